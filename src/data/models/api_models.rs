use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::data::models::SchedulingState;

/// Per-item result of applying one lesson
#[derive(Debug, Serialize)]
pub struct ItemUpdateView {
    pub lemma_id: i32,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<SchedulingState>,
}

#[derive(Debug, Serialize)]
pub struct LessonAppliedResponse {
    pub lesson_id: i32,
    pub items: Vec<ItemUpdateView>,
}

#[derive(Debug, Deserialize)]
pub struct RecomputeParams {
    pub item_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct RecomputeResponse {
    pub updated: usize,
}

#[derive(Debug, Deserialize)]
pub struct DueParams {
    pub at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize)]
pub struct JobCreatedResponse {
    pub job_id: u64,
}
