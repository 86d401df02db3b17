//! Novelty checks shared by the incremental and replay paths.
//!
//! An item is on its first exposure when its stored bin is still 0 and no
//! lesson earlier in chronological order exercised it. The incremental path
//! answers the second half from the database, the replay path from the set
//! of items it has already folded in. Both go through [`HistoryView`].

use std::collections::HashSet;
use std::convert::Infallible;

use diesel::SqliteConnection;

use crate::data::models::{Lesson, SchedulingState};
use crate::data::repositories::LessonRepository;

pub trait HistoryView {
    type Error;

    /// Whether `lemma_id` was exercised before the lesson being applied
    fn touched_before(&mut self, lemma_id: i32) -> Result<bool, Self::Error>;
}

pub fn is_first_exposure<H: HistoryView>(
    state: &SchedulingState,
    lemma_id: i32,
    history: &mut H,
) -> Result<bool, H::Error> {
    if state.is_initialized() {
        return Ok(false);
    }
    Ok(!history.touched_before(lemma_id)?)
}

/// History as persisted: lessons ordered before `lesson` by end time, then id
pub struct StoredHistory<'a> {
    conn: &'a mut SqliteConnection,
    user_id: i32,
    lesson: &'a Lesson,
}

impl<'a> StoredHistory<'a> {
    pub fn new(conn: &'a mut SqliteConnection, user_id: i32, lesson: &'a Lesson) -> Self {
        Self {
            conn,
            user_id,
            lesson,
        }
    }
}

impl HistoryView for StoredHistory<'_> {
    type Error = diesel::result::Error;

    fn touched_before(&mut self, lemma_id: i32) -> Result<bool, Self::Error> {
        LessonRepository::item_seen_before(self.conn, self.user_id, lemma_id, self.lesson)
    }
}

/// History accumulated during a replay, scoped to that run
#[derive(Debug, Default, Clone)]
pub struct ReplayHistory {
    seen: HashSet<i32>,
}

impl ReplayHistory {
    pub fn mark_seen(&mut self, lemma_id: i32) {
        self.seen.insert(lemma_id);
    }
}

impl HistoryView for ReplayHistory {
    type Error = Infallible;

    fn touched_before(&mut self, lemma_id: i32) -> Result<bool, Self::Error> {
        Ok(self.seen.contains(&lemma_id))
    }
}
