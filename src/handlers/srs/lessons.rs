use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};

use crate::{
    data::models::{ItemUpdateView, LessonAppliedResponse, NewLessonRequest, SrsError},
    features::srs::{ItemUpdate, LessonApplied, SrsEngine},
    handlers::AppState,
    utils::with_conn,
};

impl From<LessonApplied> for LessonAppliedResponse {
    fn from(applied: LessonApplied) -> Self {
        LessonAppliedResponse {
            lesson_id: applied.lesson_id,
            items: applied
                .items
                .into_iter()
                .map(|(lemma_id, update)| ItemUpdateView {
                    lemma_id,
                    status: update.status(),
                    state: match update {
                        ItemUpdate::Updated(state) => Some(state),
                        ItemUpdate::Unchanged => None,
                    },
                })
                .collect(),
        }
    }
}

pub async fn complete_lesson(
    State(state): State<AppState>,
    Path(learner_id): Path<i32>,
    Json(payload): Json<NewLessonRequest>,
) -> Result<(StatusCode, Json<LessonAppliedResponse>), SrsError> {
    let applied = with_conn(&state.pool, move |conn| {
        SrsEngine::new(conn).complete_lesson(learner_id, &payload)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(applied.into())))
}

pub async fn apply_lesson(
    State(state): State<AppState>,
    Path((learner_id, lesson_id)): Path<(i32, i32)>,
) -> Result<Json<LessonAppliedResponse>, SrsError> {
    let applied = with_conn(&state.pool, move |conn| {
        SrsEngine::new(conn).apply_lesson(learner_id, lesson_id)
    })
    .await?;

    Ok(Json(applied.into()))
}
