use axum::extract::{Json, Path, Query, State};
use chrono::Utc;

use crate::{
    data::models::{DueItem, DueParams, RecomputeParams, RecomputeResponse, SrsError, SrsSettings},
    features::srs::SrsEngine,
    handlers::AppState,
    utils::with_conn,
};

pub async fn recompute_learner(
    State(state): State<AppState>,
    Path(learner_id): Path<i32>,
    Query(params): Query<RecomputeParams>,
) -> Result<Json<RecomputeResponse>, SrsError> {
    let updated = with_conn(&state.pool, move |conn| {
        SrsEngine::new(conn).recompute_learner(learner_id, params.item_id)
    })
    .await?;

    Ok(Json(RecomputeResponse { updated }))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Path(learner_id): Path<i32>,
    Json(settings): Json<SrsSettings>,
) -> Result<Json<RecomputeResponse>, SrsError> {
    let updated = with_conn(&state.pool, move |conn| {
        SrsEngine::new(conn).update_settings(learner_id, &settings)
    })
    .await?;

    Ok(Json(RecomputeResponse { updated }))
}

pub async fn due_items(
    State(state): State<AppState>,
    Path(learner_id): Path<i32>,
    Query(params): Query<DueParams>,
) -> Result<Json<Vec<DueItem>>, SrsError> {
    let now = params.at.unwrap_or_else(|| Utc::now().naive_utc());
    let items = with_conn(&state.pool, move |conn| {
        SrsEngine::new(conn).due_items(learner_id, now)
    })
    .await?;

    Ok(Json(items))
}
