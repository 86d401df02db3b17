pub mod jobs;
pub mod srs;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::db::DbPool;
use crate::features::jobs::JobStore;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub jobs: JobStore,
}

pub fn router(state: AppState) -> Router {
    let learner_router = Router::new()
        .route("/lessons", post(srs::lessons::complete_lesson))
        .route("/lessons/{lesson_id}/apply", post(srs::lessons::apply_lesson))
        .route("/srs/recompute", post(srs::schedule::recompute_learner))
        .route("/srs/settings", put(srs::schedule::update_settings))
        .route("/srs/due", get(srs::schedule::due_items));

    let api_router = Router::new()
        .nest("/learners/{learner_id}", learner_router)
        .route("/srs/recompute", post(jobs::start_bulk_recompute))
        .route("/jobs/{job_id}", get(jobs::job_status));

    Router::new().nest("/api", api_router).with_state(state)
}
