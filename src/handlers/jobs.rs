use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};

use crate::{
    data::models::JobCreatedResponse,
    features::{
        jobs::{JobId, JobStatus},
        srs::recompute_all,
    },
    handlers::AppState,
};

/// Starts a recompute of every learner in the background
pub async fn start_bulk_recompute(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<JobCreatedResponse>), (StatusCode, String)> {
    let job_id = state.jobs.create().await.ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Job store unavailable".to_string(),
        )
    })?;

    let AppState { pool, jobs } = state;
    tokio::spawn(async move {
        jobs.update(job_id, JobStatus::Running).await;
        let status = match recompute_all(pool).await {
            Ok(summary) => JobStatus::Finished { summary },
            Err(e) => {
                log::error!("Bulk recompute job {} failed: {}", job_id, e);
                JobStatus::Failed {
                    message: e.to_string(),
                }
            }
        };
        jobs.update(job_id, status).await;
    });

    Ok((StatusCode::ACCEPTED, Json(JobCreatedResponse { job_id })))
}

pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> Result<Json<JobStatus>, (StatusCode, String)> {
    state
        .jobs
        .snapshot(job_id)
        .await
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Job {} not found", job_id)))
}
