//! Recompute every learner at once, one blocking task per learner.

use std::any::Any;
use std::collections::BTreeSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use diesel::SqliteConnection;
use serde::Serialize;
use tokio::task::JoinSet;

use super::engine::SrsEngine;
use crate::data::models::SrsError;
use crate::data::repositories::LearnerRepository;
use crate::db::DbPool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LearnerFailure {
    pub user_id: i32,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecomputeSummary {
    pub learners: usize,
    pub items_updated: usize,
    pub failures: Vec<LearnerFailure>,
}

impl RecomputeSummary {
    fn record_failure(&mut self, user_id: i32, error: String) {
        log::error!("Recompute failed for learner {}: {}", user_id, error);
        self.failures.push(LearnerFailure { user_id, error });
    }
}

/// Runs a full recompute for every learner. Each learner is its own
/// transaction; one learner failing, or panicking, is recorded in the summary
/// and does not stop the others.
pub async fn recompute_all(pool: DbPool) -> Result<RecomputeSummary, SrsError> {
    recompute_each(pool, |conn, user_id| {
        SrsEngine::new(conn).recompute_learner(user_id, None)
    })
    .await
}

async fn recompute_each<F>(pool: DbPool, work: F) -> Result<RecomputeSummary, SrsError>
where
    F: Fn(&mut SqliteConnection, i32) -> Result<usize, SrsError> + Send + Sync + 'static,
{
    let listing_pool = pool.clone();
    let learner_ids = tokio::task::spawn_blocking(move || -> Result<Vec<i32>, SrsError> {
        let mut conn = listing_pool.get()?;
        Ok(LearnerRepository::list_ids(&mut conn)?)
    })
    .await??;

    let work = Arc::new(work);
    let mut pending: BTreeSet<i32> = learner_ids.iter().copied().collect();
    let mut tasks = JoinSet::new();
    for user_id in learner_ids {
        let pool = pool.clone();
        let work = Arc::clone(&work);
        tasks.spawn_blocking(move || (user_id, run_isolated(&pool, user_id, work.as_ref())));
    }

    let mut summary = RecomputeSummary::default();
    while let Some(joined) = tasks.join_next().await {
        let (user_id, result) = match joined {
            Ok(done) => done,
            Err(e) => {
                // Panics are caught inside the task, so this only happens on
                // cancellation; the learner stays in `pending`.
                log::error!("Recompute task did not complete: {}", e);
                continue;
            }
        };
        pending.remove(&user_id);
        summary.learners += 1;
        match result {
            Ok(items) => summary.items_updated += items,
            Err(e) => summary.record_failure(user_id, e.to_string()),
        }
    }
    for user_id in pending {
        summary.learners += 1;
        summary.record_failure(user_id, "recompute task did not complete".into());
    }
    summary.failures.sort_by_key(|failure| failure.user_id);

    log::info!(
        "Recomputed {} learners ({} items, {} failures)",
        summary.learners,
        summary.items_updated,
        summary.failures.len()
    );
    Ok(summary)
}

/// Runs `work` for one learner, turning a panic into an error. A connection
/// left inside a transaction by the panic is discarded by the pool.
fn run_isolated<F>(pool: &DbPool, user_id: i32, work: &F) -> Result<usize, SrsError>
where
    F: Fn(&mut SqliteConnection, i32) -> Result<usize, SrsError>,
{
    let mut conn = pool.get()?;
    match catch_unwind(AssertUnwindSafe(|| work(&mut conn, user_id))) {
        Ok(result) => result,
        Err(payload) => Err(SrsError::Task(format!(
            "recompute panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
