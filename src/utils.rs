use diesel::SqliteConnection;

use crate::data::models::SrsError;
use crate::db::DbPool;

/// Runs blocking diesel work on the blocking thread pool with a pooled
/// connection, so async handlers never block the runtime.
pub async fn with_conn<T, F>(pool: &DbPool, work: F) -> Result<T, SrsError>
where
    F: FnOnce(&mut SqliteConnection) -> Result<T, SrsError> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get()?;
        work(&mut conn)
    })
    .await?
}
