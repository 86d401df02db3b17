use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, Pool, PoolError};
use diesel::SqliteConnection;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

const BUSY_TIMEOUT_MS: u64 = 5_000;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    srs_max_bins INTEGER NOT NULL DEFAULT 7,
    srs_interval_start_hours INTEGER NOT NULL DEFAULT 23,
    srs_algorithm TEXT NOT NULL DEFAULT 'fibonacci'
);

CREATE TABLE IF NOT EXISTS lemmas (
    lemma_id INTEGER PRIMARY KEY AUTOINCREMENT,
    language TEXT NOT NULL,
    lemma TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lessons (
    lesson_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    language TEXT NOT NULL,
    kind TEXT NOT NULL,
    start_time TIMESTAMP NOT NULL,
    end_time TIMESTAMP NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_lessons_user_end ON lessons(user_id, end_time);

CREATE TABLE IF NOT EXISTS exercises (
    exercise_id INTEGER PRIMARY KEY AUTOINCREMENT,
    lesson_id INTEGER NOT NULL REFERENCES lessons(lesson_id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    lemma_id INTEGER NOT NULL,
    exercise_type TEXT NOT NULL,
    result TEXT NOT NULL CHECK(result IN ('success', 'hint', 'fail')),
    start_time TIMESTAMP NOT NULL,
    end_time TIMESTAMP NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_exercises_lesson ON exercises(lesson_id);
CREATE INDEX IF NOT EXISTS idx_exercises_user_lemma ON exercises(user_id, lemma_id);

CREATE TABLE IF NOT EXISTS srs_states (
    user_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    lemma_id INTEGER NOT NULL REFERENCES lemmas(lemma_id) ON DELETE CASCADE,
    bin INTEGER NOT NULL DEFAULT 0 CHECK(bin >= 0),
    last_review TIMESTAMP,
    next_due TIMESTAMP,
    PRIMARY KEY (user_id, lemma_id)
);
"#;

/// Applies per-connection pragmas every time the pool hands one out
#[derive(Debug, Clone, Copy)]
struct ConnectionOptions {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        ))
        .map_err(r2d2::Error::QueryError)
    }
}

pub fn build_pool(database_url: &str, max_size: u32) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ConnectionOptions {
            busy_timeout: Duration::from_millis(BUSY_TIMEOUT_MS),
        }))
        .build(manager)
}

/// Creates every table the scheduler needs if it does not exist yet
pub fn init_schema(conn: &mut SqliteConnection) -> diesel::QueryResult<()> {
    conn.batch_execute(SCHEMA)
}
