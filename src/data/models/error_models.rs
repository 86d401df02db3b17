use chrono::NaiveDateTime;
use diesel::result::Error as DieselError;
use thiserror::Error;

/// Errors raised by the scheduling engine and the service around it
#[derive(Error, Debug)]
pub enum SrsError {
    #[error("Invalid SRS configuration: {0}")]
    InvalidConfig(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Learner {0} not found")]
    LearnerNotFound(i32),
    #[error("Lesson {0} not found")]
    LessonNotFound(i32),
    #[error("Lesson has no exercises")]
    EmptyLesson,
    #[error("Review at {0} cannot be scheduled: next due date is out of range")]
    TimestampOutOfRange(NaiveDateTime),
    #[error("Database error: {0}")]
    Database(#[from] DieselError),
    #[error("Connection pool error: {0}")]
    Pool(String),
    #[error("Background task error: {0}")]
    Task(String),
}

impl SrsError {
    /// Whether retrying the same call may succeed. Lock and pool timeouts
    /// are transient; everything else fails the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            SrsError::Pool(_) => true,
            SrsError::Database(DieselError::DatabaseError(_, info)) => {
                let message = info.message();
                message.contains("locked") || message.contains("busy")
            }
            _ => false,
        }
    }
}
