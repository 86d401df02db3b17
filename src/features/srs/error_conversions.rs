use std::convert::Infallible;

use diesel::r2d2::PoolError;
use tokio::task::JoinError;
use validator::ValidationErrors;

use crate::data::models::SrsError;

impl From<ValidationErrors> for SrsError {
    fn from(err: ValidationErrors) -> Self {
        SrsError::Validation(err.to_string())
    }
}

impl From<PoolError> for SrsError {
    fn from(err: PoolError) -> Self {
        SrsError::Pool(err.to_string())
    }
}

impl From<JoinError> for SrsError {
    fn from(err: JoinError) -> Self {
        SrsError::Task(err.to_string())
    }
}

impl From<Infallible> for SrsError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}
