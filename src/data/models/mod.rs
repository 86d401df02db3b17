pub mod api_models;
pub mod error_models;
pub mod learner_models;
pub mod lemma_models;
pub mod lesson_models;
pub mod srs_models;

pub use api_models::{
    DueParams, ItemUpdateView, JobCreatedResponse, LessonAppliedResponse, RecomputeParams,
    RecomputeResponse,
};
pub use error_models::SrsError;
pub use learner_models::{Learner, NewLearner, SrsAlgorithm, SrsSettings};
pub use lemma_models::NewLemma;
pub use lesson_models::{
    Exercise, ExerciseInput, ExerciseResult, Lesson, NewExercise, NewLesson, NewLessonRequest,
};
pub use srs_models::{DueItem, SchedulingState, SrsStateRow};
