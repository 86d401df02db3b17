//! Spaced-repetition scheduling: Fibonacci-interval Leitner bins.

pub mod bins;
pub mod bulk;
pub mod config;
pub mod engine;
mod error_conversions;
mod error_responses;
pub mod history;
pub mod intervals;
pub mod replay;
pub mod updater;

pub use bulk::{recompute_all, LearnerFailure, RecomputeSummary};
pub use config::SrsConfig;
pub use engine::{LessonApplied, SrsEngine};
pub use history::{HistoryView, ReplayHistory, StoredHistory};
pub use replay::{replay, LessonRecord};
pub use updater::{ItemBatch, ItemUpdate, Outcome};
