pub mod lessons;
pub mod schedule;
