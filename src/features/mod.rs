pub mod jobs;
pub mod srs;
