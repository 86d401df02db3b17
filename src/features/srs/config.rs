use chrono::Duration;
use validator::Validate;

use crate::data::models::{Learner, SrsAlgorithm, SrsError, SrsSettings};

/// Validated scheduling parameters for one learner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SrsConfig {
    max_bins: i32,
    interval_start_hours: i32,
    algorithm: SrsAlgorithm,
}

impl SrsConfig {
    pub fn new(
        max_bins: i32,
        interval_start_hours: i32,
        algorithm: SrsAlgorithm,
    ) -> Result<Self, SrsError> {
        let settings = SrsSettings {
            max_bins,
            interval_start_hours,
            algorithm,
        };
        settings
            .validate()
            .map_err(|e| SrsError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            max_bins,
            interval_start_hours,
            algorithm,
        })
    }

    pub fn max_bins(&self) -> i32 {
        self.max_bins
    }

    pub fn interval_start_hours(&self) -> i32 {
        self.interval_start_hours
    }

    pub fn algorithm(&self) -> SrsAlgorithm {
        self.algorithm
    }

    /// Wait before an item in `bin` is due again
    pub fn interval_for(&self, bin: i32) -> Duration {
        match self.algorithm {
            SrsAlgorithm::Fibonacci => {
                Duration::hours(super::intervals::interval_hours(bin, self.interval_start_hours))
            }
        }
    }
}

impl TryFrom<SrsSettings> for SrsConfig {
    type Error = SrsError;

    fn try_from(settings: SrsSettings) -> Result<Self, Self::Error> {
        SrsConfig::new(
            settings.max_bins,
            settings.interval_start_hours,
            settings.algorithm,
        )
    }
}

impl TryFrom<&Learner> for SrsConfig {
    type Error = SrsError;

    fn try_from(learner: &Learner) -> Result<Self, Self::Error> {
        let algorithm = learner
            .srs_algorithm
            .parse::<SrsAlgorithm>()
            .map_err(SrsError::InvalidConfig)?;
        SrsConfig::new(
            learner.srs_max_bins,
            learner.srs_interval_start_hours,
            algorithm,
        )
    }
}
