use std::fmt;
use std::str::FromStr;

use diesel::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schema::users;

pub const DEFAULT_MAX_BINS: i32 = 7;
pub const DEFAULT_INTERVAL_START_HOURS: i32 = 23;

/// Scheduling algorithm selector. Only the Fibonacci-interval Leitner
/// variant exists today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SrsAlgorithm {
    #[default]
    Fibonacci,
}

impl SrsAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SrsAlgorithm::Fibonacci => "fibonacci",
        }
    }
}

impl fmt::Display for SrsAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SrsAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fibonacci" => Ok(SrsAlgorithm::Fibonacci),
            other => Err(format!("Unsupported SRS algorithm: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Learner {
    pub user_id: i32,
    pub username: String,
    pub srs_max_bins: i32,
    pub srs_interval_start_hours: i32,
    pub srs_algorithm: String,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewLearner<'a> {
    pub username: &'a str,
    pub srs_max_bins: i32,
    pub srs_interval_start_hours: i32,
    pub srs_algorithm: &'a str,
}

impl<'a> NewLearner<'a> {
    pub fn with_defaults(username: &'a str) -> Self {
        Self {
            username,
            srs_max_bins: DEFAULT_MAX_BINS,
            srs_interval_start_hours: DEFAULT_INTERVAL_START_HOURS,
            srs_algorithm: SrsAlgorithm::default().as_str(),
        }
    }
}

/// Learner-editable SRS settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct SrsSettings {
    #[validate(range(min = 5, max = 20, message = "max_bins must be between 5 and 20"))]
    pub max_bins: i32,
    #[validate(range(min = 1, max = 24, message = "interval_start_hours must be between 1 and 24"))]
    pub interval_start_hours: i32,
    #[serde(default)]
    pub algorithm: SrsAlgorithm,
}

impl Default for SrsSettings {
    fn default() -> Self {
        Self {
            max_bins: DEFAULT_MAX_BINS,
            interval_start_hours: DEFAULT_INTERVAL_START_HOURS,
            algorithm: SrsAlgorithm::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_settings() {
        let settings = SrsSettings {
            max_bins: 3,
            interval_start_hours: 30,
            algorithm: SrsAlgorithm::Fibonacci,
        };
        let errors = settings.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("max_bins"));
        assert!(fields.contains_key("interval_start_hours"));
    }

    #[test]
    fn defaults_are_valid() {
        assert!(SrsSettings::default().validate().is_ok());
    }

    #[test]
    fn unknown_algorithm_does_not_parse() {
        assert!("sm2".parse::<SrsAlgorithm>().is_err());
        assert!(serde_json::from_str::<SrsAlgorithm>("\"sm2\"").is_err());
        assert_eq!("fibonacci".parse(), Ok(SrsAlgorithm::Fibonacci));
    }
}
