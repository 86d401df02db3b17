use chrono::NaiveDateTime;
use diesel::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::schema::srs_states;

/// Scheduling state of one item for one learner.
///
/// `bin == 0` means the item was never initialized; once a lesson touched it
/// the bin stays within `1..=max_bins`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingState {
    pub bin: i32,
    pub last_review: Option<NaiveDateTime>,
    pub next_due: Option<NaiveDateTime>,
}

impl SchedulingState {
    pub fn is_initialized(&self) -> bool {
        self.bin > 0
    }

    pub fn is_due_at(&self, when: NaiveDateTime) -> bool {
        match self.next_due {
            Some(due) => when >= due,
            None => true,
        }
    }
}

/// Persisted scheduling state row
#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = srs_states)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_default_value = false)]
pub struct SrsStateRow {
    pub user_id: i32,
    pub lemma_id: i32,
    pub bin: i32,
    pub last_review: Option<NaiveDateTime>,
    pub next_due: Option<NaiveDateTime>,
}

impl SrsStateRow {
    pub fn new(user_id: i32, lemma_id: i32, state: SchedulingState) -> Self {
        Self {
            user_id,
            lemma_id,
            bin: state.bin,
            last_review: state.last_review,
            next_due: state.next_due,
        }
    }

    pub fn state(&self) -> SchedulingState {
        SchedulingState {
            bin: self.bin,
            last_review: self.last_review,
            next_due: self.next_due,
        }
    }
}

/// Item due for review, as returned by the due listing
#[derive(Debug, Serialize)]
pub struct DueItem {
    pub lemma_id: i32,
    pub lemma: String,
    pub bin: i32,
    pub next_due: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn default_state_is_uninitialized_and_due() {
        let state = SchedulingState::default();
        assert!(!state.is_initialized());
        assert!(state.is_due_at(at(0)));
    }

    #[test]
    fn due_boundary_is_inclusive() {
        let state = SchedulingState {
            bin: 2,
            last_review: Some(at(1)),
            next_due: Some(at(10)),
        };
        assert!(!state.is_due_at(at(9)));
        assert!(state.is_due_at(at(10)));
    }

    #[test]
    fn row_round_trips_state() {
        let state = SchedulingState {
            bin: 3,
            last_review: Some(at(2)),
            next_due: Some(at(5)),
        };
        let row = SrsStateRow::new(4, 9, state);
        assert_eq!((row.user_id, row.lemma_id), (4, 9));
        assert_eq!(row.state(), state);
    }
}
