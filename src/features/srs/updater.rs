//! Applies one lesson's exercises to the items they target.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use serde::Serialize;

use super::bins::next_bin;
use super::config::SrsConfig;
use super::history::{is_first_exposure, HistoryView};
use crate::data::models::{Exercise, ExerciseResult, SchedulingState, SrsError};

/// One exercise outcome as the engine sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub lemma_id: i32,
    pub result: ExerciseResult,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

impl From<&Exercise> for Outcome {
    fn from(exercise: &Exercise) -> Self {
        Self {
            lemma_id: exercise.lemma_id,
            result: exercise.result,
            start_time: exercise.start_time,
            end_time: exercise.end_time,
        }
    }
}

/// All outcomes of one lesson for a single item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemBatch {
    pub lemma_id: i32,
    pub results: Vec<ExerciseResult>,
    pub last_exercise_end: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "state", rename_all = "lowercase")]
pub enum ItemUpdate {
    Updated(SchedulingState),
    Unchanged,
}

impl ItemUpdate {
    pub fn status(&self) -> &'static str {
        match self {
            ItemUpdate::Updated(_) => "updated",
            ItemUpdate::Unchanged => "unchanged",
        }
    }
}

/// Groups outcomes by item, ordered by item id
pub fn group_by_item<'a, I>(outcomes: I) -> Vec<ItemBatch>
where
    I: IntoIterator<Item = &'a Outcome>,
{
    let mut batches: BTreeMap<i32, ItemBatch> = BTreeMap::new();
    for outcome in outcomes {
        batches
            .entry(outcome.lemma_id)
            .and_modify(|batch| {
                batch.results.push(outcome.result);
                batch.last_exercise_end = batch.last_exercise_end.max(outcome.end_time);
            })
            .or_insert_with(|| ItemBatch {
                lemma_id: outcome.lemma_id,
                results: vec![outcome.result],
                last_exercise_end: outcome.end_time,
            });
    }
    batches.into_values().collect()
}

/// State transition for one item from one lesson.
///
/// A first exposure always initializes the item. Otherwise the lesson only
/// counts when it ended at or after `next_due`; earlier practice leaves the
/// state untouched.
pub fn update_item(
    state: &SchedulingState,
    batch: &ItemBatch,
    first_exposure: bool,
    config: &SrsConfig,
) -> Result<ItemUpdate, SrsError> {
    let reviewed_at = batch.last_exercise_end;

    if first_exposure {
        return reschedule(reviewed_at, 1, config).map(ItemUpdate::Updated);
    }

    if !state.is_due_at(reviewed_at) {
        return Ok(ItemUpdate::Unchanged);
    }

    let bin = next_bin(state.bin, &batch.results, false, config.max_bins());
    reschedule(reviewed_at, bin, config).map(ItemUpdate::Updated)
}

fn reschedule(
    reviewed_at: NaiveDateTime,
    bin: i32,
    config: &SrsConfig,
) -> Result<SchedulingState, SrsError> {
    let next_due = reviewed_at
        .checked_add_signed(config.interval_for(bin))
        .ok_or(SrsError::TimestampOutOfRange(reviewed_at))?;
    Ok(SchedulingState {
        bin,
        last_review: Some(reviewed_at),
        next_due: Some(next_due),
    })
}

/// Applies a lesson to every item its outcomes reference.
///
/// `states` holds the current state of every item the caller knows about.
/// Outcomes for an item missing from `states` are logged and skipped.
pub fn apply_lesson<H>(
    config: &SrsConfig,
    outcomes: &[Outcome],
    states: &HashMap<i32, SchedulingState>,
    history: &mut H,
) -> Result<Vec<(i32, ItemUpdate)>, SrsError>
where
    H: HistoryView,
    SrsError: From<H::Error>,
{
    let mut updates = Vec::new();
    for batch in group_by_item(outcomes) {
        let Some(state) = states.get(&batch.lemma_id) else {
            log::warn!(
                "Skipping {} exercise(s) for unknown item {}",
                batch.results.len(),
                batch.lemma_id
            );
            continue;
        };

        let first_exposure = is_first_exposure(state, batch.lemma_id, history)?;
        let update = update_item(state, &batch, first_exposure, config)?;
        if update == ItemUpdate::Unchanged {
            log::debug!(
                "Item {} not due until {:?}, lesson ignored",
                batch.lemma_id,
                state.next_due
            );
        }
        updates.push((batch.lemma_id, update));
    }
    Ok(updates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::SrsAlgorithm;
    use crate::db::test_support::hours;
    use crate::features::srs::history::ReplayHistory;
    use ExerciseResult::*;

    fn config() -> SrsConfig {
        SrsConfig::new(7, 23, SrsAlgorithm::Fibonacci).unwrap()
    }

    fn outcome(lemma_id: i32, result: ExerciseResult, end_hour: i64) -> Outcome {
        Outcome {
            lemma_id,
            result,
            start_time: hours(end_hour) - chrono::Duration::minutes(1),
            end_time: hours(end_hour),
        }
    }

    fn batch(results: &[ExerciseResult], end_hour: i64) -> ItemBatch {
        ItemBatch {
            lemma_id: 1,
            results: results.to_vec(),
            last_exercise_end: hours(end_hour),
        }
    }

    fn state(bin: i32, reviewed: i64, due: i64) -> SchedulingState {
        SchedulingState {
            bin,
            last_review: Some(hours(reviewed)),
            next_due: Some(hours(due)),
        }
    }

    #[test]
    fn groups_outcomes_and_keeps_latest_end() {
        let outcomes = vec![
            outcome(2, Success, 5),
            outcome(1, Hint, 3),
            outcome(2, Fail, 7),
            outcome(2, Success, 6),
        ];
        let batches = group_by_item(&outcomes);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].lemma_id, 1);
        assert_eq!(batches[1].results, vec![Success, Fail, Success]);
        assert_eq!(batches[1].last_exercise_end, hours(7));
    }

    #[test]
    fn first_exposure_initializes_regardless_of_results() {
        let update =
            update_item(&SchedulingState::default(), &batch(&[Fail], 10), true, &config()).unwrap();
        assert_eq!(
            update,
            ItemUpdate::Updated(SchedulingState {
                bin: 1,
                last_review: Some(hours(10)),
                next_due: Some(hours(33)),
            })
        );
    }

    #[test]
    fn early_practice_is_gated() {
        let current = state(1, 10, 33);
        let update = update_item(&current, &batch(&[Success], 32), false, &config()).unwrap();
        assert_eq!(update, ItemUpdate::Unchanged);
    }

    #[test]
    fn lesson_ending_exactly_at_due_counts() {
        let current = state(1, 10, 33);
        let update = update_item(&current, &batch(&[Success], 33), false, &config()).unwrap();
        assert_eq!(update, ItemUpdate::Updated(state(2, 33, 56)));
    }

    #[test]
    fn missing_due_date_is_never_gated() {
        let current = SchedulingState {
            bin: 3,
            last_review: None,
            next_due: None,
        };
        let update = update_item(&current, &batch(&[Hint], 1), false, &config()).unwrap();
        assert_eq!(update, ItemUpdate::Updated(state(3, 1, 47)));
    }

    #[test]
    fn next_due_never_precedes_last_review() {
        for bin in 0..=7 {
            for results in [&[Success][..], &[Hint], &[Fail]] {
                let current = SchedulingState {
                    bin,
                    last_review: None,
                    next_due: None,
                };
                if let Ok(ItemUpdate::Updated(next)) =
                    update_item(&current, &batch(results, 4), bin == 0, &config())
                {
                    assert!(next.next_due >= next.last_review);
                }
            }
        }
    }

    #[test]
    fn apply_lesson_skips_unknown_items() {
        let outcomes = vec![outcome(1, Success, 4), outcome(99, Success, 4)];
        let states = HashMap::from([(1, SchedulingState::default())]);
        let mut history = ReplayHistory::default();

        let updates = apply_lesson(&config(), &outcomes, &states, &mut history).unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, 1);
        assert_eq!(updates[0].1.status(), "updated");
    }

    #[test]
    fn apply_lesson_treats_seen_uninitialized_item_as_review() {
        // State lost but history says the item was exercised before.
        let outcomes = vec![outcome(1, Success, 4)];
        let states = HashMap::from([(1, SchedulingState::default())]);
        let mut history = ReplayHistory::default();
        history.mark_seen(1);

        let updates = apply_lesson(&config(), &outcomes, &states, &mut history).unwrap();
        assert_eq!(updates[0].1, ItemUpdate::Updated(state(1, 4, 27)));
    }

    #[test]
    fn due_date_past_the_calendar_is_an_error() {
        let last_day = NaiveDateTime::MAX - chrono::Duration::hours(4);
        let batch = ItemBatch {
            lemma_id: 1,
            results: vec![Success],
            last_exercise_end: last_day,
        };

        let err = update_item(&SchedulingState::default(), &batch, true, &config()).unwrap_err();
        assert!(matches!(err, SrsError::TimestampOutOfRange(at) if at == last_day));

        let reviewed = SchedulingState {
            bin: 3,
            last_review: Some(last_day - chrono::Duration::hours(100)),
            next_due: Some(last_day - chrono::Duration::hours(54)),
        };
        assert!(update_item(&reviewed, &batch, false, &config()).is_err());
    }

    #[test]
    fn latest_schedulable_review_still_fits() {
        let last_day = NaiveDateTime::MAX - chrono::Duration::hours(23);
        let batch = ItemBatch {
            lemma_id: 1,
            results: vec![Fail],
            last_exercise_end: last_day,
        };
        let update = update_item(&SchedulingState::default(), &batch, true, &config()).unwrap();
        assert_eq!(
            update,
            ItemUpdate::Updated(SchedulingState {
                bin: 1,
                last_review: Some(last_day),
                next_due: Some(NaiveDateTime::MAX),
            })
        );
    }

    #[test]
    fn apply_lesson_reports_out_of_range_items() {
        let outcomes = vec![Outcome {
            lemma_id: 1,
            result: Success,
            start_time: NaiveDateTime::MAX - chrono::Duration::hours(2),
            end_time: NaiveDateTime::MAX - chrono::Duration::hours(1),
        }];
        let states = HashMap::from([(1, SchedulingState::default())]);
        let mut history = ReplayHistory::default();

        let result = apply_lesson(&config(), &outcomes, &states, &mut history);
        assert!(matches!(result, Err(SrsError::TimestampOutOfRange(_))));
    }

    #[test]
    fn item_update_serializes_with_status_tag() {
        let json = serde_json::to_value(ItemUpdate::Unchanged).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "unchanged" }));
    }
}
