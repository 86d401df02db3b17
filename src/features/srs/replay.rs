//! Full-history replay.
//!
//! Rebuilds scheduling state from nothing by folding every lesson of a
//! learner, oldest first, into an accumulator of per-item states. The fold
//! is pure: the same lessons and config always produce the same states.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use super::config::SrsConfig;
use super::history::{is_first_exposure, ReplayHistory};
use super::updater::{group_by_item, update_item, ItemUpdate, Outcome};
use crate::data::models::{Exercise, Lesson, SchedulingState, SrsError};

/// A lesson and its outcomes, ready to be replayed
#[derive(Debug, Clone)]
pub struct LessonRecord {
    pub lesson_id: i32,
    pub end_time: NaiveDateTime,
    pub outcomes: Vec<Outcome>,
}

impl LessonRecord {
    pub fn from_rows(lesson: &Lesson, exercises: &[Exercise]) -> Self {
        Self {
            lesson_id: lesson.lesson_id,
            end_time: lesson.end_time,
            outcomes: exercises.iter().map(Outcome::from).collect(),
        }
    }
}

/// Accumulator carried through the fold
#[derive(Debug, Default, Clone)]
pub struct Replay {
    states: BTreeMap<i32, SchedulingState>,
    history: ReplayHistory,
}

impl Replay {
    pub fn apply(
        mut self,
        lesson: &LessonRecord,
        config: &SrsConfig,
        only_item: Option<i32>,
    ) -> Result<Self, SrsError> {
        let outcomes = lesson
            .outcomes
            .iter()
            .filter(|outcome| only_item.is_none_or(|item| outcome.lemma_id == item));

        for batch in group_by_item(outcomes) {
            let state = self.states.get(&batch.lemma_id).copied().unwrap_or_default();
            let first_exposure = is_first_exposure(&state, batch.lemma_id, &mut self.history)?;

            let update = update_item(&state, &batch, first_exposure, config)?;
            if let ItemUpdate::Updated(next) = update {
                self.states.insert(batch.lemma_id, next);
            }
            self.history.mark_seen(batch.lemma_id);
        }
        Ok(self)
    }

    pub fn into_states(self) -> BTreeMap<i32, SchedulingState> {
        self.states
    }
}

/// Replays `lessons` in chronological order (end time, then lesson id) and
/// returns the final state of every item touched. Stops at the first item
/// whose next due date cannot be represented.
pub fn replay(
    mut lessons: Vec<LessonRecord>,
    config: &SrsConfig,
    only_item: Option<i32>,
) -> Result<BTreeMap<i32, SchedulingState>, SrsError> {
    lessons.sort_by_key(|lesson| (lesson.end_time, lesson.lesson_id));
    lessons
        .iter()
        .try_fold(Replay::default(), |replay, lesson| {
            replay.apply(lesson, config, only_item)
        })
        .map(Replay::into_states)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::{ExerciseResult, SrsAlgorithm};
    use crate::db::test_support::hours;
    use ExerciseResult::*;

    const ITEM: i32 = 1;

    fn config() -> SrsConfig {
        SrsConfig::new(7, 23, SrsAlgorithm::Fibonacci).unwrap()
    }

    fn lesson(lesson_id: i32, end_hour: i64, outcomes: &[(i32, ExerciseResult)]) -> LessonRecord {
        LessonRecord {
            lesson_id,
            end_time: hours(end_hour),
            outcomes: outcomes
                .iter()
                .map(|&(lemma_id, result)| Outcome {
                    lemma_id,
                    result,
                    start_time: hours(end_hour) - chrono::Duration::minutes(5),
                    end_time: hours(end_hour),
                })
                .collect(),
        }
    }

    fn state_of(states: &BTreeMap<i32, SchedulingState>) -> SchedulingState {
        states[&ITEM]
    }

    #[test]
    fn reference_scenario() {
        // Lesson one initializes, lesson two lands exactly on the due date,
        // lesson three fails and drops back to the floor.
        let lessons = vec![
            lesson(1, 0, &[(ITEM, Fail)]),
            lesson(2, 23, &[(ITEM, Success), (ITEM, Success)]),
            lesson(3, 46, &[(ITEM, Success), (ITEM, Fail)]),
        ];

        let states = replay(lessons, &config(), None).unwrap();
        let state = state_of(&states);
        assert_eq!(state.bin, 1);
        assert_eq!(state.last_review, Some(hours(46)));
        assert_eq!(state.next_due, Some(hours(69)));
    }

    #[test]
    fn second_lesson_at_due_date_advances() {
        let lessons = vec![
            lesson(1, 0, &[(ITEM, Hint)]),
            lesson(2, 23, &[(ITEM, Success)]),
        ];
        let state = state_of(&replay(lessons, &config(), None).unwrap());
        assert_eq!(state.bin, 2);
        assert_eq!(state.next_due, Some(hours(46)));
    }

    #[test]
    fn early_second_lesson_leaves_state_unchanged() {
        let lessons = vec![
            lesson(1, 0, &[(ITEM, Success)]),
            lesson(2, 20, &[(ITEM, Success)]),
        ];
        let state = state_of(&replay(lessons, &config(), None).unwrap());
        assert_eq!(state.bin, 1);
        assert_eq!(state.last_review, Some(hours(0)));
        assert_eq!(state.next_due, Some(hours(23)));
    }

    #[test]
    fn order_follows_timestamps_not_input_order() {
        let in_order = vec![
            lesson(10, 0, &[(ITEM, Success)]),
            lesson(11, 30, &[(ITEM, Success)]),
        ];
        let shuffled = vec![
            lesson(11, 30, &[(ITEM, Success)]),
            lesson(10, 0, &[(ITEM, Success)]),
        ];
        assert_eq!(
            replay(in_order, &config(), None).unwrap(),
            replay(shuffled, &config(), None).unwrap()
        );
    }

    #[test]
    fn replay_is_deterministic() {
        let lessons = vec![
            lesson(1, 0, &[(ITEM, Success), (2, Hint)]),
            lesson(2, 24, &[(ITEM, Success), (2, Fail)]),
            lesson(3, 100, &[(ITEM, Hint), (2, Success)]),
        ];
        let first = replay(lessons.clone(), &config(), None).unwrap();
        let second = replay(lessons, &config(), None).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn item_filter_limits_the_replay() {
        let lessons = vec![
            lesson(1, 0, &[(ITEM, Success), (2, Success)]),
            lesson(2, 24, &[(2, Success)]),
        ];
        let states = replay(lessons, &config(), Some(2)).unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(states[&2].bin, 2);
    }

    #[test]
    fn unschedulable_lesson_fails_the_replay() {
        let mut far = lesson(2, 0, &[(ITEM, Success)]);
        far.end_time = NaiveDateTime::MAX - chrono::Duration::hours(1);
        for outcome in &mut far.outcomes {
            outcome.end_time = far.end_time;
        }
        let lessons = vec![lesson(1, 0, &[(ITEM, Success)]), far];

        let err = replay(lessons, &config(), None).unwrap_err();
        assert!(matches!(err, SrsError::TimestampOutOfRange(_)));
    }

    #[test]
    fn unschedulable_item_outside_filter_is_ignored() {
        let mut far = lesson(2, 0, &[(2, Success)]);
        far.end_time = NaiveDateTime::MAX - chrono::Duration::hours(1);
        for outcome in &mut far.outcomes {
            outcome.end_time = far.end_time;
        }
        let lessons = vec![lesson(1, 0, &[(ITEM, Success)]), far];

        let states = replay(lessons, &config(), Some(ITEM)).unwrap();
        assert_eq!(state_of(&states).bin, 1);
    }

    #[test]
    fn bins_climb_through_fibonacci_intervals() {
        let mut lessons = vec![lesson(1, 0, &[(ITEM, Success)])];
        let mut end = 0;
        let mut bin = 1;
        for id in 2..=9 {
            end += super::super::intervals::interval_hours(bin, 23);
            lessons.push(lesson(id, end, &[(ITEM, Success)]));
            bin = (bin + 1).min(7);
        }
        let state = state_of(&replay(lessons, &config(), None).unwrap());
        assert_eq!(state.bin, 7);
        assert_eq!(state.next_due, Some(hours(end + 299)));
    }
}
