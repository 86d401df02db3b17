// Database-facing scheduling operations. Every public method runs as one
// IMMEDIATE transaction so a failure never leaves a learner half-updated.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use diesel::prelude::*;
use validator::Validate;

use super::config::SrsConfig;
use super::history::StoredHistory;
use super::replay::{replay, LessonRecord};
use super::updater::{self, ItemUpdate, Outcome};
use crate::data::models::{
    DueItem, Learner, Lesson, NewExercise, NewLesson, NewLessonRequest, SchedulingState,
    SrsError, SrsSettings, SrsStateRow,
};
use crate::data::repositories::{
    LearnerRepository, LemmaRepository, LessonRepository, SrsStateRepository,
};

/// Result of applying one lesson
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonApplied {
    pub lesson_id: i32,
    pub items: Vec<(i32, ItemUpdate)>,
}

impl LessonApplied {
    pub fn updated_count(&self) -> usize {
        self.items
            .iter()
            .filter(|(_, update)| matches!(update, ItemUpdate::Updated(_)))
            .count()
    }
}

/// The scheduling engine bound to a database connection
pub struct SrsEngine<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> SrsEngine<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        SrsEngine { conn }
    }

    /// Stores a finished lesson with its exercises and updates the schedule
    /// of every item it touched.
    pub fn complete_lesson(
        &mut self,
        user_id: i32,
        request: &NewLessonRequest,
    ) -> Result<LessonApplied, SrsError> {
        request.validate()?;
        let (start_time, end_time) = lesson_bounds(request)?;

        self.conn.immediate_transaction(|conn| {
            let learner = load_learner(conn, user_id)?;
            let config = SrsConfig::try_from(&learner)?;

            let lesson_id = LessonRepository::insert_lesson(
                conn,
                &NewLesson {
                    user_id,
                    language: &request.language,
                    kind: &request.kind,
                    start_time,
                    end_time,
                },
            )?;

            let rows: Vec<NewExercise<'_>> = request
                .exercises
                .iter()
                .map(|exercise| NewExercise {
                    lesson_id,
                    user_id,
                    lemma_id: exercise.lemma_id,
                    exercise_type: &exercise.exercise_type,
                    result: exercise.result,
                    start_time: exercise.start_time,
                    end_time: exercise.end_time,
                })
                .collect();
            LessonRepository::insert_exercises(conn, &rows)?;

            let lesson = LessonRepository::find(conn, user_id, lesson_id)?
                .ok_or(SrsError::LessonNotFound(lesson_id))?;
            let applied = apply_stored_lesson(conn, &config, &lesson)?;

            log::info!(
                "Learner {} completed lesson {} ({} exercises, {} items rescheduled)",
                user_id,
                lesson_id,
                rows.len(),
                applied.updated_count()
            );
            Ok(applied)
        })
    }

    /// Applies an already stored lesson. Applying the same lesson again is a
    /// no-op because every item it touched is no longer due.
    pub fn apply_lesson(
        &mut self,
        user_id: i32,
        lesson_id: i32,
    ) -> Result<LessonApplied, SrsError> {
        self.conn.immediate_transaction(|conn| {
            let learner = load_learner(conn, user_id)?;
            let config = SrsConfig::try_from(&learner)?;
            let lesson = LessonRepository::find(conn, user_id, lesson_id)?
                .ok_or(SrsError::LessonNotFound(lesson_id))?;
            apply_stored_lesson(conn, &config, &lesson)
        })
    }

    /// Rebuilds the learner's schedule from the complete lesson history,
    /// optionally for a single item. Returns how many items were written.
    pub fn recompute_learner(
        &mut self,
        user_id: i32,
        item: Option<i32>,
    ) -> Result<usize, SrsError> {
        self.conn.immediate_transaction(|conn| {
            let learner = load_learner(conn, user_id)?;
            let config = SrsConfig::try_from(&learner)?;
            recompute(conn, &learner, &config, item)
        })
    }

    /// Stores new settings and recomputes the learner under them
    pub fn update_settings(
        &mut self,
        user_id: i32,
        settings: &SrsSettings,
    ) -> Result<usize, SrsError> {
        settings.validate()?;
        let config = SrsConfig::try_from(*settings)?;

        self.conn.immediate_transaction(|conn| {
            if LearnerRepository::update_settings(conn, user_id, settings)? == 0 {
                return Err(SrsError::LearnerNotFound(user_id));
            }
            let learner = load_learner(conn, user_id)?;
            recompute(conn, &learner, &config, None)
        })
    }

    pub fn due_items(
        &mut self,
        user_id: i32,
        now: NaiveDateTime,
    ) -> Result<Vec<DueItem>, SrsError> {
        load_learner(self.conn, user_id)?;
        Ok(SrsStateRepository::due(self.conn, user_id, now)?)
    }

    pub fn states(&mut self, user_id: i32) -> Result<HashMap<i32, SchedulingState>, SrsError> {
        Ok(SrsStateRepository::for_learner(self.conn, user_id)?
            .into_iter()
            .map(|row| (row.lemma_id, row.state()))
            .collect())
    }
}

fn load_learner(conn: &mut SqliteConnection, user_id: i32) -> Result<Learner, SrsError> {
    LearnerRepository::find(conn, user_id)?.ok_or(SrsError::LearnerNotFound(user_id))
}

/// Lesson start and end derived from its exercises
fn lesson_bounds(
    request: &NewLessonRequest,
) -> Result<(NaiveDateTime, NaiveDateTime), SrsError> {
    if let Some(bad) = request
        .exercises
        .iter()
        .find(|exercise| exercise.end_time < exercise.start_time)
    {
        return Err(SrsError::Validation(format!(
            "Exercise for item {} ends before it starts",
            bad.lemma_id
        )));
    }

    let start = request.exercises.iter().map(|e| e.start_time).min();
    let end = request.exercises.iter().map(|e| e.end_time).max();
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(SrsError::EmptyLesson),
    }
}

fn apply_stored_lesson(
    conn: &mut SqliteConnection,
    config: &SrsConfig,
    lesson: &Lesson,
) -> Result<LessonApplied, SrsError> {
    let exercises = LessonRepository::exercises_for_lesson(conn, lesson.lesson_id)?;
    if exercises.is_empty() {
        return Err(SrsError::EmptyLesson);
    }
    let outcomes: Vec<Outcome> = exercises.iter().map(Outcome::from).collect();

    let mut lemma_ids: Vec<i32> = outcomes.iter().map(|o| o.lemma_id).collect();
    lemma_ids.sort_unstable();
    lemma_ids.dedup();

    // Only items that exist get a state entry; the updater skips the rest.
    let known = LemmaRepository::existing_ids(conn, &lemma_ids)?;
    let mut states: HashMap<i32, SchedulingState> = known
        .iter()
        .map(|&lemma_id| (lemma_id, SchedulingState::default()))
        .collect();
    for row in SrsStateRepository::find_many(conn, lesson.user_id, &lemma_ids)? {
        states.insert(row.lemma_id, row.state());
    }

    let items = {
        let mut history = StoredHistory::new(conn, lesson.user_id, lesson);
        updater::apply_lesson(config, &outcomes, &states, &mut history)?
    };

    for (lemma_id, update) in &items {
        if let ItemUpdate::Updated(state) = update {
            SrsStateRepository::upsert(conn, &SrsStateRow::new(lesson.user_id, *lemma_id, *state))?;
        }
    }

    Ok(LessonApplied {
        lesson_id: lesson.lesson_id,
        items,
    })
}

fn recompute(
    conn: &mut SqliteConnection,
    learner: &Learner,
    config: &SrsConfig,
    item: Option<i32>,
) -> Result<usize, SrsError> {
    let history = LessonRepository::history(conn, learner.user_id)?;

    let mut lemma_ids: Vec<i32> = history
        .iter()
        .flat_map(|(_, exercises)| exercises.iter().map(|e| e.lemma_id))
        .collect();
    lemma_ids.sort_unstable();
    lemma_ids.dedup();
    let known = LemmaRepository::existing_ids(conn, &lemma_ids)?;
    let unknown: HashSet<i32> = lemma_ids
        .iter()
        .copied()
        .filter(|id| !known.contains(id))
        .collect();
    for lemma_id in &unknown {
        log::warn!(
            "Learner {} has exercises for unknown item {}, skipping it",
            learner.user_id,
            lemma_id
        );
    }

    let records: Vec<LessonRecord> = history
        .iter()
        .map(|(lesson, exercises)| {
            let mut record = LessonRecord::from_rows(lesson, exercises);
            record.outcomes.retain(|o| known.contains(&o.lemma_id));
            record
        })
        .collect();

    let states = replay(records, config, item)?;

    SrsStateRepository::delete_for_learner(conn, learner.user_id, item)?;
    let rows: Vec<SrsStateRow> = states
        .iter()
        .map(|(&lemma_id, &state)| SrsStateRow::new(learner.user_id, lemma_id, state))
        .collect();
    SrsStateRepository::insert_many(conn, &rows)?;

    log::info!(
        "Recomputed learner {} from {} lessons: {} items ({}, {} bins, {}h start)",
        learner.user_id,
        history.len(),
        rows.len(),
        config.algorithm(),
        config.max_bins(),
        config.interval_start_hours()
    );
    Ok(rows.len())
}
