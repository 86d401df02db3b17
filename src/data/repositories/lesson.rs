use std::collections::HashMap;

use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::sql_types::Integer;

use crate::data::models::{Exercise, Lesson, NewExercise, NewLesson};
use crate::schema::{exercises, lessons};

pub struct LessonRepository;

impl LessonRepository {
    pub fn insert_lesson(
        conn: &mut SqliteConnection,
        lesson: &NewLesson<'_>,
    ) -> Result<i32, diesel::result::Error> {
        diesel::insert_into(lessons::table)
            .values(lesson)
            .execute(conn)?;

        diesel::select(diesel::dsl::sql::<Integer>("last_insert_rowid()")).get_result::<i32>(conn)
    }

    pub fn insert_exercises(
        conn: &mut SqliteConnection,
        rows: &[NewExercise<'_>],
    ) -> Result<usize, diesel::result::Error> {
        diesel::insert_into(exercises::table)
            .values(rows)
            .execute(conn)
    }

    pub fn find(
        conn: &mut SqliteConnection,
        user_id: i32,
        lesson_id: i32,
    ) -> Result<Option<Lesson>, diesel::result::Error> {
        lessons::table
            .filter(lessons::lesson_id.eq(lesson_id))
            .filter(lessons::user_id.eq(user_id))
            .select(Lesson::as_select())
            .first(conn)
            .optional()
    }

    pub fn exercises_for_lesson(
        conn: &mut SqliteConnection,
        lesson_id: i32,
    ) -> Result<Vec<Exercise>, diesel::result::Error> {
        exercises::table
            .filter(exercises::lesson_id.eq(lesson_id))
            .order_by(exercises::exercise_id.asc())
            .select(Exercise::as_select())
            .load(conn)
    }

    /// Every lesson of a learner with its exercises, oldest `end_time` first.
    /// Lessons sharing an end time are ordered by id.
    pub fn history(
        conn: &mut SqliteConnection,
        user_id: i32,
    ) -> Result<Vec<(Lesson, Vec<Exercise>)>, diesel::result::Error> {
        let lessons = lessons::table
            .filter(lessons::user_id.eq(user_id))
            .order_by((lessons::end_time.asc(), lessons::lesson_id.asc()))
            .select(Lesson::as_select())
            .load(conn)?;

        let mut by_lesson: HashMap<i32, Vec<Exercise>> = HashMap::new();
        for exercise in exercises::table
            .filter(exercises::user_id.eq(user_id))
            .order_by(exercises::exercise_id.asc())
            .select(Exercise::as_select())
            .load(conn)?
        {
            by_lesson.entry(exercise.lesson_id).or_default().push(exercise);
        }

        Ok(lessons
            .into_iter()
            .map(|lesson| {
                let exercises = by_lesson.remove(&lesson.lesson_id).unwrap_or_default();
                (lesson, exercises)
            })
            .collect())
    }

    /// Whether `lemma_id` was exercised in a lesson that precedes `lesson`
    /// in chronological order.
    pub fn item_seen_before(
        conn: &mut SqliteConnection,
        user_id: i32,
        lemma_id: i32,
        lesson: &Lesson,
    ) -> Result<bool, diesel::result::Error> {
        let earlier = exercises::table
            .inner_join(lessons::table)
            .filter(exercises::user_id.eq(user_id))
            .filter(exercises::lemma_id.eq(lemma_id))
            .filter(
                lessons::end_time.lt(lesson.end_time).or(lessons::end_time
                    .eq(lesson.end_time)
                    .and(lessons::lesson_id.lt(lesson.lesson_id))),
            );

        diesel::select(exists(earlier)).get_result(conn)
    }
}
