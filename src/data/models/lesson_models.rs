use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};
use diesel::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schema::{exercises, lessons};

/// Outcome of testing a learner on one item once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseResult {
    Success,
    Hint,
    Fail,
}

impl ExerciseResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseResult::Success => "success",
            ExerciseResult::Hint => "hint",
            ExerciseResult::Fail => "fail",
        }
    }
}

impl FromStr for ExerciseResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(ExerciseResult::Success),
            "hint" => Ok(ExerciseResult::Hint),
            "fail" => Ok(ExerciseResult::Fail),
            other => Err(format!("Unknown exercise result: {}", other)),
        }
    }
}

impl ToSql<Text, Sqlite> for ExerciseResult {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for ExerciseResult {
    fn from_sql(bytes: SqliteValue<'_, '_, '_>) -> deserialize::Result<Self> {
        let raw = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
        raw.parse::<ExerciseResult>().map_err(Into::into)
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = lessons)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Lesson {
    pub lesson_id: i32,
    pub user_id: i32,
    pub language: String,
    pub kind: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = lessons)]
pub struct NewLesson<'a> {
    pub user_id: i32,
    pub language: &'a str,
    pub kind: &'a str,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = exercises)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Exercise {
    pub exercise_id: i32,
    pub lesson_id: i32,
    pub user_id: i32,
    pub lemma_id: i32,
    pub exercise_type: String,
    pub result: ExerciseResult,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = exercises)]
pub struct NewExercise<'a> {
    pub lesson_id: i32,
    pub user_id: i32,
    pub lemma_id: i32,
    pub exercise_type: &'a str,
    pub result: ExerciseResult,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

/// Request payload for a completed lesson
#[derive(Debug, Deserialize, Validate)]
pub struct NewLessonRequest {
    #[validate(length(min = 1, max = 16, message = "Language code must be 1-16 characters"))]
    pub language: String,
    #[validate(length(min = 1, max = 64, message = "Lesson kind must be 1-64 characters"))]
    pub kind: String,
    #[validate(length(min = 1, message = "A lesson needs at least one exercise"))]
    pub exercises: Vec<ExerciseInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseInput {
    pub lemma_id: i32,
    pub exercise_type: String,
    pub result: ExerciseResult,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_results() {
        assert_eq!("hint".parse::<ExerciseResult>(), Ok(ExerciseResult::Hint));
        assert!("partial".parse::<ExerciseResult>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_tags() {
        let json = serde_json::to_string(&ExerciseResult::Fail).unwrap();
        assert_eq!(json, "\"fail\"");
        let parsed: ExerciseResult = serde_json::from_str("\"success\"").unwrap();
        assert_eq!(parsed, ExerciseResult::Success);
    }

    #[test]
    fn empty_lesson_fails_validation() {
        let request = NewLessonRequest {
            language: "zh".into(),
            kind: "review".into(),
            exercises: Vec::new(),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("exercises"));
    }

    #[test]
    fn json_payload_with_exercises_validates() {
        let request: NewLessonRequest = serde_json::from_value(serde_json::json!({
            "language": "zh",
            "kind": "review",
            "exercises": [{
                "lemma_id": 3,
                "exercise_type": "translate",
                "result": "hint",
                "start_time": "2024-01-01T00:00:00",
                "end_time": "+262142-12-31T20:00:00",
            }]
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let echoed = serde_json::to_value(&request.exercises[0]).unwrap();
        assert_eq!(echoed["result"], "hint");
    }
}
