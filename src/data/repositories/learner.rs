use diesel::prelude::*;
use diesel::sql_types::Integer;

use crate::data::models::{Learner, NewLearner, SrsSettings};
use crate::schema::users;

pub struct LearnerRepository;

impl LearnerRepository {
    pub fn find(
        conn: &mut SqliteConnection,
        user_id: i32,
    ) -> Result<Option<Learner>, diesel::result::Error> {
        users::table
            .filter(users::user_id.eq(user_id))
            .select(Learner::as_select())
            .first(conn)
            .optional()
    }

    pub fn create(
        conn: &mut SqliteConnection,
        username: &str,
    ) -> Result<Learner, diesel::result::Error> {
        diesel::insert_into(users::table)
            .values(&NewLearner::with_defaults(username))
            .execute(conn)?;

        let user_id = diesel::select(diesel::dsl::sql::<Integer>("last_insert_rowid()"))
            .get_result::<i32>(conn)?;

        users::table
            .filter(users::user_id.eq(user_id))
            .select(Learner::as_select())
            .first(conn)
    }

    pub fn list_ids(conn: &mut SqliteConnection) -> Result<Vec<i32>, diesel::result::Error> {
        users::table
            .select(users::user_id)
            .order_by(users::user_id.asc())
            .load(conn)
    }

    /// Returns the number of rows touched (0 when the learner does not exist)
    pub fn update_settings(
        conn: &mut SqliteConnection,
        user_id: i32,
        settings: &SrsSettings,
    ) -> Result<usize, diesel::result::Error> {
        diesel::update(users::table.filter(users::user_id.eq(user_id)))
            .set((
                users::srs_max_bins.eq(settings.max_bins),
                users::srs_interval_start_hours.eq(settings.interval_start_hours),
                users::srs_algorithm.eq(settings.algorithm.as_str()),
            ))
            .execute(conn)
    }
}
