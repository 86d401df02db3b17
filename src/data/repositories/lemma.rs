use std::collections::HashSet;

use diesel::prelude::*;
use diesel::sql_types::Integer;

use crate::data::models::NewLemma;
use crate::schema::lemmas;

pub struct LemmaRepository;

impl LemmaRepository {
    pub fn create(
        conn: &mut SqliteConnection,
        language: &str,
        lemma: &str,
    ) -> Result<i32, diesel::result::Error> {
        diesel::insert_into(lemmas::table)
            .values(&NewLemma { language, lemma })
            .execute(conn)?;

        diesel::select(diesel::dsl::sql::<Integer>("last_insert_rowid()")).get_result::<i32>(conn)
    }

    /// Subset of `ids` that reference an existing lemma
    pub fn existing_ids(
        conn: &mut SqliteConnection,
        ids: &[i32],
    ) -> Result<HashSet<i32>, diesel::result::Error> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let found: Vec<i32> = lemmas::table
            .filter(lemmas::lemma_id.eq_any(ids.to_vec()))
            .select(lemmas::lemma_id)
            .load(conn)?;

        Ok(found.into_iter().collect())
    }
}
