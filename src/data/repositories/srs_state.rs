use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::data::models::{DueItem, SrsStateRow};
use crate::schema::{lemmas, srs_states};

pub struct SrsStateRepository;

impl SrsStateRepository {
    pub fn find_many(
        conn: &mut SqliteConnection,
        user_id: i32,
        lemma_ids: &[i32],
    ) -> Result<Vec<SrsStateRow>, diesel::result::Error> {
        srs_states::table
            .filter(srs_states::user_id.eq(user_id))
            .filter(srs_states::lemma_id.eq_any(lemma_ids.to_vec()))
            .select(SrsStateRow::as_select())
            .load(conn)
    }

    pub fn for_learner(
        conn: &mut SqliteConnection,
        user_id: i32,
    ) -> Result<Vec<SrsStateRow>, diesel::result::Error> {
        srs_states::table
            .filter(srs_states::user_id.eq(user_id))
            .order_by(srs_states::lemma_id.asc())
            .select(SrsStateRow::as_select())
            .load(conn)
    }

    pub fn upsert(
        conn: &mut SqliteConnection,
        row: &SrsStateRow,
    ) -> Result<(), diesel::result::Error> {
        diesel::insert_into(srs_states::table)
            .values(row)
            .on_conflict((srs_states::user_id, srs_states::lemma_id))
            .do_update()
            .set((
                srs_states::bin.eq(row.bin),
                srs_states::last_review.eq(row.last_review),
                srs_states::next_due.eq(row.next_due),
            ))
            .execute(conn)?;

        Ok(())
    }

    /// Drops a learner's scheduling state, or only one item's when `lemma_id` is set
    pub fn delete_for_learner(
        conn: &mut SqliteConnection,
        user_id: i32,
        lemma_id: Option<i32>,
    ) -> Result<usize, diesel::result::Error> {
        match lemma_id {
            Some(lemma_id) => diesel::delete(
                srs_states::table
                    .filter(srs_states::user_id.eq(user_id))
                    .filter(srs_states::lemma_id.eq(lemma_id)),
            )
            .execute(conn),
            None => diesel::delete(srs_states::table.filter(srs_states::user_id.eq(user_id)))
                .execute(conn),
        }
    }

    pub fn insert_many(
        conn: &mut SqliteConnection,
        rows: &[SrsStateRow],
    ) -> Result<usize, diesel::result::Error> {
        let mut inserted = 0;
        for row in rows {
            inserted += diesel::insert_into(srs_states::table)
                .values(row)
                .execute(conn)?;
        }
        Ok(inserted)
    }

    /// Items whose `next_due` is at or before `now`, soonest first
    pub fn due(
        conn: &mut SqliteConnection,
        user_id: i32,
        now: NaiveDateTime,
    ) -> Result<Vec<DueItem>, diesel::result::Error> {
        srs_states::table
            .inner_join(lemmas::table)
            .filter(srs_states::user_id.eq(user_id))
            .filter(srs_states::next_due.le(now))
            .order_by((srs_states::next_due.asc(), srs_states::lemma_id.asc()))
            .select((
                srs_states::lemma_id,
                lemmas::lemma,
                srs_states::bin,
                srs_states::next_due,
            ))
            .load::<(i32, String, i32, Option<NaiveDateTime>)>(conn)
            .map(|rows| {
                rows.into_iter()
                    .map(|(lemma_id, lemma, bin, next_due)| DueItem {
                        lemma_id,
                        lemma,
                        bin,
                        next_due,
                    })
                    .collect()
            })
    }
}
