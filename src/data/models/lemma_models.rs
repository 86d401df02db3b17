use diesel::Insertable;

use crate::schema::lemmas;

/// Vocabulary item being learned
#[derive(Insertable)]
#[diesel(table_name = lemmas)]
pub struct NewLemma<'a> {
    pub language: &'a str,
    pub lemma: &'a str,
}
