//! Word record store over SQLite.
//!
//! # Invariants
//! - Reads join the referenced category so returned words carry its labels.
//! - A dangling `category_id` is rejected by the foreign key on write.

use super::{RepoError, RepoResult, Repository};
use crate::db::SharedConnection;
use crate::model::{Category, Entity, EntityId, Word};
use crate::page::{Page, PageRequest};
use rusqlite::{params, Connection, OptionalExtension, Row};

const WORD_SELECT_SQL: &str = "SELECT
    w.id AS id,
    w.rus AS rus,
    w.en AS en,
    w.definition AS definition,
    w.category_id AS category_id,
    c.rus AS category_rus,
    c.en AS category_en
FROM word w
LEFT JOIN category c ON c.id = w.category_id";

const WORD_SORT_COLUMNS: &[(&str, &str)] = &[
    ("id", "w.id"),
    ("rus", "w.rus"),
    ("en", "w.en"),
    ("definition", "w.definition"),
    ("categoryId", "w.category_id"),
];

/// SQLite-backed word repository.
#[derive(Clone)]
pub struct SqliteWordRepository {
    conn: SharedConnection,
}

impl SqliteWordRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl Repository<Word> for SqliteWordRepository {
    fn create(&self, word: &Word) -> RepoResult<Word> {
        if let Some(id) = word.id {
            return Err(RepoError::IdAlreadyAssigned {
                entity: Word::NAME,
                id,
            });
        }

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO word (rus, en, definition, category_id)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                word.rus.as_deref(),
                word.en.as_deref(),
                word.definition.as_deref(),
                word.category_id(),
            ],
        )?;
        let id = conn.last_insert_rowid();

        load_word(&conn, id)?.ok_or(RepoError::Vanished {
            entity: Word::NAME,
            id,
        })
    }

    fn update(&self, word: &Word) -> RepoResult<Word> {
        let id = word.id.ok_or(RepoError::MissingId { entity: Word::NAME })?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO word (id, rus, en, definition, category_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (id) DO UPDATE SET
                rus = excluded.rus,
                en = excluded.en,
                definition = excluded.definition,
                category_id = excluded.category_id;",
            params![
                id,
                word.rus.as_deref(),
                word.en.as_deref(),
                word.definition.as_deref(),
                word.category_id(),
            ],
        )?;

        load_word(&conn, id)?.ok_or(RepoError::Vanished {
            entity: Word::NAME,
            id,
        })
    }

    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<Word>> {
        let conn = self.conn.lock();
        load_word(&conn, id)
    }

    fn find_all(&self, page: &PageRequest) -> RepoResult<Page<Word>> {
        let order_by = page.order_by(WORD_SORT_COLUMNS, "w.id")?;

        let conn = self.conn.lock();
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM word;", [], |row| row.get(0))?;

        let mut stmt = conn.prepare(&format!(
            "{WORD_SELECT_SQL} ORDER BY {order_by} LIMIT ?1 OFFSET ?2;"
        ))?;
        let words = stmt
            .query_map(params![page.limit(), page.offset()], parse_word_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Page::new(words, page, u64::try_from(total).unwrap_or(0)))
    }

    fn delete(&self, id: EntityId) -> RepoResult<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM word WHERE id = ?1;", [id])?;
        Ok(())
    }
}

fn load_word(conn: &Connection, id: EntityId) -> RepoResult<Option<Word>> {
    let word = conn
        .query_row(
            &format!("{WORD_SELECT_SQL} WHERE w.id = ?1;"),
            [id],
            parse_word_row,
        )
        .optional()?;
    Ok(word)
}

fn parse_word_row(row: &Row<'_>) -> rusqlite::Result<Word> {
    let category = match row.get::<_, Option<EntityId>>("category_id")? {
        Some(category_id) => Some(Category {
            id: Some(category_id),
            rus: row.get("category_rus")?,
            en: row.get("category_en")?,
        }),
        None => None,
    };

    Ok(Word {
        id: Some(row.get("id")?),
        rus: row.get("rus")?,
        en: row.get("en")?,
        definition: row.get("definition")?,
        category,
    })
}
