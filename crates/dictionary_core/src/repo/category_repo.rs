//! Category record store over SQLite.
//!
//! # Invariants
//! - Deleting a category still referenced by a word fails on the foreign key.

use super::{RepoError, RepoResult, Repository};
use crate::db::SharedConnection;
use crate::model::{Category, Entity, EntityId};
use crate::page::{Page, PageRequest};
use rusqlite::{params, Connection, OptionalExtension, Row};

const CATEGORY_SELECT_SQL: &str = "SELECT id, rus, en FROM category";

const CATEGORY_SORT_COLUMNS: &[(&str, &str)] = &[("id", "id"), ("rus", "rus"), ("en", "en")];

/// SQLite-backed category repository.
#[derive(Clone)]
pub struct SqliteCategoryRepository {
    conn: SharedConnection,
}

impl SqliteCategoryRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl Repository<Category> for SqliteCategoryRepository {
    fn create(&self, category: &Category) -> RepoResult<Category> {
        if let Some(id) = category.id {
            return Err(RepoError::IdAlreadyAssigned {
                entity: Category::NAME,
                id,
            });
        }

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO category (rus, en) VALUES (?1, ?2);",
            params![category.rus.as_deref(), category.en.as_deref()],
        )?;
        let id = conn.last_insert_rowid();

        load_category(&conn, id)?.ok_or(RepoError::Vanished {
            entity: Category::NAME,
            id,
        })
    }

    fn update(&self, category: &Category) -> RepoResult<Category> {
        let id = category.id.ok_or(RepoError::MissingId {
            entity: Category::NAME,
        })?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO category (id, rus, en) VALUES (?1, ?2, ?3)
             ON CONFLICT (id) DO UPDATE SET rus = excluded.rus, en = excluded.en;",
            params![id, category.rus.as_deref(), category.en.as_deref()],
        )?;

        load_category(&conn, id)?.ok_or(RepoError::Vanished {
            entity: Category::NAME,
            id,
        })
    }

    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<Category>> {
        let conn = self.conn.lock();
        load_category(&conn, id)
    }

    fn find_all(&self, page: &PageRequest) -> RepoResult<Page<Category>> {
        let order_by = page.order_by(CATEGORY_SORT_COLUMNS, "id")?;

        let conn = self.conn.lock();
        let total: i64 =
            conn.query_row("SELECT COUNT(*) FROM category;", [], |row| row.get(0))?;

        let mut stmt = conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL} ORDER BY {order_by} LIMIT ?1 OFFSET ?2;"
        ))?;
        let categories = stmt
            .query_map(params![page.limit(), page.offset()], parse_category_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Page::new(categories, page, u64::try_from(total).unwrap_or(0)))
    }

    fn delete(&self, id: EntityId) -> RepoResult<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM category WHERE id = ?1;", [id])?;
        Ok(())
    }
}

fn load_category(conn: &Connection, id: EntityId) -> RepoResult<Option<Category>> {
    let category = conn
        .query_row(
            &format!("{CATEGORY_SELECT_SQL} WHERE id = ?1;"),
            [id],
            parse_category_row,
        )
        .optional()?;
    Ok(category)
}

fn parse_category_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: Some(row.get("id")?),
        rus: row.get("rus")?,
        en: row.get("en")?,
    })
}
