//! SQLite FTS5-backed search index.
//!
//! # Responsibility
//! - Store one denormalized document per record, keyed by the record id.
//! - Evaluate query strings against those documents with paging.
//!
//! # Invariants
//! - FTS rows are maintained by triggers on the document table, so a document
//!   write and its token update are one statement.
//! - Default result ordering is ascending id.

use super::document::IndexDocument;
use super::query::{compile, parse_query};
use super::{SearchError, SearchIndex, SearchResult};
use crate::db::{DbError, SharedConnection};
use crate::model::EntityId;
use crate::page::{Page, PageRequest};
use log::debug;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use std::marker::PhantomData;

/// Search index over documents of type `T`.
pub struct SqliteSearchIndex<T> {
    conn: SharedConnection,
    _document: PhantomData<fn() -> T>,
}

impl<T> Clone for SqliteSearchIndex<T> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            _document: PhantomData,
        }
    }
}

impl<T: IndexDocument> SqliteSearchIndex<T> {
    pub fn new(conn: SharedConnection) -> Self {
        Self {
            conn,
            _document: PhantomData,
        }
    }

    /// Number of stored documents.
    pub fn count(&self) -> SearchResult<u64> {
        let schema = T::schema();
        let conn = self.conn.lock();
        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", schema.table),
            [],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(total).unwrap_or(0))
    }
}

impl<T: IndexDocument> SearchIndex<T> for SqliteSearchIndex<T> {
    fn upsert(&self, record: &T) -> SearchResult<()> {
        let schema = T::schema();
        let id = record.document_id().ok_or(SearchError::MissingId {
            entity: schema.entity,
        })?;

        let placeholders = (1..=schema.columns.len())
            .map(|n| format!("?{n}"))
            .collect::<Vec<_>>()
            .join(", ");
        let assignments = schema
            .columns
            .iter()
            .filter(|column| **column != "id")
            .map(|column| format!("{column} = excluded.{column}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {table} ({columns}) VALUES ({placeholders})
             ON CONFLICT (id) DO UPDATE SET {assignments};",
            table = schema.table,
            columns = schema.columns.join(", "),
        );

        let conn = self.conn.lock();
        conn.execute(&sql, params_from_iter(record.to_values()))?;
        debug!(
            "event=index_upsert module=search status=ok entity={} id={}",
            schema.entity, id
        );
        Ok(())
    }

    fn delete(&self, id: EntityId) -> SearchResult<()> {
        let schema = T::schema();
        let conn = self.conn.lock();
        conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", schema.table),
            [id],
        )?;
        debug!(
            "event=index_delete module=search status=ok entity={} id={}",
            schema.entity, id
        );
        Ok(())
    }

    fn delete_all(&self) -> SearchResult<()> {
        let schema = T::schema();
        let conn = self.conn.lock();
        let removed = conn.execute(&format!("DELETE FROM {};", schema.table), [])?;
        debug!(
            "event=index_clear module=search status=ok entity={} removed={}",
            schema.entity, removed
        );
        Ok(())
    }

    fn search(&self, query: &str, page: &PageRequest) -> SearchResult<Page<T>> {
        let schema = T::schema();
        let Some(node) = parse_query(query).map_err(|err| SearchError::from_query(query, err))?
        else {
            return Ok(Page::empty(page));
        };
        let filter = compile(&node, schema).map_err(|err| SearchError::from_query(query, err))?;
        let order_by = page.order_by(&schema.sort_columns(), "id")?;

        let conn = self.conn.lock();

        let total: i64 = conn
            .query_row(
                &format!(
                    "SELECT COUNT(*) FROM {} WHERE {};",
                    schema.table, filter.sql
                ),
                params_from_iter(filter.params.iter()),
                |row| row.get(0),
            )
            .map_err(|err| map_query_error(err, query))?;

        let mut bind_values = filter.params.clone();
        bind_values.push(Value::Integer(page.limit()));
        bind_values.push(Value::Integer(page.offset()));

        let mut stmt = conn.prepare(&format!(
            "SELECT {columns} FROM {table} WHERE {filter} ORDER BY {order_by} LIMIT ? OFFSET ?;",
            columns = schema.columns.join(", "),
            table = schema.table,
            filter = filter.sql,
        ))?;
        let mut rows = stmt
            .query(params_from_iter(bind_values))
            .map_err(|err| map_query_error(err, query))?;

        let mut documents = Vec::new();
        while let Some(row) = rows.next().map_err(|err| map_query_error(err, query))? {
            documents.push(T::from_row(row)?);
        }

        debug!(
            "event=index_search module=search status=ok entity={} hits={} total={}",
            schema.entity,
            documents.len(),
            total
        );
        Ok(Page::new(documents, page, u64::try_from(total).unwrap_or(0)))
    }
}

fn map_query_error(err: rusqlite::Error, query: &str) -> SearchError {
    if is_match_syntax_error(&err) {
        return SearchError::InvalidQuery {
            query: query.to_string(),
            message: err.to_string(),
        };
    }

    SearchError::Db(DbError::Sqlite(err))
}

fn is_match_syntax_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => {
            let msg = message.to_lowercase();
            (msg.contains("fts5") && msg.contains("syntax"))
                || msg.contains("malformed match expression")
                || msg.contains("unterminated")
        }
        _ => false,
    }
}
