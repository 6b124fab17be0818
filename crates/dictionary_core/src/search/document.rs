//! Index document layouts for each searchable record.
//!
//! A document is the flattened row the index stores for one record. Word
//! documents copy the category labels so search hits render without a join
//! back into the record store.

use crate::model::{Category, Entity, EntityId, Word};
use rusqlite::types::Value;
use rusqlite::Row;

/// How a query field is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Exact numeric equality against a plain column.
    Integer,
    /// Token match through the FTS5 table; the column name is the FTS column.
    Text,
}

/// A queryable and sortable document field.
#[derive(Debug, Clone, Copy)]
pub struct IndexField {
    /// Name used in query strings and `sort` parameters.
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
}

/// Physical layout of one document type inside the index database.
#[derive(Debug)]
pub struct IndexSchema {
    pub entity: &'static str,
    pub table: &'static str,
    pub fts_table: &'static str,
    pub fields: &'static [IndexField],
    /// Every stored column, `id` first, in the order of [`IndexDocument::to_values`].
    pub columns: &'static [&'static str],
}

impl IndexSchema {
    pub fn field(&self, name: &str) -> Option<&IndexField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn sort_columns(&self) -> Vec<(&'static str, &'static str)> {
        self.fields
            .iter()
            .map(|field| (field.name, field.column))
            .collect()
    }
}

/// A record that can be flattened into, and rebuilt from, an index row.
pub trait IndexDocument: Sized {
    fn schema() -> &'static IndexSchema;
    fn document_id(&self) -> Option<EntityId>;
    /// One value per entry of [`IndexSchema::columns`].
    fn to_values(&self) -> Vec<Value>;
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

static WORD_SCHEMA: IndexSchema = IndexSchema {
    entity: Word::NAME,
    table: "word_document",
    fts_table: "word_document_fts",
    fields: &[
        IndexField {
            name: "id",
            column: "id",
            kind: FieldKind::Integer,
        },
        IndexField {
            name: "rus",
            column: "rus",
            kind: FieldKind::Text,
        },
        IndexField {
            name: "en",
            column: "en",
            kind: FieldKind::Text,
        },
        IndexField {
            name: "definition",
            column: "definition",
            kind: FieldKind::Text,
        },
        IndexField {
            name: "categoryId",
            column: "category_id",
            kind: FieldKind::Integer,
        },
        IndexField {
            name: "category.id",
            column: "category_id",
            kind: FieldKind::Integer,
        },
        IndexField {
            name: "category.rus",
            column: "category_rus",
            kind: FieldKind::Text,
        },
        IndexField {
            name: "category.en",
            column: "category_en",
            kind: FieldKind::Text,
        },
    ],
    columns: &[
        "id",
        "rus",
        "en",
        "definition",
        "category_id",
        "category_rus",
        "category_en",
    ],
};

static CATEGORY_SCHEMA: IndexSchema = IndexSchema {
    entity: Category::NAME,
    table: "category_document",
    fts_table: "category_document_fts",
    fields: &[
        IndexField {
            name: "id",
            column: "id",
            kind: FieldKind::Integer,
        },
        IndexField {
            name: "rus",
            column: "rus",
            kind: FieldKind::Text,
        },
        IndexField {
            name: "en",
            column: "en",
            kind: FieldKind::Text,
        },
    ],
    columns: &["id", "rus", "en"],
};

impl IndexDocument for Word {
    fn schema() -> &'static IndexSchema {
        &WORD_SCHEMA
    }

    fn document_id(&self) -> Option<EntityId> {
        self.id
    }

    fn to_values(&self) -> Vec<Value> {
        let category = self.category.as_ref();
        vec![
            optional_integer(self.id),
            optional_text(self.rus.as_deref()),
            optional_text(self.en.as_deref()),
            optional_text(self.definition.as_deref()),
            optional_integer(self.category_id()),
            optional_text(category.and_then(|c| c.rus.as_deref())),
            optional_text(category.and_then(|c| c.en.as_deref())),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
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
}

impl IndexDocument for Category {
    fn schema() -> &'static IndexSchema {
        &CATEGORY_SCHEMA
    }

    fn document_id(&self) -> Option<EntityId> {
        self.id
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            optional_integer(self.id),
            optional_text(self.rus.as_deref()),
            optional_text(self.en.as_deref()),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Category {
            id: Some(row.get("id")?),
            rus: row.get("rus")?,
            en: row.get("en")?,
        })
    }
}

fn optional_integer(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}

fn optional_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |text| Value::Text(text.to_string()))
}
