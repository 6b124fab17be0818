//! Word record.
//!
//! # Invariants
//! - `category` is a reference only; deleting a word never touches its category.

use super::{same_identity, Category, Entity, EntityId};
use serde::{Deserialize, Serialize};

/// A Russian/English term pair with an optional definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Word {
    pub id: Option<EntityId>,
    /// Russian-language term.
    pub rus: Option<String>,
    /// English-language term.
    pub en: Option<String>,
    pub definition: Option<String>,
    /// Labels are present when loaded from a store, absent when built from an id.
    pub category: Option<Category>,
}

impl Word {
    /// Creates an unsaved word without definition or category.
    pub fn new(rus: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            rus: Some(rus.into()),
            en: Some(en.into()),
            ..Self::default()
        }
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Id of the referenced category, if any.
    pub fn category_id(&self) -> Option<EntityId> {
        self.category.as_ref().and_then(|category| category.id)
    }
}

impl Entity for Word {
    const NAME: &'static str = "word";

    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

impl PartialEq for Word {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}
