//! Category record.

use super::{same_identity, Entity, EntityId};
use serde::{Deserialize, Serialize};

/// A bilingual label grouping words.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<EntityId>,
    pub rus: Option<String>,
    pub en: Option<String>,
}

impl Category {
    /// Creates an unsaved category.
    pub fn new(rus: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            id: None,
            rus: Some(rus.into()),
            en: Some(en.into()),
        }
    }

    /// Builds a reference carrying identity only.
    ///
    /// Used when a word names its category by id and the labels are not loaded.
    pub fn from_id(id: EntityId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }
}

impl Entity for Category {
    const NAME: &'static str = "category";

    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}
