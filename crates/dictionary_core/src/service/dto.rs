//! Transfer records exchanged with API clients.
//!
//! Field names serialize in camelCase. A word names its category by id only,
//! so the wire format never embeds a full category payload.

use crate::model::{same_identity, EntityId};
use serde::{Deserialize, Serialize};

/// API projection of a [`crate::model::Word`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordDto {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub rus: Option<String>,
    #[serde(default)]
    pub en: Option<String>,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub category_id: Option<EntityId>,
}

/// API projection of a [`crate::model::Category`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub rus: Option<String>,
    #[serde(default)]
    pub en: Option<String>,
}

/// Transfer record addressed by the store-assigned id.
pub trait TransferRecord {
    fn id(&self) -> Option<EntityId>;
}

impl TransferRecord for WordDto {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

impl TransferRecord for CategoryDto {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

impl PartialEq for WordDto {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}

impl PartialEq for CategoryDto {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}

#[cfg(test)]
mod tests {
    use super::WordDto;

    #[test]
    fn serializes_category_id_in_camel_case() {
        let dto = WordDto {
            id: Some(5),
            rus: Some("дом".to_string()),
            en: Some("house".to_string()),
            definition: None,
            category_id: Some(2),
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["categoryId"], 2);
        assert_eq!(json["rus"], "дом");
        assert!(json["definition"].is_null());
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let dto: WordDto = serde_json::from_str(r#"{"rus":"updated"}"#).unwrap();
        assert_eq!(dto.id, None);
        assert_eq!(dto.rus.as_deref(), Some("updated"));
        assert_eq!(dto.category_id, None);
    }
}
