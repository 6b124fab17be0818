//! Persisted domain records.
//!
//! # Responsibility
//! - Define the canonical Word and Category records used by the stores.
//! - Provide identity-only equality shared by every record.
//!
//! # Invariants
//! - `id` is `None` until the record store assigns one and never changes after.
//! - Two records are equal iff both ids are `Some` and match; a record without
//!   an id equals nothing, so the types are `PartialEq` but not `Eq`.

pub mod category;
pub mod word;

pub use category::Category;
pub use word::Word;

/// Store-assigned numeric identifier shared by all records.
pub type EntityId = i64;

/// A record addressed by a store-assigned id.
pub trait Entity {
    /// Lowercase entity name used in logs and alert headers.
    const NAME: &'static str;

    fn id(&self) -> Option<EntityId>;
}

/// Identity-only equality: both ids present and equal.
pub fn same_identity(left: Option<EntityId>, right: Option<EntityId>) -> bool {
    matches!((left, right), (Some(a), Some(b)) if a == b)
}

#[cfg(test)]
mod tests {
    use super::same_identity;

    #[test]
    fn missing_ids_never_match() {
        assert!(same_identity(Some(1), Some(1)));
        assert!(!same_identity(Some(1), Some(2)));
        assert!(!same_identity(None, Some(1)));
        assert!(!same_identity(None, None));
    }
}
