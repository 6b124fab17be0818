//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate record store and search index calls into use-case APIs.
//! - Translate between persisted records and transfer records.
//!
//! # Invariants
//! - The record store is written first; the index only mirrors what it returned.
//! - Services stay storage-agnostic and depend on the store traits only.

pub mod dto;
pub mod entity_service;
pub mod mapper;
