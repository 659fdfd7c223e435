//! Repository layer for durable list state.
//!
//! # Responsibility
//! - Define the key-value contract the stores persist through.
//! - Isolate SQLite and JSON encoding details from store logic.
//!
//! # Invariants
//! - A list is always written as one full document under its key.
//! - Read paths reject undecodable documents instead of masking them.

pub mod kv_repo;
