//! Document domain model.
//!
//! # Responsibility
//! - Define the in-memory document shape mapped onto store nodes.
//! - Define the scalar value type shared by nodes, documents and options.
//! - Resolve document capabilities once, at construction time.
//!
//! # Invariants
//! - Every document is identified by a stable `DocumentId`.
//! - Capabilities (`Behaviors`) never change after a document is built.

pub mod document;
pub mod metadata;
pub mod value;
