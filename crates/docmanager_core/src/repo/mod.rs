//! SQLite-backed persistence implementations.
//!
//! # Responsibility
//! - Implement the node store contract on top of migrated connections.
//! - Keep SQL details inside the persistence boundary.

pub mod sqlite_node_store;
