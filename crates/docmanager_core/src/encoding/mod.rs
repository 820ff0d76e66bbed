//! Property key encoding.
//!
//! # Responsibility
//! - Map encoding roles to namespace prefixes.
//! - Turn (role, name, locale) into physical node property keys and back.
//!
//! # Invariants
//! - For a fixed role, distinct (name, locale) pairs never share a key.
//! - Encoding is pure; the namespace table is read-only once built.

pub mod encoder;
pub mod namespace;
