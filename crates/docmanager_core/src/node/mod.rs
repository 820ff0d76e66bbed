//! Hierarchical node store contracts.
//!
//! # Responsibility
//! - Define the node handle the pipeline reads and writes properties on.
//! - Define the session-like store that resolves, creates and saves nodes.
//!
//! # Invariants
//! - Paths are absolute, `/`-separated, without empty segments; `/` is the
//!   root node and always exists.
//! - A node's parent exists before the node is created.
//! - Property writes stay in the session until `save()`.

use crate::db::DbError;
use crate::model::value::PropertyValue;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod memory;

pub use memory::MemoryNodeStore;

/// Stable node identifier; equals the id of the document mapped onto it.
pub type NodeId = Uuid;

/// Identifier of the root node.
pub const ROOT_IDENTIFIER: NodeId = Uuid::nil();
/// Path of the root node.
pub const ROOT_PATH: &str = "/";

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by node store implementations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Path is not absolute or contains empty segments.
    InvalidPath(String),
    /// Parent of a node to create does not exist.
    ParentNotFound(String),
    /// A node already exists at the path.
    PathExists(String),
    /// A node already uses the identifier.
    IdentifierExists(NodeId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted into a node.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidPath(path) => write!(f, "invalid node path `{path}`"),
            Self::ParentNotFound(path) => write!(f, "parent node not found for `{path}`"),
            Self::PathExists(path) => write!(f, "node already exists at `{path}`"),
            Self::IdentifierExists(id) => write!(f, "node identifier already in use: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "node store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid node data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Property access on one node of the hierarchical store.
pub trait Node {
    fn identifier(&self) -> NodeId;
    fn path(&self) -> &str;
    fn has_property(&self, key: &str) -> bool;
    fn property(&self, key: &str) -> Option<&PropertyValue>;
    fn set_property(&mut self, key: &str, value: PropertyValue);
    fn remove_property(&mut self, key: &str) -> Option<PropertyValue>;
    /// Property keys in ascending order.
    fn property_keys(&self) -> Vec<String>;

    /// Returns the stored value, or `default` when the key is absent.
    fn get_property_value_with_default(
        &self,
        key: &str,
        default: Option<PropertyValue>,
    ) -> Option<PropertyValue> {
        self.property(key).cloned().or(default)
    }

    /// Writes `Some(value)`, or removes the property for `None`.
    fn set_or_remove_property(&mut self, key: &str, value: Option<PropertyValue>) {
        match value {
            Some(value) => self.set_property(key, value),
            None => {
                self.remove_property(key);
            }
        }
    }

    /// Node name: the last path segment, empty for the root.
    fn name(&self) -> &str {
        self.path().rsplit('/').next().unwrap_or_default()
    }
}

/// Session over a hierarchical node store.
pub trait NodeStore {
    fn node_by_identifier(&mut self, identifier: NodeId) -> StoreResult<Option<&mut dyn Node>>;
    fn node_by_path(&mut self, path: &str) -> StoreResult<Option<&mut dyn Node>>;
    /// Creates an empty node; the parent path must already exist.
    fn create_node(&mut self, path: &str, identifier: NodeId) -> StoreResult<&mut dyn Node>;
    /// Direct child paths in creation order.
    fn child_paths(&mut self, path: &str) -> StoreResult<Vec<String>>;
    /// Commits all pending node changes.
    fn save(&mut self) -> StoreResult<()>;
}

/// Session-side node state shared by store implementations.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredNode {
    identifier: NodeId,
    path: String,
    properties: BTreeMap<String, PropertyValue>,
    dirty: bool,
}

impl StoredNode {
    /// New node; starts dirty because it is not persisted yet.
    pub fn new(identifier: NodeId, path: impl Into<String>) -> Self {
        Self {
            identifier,
            path: path.into(),
            properties: BTreeMap::new(),
            dirty: true,
        }
    }

    /// Node loaded from persistent storage; starts clean.
    pub fn loaded(
        identifier: NodeId,
        path: impl Into<String>,
        properties: BTreeMap<String, PropertyValue>,
    ) -> Self {
        Self {
            identifier,
            path: path.into(),
            properties,
            dirty: false,
        }
    }

    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

impl Node for StoredNode {
    fn identifier(&self) -> NodeId {
        self.identifier
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    fn set_property(&mut self, key: &str, value: PropertyValue) {
        self.properties.insert(key.to_string(), value);
        self.dirty = true;
    }

    fn remove_property(&mut self, key: &str) -> Option<PropertyValue> {
        let removed = self.properties.remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    fn property_keys(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }
}

/// Validates an absolute node path and strips a trailing `/`.
pub fn normalize_path(path: &str) -> StoreResult<String> {
    let trimmed = path.trim();
    if trimmed == ROOT_PATH {
        return Ok(ROOT_PATH.to_string());
    }
    let Some(relative) = trimmed.strip_prefix('/') else {
        return Err(StoreError::InvalidPath(path.to_string()));
    };
    let relative = relative.strip_suffix('/').unwrap_or(relative);
    if relative.split('/').any(|segment| segment.is_empty()) {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(format!("/{relative}"))
}

/// Parent of a normalized path; `None` for the root.
pub fn parent_path(path: &str) -> Option<&str> {
    if path == ROOT_PATH {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some(ROOT_PATH),
        Some(index) => Some(&path[..index]),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_path, parent_path, Node, StoreError, StoredNode};
    use crate::model::value::PropertyValue;
    use uuid::Uuid;

    #[test]
    fn normalize_path_accepts_absolute_paths() {
        assert_eq!(normalize_path("/").unwrap(), "/");
        assert_eq!(normalize_path("/cmf/pages/").unwrap(), "/cmf/pages");
    }

    #[test]
    fn normalize_path_rejects_relative_or_empty_segments() {
        for path in ["cmf", "", "/cmf//pages"] {
            let err = normalize_path(path).expect_err("invalid path must fail");
            assert!(matches!(err, StoreError::InvalidPath(_)));
        }
    }

    #[test]
    fn parent_path_walks_up_to_root() {
        assert_eq!(parent_path("/cmf/pages"), Some("/cmf"));
        assert_eq!(parent_path("/cmf"), Some("/"));
        assert_eq!(parent_path("/"), None);
    }

    #[test]
    fn stored_node_tracks_dirty_state_and_defaults() {
        let mut node = StoredNode::loaded(Uuid::new_v4(), "/cmf/about", Default::default());
        assert!(!node.is_dirty());
        assert_eq!(node.name(), "about");
        assert_eq!(
            node.get_property_value_with_default("sulu:creator", None),
            None
        );

        node.set_property("sulu:creator", PropertyValue::Integer(1));
        assert!(node.is_dirty());
        node.mark_clean();

        node.set_or_remove_property("sulu:creator", None);
        assert!(node.is_dirty());
        assert!(!node.has_property("sulu:creator"));
    }
}
