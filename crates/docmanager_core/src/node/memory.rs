//! In-memory node store.

use crate::node::{
    normalize_path, parent_path, Node, NodeId, NodeStore, StoreError, StoreResult, StoredNode,
    ROOT_IDENTIFIER, ROOT_PATH,
};
use std::collections::{BTreeMap, HashMap};

/// Node store kept entirely in memory.
///
/// `save()` only marks nodes clean and counts commits.
#[derive(Debug, Clone)]
pub struct MemoryNodeStore {
    nodes: BTreeMap<String, StoredNode>,
    paths_by_id: HashMap<NodeId, String>,
    children: HashMap<String, Vec<String>>,
    save_count: usize,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        let mut root = StoredNode::new(ROOT_IDENTIFIER, ROOT_PATH);
        root.mark_clean();
        nodes.insert(ROOT_PATH.to_string(), root);

        let mut paths_by_id = HashMap::new();
        paths_by_id.insert(ROOT_IDENTIFIER, ROOT_PATH.to_string());

        Self {
            nodes,
            paths_by_id,
            children: HashMap::new(),
            save_count: 0,
        }
    }

    /// Number of completed `save()` calls.
    pub fn save_count(&self) -> usize {
        self.save_count
    }

    /// Whether any node has unsaved changes.
    pub fn has_pending_changes(&self) -> bool {
        self.nodes.values().any(StoredNode::is_dirty)
    }

    /// Read-only snapshot of one node.
    pub fn get(&self, path: &str) -> Option<&StoredNode> {
        self.nodes.get(path)
    }

    /// Creates every missing ancestor and the node itself with generated ids.
    pub fn ensure_path(&mut self, path: &str) -> StoreResult<NodeId> {
        let normalized = normalize_path(path)?;
        let mut current = String::new();
        for segment in normalized.split('/').filter(|segment| !segment.is_empty()) {
            current.push('/');
            current.push_str(segment);
            if !self.nodes.contains_key(current.as_str()) {
                self.create_node(current.as_str(), uuid::Uuid::new_v4())?;
            }
        }
        match self.nodes.get(normalized.as_str()) {
            Some(node) => Ok(node.identifier()),
            None => Ok(ROOT_IDENTIFIER),
        }
    }
}

impl Default for MemoryNodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore for MemoryNodeStore {
    fn node_by_identifier(&mut self, identifier: NodeId) -> StoreResult<Option<&mut dyn Node>> {
        let Some(path) = self.paths_by_id.get(&identifier) else {
            return Ok(None);
        };
        Ok(self
            .nodes
            .get_mut(path.as_str())
            .map(|node| node as &mut dyn Node))
    }

    fn node_by_path(&mut self, path: &str) -> StoreResult<Option<&mut dyn Node>> {
        let normalized = normalize_path(path)?;
        Ok(self
            .nodes
            .get_mut(normalized.as_str())
            .map(|node| node as &mut dyn Node))
    }

    fn create_node(&mut self, path: &str, identifier: NodeId) -> StoreResult<&mut dyn Node> {
        let normalized = normalize_path(path)?;
        if self.nodes.contains_key(normalized.as_str()) {
            return Err(StoreError::PathExists(normalized));
        }
        if self.paths_by_id.contains_key(&identifier) {
            return Err(StoreError::IdentifierExists(identifier));
        }
        let parent = parent_path(normalized.as_str())
            .ok_or_else(|| StoreError::PathExists(normalized.clone()))?
            .to_string();
        if !self.nodes.contains_key(parent.as_str()) {
            return Err(StoreError::ParentNotFound(normalized));
        }

        self.children
            .entry(parent)
            .or_default()
            .push(normalized.clone());
        self.paths_by_id.insert(identifier, normalized.clone());
        let node = self
            .nodes
            .entry(normalized.clone())
            .or_insert_with(|| StoredNode::new(identifier, normalized));
        Ok(node as &mut dyn Node)
    }

    fn child_paths(&mut self, path: &str) -> StoreResult<Vec<String>> {
        let normalized = normalize_path(path)?;
        Ok(self
            .children
            .get(normalized.as_str())
            .cloned()
            .unwrap_or_default())
    }

    fn save(&mut self) -> StoreResult<()> {
        for node in self.nodes.values_mut() {
            node.mark_clean();
        }
        self.save_count += 1;
        Ok(())
    }
}
