//! Node store session over SQLite.
//!
//! # Responsibility
//! - Lazily load nodes and their properties into a session cache.
//! - Write created nodes and dirty properties back in one transaction on
//!   `save()`.
//!
//! # Invariants
//! - Reads see session changes before they are saved.
//! - Nothing is written to SQLite outside `save()`.
//! - Child order is creation order (`position ASC`).

use crate::db::migrations::current_user_version;
use crate::db::migrations::latest_version;
use crate::model::value::PropertyValue;
use crate::node::{
    normalize_path, parent_path, Node, NodeId, NodeStore, StoreError, StoreResult, StoredNode,
};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;
use uuid::Uuid;

/// SQLite-backed node store session.
pub struct SqliteNodeStore<'conn> {
    conn: &'conn Connection,
    cache: BTreeMap<String, StoredNode>,
    paths_by_id: HashMap<NodeId, String>,
    created: Vec<String>,
}

impl<'conn> SqliteNodeStore<'conn> {
    /// Creates a session over a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        Ok(Self {
            conn,
            cache: BTreeMap::new(),
            paths_by_id: HashMap::new(),
            created: Vec::new(),
        })
    }

    /// Whether the session holds unsaved node changes.
    pub fn has_pending_changes(&self) -> bool {
        !self.created.is_empty() || self.cache.values().any(StoredNode::is_dirty)
    }

    /// Drops all unsaved changes and cached nodes.
    pub fn discard(&mut self) {
        self.cache.clear();
        self.paths_by_id.clear();
        self.created.clear();
    }

    fn cache_node(&mut self, node: StoredNode) {
        self.paths_by_id
            .insert(node.identifier(), node.path().to_string());
        self.cache.insert(node.path().to_string(), node);
    }

    fn ensure_cached_by_path(&mut self, path: &str) -> StoreResult<bool> {
        if self.cache.contains_key(path) {
            return Ok(true);
        }
        let identifier = self
            .conn
            .query_row(
                "SELECT identifier FROM nodes WHERE path = ?1;",
                [path],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        match identifier {
            Some(identifier) => {
                let node = load_node(self.conn, parse_identifier(&identifier)?, path)?;
                self.cache_node(node);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn ensure_cached_by_identifier(&mut self, identifier: NodeId) -> StoreResult<Option<String>> {
        if let Some(path) = self.paths_by_id.get(&identifier) {
            return Ok(Some(path.clone()));
        }
        let path = self
            .conn
            .query_row(
                "SELECT path FROM nodes WHERE identifier = ?1;",
                [identifier.to_string()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        let Some(path) = path else {
            return Ok(None);
        };
        let node = load_node(self.conn, identifier, &path)?;
        self.cache_node(node);
        Ok(Some(path))
    }

    fn write_pending(&self, tx: &Transaction<'_>) -> StoreResult<usize> {
        for path in &self.created {
            let Some(node) = self.cache.get(path.as_str()) else {
                continue;
            };
            let parent = parent_path(path.as_str());
            tx.execute(
                "INSERT INTO nodes (identifier, path, parent_path, position)
                 VALUES (
                    ?1,
                    ?2,
                    ?3,
                    (SELECT COALESCE(MAX(position) + 1, 0) FROM nodes WHERE parent_path = ?3)
                 );",
                params![node.identifier().to_string(), path, parent],
            )?;
        }

        let mut written = 0;
        for node in self.cache.values().filter(|node| node.is_dirty()) {
            let identifier = node.identifier().to_string();
            tx.execute(
                "DELETE FROM node_properties WHERE node_identifier = ?1;",
                [identifier.as_str()],
            )?;
            for (name, value) in node.properties() {
                let (integer, real, text) = split_value(value);
                tx.execute(
                    "INSERT INTO node_properties (
                        node_identifier,
                        name,
                        value_type,
                        value_integer,
                        value_real,
                        value_text
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                    params![identifier, name, value.type_name(), integer, real, text],
                )?;
            }
            tx.execute(
                "UPDATE nodes
                 SET updated_at = (strftime('%s', 'now') * 1000)
                 WHERE identifier = ?1;",
                [identifier.as_str()],
            )?;
            written += 1;
        }
        Ok(written)
    }
}

impl NodeStore for SqliteNodeStore<'_> {
    fn node_by_identifier(&mut self, identifier: NodeId) -> StoreResult<Option<&mut dyn Node>> {
        let Some(path) = self.ensure_cached_by_identifier(identifier)? else {
            return Ok(None);
        };
        Ok(self
            .cache
            .get_mut(path.as_str())
            .map(|node| node as &mut dyn Node))
    }

    fn node_by_path(&mut self, path: &str) -> StoreResult<Option<&mut dyn Node>> {
        let normalized = normalize_path(path)?;
        if !self.ensure_cached_by_path(normalized.as_str())? {
            return Ok(None);
        }
        Ok(self
            .cache
            .get_mut(normalized.as_str())
            .map(|node| node as &mut dyn Node))
    }

    fn create_node(&mut self, path: &str, identifier: NodeId) -> StoreResult<&mut dyn Node> {
        let normalized = normalize_path(path)?;
        if self.ensure_cached_by_path(normalized.as_str())? {
            return Err(StoreError::PathExists(normalized));
        }
        if self.ensure_cached_by_identifier(identifier)?.is_some() {
            return Err(StoreError::IdentifierExists(identifier));
        }
        let parent = parent_path(normalized.as_str())
            .ok_or_else(|| StoreError::PathExists(normalized.clone()))?
            .to_string();
        if !self.ensure_cached_by_path(parent.as_str())? {
            return Err(StoreError::ParentNotFound(normalized));
        }

        self.created.push(normalized.clone());
        self.cache_node(StoredNode::new(identifier, normalized.as_str()));
        self.cache
            .get_mut(normalized.as_str())
            .map(|node| node as &mut dyn Node)
            .ok_or(StoreError::InvalidData(format!(
                "created node `{normalized}` missing from session"
            )))
    }

    fn child_paths(&mut self, path: &str) -> StoreResult<Vec<String>> {
        let normalized = normalize_path(path)?;
        let mut stmt = self.conn.prepare(
            "SELECT path FROM nodes
             WHERE parent_path = ?1
             ORDER BY position ASC, path ASC;",
        )?;
        let mut rows = stmt.query([normalized.as_str()])?;
        let mut children = Vec::new();
        while let Some(row) = rows.next()? {
            children.push(row.get::<_, String>(0)?);
        }

        for created in &self.created {
            if parent_path(created.as_str()) == Some(normalized.as_str()) {
                children.push(created.clone());
            }
        }
        Ok(children)
    }

    fn save(&mut self) -> StoreResult<()> {
        let started_at = Instant::now();
        let created = self.created.len();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let written = match self.write_pending(&tx) {
            Ok(written) => written,
            Err(err) => {
                error!(
                    "event=store_save module=repo status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };
        tx.commit()?;

        self.created.clear();
        for node in self.cache.values_mut() {
            node.mark_clean();
        }
        info!(
            "event=store_save module=repo status=ok created={} written={} duration_ms={}",
            created,
            written,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

fn load_node(conn: &Connection, identifier: NodeId, path: &str) -> StoreResult<StoredNode> {
    let mut stmt = conn.prepare(
        "SELECT name, value_type, value_integer, value_real, value_text
         FROM node_properties
         WHERE node_identifier = ?1
         ORDER BY name ASC;",
    )?;
    let mut rows = stmt.query([identifier.to_string()])?;
    let mut properties = BTreeMap::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get("name")?;
        let value_type: String = row.get("value_type")?;
        let value = match value_type.as_str() {
            "boolean" => row
                .get::<_, Option<i64>>("value_integer")?
                .map(|value| PropertyValue::Boolean(value != 0)),
            "integer" => row
                .get::<_, Option<i64>>("value_integer")?
                .map(PropertyValue::Integer),
            "float" => row
                .get::<_, Option<f64>>("value_real")?
                .map(PropertyValue::Float),
            "string" => row
                .get::<_, Option<String>>("value_text")?
                .map(PropertyValue::String),
            other => {
                return Err(StoreError::InvalidData(format!(
                    "invalid value type `{other}` in node_properties.value_type"
                )));
            }
        };
        let value = value.ok_or_else(|| {
            StoreError::InvalidData(format!(
                "property `{name}` of node {identifier} has no {value_type} value"
            ))
        })?;
        properties.insert(name, value);
    }
    Ok(StoredNode::loaded(identifier, path, properties))
}

fn split_value(value: &PropertyValue) -> (Option<i64>, Option<f64>, Option<&str>) {
    match value {
        PropertyValue::Boolean(value) => (Some(i64::from(*value)), None, None),
        PropertyValue::Integer(value) => (Some(*value), None, None),
        PropertyValue::Float(value) => (None, Some(*value), None),
        PropertyValue::String(value) => (None, None, Some(value.as_str())),
    }
}

fn parse_identifier(value: &str) -> StoreResult<NodeId> {
    Uuid::parse_str(value).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{value}` in nodes.identifier"))
    })
}
