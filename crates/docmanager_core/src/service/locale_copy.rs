//! Bulk copy of one locale onto another across a node subtree.
//!
//! # Responsibility
//! - Walk a subtree depth-first (parents before children, children in
//!   store order) and copy localized properties from a source locale.
//! - Report what happened to every visited node.
//!
//! # Invariants
//! - Only `system_localized` and `content_localized` keys are touched.
//! - A node already holding the destination locale is skipped unless
//!   overwrite is on; with overwrite the destination mirrors the source.
//! - Nothing is saved; the caller commits or discards the store session.

use crate::encoding::encoder::{validate_locale, PropertyEncoder};
use crate::encoding::namespace::EncodingRole;
use crate::error::{DocumentManagerError, DocumentResult};
use crate::model::value::PropertyValue;
use crate::node::{Node, NodeStore};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Result of visiting one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Processed,
    /// Source locale has no properties on the node.
    SkippedGhost,
    /// Destination locale already present and overwrite is off.
    SkippedExists,
}

impl CopyOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::SkippedGhost => "skipped_ghost",
            Self::SkippedExists => "skipped_exists",
        }
    }
}

impl Display for CopyOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyReportEntry {
    pub path: String,
    pub outcome: CopyOutcome,
    /// Properties written to the destination locale.
    pub copied: usize,
}

#[derive(Debug, Clone)]
pub struct LocaleCopier {
    encoder: PropertyEncoder,
}

impl LocaleCopier {
    pub fn new(encoder: PropertyEncoder) -> Self {
        Self { encoder }
    }

    /// Copies `source` onto `dest` for `root` and all its descendants.
    ///
    /// # Errors
    /// - `InvalidLocale` for malformed or identical locales.
    /// - `DocumentNotFound` when `root` does not exist.
    pub fn copy(
        &self,
        store: &mut dyn NodeStore,
        root: &str,
        source: &str,
        dest: &str,
        overwrite: bool,
    ) -> DocumentResult<Vec<CopyReportEntry>> {
        validate_locale(Some(source))?;
        validate_locale(Some(dest))?;
        if source == dest {
            return Err(DocumentManagerError::InvalidLocale(Some(dest.to_string())));
        }
        if store.node_by_path(root)?.is_none() {
            return Err(DocumentManagerError::DocumentNotFound(root.to_string()));
        }

        info!(
            "event=locale_copy module=service status=start root={} source={} dest={} overwrite={}",
            root, source, dest, overwrite
        );
        let mut report = Vec::new();
        let mut pending = vec![root.to_string()];
        while let Some(path) = pending.pop() {
            let mut children = store.child_paths(&path)?;
            children.reverse();

            let node = store
                .node_by_path(&path)?
                .ok_or_else(|| DocumentManagerError::DocumentNotFound(path.clone()))?;
            let entry = self.copy_node(node, source, dest, overwrite)?;
            debug!(
                "event=locale_copy_node module=service status={} path={} copied={}",
                entry.outcome, entry.path, entry.copied
            );
            report.push(entry);
            pending.extend(children);
        }

        info!(
            "event=locale_copy module=service status=ok root={} nodes={}",
            root,
            report.len()
        );
        Ok(report)
    }

    fn copy_node(
        &self,
        node: &mut dyn Node,
        source: &str,
        dest: &str,
        overwrite: bool,
    ) -> DocumentResult<CopyReportEntry> {
        let path = node.path().to_string();
        let existing = self.localized_keys(node, dest);
        if !existing.is_empty() && !overwrite {
            return Ok(CopyReportEntry {
                path,
                outcome: CopyOutcome::SkippedExists,
                copied: 0,
            });
        }

        let mut copies: BTreeMap<String, PropertyValue> = BTreeMap::new();
        for (key, (role, name)) in self.localized_keys(node, source) {
            let Some(value) = node.property(&key) else {
                continue;
            };
            let target = self.encoder.encode(role, &name, Some(dest))?;
            copies.insert(target, value.clone());
        }
        if copies.is_empty() {
            return Ok(CopyReportEntry {
                path,
                outcome: CopyOutcome::SkippedGhost,
                copied: 0,
            });
        }

        for key in existing.keys() {
            if !copies.contains_key(key) {
                node.remove_property(key);
            }
        }
        let copied = copies.len();
        for (key, value) in copies {
            node.set_property(&key, value);
        }
        Ok(CopyReportEntry {
            path,
            outcome: CopyOutcome::Processed,
            copied,
        })
    }

    /// Localized keys of `locale` on the node.
    fn localized_keys(
        &self,
        node: &dyn Node,
        locale: &str,
    ) -> BTreeMap<String, (EncodingRole, String)> {
        node.property_keys()
            .into_iter()
            .filter_map(|key| {
                let decoded = self.encoder.decode_localized(&key, locale)?;
                Some((key, decoded))
            })
            .collect()
    }
}
