//! Document capability metadata.
//!
//! Capabilities are plain data attached to a document alias and copied onto
//! each document when it is built, so subscribers check a flag instead of
//! inspecting the document type on every event.

use std::collections::BTreeMap;

/// Whether a behavior stores its properties per locale or once per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorScope {
    /// One value per locale (`system_localized` encoding).
    Localized,
    /// One value shared by every locale (`system` encoding).
    Shared,
}

/// Capability set of one document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Behaviors {
    /// Creator/changer tracking.
    pub blame: Option<BehaviorScope>,
    /// Created/changed timestamps.
    pub timestamp: Option<BehaviorScope>,
    /// Test/published workflow stage, always localized.
    pub workflow: bool,
    /// Localized title and structure content.
    pub content: bool,
}

impl Behaviors {
    /// Behaviors of a regular localized page.
    pub fn localized_page() -> Self {
        Self {
            blame: Some(BehaviorScope::Localized),
            timestamp: Some(BehaviorScope::Localized),
            workflow: true,
            content: true,
        }
    }

    /// Behaviors of a document whose blame/timestamps are shared across locales.
    pub fn shared_snippet() -> Self {
        Self {
            blame: Some(BehaviorScope::Shared),
            timestamp: Some(BehaviorScope::Shared),
            workflow: true,
            content: true,
        }
    }
}

/// Metadata registered for one document alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub alias: String,
    pub behaviors: Behaviors,
}

/// Alias-to-metadata table used when materializing documents from nodes.
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    entries: BTreeMap<String, DocumentMetadata>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `page`, `snippet` and `route` aliases.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("page", Behaviors::localized_page());
        registry.register("snippet", Behaviors::shared_snippet());
        registry.register("route", Behaviors::default());
        registry
    }

    /// Registers or replaces metadata for one alias.
    pub fn register(&mut self, alias: impl Into<String>, behaviors: Behaviors) {
        let alias = alias.into();
        self.entries.insert(
            alias.clone(),
            DocumentMetadata { alias, behaviors },
        );
    }

    pub fn get(&self, alias: &str) -> Option<&DocumentMetadata> {
        self.entries.get(alias)
    }

    pub fn aliases(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}
