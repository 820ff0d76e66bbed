//! Document domain model.
//!
//! # Responsibility
//! - Hold the locale-scoped field values of one repository document.
//! - Expose typed getters for fields managed by pipeline subscribers.
//!
//! # Invariants
//! - `uuid` equals the identifier of the backing node once persisted.
//! - System fields are written only through `DocumentAccessor`, or through
//!   the explicit caller-facing setters below.

use crate::model::metadata::{Behaviors, DocumentMetadata};
use crate::model::value::{PropertyValue, UserId};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Stable identifier shared by a document and its node.
pub type DocumentId = Uuid;

/// Field names written by pipeline subscribers.
pub mod fields {
    pub const CREATOR: &str = "creator";
    pub const CHANGER: &str = "changer";
    pub const CREATED: &str = "created";
    pub const CHANGED: &str = "changed";
    pub const WORKFLOW_STAGE: &str = "workflowStage";
    pub const PUBLISHED: &str = "published";
    pub const TITLE: &str = "title";

    /// Fields owned by system behaviors.
    pub const SYSTEM: &[&str] = &[CREATOR, CHANGER, CREATED, CHANGED, WORKFLOW_STAGE, PUBLISHED];
}

/// In-memory document mapped onto one (node, locale) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    uuid: DocumentId,
    alias: String,
    behaviors: Behaviors,
    path: Option<String>,
    locale: Option<String>,
    system: BTreeMap<String, PropertyValue>,
    title: Option<String>,
    content: BTreeMap<String, PropertyValue>,
}

impl Document {
    /// Creates a new, not yet persisted document with a generated id.
    pub fn new(metadata: &DocumentMetadata) -> Self {
        Self::with_id(Uuid::new_v4(), metadata)
    }

    /// Creates a document for an existing identity (loader and import paths).
    pub fn with_id(uuid: DocumentId, metadata: &DocumentMetadata) -> Self {
        Self {
            uuid,
            alias: metadata.alias.clone(),
            behaviors: metadata.behaviors,
            path: None,
            locale: None,
            system: BTreeMap::new(),
            title: None,
            content: BTreeMap::new(),
        }
    }

    pub fn uuid(&self) -> DocumentId {
        self.uuid
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn behaviors(&self) -> Behaviors {
        self.behaviors
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = Some(path.into());
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn set_locale(&mut self, locale: Option<String>) {
        self.locale = locale;
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn content(&self) -> &BTreeMap<String, PropertyValue> {
        &self.content
    }

    pub fn content_value(&self, name: &str) -> Option<&PropertyValue> {
        self.content.get(name)
    }

    pub fn set_content_value(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.content.insert(name.into(), value.into());
    }

    pub fn creator(&self) -> Option<UserId> {
        self.system_integer(fields::CREATOR)
    }

    /// Presets the creator used on first persist instead of the acting user.
    pub fn set_creator(&mut self, creator: Option<UserId>) {
        self.set_system_field(fields::CREATOR, creator.map(PropertyValue::Integer));
    }

    pub fn changer(&self) -> Option<UserId> {
        self.system_integer(fields::CHANGER)
    }

    pub fn set_changer(&mut self, changer: Option<UserId>) {
        self.set_system_field(fields::CHANGER, changer.map(PropertyValue::Integer));
    }

    /// Creation time in Unix epoch milliseconds.
    pub fn created(&self) -> Option<i64> {
        self.system_integer(fields::CREATED)
    }

    /// Last change time in Unix epoch milliseconds.
    pub fn changed(&self) -> Option<i64> {
        self.system_integer(fields::CHANGED)
    }

    pub fn workflow_stage(&self) -> Option<&str> {
        self.system
            .get(fields::WORKFLOW_STAGE)
            .and_then(PropertyValue::as_str)
    }

    /// First publication time in Unix epoch milliseconds.
    pub fn published(&self) -> Option<i64> {
        self.system_integer(fields::PUBLISHED)
    }

    /// Raw system field value as last written by the pipeline.
    pub fn system_field(&self, name: &str) -> Option<&PropertyValue> {
        self.system.get(name)
    }

    pub(crate) fn set_system_field(&mut self, name: &str, value: Option<PropertyValue>) {
        match value {
            Some(value) => {
                self.system.insert(name.to_string(), value);
            }
            None => {
                self.system.remove(name);
            }
        }
    }

    pub(crate) fn clear_content(&mut self) {
        self.title = None;
        self.content.clear();
    }

    fn system_integer(&self, name: &str) -> Option<i64> {
        self.system.get(name).and_then(PropertyValue::as_integer)
    }
}
