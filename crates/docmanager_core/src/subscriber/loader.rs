//! Document materialization on find.
//!
//! # Responsibility
//! - Resolve a find identifier (absolute path or UUID) to a node.
//! - Build the document from the node's alias metadata and hydrate it
//!   through the same dispatcher.
//! - Stamp the alias on nodes written by persist and publish.
//!
//! # Invariants
//! - Runs before every other find listener (`LOADER_PRIORITY`); a document
//!   already assigned by an earlier listener is left alone.
//! - The alias property is written once and never rewritten.

use crate::dispatch::{FindContext, Subscriber, Subscription};
use crate::encoding::encoder::PropertyEncoder;
use crate::error::{DocumentManagerError, DocumentResult};
use crate::event::{DocumentEvent, EventKind, FindEvent};
use crate::model::document::Document;
use crate::model::metadata::MetadataRegistry;
use crate::model::value::PropertyValue;
use crate::node::{Node, NodeStore};
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

/// System property naming the document alias of a node.
pub const ALIAS_PROPERTY: &str = "alias";

/// Priority of the loader on find, persist and publish.
pub const LOADER_PRIORITY: i32 = 500;

#[derive(Debug, Clone)]
pub struct DocumentLoaderSubscriber {
    metadata: Arc<MetadataRegistry>,
    encoder: PropertyEncoder,
    default_locale: String,
}

impl DocumentLoaderSubscriber {
    pub fn new(
        metadata: Arc<MetadataRegistry>,
        encoder: PropertyEncoder,
        default_locale: impl Into<String>,
    ) -> Self {
        Self {
            metadata,
            encoder,
            default_locale: default_locale.into(),
        }
    }

    fn resolve<'s>(
        store: &'s mut dyn NodeStore,
        identifier: &str,
    ) -> DocumentResult<Option<&'s mut dyn Node>> {
        if identifier.starts_with('/') {
            return Ok(store.node_by_path(identifier)?);
        }
        match Uuid::parse_str(identifier) {
            Ok(uuid) => Ok(store.node_by_identifier(uuid)?),
            Err(_) => Ok(None),
        }
    }

    fn stamp_alias(&self, event: &mut DocumentEvent<'_>) {
        let key = self.encoder.system_name(ALIAS_PROPERTY);
        if event.node().has_property(&key) {
            return;
        }
        let alias = PropertyValue::from(event.document().alias());
        event.node_mut().set_property(&key, alias);
    }
}

impl Subscriber for DocumentLoaderSubscriber {
    fn name(&self) -> &'static str {
        "document_loader"
    }

    fn subscriptions(&self) -> Vec<Subscription> {
        vec![
            Subscription::new(EventKind::Find, LOADER_PRIORITY),
            Subscription::new(EventKind::Persist, LOADER_PRIORITY),
            Subscription::new(EventKind::Publish, LOADER_PRIORITY),
        ]
    }

    fn on_find(&self, event: &mut FindEvent, context: &mut FindContext<'_>) -> DocumentResult<()> {
        if event.has_document() {
            return Ok(());
        }

        let identifier = event.identifier().to_string();
        let node = Self::resolve(&mut *context.store, &identifier)?
            .ok_or_else(|| DocumentManagerError::DocumentNotFound(identifier.clone()))?;

        // Nodes without alias are plain structure, not documents.
        let alias = node
            .property(&self.encoder.system_name(ALIAS_PROPERTY))
            .and_then(PropertyValue::as_str)
            .map(str::to_string)
            .ok_or_else(|| DocumentManagerError::DocumentNotFound(identifier.clone()))?;
        let metadata = self
            .metadata
            .get(&alias)
            .ok_or_else(|| DocumentManagerError::UnknownAlias(alias.clone()))?;

        let locale = event
            .locale()
            .map(str::to_string)
            .unwrap_or_else(|| self.default_locale.clone());
        let mut document = Document::with_id(node.identifier(), metadata);
        document.set_path(node.path());
        document.set_locale(Some(locale.clone()));

        debug!(
            "event=document_load module=subscriber status=hydrate identifier={} alias={} locale={}",
            identifier, alias, locale
        );
        let mut hydrate =
            DocumentEvent::hydrate(&mut document, node, Some(locale), event.options().clone());
        context.dispatcher.dispatch(&mut hydrate)?;

        event.set_document(document);
        Ok(())
    }

    fn on_persist(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        self.stamp_alias(event);
        Ok(())
    }

    fn on_publish(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        self.stamp_alias(event);
        Ok(())
    }
}
