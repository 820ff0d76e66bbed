//! Document manager facade.
//!
//! # Responsibility
//! - Own the dispatcher and the default (draft) and live node stores.
//! - Resolve the node and locale of a request, then dispatch its event.
//!
//! # Invariants
//! - Every event carries a locale: the requested one, else the document's,
//!   else the configured default.
//! - A published node has the same identifier and path in both stores;
//!   missing live ancestors are mirrored with their draft identifiers.
//! - Nothing reaches the backing storage before `flush`.

use crate::config::DocumentManagerConfig;
use crate::dispatch::EventDispatcher;
use crate::encoding::encoder::PropertyEncoder;
use crate::error::{DocumentManagerError, DocumentResult};
use crate::event::{DocumentEvent, FindEvent, Options};
use crate::model::document::Document;
use crate::model::metadata::MetadataRegistry;
use crate::model::value::PropertyValue;
use crate::node::{parent_path, NodeStore, ROOT_PATH};
use crate::subscriber::{
    BlameSubscriber, ContentSubscriber, DocumentLoaderSubscriber, TimestampSubscriber,
    WorkflowStageSubscriber,
};
use log::info;
use std::sync::Arc;

pub struct DocumentManager<S: NodeStore> {
    dispatcher: EventDispatcher,
    encoder: PropertyEncoder,
    default_store: S,
    live_store: S,
    default_locale: String,
}

impl<S: NodeStore> DocumentManager<S> {
    pub fn new(
        dispatcher: EventDispatcher,
        encoder: PropertyEncoder,
        default_store: S,
        live_store: S,
        default_locale: impl Into<String>,
    ) -> Self {
        Self {
            dispatcher,
            encoder,
            default_store,
            live_store,
            default_locale: default_locale.into(),
        }
    }

    /// Manager with the loader, blame, timestamp, workflow and content
    /// subscribers registered over one shared namespace registry.
    ///
    /// # Errors
    /// - `InvalidEncoding` when the config names an unknown role.
    pub fn with_default_subscribers(
        config: &DocumentManagerConfig,
        metadata: MetadataRegistry,
        default_store: S,
        live_store: S,
    ) -> DocumentResult<Self> {
        let encoder = PropertyEncoder::new(Arc::new(config.namespace_registry()?));

        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(Arc::new(DocumentLoaderSubscriber::new(
            Arc::new(metadata),
            encoder.clone(),
            config.default_locale.clone(),
        )));
        dispatcher.register(Arc::new(BlameSubscriber::new(encoder.clone())));
        dispatcher.register(Arc::new(TimestampSubscriber::new(encoder.clone())));
        dispatcher.register(Arc::new(WorkflowStageSubscriber::new(encoder.clone())));
        dispatcher.register(Arc::new(ContentSubscriber::new(encoder.clone())));

        Ok(Self::new(
            dispatcher,
            encoder,
            default_store,
            live_store,
            config.default_locale.clone(),
        ))
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub fn default_store(&self) -> &S {
        &self.default_store
    }

    pub fn default_store_mut(&mut self) -> &mut S {
        &mut self.default_store
    }

    pub fn live_store(&self) -> &S {
        &self.live_store
    }

    pub fn live_store_mut(&mut self) -> &mut S {
        &mut self.live_store
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Loads a draft document by UUID or absolute path.
    pub fn find(
        &mut self,
        identifier: &str,
        locale: Option<&str>,
        options: Options,
    ) -> DocumentResult<Document> {
        let mut event = FindEvent::new(identifier, locale.map(str::to_string), options);
        self.dispatcher
            .dispatch_find(&mut event, &mut self.default_store)?;
        event.into_document()
    }

    /// Writes `document` into the draft store, creating its node on first
    /// persist at `document.path()`.
    ///
    /// # Errors
    /// - `MissingPath` for a new document without path.
    /// - Store errors from node creation, listener errors from dispatch.
    pub fn persist(
        &mut self,
        document: &mut Document,
        locale: Option<&str>,
        options: Options,
    ) -> DocumentResult<()> {
        let locale = self.event_locale(document, locale);
        let uuid = document.uuid();

        let exists = self.default_store.node_by_identifier(uuid)?.is_some();
        let node = if exists {
            self.default_store
                .node_by_identifier(uuid)?
                .ok_or_else(|| DocumentManagerError::DocumentNotFound(uuid.to_string()))?
        } else {
            let path = document
                .path()
                .ok_or(DocumentManagerError::MissingPath(uuid))?
                .to_string();
            self.default_store.create_node(&path, uuid)?
        };
        document.set_path(node.path());
        document.set_locale(Some(locale.clone()));

        let mut event = DocumentEvent::persist(document, node, Some(locale), options);
        self.dispatcher.dispatch(&mut event)
    }

    /// Publishes a persisted document into the live store.
    ///
    /// # Errors
    /// - `DocumentNotFound` when the document was never persisted.
    pub fn publish(
        &mut self,
        document: &mut Document,
        locale: Option<&str>,
        options: Options,
    ) -> DocumentResult<()> {
        let locale = self.event_locale(document, locale);
        let uuid = document.uuid();
        let path = self
            .default_store
            .node_by_identifier(uuid)?
            .map(|node| node.path().to_string())
            .ok_or_else(|| DocumentManagerError::DocumentNotFound(uuid.to_string()))?;

        self.mirror_into_live(&path)?;
        let node = self
            .live_store
            .node_by_identifier(uuid)?
            .ok_or_else(|| DocumentManagerError::DocumentNotFound(uuid.to_string()))?;
        document.set_locale(Some(locale.clone()));

        info!(
            "event=document_publish module=service status=start document={} path={} locale={}",
            uuid, path, locale
        );
        let mut event = DocumentEvent::publish(document, node, Some(locale), options);
        self.dispatcher.dispatch(&mut event)
    }

    /// Resets the draft node's localized properties of the event locale to
    /// their live state and re-hydrates `document`. Other locales and shared
    /// properties of the draft stay as they are.
    ///
    /// # Errors
    /// - `DocumentNotFound` when either store lacks the document node.
    pub fn restore(
        &mut self,
        document: &mut Document,
        locale: Option<&str>,
        options: Options,
    ) -> DocumentResult<()> {
        let locale = self.event_locale(document, locale);
        let uuid = document.uuid();
        let not_found = || DocumentManagerError::DocumentNotFound(uuid.to_string());
        let encoder = &self.encoder;
        let in_locale = |key: &str| encoder.decode_localized(key, &locale).is_some();

        let live: Vec<(String, PropertyValue)> = {
            let node = self.live_store.node_by_identifier(uuid)?.ok_or_else(not_found)?;
            node.property_keys()
                .into_iter()
                .filter(|key| in_locale(key))
                .filter_map(|key| {
                    let value = node.property(&key)?.clone();
                    Some((key, value))
                })
                .collect()
        };

        let node = self
            .default_store
            .node_by_identifier(uuid)?
            .ok_or_else(not_found)?;
        for key in node.property_keys() {
            if in_locale(&key) && !live.iter().any(|(live_key, _)| *live_key == key) {
                node.remove_property(&key);
            }
        }
        for (key, value) in live {
            node.set_property(&key, value);
        }
        document.set_locale(Some(locale.clone()));

        let mut event = DocumentEvent::restore(document, node, Some(locale), options);
        self.dispatcher.dispatch(&mut event)
    }

    /// Commits both stores, draft first.
    pub fn flush(&mut self) -> DocumentResult<()> {
        self.default_store.save()?;
        self.live_store.save()?;
        Ok(())
    }

    fn event_locale(&self, document: &Document, locale: Option<&str>) -> String {
        locale
            .or(document.locale())
            .unwrap_or(&self.default_locale)
            .to_string()
    }

    /// Creates `path` and its missing ancestors in the live store.
    fn mirror_into_live(&mut self, path: &str) -> DocumentResult<()> {
        let mut missing = Vec::new();
        let mut current = Some(path);
        while let Some(candidate) = current {
            if candidate == ROOT_PATH || self.live_store.node_by_path(candidate)?.is_some() {
                break;
            }
            missing.push(candidate.to_string());
            current = parent_path(candidate);
        }

        for candidate in missing.iter().rev() {
            let identifier = self
                .default_store
                .node_by_path(candidate)?
                .map(|node| node.identifier())
                .ok_or_else(|| DocumentManagerError::DocumentNotFound(candidate.clone()))?;
            self.live_store.create_node(candidate, identifier)?;
        }
        Ok(())
    }
}
