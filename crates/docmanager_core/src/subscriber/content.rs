//! Localized title and structure content.
//!
//! # Responsibility
//! - Write the document title and content values as `content_localized`
//!   properties of the event locale.
//! - Rebuild document content by enumerating and decoding node keys.
//!
//! # Invariants
//! - After persist, the node holds exactly the document's content for the
//!   event locale; other locales are untouched.
//! - Content names are non-empty and never `title`.
//! - When content and system share a localized prefix, system field names
//!   are neither read as content nor accepted as content names.

use crate::dispatch::{Subscriber, Subscription};
use crate::encoding::encoder::PropertyEncoder;
use crate::encoding::namespace::EncodingRole;
use crate::error::{DocumentManagerError, DocumentResult};
use crate::event::{DocumentEvent, EventKind};
use crate::model::document::fields;
use crate::model::value::PropertyValue;
use std::collections::BTreeMap;

const BEHAVIOR: &str = "content";

#[derive(Debug, Clone)]
pub struct ContentSubscriber {
    encoder: PropertyEncoder,
}

impl ContentSubscriber {
    pub fn new(encoder: PropertyEncoder) -> Self {
        Self { encoder }
    }

    fn shares_system_namespace(&self) -> bool {
        let registry = self.encoder.registry();
        registry.get_prefix(EncodingRole::ContentLocalized)
            == registry.get_prefix(EncodingRole::SystemLocalized)
    }

    fn is_system_name(&self, name: &str) -> bool {
        self.shares_system_namespace() && fields::SYSTEM.contains(&name)
    }

    fn locale(&self, event: &DocumentEvent<'_>) -> DocumentResult<String> {
        event
            .locale()
            .map(str::to_string)
            .ok_or_else(|| DocumentManagerError::MissingLocale {
                identifier: event.document().uuid(),
                behavior: BEHAVIOR,
            })
    }

    /// Content keys of `locale` currently on the node, by logical name.
    fn node_content(&self, event: &DocumentEvent<'_>, locale: &str) -> BTreeMap<String, String> {
        event
            .node()
            .property_keys()
            .into_iter()
            .filter_map(|key| {
                let name = self
                    .encoder
                    .decode_for_locale(EncodingRole::ContentLocalized, &key, locale)?;
                (!self.is_system_name(&name)).then_some((name, key))
            })
            .collect()
    }

    fn read_content(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        let locale = self.locale(event)?;
        let values: Vec<(String, PropertyValue)> = self
            .node_content(event, &locale)
            .into_iter()
            .filter_map(|(name, key)| Some((name, event.node().property(&key)?.clone())))
            .collect();

        let document = event.document_mut();
        document.clear_content();
        for (name, value) in values {
            if name == fields::TITLE {
                document.set_title(value.to_string());
            } else {
                document.set_content_value(name, value);
            }
        }
        Ok(())
    }

    fn write_content(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        let locale = self.locale(event)?;

        let mut values = BTreeMap::new();
        if let Some(title) = event.document().title() {
            values.insert(fields::TITLE.to_string(), PropertyValue::from(title));
        }
        for (name, value) in event.document().content() {
            if name.is_empty() || name == fields::TITLE || self.is_system_name(name) {
                return Err(DocumentManagerError::ReservedPropertyName(name.clone()));
            }
            values.insert(name.clone(), value.clone());
        }

        for (name, key) in self.node_content(event, &locale) {
            if !values.contains_key(&name) {
                event.node_mut().remove_property(&key);
            }
        }
        for (name, value) in values {
            let key = self
                .encoder
                .encode(EncodingRole::ContentLocalized, &name, Some(&locale))?;
            event.node_mut().set_property(&key, value);
        }
        Ok(())
    }
}

impl Subscriber for ContentSubscriber {
    fn name(&self) -> &'static str {
        "content"
    }

    fn subscriptions(&self) -> Vec<Subscription> {
        vec![
            Subscription::default_priority(EventKind::Hydrate),
            Subscription::default_priority(EventKind::Persist),
            Subscription::default_priority(EventKind::Publish),
            Subscription::default_priority(EventKind::Restore),
        ]
    }

    fn on_hydrate(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        if !event.document().behaviors().content {
            return Ok(());
        }
        self.read_content(event)
    }

    fn on_persist(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        if !event.document().behaviors().content {
            return Ok(());
        }
        self.write_content(event)
    }

    fn on_publish(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        if !event.document().behaviors().content {
            return Ok(());
        }
        self.write_content(event)
    }

    /// Restored node content replaces whatever the document held.
    fn on_restore(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        if !event.document().behaviors().content {
            return Ok(());
        }
        self.read_content(event)
    }
}
