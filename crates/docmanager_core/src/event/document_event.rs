//! Hydrate, persist, publish and restore events.

use crate::event::accessor::DocumentAccessor;
use crate::event::options::Options;
use crate::event::EventKind;
use crate::model::document::Document;
use crate::model::value::PropertyValue;
use crate::node::Node;

/// Event carrying a document together with the node it maps onto.
pub struct DocumentEvent<'a> {
    kind: EventKind,
    document: &'a mut Document,
    node: &'a mut dyn Node,
    locale: Option<String>,
    options: Options,
}

/// Populate a document from its node.
pub type HydrateEvent<'a> = DocumentEvent<'a>;
/// Write a document onto its default-workspace node.
pub type PersistEvent<'a> = DocumentEvent<'a>;
/// Write a document onto its live-workspace node.
pub type PublishEvent<'a> = DocumentEvent<'a>;
/// Re-apply node state after a document was restored.
pub type RestoreEvent<'a> = DocumentEvent<'a>;

impl<'a> DocumentEvent<'a> {
    pub fn hydrate(
        document: &'a mut Document,
        node: &'a mut dyn Node,
        locale: Option<String>,
        options: Options,
    ) -> HydrateEvent<'a> {
        Self::with_kind(EventKind::Hydrate, document, node, locale, options)
    }

    pub fn persist(
        document: &'a mut Document,
        node: &'a mut dyn Node,
        locale: Option<String>,
        options: Options,
    ) -> PersistEvent<'a> {
        Self::with_kind(EventKind::Persist, document, node, locale, options)
    }

    pub fn publish(
        document: &'a mut Document,
        node: &'a mut dyn Node,
        locale: Option<String>,
        options: Options,
    ) -> PublishEvent<'a> {
        Self::with_kind(EventKind::Publish, document, node, locale, options)
    }

    pub fn restore(
        document: &'a mut Document,
        node: &'a mut dyn Node,
        locale: Option<String>,
        options: Options,
    ) -> RestoreEvent<'a> {
        Self::with_kind(EventKind::Restore, document, node, locale, options)
    }

    fn with_kind(
        kind: EventKind,
        document: &'a mut Document,
        node: &'a mut dyn Node,
        locale: Option<String>,
        options: Options,
    ) -> Self {
        Self {
            kind,
            document,
            node,
            locale,
            options,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn document(&self) -> &Document {
        &*self.document
    }

    /// Mutable access for listeners that own whole document sections, such as
    /// content hydration.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut *self.document
    }

    pub fn accessor(&mut self) -> DocumentAccessor<'_> {
        DocumentAccessor::new(&mut *self.document)
    }

    pub fn node(&self) -> &dyn Node {
        &*self.node
    }

    pub fn node_mut(&mut self) -> &mut dyn Node {
        &mut *self.node
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn option(&self, key: &str) -> Option<&PropertyValue> {
        self.options.get(key)
    }

    /// Short trace line for logs.
    pub fn debug_message(&self) -> String {
        format!(
            "k:{} d:{} n:{} l:{}",
            self.kind,
            self.document.uuid(),
            self.node.path(),
            self.locale.as_deref().unwrap_or("<no locale>")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::DocumentEvent;
    use crate::event::{EventKind, Options};
    use crate::model::document::Document;
    use crate::model::metadata::MetadataRegistry;
    use crate::model::value::PropertyValue;
    use crate::node::StoredNode;

    #[test]
    fn constructors_tag_event_kind_and_expose_accessor() {
        let registry = MetadataRegistry::with_defaults();
        let mut document = Document::new(registry.get("page").expect("page metadata"));
        let mut node = StoredNode::new(document.uuid(), "/cmf/about");

        let mut event = DocumentEvent::restore(
            &mut document,
            &mut node,
            Some("en".to_string()),
            Options::for_user(3),
        );
        assert_eq!(event.kind(), EventKind::Restore);
        assert_eq!(event.option("user"), Some(&PropertyValue::Integer(3)));

        event.accessor().set("changer", Some(PropertyValue::Integer(3)));
        assert!(event.debug_message().contains("/cmf/about"));
        assert_eq!(document.changer(), Some(3));
    }
}
