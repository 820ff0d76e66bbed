//! Shared helpers for subscriber unit tests.

use crate::dispatch::Subscriber;
use crate::event::{DocumentEvent, Options};
use crate::model::document::Document;
use crate::model::value::PropertyValue;
use crate::node::{Node, NodeId, StoredNode};
use std::cell::Cell;

/// Node that counts every call made on it.
pub(crate) struct SpyNode {
    inner: StoredNode,
    calls: Cell<usize>,
}

impl SpyNode {
    pub(crate) fn new(identifier: NodeId, path: &str) -> Self {
        Self {
            inner: StoredNode::new(identifier, path),
            calls: Cell::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }

    fn hit(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl Node for SpyNode {
    fn identifier(&self) -> NodeId {
        self.hit();
        self.inner.identifier()
    }

    fn path(&self) -> &str {
        self.inner.path()
    }

    fn has_property(&self, key: &str) -> bool {
        self.hit();
        self.inner.has_property(key)
    }

    fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.hit();
        self.inner.property(key)
    }

    fn set_property(&mut self, key: &str, value: PropertyValue) {
        self.hit();
        self.inner.set_property(key, value);
    }

    fn remove_property(&mut self, key: &str) -> Option<PropertyValue> {
        self.hit();
        self.inner.remove_property(key)
    }

    fn property_keys(&self) -> Vec<String> {
        self.hit();
        self.inner.property_keys()
    }
}

/// Runs hydrate, persist, publish and restore of `subscriber` against a
/// spy node and asserts neither the node nor the document was touched.
pub(crate) fn assert_passes_through(subscriber: &dyn Subscriber, document: &mut Document) {
    let before = document.clone();
    let mut node = SpyNode::new(document.uuid(), "/plain");

    for kind in 0..4 {
        let locale = Some("en".to_string());
        let options = Options::for_user(42);
        let mut event = match kind {
            0 => DocumentEvent::hydrate(&mut *document, &mut node, locale, options),
            1 => DocumentEvent::persist(&mut *document, &mut node, locale, options),
            2 => DocumentEvent::publish(&mut *document, &mut node, locale, options),
            _ => DocumentEvent::restore(&mut *document, &mut node, locale, options),
        };
        let result = match kind {
            0 => subscriber.on_hydrate(&mut event),
            1 => subscriber.on_persist(&mut event),
            2 => subscriber.on_publish(&mut event),
            _ => subscriber.on_restore(&mut event),
        };
        result.expect("unsupported documents pass through");
    }

    assert_eq!(node.calls(), 0, "{} touched the node", subscriber.name());
    assert_eq!(*document, before, "{} touched the document", subscriber.name());
}
