//! Draft/published workflow stage.
//!
//! Persisting always drops a document back to `test`; publishing moves it to
//! `published` and records the first publication time on the live node.

use crate::dispatch::{Subscriber, Subscription};
use crate::encoding::encoder::PropertyEncoder;
use crate::encoding::namespace::EncodingRole;
use crate::error::DocumentResult;
use crate::event::{DocumentEvent, EventKind};
use crate::model::document::fields::{PUBLISHED, WORKFLOW_STAGE};
use crate::model::value::PropertyValue;
use crate::subscriber::timestamp::Clock;
use crate::subscriber::{encode_for_event, system_clock_ms};
use std::sync::Arc;

const BEHAVIOR: &str = "workflow";

/// Workflow stage of one localized document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    Test,
    Published,
}

impl WorkflowStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Published => "published",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "test" => Some(Self::Test),
            "published" => Some(Self::Published),
            _ => None,
        }
    }
}

pub struct WorkflowStageSubscriber {
    encoder: PropertyEncoder,
    clock: Clock,
}

impl WorkflowStageSubscriber {
    pub fn new(encoder: PropertyEncoder) -> Self {
        Self::with_clock(encoder, Arc::new(system_clock_ms))
    }

    pub fn with_clock(encoder: PropertyEncoder, clock: Clock) -> Self {
        Self { encoder, clock }
    }

    fn key(&self, event: &DocumentEvent<'_>, name: &str) -> DocumentResult<String> {
        encode_for_event(
            &self.encoder,
            event,
            EncodingRole::SystemLocalized,
            name,
            BEHAVIOR,
        )
    }

    fn set_stage(&self, event: &mut DocumentEvent<'_>, stage: WorkflowStage) -> DocumentResult<()> {
        let key = self.key(event, WORKFLOW_STAGE)?;
        let value = PropertyValue::from(stage.as_str());
        event.accessor().set(WORKFLOW_STAGE, Some(value.clone()));
        event.node_mut().set_property(&key, value);
        Ok(())
    }
}

impl Subscriber for WorkflowStageSubscriber {
    fn name(&self) -> &'static str {
        "workflow_stage"
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
        if !event.document().behaviors().workflow {
            return Ok(());
        }
        let stage = event
            .node()
            .get_property_value_with_default(&self.key(event, WORKFLOW_STAGE)?, None)
            .filter(|value| value.as_str().and_then(WorkflowStage::parse).is_some());
        let published = event
            .node()
            .get_property_value_with_default(&self.key(event, PUBLISHED)?, None);

        let mut accessor = event.accessor();
        accessor.set(WORKFLOW_STAGE, stage);
        accessor.set(PUBLISHED, published);
        Ok(())
    }

    fn on_persist(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        if !event.document().behaviors().workflow {
            return Ok(());
        }
        self.set_stage(event, WorkflowStage::Test)
    }

    fn on_publish(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        if !event.document().behaviors().workflow {
            return Ok(());
        }
        self.set_stage(event, WorkflowStage::Published)?;

        let published_key = self.key(event, PUBLISHED)?;
        if !event.node().has_property(&published_key) {
            let published = PropertyValue::Integer((self.clock)());
            event.accessor().set(PUBLISHED, Some(published.clone()));
            event.node_mut().set_property(&published_key, published);
        }
        Ok(())
    }

    /// A restored document is a draft again until it is published.
    fn on_restore(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        if !event.document().behaviors().workflow {
            return Ok(());
        }
        self.set_stage(event, WorkflowStage::Test)
    }
}

#[cfg(test)]
mod tests {
    use super::{WorkflowStage, WorkflowStageSubscriber};
    use crate::dispatch::Subscriber;
    use crate::encoding::encoder::PropertyEncoder;
    use crate::encoding::namespace::NamespaceRegistry;
    use crate::event::{DocumentEvent, Options};
    use crate::model::document::Document;
    use crate::model::metadata::{Behaviors, DocumentMetadata, MetadataRegistry};
    use crate::model::value::PropertyValue;
    use crate::node::{Node, StoredNode};
    use crate::subscriber::test_support::assert_passes_through;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    fn subscriber() -> WorkflowStageSubscriber {
        let ticks = Arc::new(AtomicI64::new(1_000));
        WorkflowStageSubscriber::with_clock(
            PropertyEncoder::new(Arc::new(NamespaceRegistry::with_defaults())),
            Arc::new(move || ticks.fetch_add(500, Ordering::SeqCst)),
        )
    }

    fn page() -> Document {
        let registry = MetadataRegistry::with_defaults();
        Document::new(registry.get("page").expect("page metadata"))
    }

    fn locale() -> Option<String> {
        Some("en".to_string())
    }

    #[test]
    fn published_time_is_recorded_once() {
        let subscriber = subscriber();
        let mut document = page();
        let mut live = StoredNode::new(document.uuid(), "/page");

        for _ in 0..2 {
            let mut event =
                DocumentEvent::publish(&mut document, &mut live, locale(), Options::new());
            subscriber.on_publish(&mut event).expect("publish");
        }

        assert_eq!(live.property("i18n:en-published"), Some(&PropertyValue::Integer(1_000)));
        assert_eq!(
            live.property("i18n:en-workflowStage"),
            Some(&PropertyValue::from("published"))
        );
        assert_eq!(document.published(), Some(1_000));
        assert_eq!(document.workflow_stage(), Some("published"));
    }

    #[test]
    fn restore_returns_the_document_to_test() {
        let subscriber = subscriber();
        let mut document = page();
        let mut node = StoredNode::new(document.uuid(), "/page");
        node.set_property("i18n:en-workflowStage", PropertyValue::from("published"));

        let mut event = DocumentEvent::restore(&mut document, &mut node, locale(), Options::new());
        subscriber.on_restore(&mut event).expect("restore");

        assert_eq!(node.property("i18n:en-workflowStage"), Some(&PropertyValue::from("test")));
        assert_eq!(document.workflow_stage(), Some("test"));
    }

    #[test]
    fn hydrate_drops_unknown_stages() {
        let subscriber = subscriber();
        let mut document = page();
        let mut node = StoredNode::new(document.uuid(), "/page");

        let mut event = DocumentEvent::persist(&mut document, &mut node, locale(), Options::new());
        subscriber.on_persist(&mut event).expect("persist");
        assert_eq!(document.workflow_stage(), Some("test"));

        node.set_property("i18n:en-workflowStage", PropertyValue::from("draft"));
        node.set_property("i18n:en-published", PropertyValue::Integer(5));
        let mut event = DocumentEvent::hydrate(&mut document, &mut node, locale(), Options::new());
        subscriber.on_hydrate(&mut event).expect("hydrate");

        assert_eq!(document.workflow_stage(), None);
        assert_eq!(document.published(), Some(5));
    }

    #[test]
    fn documents_without_workflow_pass_through() {
        let mut document = Document::new(&DocumentMetadata {
            alias: "plain".to_string(),
            behaviors: Behaviors::default(),
        });
        assert_passes_through(&subscriber(), &mut document);
    }

    #[test]
    fn stage_strings_round_trip() {
        for stage in [WorkflowStage::Test, WorkflowStage::Published] {
            assert_eq!(WorkflowStage::parse(stage.as_str()), Some(stage));
        }
        assert_eq!(WorkflowStage::parse("draft"), None);
    }
}
