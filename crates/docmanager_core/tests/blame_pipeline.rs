use docmanager_core::dispatch::{Subscriber, Subscription};
use docmanager_core::model::document::fields;
use docmanager_core::{
    BlameSubscriber, Document, DocumentEvent, DocumentManagerError, DocumentResult, EventDispatcher,
    EventKind, MetadataRegistry, NamespaceRegistry, Node, Options, PropertyEncoder, PropertyValue,
    StoredNode,
};
use std::sync::{Arc, Mutex};

fn dispatcher() -> EventDispatcher {
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(Arc::new(BlameSubscriber::new(PropertyEncoder::new(
        Arc::new(NamespaceRegistry::with_defaults()),
    ))));
    dispatcher
}

fn page() -> Document {
    let registry = MetadataRegistry::with_defaults();
    let mut document = Document::new(registry.get("page").unwrap());
    document.set_path("/about");
    document
}

fn run(
    dispatcher: &EventDispatcher,
    kind: EventKind,
    document: &mut Document,
    node: &mut StoredNode,
    options: Options,
) -> DocumentResult<()> {
    let locale = Some("en".to_string());
    let mut event = match kind {
        EventKind::Hydrate => DocumentEvent::hydrate(document, node, locale, options),
        EventKind::Persist => DocumentEvent::persist(document, node, locale, options),
        EventKind::Publish => DocumentEvent::publish(document, node, locale, options),
        EventKind::Restore => DocumentEvent::restore(document, node, locale, options),
        EventKind::Find => unreachable!("find is not a document event"),
    };
    dispatcher.dispatch(&mut event)
}

#[test]
fn second_persist_keeps_creator_and_replaces_changer() {
    let dispatcher = dispatcher();
    let mut document = page();
    let mut node = StoredNode::new(document.uuid(), "/about");

    run(&dispatcher, EventKind::Persist, &mut document, &mut node, Options::for_user(42)).unwrap();
    assert_eq!(node.property("i18n:en-creator"), Some(&PropertyValue::Integer(42)));
    assert_eq!(node.property("i18n:en-changer"), Some(&PropertyValue::Integer(42)));

    run(&dispatcher, EventKind::Persist, &mut document, &mut node, Options::for_user(7)).unwrap();
    assert_eq!(node.property("i18n:en-creator"), Some(&PropertyValue::Integer(42)));
    assert_eq!(node.property("i18n:en-changer"), Some(&PropertyValue::Integer(7)));
    assert_eq!(document.creator(), Some(42));
    assert_eq!(document.changer(), Some(7));
}

#[test]
fn hydrate_reads_blame_of_the_event_locale() {
    let dispatcher = dispatcher();
    let mut document = page();
    let mut node = StoredNode::new(document.uuid(), "/about");
    node.set_property("i18n:en-creator", PropertyValue::Integer(3));
    node.set_property("i18n:de-changer", PropertyValue::Integer(4));

    run(&dispatcher, EventKind::Hydrate, &mut document, &mut node, Options::new()).unwrap();

    assert_eq!(document.creator(), Some(3));
    assert_eq!(document.changer(), None);
}

#[test]
fn publish_stamps_the_last_recorded_changer() {
    let dispatcher = dispatcher();
    let mut document = page();
    let mut draft = StoredNode::new(document.uuid(), "/about");
    run(&dispatcher, EventKind::Persist, &mut document, &mut draft, Options::for_user(5)).unwrap();

    let mut live = StoredNode::new(document.uuid(), "/about");
    run(&dispatcher, EventKind::Publish, &mut document, &mut live, Options::for_user(99)).unwrap();

    assert_eq!(live.property("i18n:en-creator"), Some(&PropertyValue::Integer(5)));
    assert_eq!(live.property("i18n:en-changer"), Some(&PropertyValue::Integer(5)));
}

/// Records the changer visible on the node when it runs.
struct ChangerRecorder {
    seen: Mutex<Vec<Option<PropertyValue>>>,
}

impl Subscriber for ChangerRecorder {
    fn name(&self) -> &'static str {
        "changer_recorder"
    }

    fn subscriptions(&self) -> Vec<Subscription> {
        vec![Subscription::default_priority(EventKind::Restore)]
    }

    fn on_restore(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        let value = event
            .node()
            .get_property_value_with_default("i18n:en-changer", None);
        self.seen.lock().unwrap().push(value);
        Ok(())
    }
}

#[test]
fn restore_sets_changer_from_options_after_other_listeners() {
    let recorder = Arc::new(ChangerRecorder {
        seen: Mutex::new(Vec::new()),
    });
    let mut dispatcher = dispatcher();
    dispatcher.register(recorder.clone());

    let mut document = page();
    let mut node = StoredNode::new(document.uuid(), "/about");
    run(&dispatcher, EventKind::Persist, &mut document, &mut node, Options::for_user(42)).unwrap();

    run(&dispatcher, EventKind::Restore, &mut document, &mut node, Options::for_user(9)).unwrap();

    assert_eq!(
        recorder.seen.lock().unwrap().as_slice(),
        &[Some(PropertyValue::Integer(42))]
    );
    assert_eq!(node.property("i18n:en-changer"), Some(&PropertyValue::Integer(9)));
    // Restore bypasses the document accessor.
    assert_eq!(
        document.system_field(fields::CHANGER),
        Some(&PropertyValue::Integer(42))
    );
}

#[test]
fn persist_without_locale_reports_missing_locale_through_listener_error() {
    let dispatcher = dispatcher();
    let mut document = page();
    let mut node = StoredNode::new(document.uuid(), "/about");

    let mut event = DocumentEvent::persist(&mut document, &mut node, None, Options::for_user(1));
    let err = dispatcher.dispatch(&mut event).unwrap_err();

    match &err {
        DocumentManagerError::Listener {
            listener, event, ..
        } => {
            assert_eq!(*listener, "blame");
            assert_eq!(*event, EventKind::Persist);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(
        err.root_cause(),
        DocumentManagerError::MissingLocale { behavior: "blame", .. }
    ));
    assert!(!node.has_property("i18n:en-creator"));
}
