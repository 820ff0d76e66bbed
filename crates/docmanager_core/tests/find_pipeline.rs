use docmanager_core::{
    BlameSubscriber, ContentSubscriber, DocumentLoaderSubscriber, DocumentManagerError,
    EventDispatcher, EventKind, FindEvent, MemoryNodeStore, MetadataRegistry, NamespaceRegistry,
    NodeStore, Options, PropertyEncoder, PropertyValue,
};
use std::sync::Arc;
use uuid::Uuid;

fn encoder() -> PropertyEncoder {
    PropertyEncoder::new(Arc::new(NamespaceRegistry::with_defaults()))
}

fn full_dispatcher() -> EventDispatcher {
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(Arc::new(BlameSubscriber::new(encoder())));
    dispatcher.register(Arc::new(ContentSubscriber::new(encoder())));
    dispatcher.register(Arc::new(DocumentLoaderSubscriber::new(
        Arc::new(MetadataRegistry::with_defaults()),
        encoder(),
        "en",
    )));
    dispatcher
}

fn store_with_page() -> (MemoryNodeStore, Uuid) {
    let mut store = MemoryNodeStore::new();
    store.ensure_path("/cmf/pages").unwrap();
    let id = Uuid::new_v4();
    let node = store.create_node("/cmf/pages/about", id).unwrap();
    node.set_property("sulu:alias", PropertyValue::from("page"));
    node.set_property("i18n:de-title", PropertyValue::from("Über uns"));
    node.set_property("i18n:de-creator", PropertyValue::Integer(11));
    node.set_property("i18n:en-title", PropertyValue::from("About"));
    (store, id)
}

#[test]
fn find_without_listeners_leaves_document_unset() {
    let dispatcher = EventDispatcher::new();
    let (mut store, id) = store_with_page();

    let mut event = FindEvent::new(id.to_string(), Some("de".to_string()), Options::new());
    dispatcher.dispatch_find(&mut event, &mut store).unwrap();

    let err = event.document().unwrap_err();
    assert!(matches!(err, DocumentManagerError::DocumentNotSet { identifier } if identifier == id.to_string()));
}

#[test]
fn loader_runs_first_and_hydrates_through_the_pipeline() {
    let dispatcher = full_dispatcher();
    let find_listeners = dispatcher.listeners(EventKind::Find);
    assert_eq!(find_listeners[0].name, "document_loader");

    let (mut store, id) = store_with_page();
    let mut event = FindEvent::new("/cmf/pages/about", Some("de".to_string()), Options::new());
    dispatcher.dispatch_find(&mut event, &mut store).unwrap();
    let document = event.into_document().unwrap();

    assert_eq!(document.uuid(), id);
    assert_eq!(document.locale(), Some("de"));
    assert_eq!(document.title(), Some("Über uns"));
    assert_eq!(document.creator(), Some(11));
    assert!(document.content().is_empty());
}

#[test]
fn plain_structure_nodes_are_not_documents() {
    let dispatcher = full_dispatcher();
    let (mut store, _) = store_with_page();

    let mut event = FindEvent::new("/cmf/pages", None, Options::new());
    let err = dispatcher.dispatch_find(&mut event, &mut store).unwrap_err();

    assert!(matches!(
        err.root_cause(),
        DocumentManagerError::DocumentNotFound(path) if path == "/cmf/pages"
    ));
    assert!(!event.has_document());
}
