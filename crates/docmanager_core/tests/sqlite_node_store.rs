use docmanager_core::db::migrations::latest_version;
use docmanager_core::db::{open_db, open_db_in_memory, DbError};
use docmanager_core::node::ROOT_IDENTIFIER;
use docmanager_core::{NodeStore, PropertyValue, SqliteNodeStore, StoreError};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn migrated_database_contains_root_node() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(schema_version(&conn), latest_version());

    let mut store = SqliteNodeStore::try_new(&conn).unwrap();
    let root = store.node_by_path("/").unwrap().unwrap();
    assert_eq!(root.identifier(), ROOT_IDENTIFIER);
    assert!(root.property_keys().is_empty());
}

#[test]
fn unmigrated_connection_is_rejected() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteNodeStore::try_new(&conn).err().unwrap();
    match err {
        StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        } => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn saved_nodes_and_typed_properties_survive_a_new_session() {
    let conn = open_db_in_memory().unwrap();
    let id = Uuid::new_v4();
    {
        let mut store = SqliteNodeStore::try_new(&conn).unwrap();
        store.create_node("/cmf", Uuid::new_v4()).unwrap();
        let node = store.create_node("/cmf/home", id).unwrap();
        node.set_property("sulu:alias", PropertyValue::from("page"));
        node.set_property("i18n:en-creator", PropertyValue::Integer(42));
        node.set_property("i18n:en-rating", PropertyValue::Float(4.5));
        node.set_property("i18n:en-hidden", PropertyValue::Boolean(true));
        assert!(store.has_pending_changes());
        store.save().unwrap();
        assert!(!store.has_pending_changes());
    }

    let mut store = SqliteNodeStore::try_new(&conn).unwrap();
    let node = store.node_by_identifier(id).unwrap().unwrap();
    assert_eq!(node.path(), "/cmf/home");
    assert_eq!(node.property("sulu:alias"), Some(&PropertyValue::from("page")));
    assert_eq!(node.property("i18n:en-creator"), Some(&PropertyValue::Integer(42)));
    assert_eq!(node.property("i18n:en-rating"), Some(&PropertyValue::Float(4.5)));
    assert_eq!(node.property("i18n:en-hidden"), Some(&PropertyValue::Boolean(true)));
    assert_eq!(store.child_paths("/cmf").unwrap(), vec!["/cmf/home".to_string()]);
}

#[test]
fn removed_properties_are_deleted_on_save() {
    let conn = open_db_in_memory().unwrap();
    let id = Uuid::new_v4();
    {
        let mut store = SqliteNodeStore::try_new(&conn).unwrap();
        let node = store.create_node("/page", id).unwrap();
        node.set_property("i18n:en-title", PropertyValue::from("Old"));
        node.set_property("i18n:en-teaser", PropertyValue::from("Gone soon"));
        store.save().unwrap();
    }
    {
        let mut store = SqliteNodeStore::try_new(&conn).unwrap();
        let node = store.node_by_path("/page").unwrap().unwrap();
        node.remove_property("i18n:en-teaser");
        node.set_property("i18n:en-title", PropertyValue::from("New"));
        store.save().unwrap();
    }

    let mut store = SqliteNodeStore::try_new(&conn).unwrap();
    let node = store.node_by_identifier(id).unwrap().unwrap();
    assert_eq!(node.property_keys(), vec!["i18n:en-title".to_string()]);
    assert_eq!(node.property("i18n:en-title"), Some(&PropertyValue::from("New")));
}

#[test]
fn discarded_session_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteNodeStore::try_new(&conn).unwrap();
    store.create_node("/draft", Uuid::new_v4()).unwrap();
    store.discard();
    store.save().unwrap();

    let mut store = SqliteNodeStore::try_new(&conn).unwrap();
    assert!(store.node_by_path("/draft").unwrap().is_none());
}

#[test]
fn create_rejects_missing_parent_and_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteNodeStore::try_new(&conn).unwrap();
    let id = Uuid::new_v4();

    let err = store.create_node("/a/b", Uuid::new_v4()).err().unwrap();
    assert!(matches!(err, StoreError::ParentNotFound(path) if path == "/a/b"));

    store.create_node("/a", id).unwrap();
    let err = store.create_node("/a", Uuid::new_v4()).err().unwrap();
    assert!(matches!(err, StoreError::PathExists(_)));
    let err = store.create_node("/other", id).err().unwrap();
    assert!(matches!(err, StoreError::IdentifierExists(existing) if existing == id));
}

#[test]
fn file_database_keeps_nodes_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("documents.db");
    let id = Uuid::new_v4();
    {
        let conn = open_db(&path).unwrap();
        let mut store = SqliteNodeStore::try_new(&conn).unwrap();
        store
            .create_node("/snippet", id)
            .unwrap()
            .set_property("sulu:alias", PropertyValue::from("snippet"));
        store.save().unwrap();
    }

    let conn = open_db(&path).unwrap();
    let mut store = SqliteNodeStore::try_new(&conn).unwrap();
    let node = store.node_by_path("/snippet").unwrap().unwrap();
    assert_eq!(node.identifier(), id);
    assert_eq!(store.child_paths("/").unwrap(), vec!["/snippet".to_string()]);
}

#[test]
fn database_from_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 42;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 42);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}
