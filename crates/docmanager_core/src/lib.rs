//! Document manager core: property encoding, the event pipeline and its
//! subscribers, node stores and the services built on them.

pub mod config;
pub mod db;
pub mod dispatch;
pub mod encoding;
pub mod error;
pub mod event;
pub mod logging;
pub mod model;
pub mod node;
pub mod repo;
pub mod service;
pub mod subscriber;

pub use config::{ConfigError, DocumentManagerConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use dispatch::{EventDispatcher, FindContext, ListenerInfo, Subscriber, Subscription};
pub use encoding::encoder::{DecodedProperty, PropertyEncoder};
pub use encoding::namespace::{EncodingRole, NamespaceRegistry};
pub use error::{DocumentManagerError, DocumentResult};
pub use event::{DocumentAccessor, DocumentEvent, EventKind, FindEvent, Options};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::document::{Document, DocumentId};
pub use model::metadata::{BehaviorScope, Behaviors, DocumentMetadata, MetadataRegistry};
pub use model::value::{PropertyValue, UserId};
pub use node::{MemoryNodeStore, Node, NodeId, NodeStore, StoreError, StoreResult, StoredNode};
pub use repo::sqlite_node_store::SqliteNodeStore;
pub use service::{CopyOutcome, CopyReportEntry, DocumentManager, LocaleCopier};
pub use subscriber::{
    BlameSubscriber, ContentSubscriber, DocumentLoaderSubscriber, TimestampSubscriber,
    WorkflowStageSubscriber,
};

/// Liveness check for embedders.
pub fn ping() -> &'static str {
    "pong"
}

pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
