//! Pipeline events.
//!
//! # Responsibility
//! - Carry identifier, locale, document, node and options through dispatch.
//! - Give listeners a narrow mutation surface on documents (`DocumentAccessor`).
//!
//! # Invariants
//! - A find event yields a document only after a listener assigned one.
//! - Document events always hold a document, a node and options from
//!   construction on; options are never mutated after construction.

use std::fmt::{Display, Formatter};

pub mod accessor;
pub mod document_event;
pub mod find;
pub mod options;

pub use accessor::DocumentAccessor;
pub use document_event::{DocumentEvent, HydrateEvent, PersistEvent, PublishEvent, RestoreEvent};
pub use find::FindEvent;
pub use options::{Options, OPTION_USER};

/// Event kinds listeners subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    Find,
    Hydrate,
    Persist,
    Publish,
    Restore,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Find => "find",
            Self::Hydrate => "hydrate",
            Self::Persist => "persist",
            Self::Publish => "publish",
            Self::Restore => "restore",
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
