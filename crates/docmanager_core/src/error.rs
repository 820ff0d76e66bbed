//! Pipeline-level error taxonomy.
//!
//! # Invariants
//! - Listener failures are wrapped once per dispatch level and keep the
//!   original error reachable through `source()` and `root_cause()`.
//! - Store failures are carried unchanged inside `Store`.

use crate::event::EventKind;
use crate::model::document::DocumentId;
use crate::node::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DocumentResult<T> = Result<T, DocumentManagerError>;

#[derive(Debug)]
pub enum DocumentManagerError {
    /// Encoding role string is not one of the four known roles.
    InvalidEncoding(String),
    /// Localized encoding requested without a usable locale.
    InvalidLocale(Option<String>),
    /// `FindEvent::document()` called before any listener assigned one.
    DocumentNotSet { identifier: String },
    /// A document whose behavior requires a locale was processed without one.
    MissingLocale {
        identifier: DocumentId,
        behavior: &'static str,
    },
    /// No node exists for the requested identifier or path.
    DocumentNotFound(String),
    /// Node carries an alias with no registered metadata.
    UnknownAlias(String),
    /// Content field name is empty or collides with a title or system property key.
    ReservedPropertyName(String),
    /// A document without a path cannot be persisted for the first time.
    MissingPath(DocumentId),
    /// A listener failed; remaining listeners for the event were skipped.
    Listener {
        listener: &'static str,
        event: EventKind,
        source: Box<DocumentManagerError>,
    },
    Store(StoreError),
}

impl DocumentManagerError {
    /// Returns the innermost error below any listener wrapping.
    pub fn root_cause(&self) -> &DocumentManagerError {
        let mut current = self;
        while let Self::Listener { source, .. } = current {
            current = source.as_ref();
        }
        current
    }
}

impl Display for DocumentManagerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEncoding(value) => write!(f, "invalid encoding `{value}`"),
            Self::InvalidLocale(Some(value)) => write!(f, "invalid locale `{value}`"),
            Self::InvalidLocale(None) => write!(f, "invalid locale: no locale given"),
            Self::DocumentNotSet { identifier } => write!(
                f,
                "no document has been set for the find event for `{identifier}`; a listener should have done this"
            ),
            Self::MissingLocale {
                identifier,
                behavior,
            } => write!(
                f,
                "document {identifier} requires a locale for {behavior} properties"
            ),
            Self::DocumentNotFound(identifier) => write!(f, "document not found: {identifier}"),
            Self::UnknownAlias(alias) => write!(f, "no metadata registered for alias `{alias}`"),
            Self::ReservedPropertyName(name) => {
                write!(f, "content property name `{name}` is empty or reserved")
            }
            Self::MissingPath(id) => write!(f, "document {id} has no path to create its node at"),
            Self::Listener {
                listener,
                event,
                source,
            } => write!(f, "listener `{listener}` failed on {event}: {source}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DocumentManagerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Listener { source, .. } => Some(source.as_ref()),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for DocumentManagerError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
