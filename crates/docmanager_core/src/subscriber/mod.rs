//! Built-in pipeline subscribers.
//!
//! # Responsibility
//! - Materialize documents on find and hydrate/persist cross-cutting fields.
//! - Keep each concern (blame, timestamps, workflow, content) in one
//!   subscriber that no-ops on documents without the capability.
//!
//! # Invariants
//! - A subscriber never touches node or accessor for unsupported documents.
//! - Localized behaviors fail with `MissingLocale` instead of skipping.

use crate::encoding::encoder::PropertyEncoder;
use crate::encoding::namespace::EncodingRole;
use crate::error::{DocumentManagerError, DocumentResult};
use crate::event::DocumentEvent;
use crate::model::metadata::BehaviorScope;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod blame;
pub mod content;
pub mod loader;
pub mod timestamp;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;

pub use blame::BlameSubscriber;
pub use content::ContentSubscriber;
pub use loader::DocumentLoaderSubscriber;
pub use timestamp::{Clock, TimestampSubscriber};
pub use workflow::{WorkflowStage, WorkflowStageSubscriber};

/// Priority of restore listeners that must see fields other restore
/// listeners already normalized.
pub const LATE_RESTORE_PRIORITY: i32 = -32;

/// System encoding role for a behavior scope.
pub(crate) fn system_role(scope: BehaviorScope) -> EncodingRole {
    match scope {
        BehaviorScope::Localized => EncodingRole::SystemLocalized,
        BehaviorScope::Shared => EncodingRole::System,
    }
}

/// Encodes `name` for the document of `event`, failing explicitly when a
/// localized role meets an event without locale.
pub(crate) fn encode_for_event(
    encoder: &PropertyEncoder,
    event: &DocumentEvent<'_>,
    role: EncodingRole,
    name: &str,
    behavior: &'static str,
) -> DocumentResult<String> {
    if role.is_localized() && event.locale().is_none() {
        return Err(DocumentManagerError::MissingLocale {
            identifier: event.document().uuid(),
            behavior,
        });
    }
    encoder.encode(role, name, event.locale())
}

/// Current wall clock in Unix epoch milliseconds.
pub fn system_clock_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}
