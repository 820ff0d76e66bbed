//! Use-case services over the event pipeline.
//!
//! # Responsibility
//! - Turn find/persist/publish/restore requests into dispatched events.
//! - Provide store-level maintenance commands such as locale copy.

pub mod document_manager;
pub mod locale_copy;

pub use document_manager::DocumentManager;
pub use locale_copy::{CopyOutcome, CopyReportEntry, LocaleCopier};
