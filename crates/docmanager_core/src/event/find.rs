//! Find event.

use crate::error::{DocumentManagerError, DocumentResult};
use crate::event::options::Options;
use crate::model::document::Document;

/// Request to materialize a document by identifier (UUID or path) and locale.
#[derive(Debug)]
pub struct FindEvent {
    identifier: String,
    locale: Option<String>,
    options: Options,
    document: Option<Document>,
}

impl FindEvent {
    pub fn new(identifier: impl Into<String>, locale: Option<String>, options: Options) -> Self {
        Self {
            identifier: identifier.into(),
            locale,
            options,
            document: None,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    /// # Errors
    /// - `DocumentNotSet` while no listener has assigned a document.
    pub fn document(&self) -> DocumentResult<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| DocumentManagerError::DocumentNotSet {
                identifier: self.identifier.clone(),
            })
    }

    pub fn set_document(&mut self, document: Document) {
        self.document = Some(document);
    }

    /// Consumes the event and hands the document to the caller.
    ///
    /// # Errors
    /// - `DocumentNotSet` while no listener has assigned a document.
    pub fn into_document(self) -> DocumentResult<Document> {
        let identifier = self.identifier;
        self.document
            .ok_or(DocumentManagerError::DocumentNotSet { identifier })
    }

    /// Short trace line for logs.
    pub fn debug_message(&self) -> String {
        format!(
            "i:{} d:{} l:{}",
            self.identifier,
            self.document
                .as_ref()
                .map(|document| document.uuid().to_string())
                .unwrap_or_else(|| "<no document>".to_string()),
            self.locale.as_deref().unwrap_or("<no locale>")
        )
    }
}
