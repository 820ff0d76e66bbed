//! Pipeline-only write access to document system fields.

use crate::model::document::Document;
use crate::model::value::PropertyValue;

/// Writes fields the document type does not expose setters for.
pub struct DocumentAccessor<'a> {
    document: &'a mut Document,
}

impl<'a> DocumentAccessor<'a> {
    pub fn new(document: &'a mut Document) -> Self {
        Self { document }
    }

    /// Sets `field` to `value`; `None` clears the field.
    pub fn set(&mut self, field: &str, value: Option<PropertyValue>) {
        self.document.set_system_field(field, value);
    }
}
