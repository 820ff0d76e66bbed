//! Immutable option bag attached to events.

use crate::model::value::{PropertyValue, UserId};
use std::collections::BTreeMap;

/// Option key holding the acting user id.
pub const OPTION_USER: &str = "user";

/// Read-only key/value configuration passed to listeners.
///
/// Built before event construction; listeners only ever get `&Options`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    values: BTreeMap<String, PropertyValue>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options carrying only the acting user.
    pub fn for_user(user: UserId) -> Self {
        Self::new().with(OPTION_USER, user)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.values.get(key)
    }

    /// Acting user id from the `user` option, if it is an integer.
    pub fn user(&self) -> Option<UserId> {
        self.get(OPTION_USER).and_then(PropertyValue::as_integer)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
