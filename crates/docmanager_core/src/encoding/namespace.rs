//! Encoding roles and their namespace prefixes.

use crate::error::DocumentManagerError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Role string for shared system properties.
pub const ROLE_SYSTEM: &str = "system";
/// Role string for per-locale system properties.
pub const ROLE_SYSTEM_LOCALIZED: &str = "system_localized";
/// Role string for shared content properties.
pub const ROLE_CONTENT: &str = "content";
/// Role string for per-locale content properties.
pub const ROLE_CONTENT_LOCALIZED: &str = "content_localized";

/// Classification of a property as namespace- and/or locale-qualified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingRole {
    System,
    SystemLocalized,
    Content,
    ContentLocalized,
}

impl EncodingRole {
    pub const ALL: [EncodingRole; 4] = [
        Self::System,
        Self::SystemLocalized,
        Self::Content,
        Self::ContentLocalized,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => ROLE_SYSTEM,
            Self::SystemLocalized => ROLE_SYSTEM_LOCALIZED,
            Self::Content => ROLE_CONTENT,
            Self::ContentLocalized => ROLE_CONTENT_LOCALIZED,
        }
    }

    /// Parses a role string; anything but the four known roles is rejected.
    pub fn parse(value: &str) -> Result<Self, DocumentManagerError> {
        match value {
            ROLE_SYSTEM => Ok(Self::System),
            ROLE_SYSTEM_LOCALIZED => Ok(Self::SystemLocalized),
            ROLE_CONTENT => Ok(Self::Content),
            ROLE_CONTENT_LOCALIZED => Ok(Self::ContentLocalized),
            other => Err(DocumentManagerError::InvalidEncoding(other.to_string())),
        }
    }

    pub fn is_localized(self) -> bool {
        matches!(self, Self::SystemLocalized | Self::ContentLocalized)
    }
}

impl Display for EncodingRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only role-to-prefix table.
///
/// A role without a prefix (or with an empty one) encodes to unprefixed keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceRegistry {
    prefixes: BTreeMap<EncodingRole, String>,
}

impl NamespaceRegistry {
    /// Registry with no prefixes at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// CMS defaults: `sulu` for system, `i18n` for both localized roles and no
    /// prefix for shared content.
    pub fn with_defaults() -> Self {
        Self::empty()
            .with_prefix(EncodingRole::System, "sulu")
            .with_prefix(EncodingRole::SystemLocalized, "i18n")
            .with_prefix(EncodingRole::ContentLocalized, "i18n")
    }

    /// Applies role-string overrides, e.g. from loaded configuration.
    ///
    /// Roles not named keep their prefix; `None` makes a role unprefixed.
    pub fn with_overrides(
        self,
        overrides: &BTreeMap<String, Option<String>>,
    ) -> Result<Self, DocumentManagerError> {
        let mut registry = self;
        for (role, prefix) in overrides {
            let role = EncodingRole::parse(role)?;
            registry = registry.with_prefix(role, prefix.clone().unwrap_or_default());
        }
        Ok(registry)
    }

    pub fn with_prefix(mut self, role: EncodingRole, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if prefix.trim().is_empty() {
            self.prefixes.remove(&role);
        } else {
            self.prefixes.insert(role, prefix.trim().to_string());
        }
        self
    }

    /// Returns the prefix for `role`, or `None` when keys stay unprefixed.
    pub fn get_prefix(&self, role: EncodingRole) -> Option<&str> {
        self.prefixes.get(&role).map(String::as_str)
    }
}
