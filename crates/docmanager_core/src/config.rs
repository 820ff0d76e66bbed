//! Document manager configuration.
//!
//! # Responsibility
//! - Load the default locale and namespace prefixes from JSON.
//! - Build the shared `NamespaceRegistry` the encoders read from.
//!
//! # Invariants
//! - Roles missing from `namespaces` keep their CMS default prefix; an
//!   explicit `null` makes the role unprefixed.
//! - A loaded config always has a valid default locale and known roles.

use crate::encoding::encoder::validate_locale;
use crate::encoding::namespace::NamespaceRegistry;
use crate::error::DocumentManagerError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_LOCALE: &str = "en";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(DocumentManagerError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "malformed config: {err}"),
            Self::Invalid(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<DocumentManagerError> for ConfigError {
    fn from(value: DocumentManagerError) -> Self {
        Self::Invalid(value)
    }
}

/// Settings shared by every encoder and subscriber of one manager.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentManagerConfig {
    #[serde(default = "default_locale")]
    pub default_locale: String,
    /// Role string to prefix overrides.
    #[serde(default)]
    pub namespaces: BTreeMap<String, Option<String>>,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

impl Default for DocumentManagerConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            namespaces: BTreeMap::new(),
        }
    }
}

impl DocumentManagerConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// CMS defaults overlaid with the configured prefixes.
    pub fn namespace_registry(&self) -> Result<NamespaceRegistry, DocumentManagerError> {
        NamespaceRegistry::with_defaults().with_overrides(&self.namespaces)
    }

    fn validate(&self) -> Result<(), DocumentManagerError> {
        validate_locale(Some(&self.default_locale))?;
        self.namespace_registry().map(|_| ())
    }
}
