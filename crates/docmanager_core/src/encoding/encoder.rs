//! Property encoder.
//!
//! # Responsibility
//! - Build physical property keys: `prefix:name`, `prefix:locale-name`, or
//!   the unprefixed `name` / `locale-name` forms when a role has no prefix.
//! - Recover (name, locale) from a raw key for a candidate role.
//!
//! # Invariants
//! - Localized roles always need a locale; a locale never contains `-` or
//!   `:`, so the first `-` after the prefix separates locale from name.
//! - Encoding never touches shared mutable state.

use crate::encoding::namespace::{EncodingRole, NamespaceRegistry};
use crate::error::{DocumentManagerError, DocumentResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static LOCALE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+(?:_[A-Za-z0-9]+)*$").expect("valid locale regex"));
static LOCALIZED_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<locale>[A-Za-z0-9]+(?:_[A-Za-z0-9]+)*)-(?P<name>.+)$")
        .expect("valid localized name regex")
});

/// Logical name and locale recovered from a physical key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedProperty {
    pub name: String,
    pub locale: Option<String>,
}

/// Encodes document property names into node property keys.
#[derive(Debug, Clone)]
pub struct PropertyEncoder {
    registry: Arc<NamespaceRegistry>,
}

impl PropertyEncoder {
    pub fn new(registry: Arc<NamespaceRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }

    /// Encodes `name` for `role`. `locale` is ignored by non-localized roles.
    ///
    /// # Errors
    /// - `InvalidLocale` when a localized role gets no locale or a locale
    ///   containing `-`, `:` or other non-alphanumeric characters.
    pub fn encode(
        &self,
        role: EncodingRole,
        name: &str,
        locale: Option<&str>,
    ) -> DocumentResult<String> {
        match role {
            EncodingRole::System => Ok(self.system_name(name)),
            EncodingRole::SystemLocalized => self.localized_system_name(name, locale),
            EncodingRole::Content => Ok(self.content_name(name)),
            EncodingRole::ContentLocalized => self.localized_content_name(name, locale),
        }
    }

    /// Same as `encode`, with the role given as its configuration string.
    ///
    /// # Errors
    /// - `InvalidEncoding` for anything but the four known role strings.
    pub fn encode_str(
        &self,
        encoding: &str,
        name: &str,
        locale: Option<&str>,
    ) -> DocumentResult<String> {
        self.encode(EncodingRole::parse(encoding)?, name, locale)
    }

    pub fn system_name(&self, name: &str) -> String {
        self.format_name(EncodingRole::System, name)
    }

    pub fn localized_system_name(&self, name: &str, locale: Option<&str>) -> DocumentResult<String> {
        let locale = validate_locale(locale)?;
        Ok(self.format_localized_name(EncodingRole::SystemLocalized, name, locale))
    }

    pub fn content_name(&self, name: &str) -> String {
        self.format_name(EncodingRole::Content, name)
    }

    pub fn localized_content_name(&self, name: &str, locale: Option<&str>) -> DocumentResult<String> {
        let locale = validate_locale(locale)?;
        Ok(self.format_localized_name(EncodingRole::ContentLocalized, name, locale))
    }

    /// Returns the logical name and locale if `key` has the shape `encode`
    /// produces for `role`.
    ///
    /// Unprefixed roles only match keys without any namespace separator, so
    /// an unprefixed non-localized role also matches unprefixed localized
    /// keys; callers enumerating such roles must disambiguate themselves.
    pub fn decode(&self, role: EncodingRole, key: &str) -> Option<DecodedProperty> {
        let local = self.strip_prefix(role, key)?;
        if local.is_empty() {
            return None;
        }

        if !role.is_localized() {
            return Some(DecodedProperty {
                name: local.to_string(),
                locale: None,
            });
        }

        let captures = LOCALIZED_NAME_RE.captures(local)?;
        Some(DecodedProperty {
            name: captures["name"].to_string(),
            locale: Some(captures["locale"].to_string()),
        })
    }

    /// Returns the logical name when `key` is a `role` key for `locale`.
    pub fn decode_for_locale(&self, role: EncodingRole, key: &str, locale: &str) -> Option<String> {
        let decoded = self.decode(role, key)?;
        match decoded.locale.as_deref() {
            Some(value) if value == locale => Some(decoded.name),
            _ => None,
        }
    }

    /// Role and logical name of `key` when it is a localized key of `locale`.
    ///
    /// A key matching both localized roles (shared prefix) is reported as
    /// `SystemLocalized`.
    pub fn decode_localized(&self, key: &str, locale: &str) -> Option<(EncodingRole, String)> {
        [EncodingRole::SystemLocalized, EncodingRole::ContentLocalized]
            .into_iter()
            .find_map(|role| Some((role, self.decode_for_locale(role, key, locale)?)))
    }

    fn strip_prefix<'k>(&self, role: EncodingRole, key: &'k str) -> Option<&'k str> {
        match self.registry.get_prefix(role) {
            Some(prefix) => key.strip_prefix(prefix)?.strip_prefix(':'),
            None if key.contains(':') => None,
            None => Some(key),
        }
    }

    fn format_name(&self, role: EncodingRole, name: &str) -> String {
        match self.registry.get_prefix(role) {
            Some(prefix) => format!("{prefix}:{name}"),
            None => name.to_string(),
        }
    }

    fn format_localized_name(&self, role: EncodingRole, name: &str, locale: &str) -> String {
        match self.registry.get_prefix(role) {
            Some(prefix) => format!("{prefix}:{locale}-{name}"),
            None => format!("{locale}-{name}"),
        }
    }
}

/// Accepts locales made of `_`-separated alphanumeric segments.
pub fn validate_locale(locale: Option<&str>) -> DocumentResult<&str> {
    match locale {
        Some(value) if LOCALE_RE.is_match(value) => Ok(value),
        Some(value) => Err(DocumentManagerError::InvalidLocale(Some(value.to_string()))),
        None => Err(DocumentManagerError::InvalidLocale(None)),
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodedProperty, PropertyEncoder};
    use crate::encoding::namespace::{EncodingRole, NamespaceRegistry};
    use crate::error::DocumentManagerError;
    use std::sync::Arc;

    fn encoder(registry: NamespaceRegistry) -> PropertyEncoder {
        PropertyEncoder::new(Arc::new(registry))
    }

    #[test]
    fn encodes_system_name_with_and_without_prefix() {
        let prefixed = encoder(NamespaceRegistry::empty().with_prefix(EncodingRole::System, "i18n"));
        assert_eq!(
            prefixed.encode(EncodingRole::System, "creator", None).unwrap(),
            "i18n:creator"
        );

        let bare = encoder(NamespaceRegistry::empty());
        assert_eq!(bare.encode(EncodingRole::System, "creator", None).unwrap(), "creator");
    }

    #[test]
    fn encodes_localized_system_name() {
        let bare = encoder(NamespaceRegistry::empty());
        assert_eq!(
            bare.encode(EncodingRole::SystemLocalized, "changer", Some("en")).unwrap(),
            "en-changer"
        );

        let prefixed = encoder(
            NamespaceRegistry::empty().with_prefix(EncodingRole::SystemLocalized, "i18n"),
        );
        assert_eq!(
            prefixed
                .encode(EncodingRole::SystemLocalized, "changer", Some("en"))
                .unwrap(),
            "i18n:en-changer"
        );
    }

    #[test]
    fn non_localized_roles_ignore_locale() {
        let encoder = encoder(NamespaceRegistry::with_defaults());
        assert_eq!(
            encoder.encode(EncodingRole::Content, "title", Some("de")).unwrap(),
            "title"
        );
        assert_eq!(
            encoder.encode(EncodingRole::System, "title", Some("de")).unwrap(),
            "sulu:title"
        );
    }

    #[test]
    fn localized_roles_reject_missing_or_malformed_locale() {
        let encoder = encoder(NamespaceRegistry::with_defaults());
        for role in [EncodingRole::SystemLocalized, EncodingRole::ContentLocalized] {
            let err = encoder.encode(role, "title", None).expect_err("null locale");
            assert!(matches!(err, DocumentManagerError::InvalidLocale(None)));
        }

        for locale in ["", "en-us", "en:us"] {
            let err = encoder
                .encode(EncodingRole::ContentLocalized, "title", Some(locale))
                .expect_err("malformed locale");
            assert!(matches!(err, DocumentManagerError::InvalidLocale(Some(_))));
        }
    }

    #[test]
    fn encode_str_rejects_unknown_encoding() {
        let encoder = encoder(NamespaceRegistry::with_defaults());
        let err = encoder
            .encode_str("extension_localized", "title", Some("en"))
            .expect_err("unknown encoding");
        assert!(matches!(err, DocumentManagerError::InvalidEncoding(_)));
        assert_eq!(
            encoder.encode_str("system_localized", "title", Some("en")).unwrap(),
            "i18n:en-title"
        );
    }

    #[test]
    fn decode_recovers_localized_name_with_dashes() {
        let encoder = encoder(NamespaceRegistry::with_defaults());
        let key = encoder
            .encode(EncodingRole::ContentLocalized, "article-teaser", Some("de_at"))
            .unwrap();

        assert_eq!(
            encoder.decode(EncodingRole::ContentLocalized, &key),
            Some(DecodedProperty {
                name: "article-teaser".to_string(),
                locale: Some("de_at".to_string()),
            })
        );
        assert_eq!(
            encoder.decode_for_locale(EncodingRole::ContentLocalized, &key, "de_at"),
            Some("article-teaser".to_string())
        );
        assert_eq!(
            encoder.decode_for_locale(EncodingRole::ContentLocalized, &key, "de"),
            None
        );
    }

    #[test]
    fn decode_rejects_keys_from_other_namespaces() {
        let encoder = encoder(NamespaceRegistry::with_defaults());
        assert_eq!(encoder.decode(EncodingRole::System, "i18n:en-title"), None);
        assert_eq!(encoder.decode(EncodingRole::Content, "sulu:creator"), None);
        assert_eq!(encoder.decode(EncodingRole::SystemLocalized, "i18n:"), None);
        assert_eq!(encoder.decode(EncodingRole::SystemLocalized, "i18n:title"), None);
        assert_eq!(
            encoder.decode(EncodingRole::Content, "title"),
            Some(DecodedProperty {
                name: "title".to_string(),
                locale: None,
            })
        );
    }
}
