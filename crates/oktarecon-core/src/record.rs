//! Normalized user record shared by the source and Okta adapters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// System a record was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Origin {
    /// The source of truth (HR export, database dump, ...).
    Source,
    /// The Okta user directory.
    Okta,
}

impl Origin {
    /// Get the string representation used in reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Source => "SOURCE",
            Origin::Okta => "OKTA",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One user as known to a given origin.
///
/// Attributes are kept in a `BTreeMap` so that iteration order, and therefore
/// every report derived from a record, is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Join key (email, login, employee id, ...).
    pub identity_key: String,
    /// Which system produced this record.
    pub origin: Origin,
    /// Field name to value.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Record {
    /// Create a record with no attributes.
    pub fn new(identity_key: impl Into<String>, origin: Origin) -> Self {
        Self {
            identity_key: identity_key.into(),
            origin,
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute, replacing any previous value for the same field.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set an attribute in place.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Look up an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}
