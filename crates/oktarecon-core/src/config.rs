//! Reconciliation options.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How identity keys are normalized before matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyNormalization {
    /// Trim surrounding whitespace only.
    Exact,
    /// Trim and lowercase. Email addresses are case-insensitive in practice.
    #[default]
    CaseInsensitive,
}

impl KeyNormalization {
    /// Normalize a raw identity key.
    #[must_use]
    pub fn normalize(&self, key: &str) -> String {
        let trimmed = key.trim();
        match self {
            KeyNormalization::Exact => trimmed.to_string(),
            KeyNormalization::CaseInsensitive => trimmed.to_lowercase(),
        }
    }
}

/// Configuration for [`reconcile`](crate::reconcile).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Attributes to compare. `None` compares every attribute present on
    /// either record of a pair.
    #[serde(default)]
    pub compared_fields: Option<BTreeSet<String>>,
    /// Identity key normalization policy.
    #[serde(default)]
    pub key_normalization: KeyNormalization,
    /// Compare attribute values case-insensitively (after trimming).
    #[serde(default)]
    pub ignore_value_case: bool,
}

impl ReconcileConfig {
    /// Restrict the comparison to the given fields.
    #[must_use]
    pub fn with_compared_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compared_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Set the key normalization policy.
    #[must_use]
    pub fn with_key_normalization(mut self, normalization: KeyNormalization) -> Self {
        self.key_normalization = normalization;
        self
    }

    /// Compare values ignoring case.
    #[must_use]
    pub fn with_ignore_value_case(mut self, ignore: bool) -> Self {
        self.ignore_value_case = ignore;
        self
    }

    /// Whether two attribute values are considered equal under this config.
    #[must_use]
    pub fn values_equal(&self, left: &str, right: &str) -> bool {
        if self.ignore_value_case {
            left.trim().to_lowercase() == right.trim().to_lowercase()
        } else {
            left == right
        }
    }
}
