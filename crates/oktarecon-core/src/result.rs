//! Result types produced by the reconciliation engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::record::Record;

/// Exit code when every identity matched.
pub const EXIT_NO_DISCREPANCIES: i32 = 0;

/// Exit code when at least one discrepancy was found.
pub const EXIT_DISCREPANCIES_FOUND: i32 = 1;

/// Classification of one identity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// Present in the source of truth, missing from Okta.
    OnlyInSource,
    /// Present in Okta, missing from the source of truth.
    OnlyInOkta,
    /// Present in both with equal compared attributes.
    Matched,
    /// Present in both with at least one differing attribute.
    Mismatched,
}

impl Classification {
    /// Every classification, in report order.
    #[must_use]
    pub fn all() -> &'static [Classification] {
        &[
            Classification::OnlyInSource,
            Classification::OnlyInOkta,
            Classification::Mismatched,
            Classification::Matched,
        ]
    }

    /// Get the string representation used in reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::OnlyInSource => "ONLY_IN_SOURCE",
            Classification::OnlyInOkta => "ONLY_IN_OKTA",
            Classification::Matched => "MATCHED",
            Classification::Mismatched => "MISMATCHED",
        }
    }

    /// Whether this classification is a discrepancy worth reporting.
    #[must_use]
    pub fn is_discrepancy(&self) -> bool {
        !matches!(self, Classification::Matched)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome for a single identity key.
///
/// Records are borrowed from the slices passed to
/// [`reconcile`](crate::reconcile), so results live no longer than the
/// adapter output they describe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonResult<'a> {
    /// Normalized identity key.
    pub identity_key: String,
    /// How the key was classified.
    pub classification: Classification,
    /// Fields whose values differ, in ascending order. Empty unless mismatched.
    pub differing_fields: Vec<String>,
    /// Source record, absent when the key is missing from the source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_record: Option<&'a Record>,
    /// Okta record, absent when the key is missing from Okta.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub okta_record: Option<&'a Record>,
}

impl<'a> ComparisonResult<'a> {
    /// Key present only in the source.
    pub fn only_in_source(identity_key: impl Into<String>, record: &'a Record) -> Self {
        Self {
            identity_key: identity_key.into(),
            classification: Classification::OnlyInSource,
            differing_fields: Vec::new(),
            source_record: Some(record),
            okta_record: None,
        }
    }

    /// Key present only in Okta.
    pub fn only_in_okta(identity_key: impl Into<String>, record: &'a Record) -> Self {
        Self {
            identity_key: identity_key.into(),
            classification: Classification::OnlyInOkta,
            differing_fields: Vec::new(),
            source_record: None,
            okta_record: Some(record),
        }
    }

    /// Key present on both sides. An empty `differing_fields` means matched.
    pub fn compared(
        identity_key: impl Into<String>,
        source: &'a Record,
        okta: &'a Record,
        differing_fields: Vec<String>,
    ) -> Self {
        let classification = if differing_fields.is_empty() {
            Classification::Matched
        } else {
            Classification::Mismatched
        };

        Self {
            identity_key: identity_key.into(),
            classification,
            differing_fields,
            source_record: Some(source),
            okta_record: Some(okta),
        }
    }

    /// Value of `field` on the source side, if any.
    #[must_use]
    pub fn source_value(&self, field: &str) -> Option<&'a str> {
        self.source_record.and_then(|r| r.attribute(field))
    }

    /// Value of `field` on the Okta side, if any.
    #[must_use]
    pub fn okta_value(&self, field: &str) -> Option<&'a str> {
        self.okta_record.and_then(|r| r.attribute(field))
    }
}

/// How often an attribute differed across mismatched identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMismatchCount {
    /// Attribute name.
    pub attribute: String,
    /// Number of mismatched identities where it differed.
    pub count: usize,
}

/// Helper function for serde skip_serializing_if
fn is_zero(value: &usize) -> bool {
    *value == 0
}

/// Aggregate counts over a set of comparison results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    /// Distinct identity keys seen.
    pub total: usize,
    /// Keys only in the source.
    pub only_in_source: usize,
    /// Keys only in Okta.
    pub only_in_okta: usize,
    /// Keys with equal compared attributes.
    pub matched: usize,
    /// Keys with differing attributes.
    pub mismatched: usize,
    /// Attributes ordered by how often they differed (most frequent first).
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub top_mismatched_attributes: Vec<AttributeMismatchCount>,
    /// Source records considered.
    #[serde(skip_serializing_if = "is_zero", default)]
    pub source_records: usize,
    /// Okta records considered.
    #[serde(skip_serializing_if = "is_zero", default)]
    pub okta_records: usize,
}

impl ReconciliationSummary {
    /// Build a summary from engine output.
    #[must_use]
    pub fn from_results(results: &[ComparisonResult<'_>]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        let mut by_attribute: BTreeMap<&str, usize> = BTreeMap::new();

        for result in results {
            match result.classification {
                Classification::OnlyInSource => summary.only_in_source += 1,
                Classification::OnlyInOkta => summary.only_in_okta += 1,
                Classification::Matched => summary.matched += 1,
                Classification::Mismatched => summary.mismatched += 1,
            }
            if result.source_record.is_some() {
                summary.source_records += 1;
            }
            if result.okta_record.is_some() {
                summary.okta_records += 1;
            }
            for field in &result.differing_fields {
                *by_attribute.entry(field.as_str()).or_insert(0) += 1;
            }
        }

        let mut top: Vec<AttributeMismatchCount> = by_attribute
            .into_iter()
            .map(|(attribute, count)| AttributeMismatchCount {
                attribute: attribute.to_string(),
                count,
            })
            .collect();
        // BTreeMap gave us name order; a stable sort keeps it for equal counts.
        top.sort_by(|a, b| b.count.cmp(&a.count));
        summary.top_mismatched_attributes = top;

        summary
    }

    /// Count for a single classification.
    #[must_use]
    pub fn count(&self, classification: Classification) -> usize {
        match classification {
            Classification::OnlyInSource => self.only_in_source,
            Classification::OnlyInOkta => self.only_in_okta,
            Classification::Matched => self.matched,
            Classification::Mismatched => self.mismatched,
        }
    }

    /// Number of keys that are not matched.
    #[must_use]
    pub fn discrepancies(&self) -> usize {
        self.only_in_source + self.only_in_okta + self.mismatched
    }

    /// Returns true if anything other than a match was found.
    #[must_use]
    pub fn has_discrepancies(&self) -> bool {
        self.discrepancies() > 0
    }

    /// Returns the appropriate exit code based on discrepancies.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.has_discrepancies() {
            EXIT_DISCREPANCIES_FOUND
        } else {
            EXIT_NO_DISCREPANCIES
        }
    }
}
