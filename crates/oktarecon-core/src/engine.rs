//! Reconciliation engine.
//!
//! Matches source and Okta records by normalized identity key and classifies
//! every key seen on either side. The engine performs no I/O; its only
//! failures are data-integrity errors in its inputs.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::config::ReconcileConfig;
use crate::error::{ReconcileError, ReconcileResult};
use crate::record::{Origin, Record};
use crate::result::ComparisonResult;

/// Compare source records against Okta records.
///
/// Every distinct normalized identity key from either input appears exactly
/// once in the output, in ascending lexicographic key order. Output does not
/// depend on input order.
///
/// # Errors
///
/// - [`ReconcileError::DuplicateKey`] if a normalized key repeats within one input.
/// - [`ReconcileError::InvalidRecord`] if a key is empty after normalization,
///   or a record sits in the slice of the other origin.
pub fn reconcile<'a>(
    source: &'a [Record],
    okta: &'a [Record],
    config: &ReconcileConfig,
) -> ReconcileResult<Vec<ComparisonResult<'a>>> {
    let source_index = build_index(source, Origin::Source, config)?;
    let okta_index = build_index(okta, Origin::Okta, config)?;

    let keys: BTreeSet<&str> = source_index
        .keys()
        .chain(okta_index.keys())
        .map(String::as_str)
        .collect();

    let mut results = Vec::with_capacity(keys.len());
    for key in keys {
        let result = match (source_index.get(key).copied(), okta_index.get(key).copied()) {
            (Some(source_record), Some(okta_record)) => {
                let differing = compare_attributes(source_record, okta_record, config);
                ComparisonResult::compared(key, source_record, okta_record, differing)
            }
            (Some(source_record), None) => ComparisonResult::only_in_source(key, source_record),
            (None, Some(okta_record)) => ComparisonResult::only_in_okta(key, okta_record),
            // Keys come from the union of both indices.
            (None, None) => continue,
        };
        results.push(result);
    }

    debug!(
        source_records = source.len(),
        okta_records = okta.len(),
        identities = results.len(),
        "Reconciliation completed"
    );

    Ok(results)
}

/// Index records by normalized key, rejecting duplicates and malformed records.
fn build_index<'a>(
    records: &'a [Record],
    origin: Origin,
    config: &ReconcileConfig,
) -> ReconcileResult<BTreeMap<String, &'a Record>> {
    let mut index = BTreeMap::new();

    for (position, record) in records.iter().enumerate() {
        if record.origin != origin {
            return Err(ReconcileError::InvalidRecord {
                origin,
                index: position,
                reason: format!("record has origin {} but was supplied as {origin}", record.origin),
            });
        }

        let key = config.key_normalization.normalize(&record.identity_key);
        if key.is_empty() {
            return Err(ReconcileError::InvalidRecord {
                origin,
                index: position,
                reason: "empty identity key".to_string(),
            });
        }

        if index.contains_key(&key) {
            return Err(ReconcileError::DuplicateKey { origin, key });
        }
        index.insert(key, record);
    }

    Ok(index)
}

/// Return the compared fields whose values differ, in ascending order.
///
/// A field present on one side only counts as a difference; a field absent
/// on both sides does not.
fn compare_attributes(source: &Record, okta: &Record, config: &ReconcileConfig) -> Vec<String> {
    let fields: BTreeSet<&str> = match &config.compared_fields {
        Some(fields) => fields.iter().map(String::as_str).collect(),
        None => source
            .attributes
            .keys()
            .chain(okta.attributes.keys())
            .map(String::as_str)
            .collect(),
    };

    fields
        .into_iter()
        .filter(|field| match (source.attribute(field), okta.attribute(field)) {
            (Some(left), Some(right)) => !config.values_equal(left, right),
            (None, None) => false,
            _ => true,
        })
        .map(String::from)
        .collect()
}
