//! CSV source exports.
//!
//! The header row names the columns. Each data row becomes one record:
//! the identity column supplies the key, mapped columns become attributes.
//! Values are trimmed and empty cells are treated as absent attributes.

use std::io::Read;

use oktarecon_core::{Origin, Record};
use tracing::debug;

use crate::config::SourceConfig;
use crate::error::{SourceError, SourceResult};

/// Parse CSV content into source records.
///
/// # Errors
///
/// - `MissingColumn` if the identity column or a mapped column is absent
/// - `InvalidRow` if a row has no identity value
/// - `Csv` for malformed input (ragged rows, bad quoting, invalid UTF-8)
pub fn parse_csv<R: Read>(reader: R, config: &SourceConfig) -> SourceResult<Vec<Record>> {
    let mut rdr = ::csv::ReaderBuilder::new()
        .delimiter(config.delimiter_byte()?)
        .trim(::csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut missing = Vec::new();

    let identity_idx = find_column(&headers, &config.identity_field);
    if identity_idx.is_none() {
        missing.push(config.identity_field.clone());
    }

    let columns: Vec<(String, usize)> = if config.fields.is_empty() {
        headers
            .iter()
            .enumerate()
            .filter(|(idx, name)| Some(*idx) != identity_idx && !name.is_empty())
            .map(|(idx, name)| (name.to_string(), idx))
            .collect()
    } else {
        let mut mapped = Vec::with_capacity(config.fields.len());
        for (attribute, column) in &config.fields {
            match find_column(&headers, column) {
                Some(idx) => mapped.push((attribute.clone(), idx)),
                None => missing.push(column.clone()),
            }
        }
        mapped
    };

    let identity_idx = match identity_idx {
        Some(idx) if missing.is_empty() => idx,
        _ => return Err(SourceError::MissingColumn { columns: missing }),
    };

    let mut records = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let row = result?;
        // +1 for 0-index, +1 for header
        let line = row
            .position()
            .and_then(|p| usize::try_from(p.line()).ok())
            .unwrap_or(idx + 2);

        let key = row.get(identity_idx).unwrap_or_default();
        if key.is_empty() {
            return Err(SourceError::InvalidRow {
                row: line,
                message: format!(
                    "missing identity value in column '{}'",
                    config.identity_field
                ),
            });
        }

        let mut record = Record::new(key, Origin::Source);
        for (attribute, col) in &columns {
            match row.get(*col) {
                Some(value) if !value.is_empty() => record.set_attribute(attribute, value),
                _ => {}
            }
        }
        records.push(record);
    }

    debug!(
        rows = records.len(),
        attributes = columns.len(),
        "Parsed CSV source"
    );

    Ok(records)
}

/// Find a header by exact name, falling back to a case-insensitive match.
fn find_column(headers: &::csv::StringRecord, name: &str) -> Option<usize> {
    let name = name.trim();
    headers
        .iter()
        .position(|h| h == name)
        .or_else(|| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
}
