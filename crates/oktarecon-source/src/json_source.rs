//! JSON source exports: a top-level array of flat objects.

use oktarecon_core::{Origin, Record};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::SourceConfig;
use crate::error::{SourceError, SourceResult};

/// Parse JSON content into source records.
///
/// Strings, numbers and booleans become attribute values; `null` is treated
/// as absent. Nested arrays or objects are rejected. Row numbers in errors
/// are 1-based positions in the array.
pub fn parse_json(content: &str, config: &SourceConfig) -> SourceResult<Vec<Record>> {
    let rows: Vec<Value> = serde_json::from_str(content)?;
    let mut records = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let position = idx + 1;
        let object = row.as_object().ok_or_else(|| SourceError::InvalidRow {
            row: position,
            message: "expected a JSON object".to_string(),
        })?;

        let key = field_value(object, &config.identity_field, position)?.unwrap_or_default();
        if key.is_empty() {
            return Err(SourceError::InvalidRow {
                row: position,
                message: format!("missing identity value in field '{}'", config.identity_field),
            });
        }

        let mut record = Record::new(key, Origin::Source);
        if config.fields.is_empty() {
            for name in object.keys().filter(|k| *k != &config.identity_field) {
                if let Some(value) = field_value(object, name, position)? {
                    record.set_attribute(name, value);
                }
            }
        } else {
            for (attribute, field) in &config.fields {
                if let Some(value) = field_value(object, field, position)? {
                    record.set_attribute(attribute, value);
                }
            }
        }
        records.push(record);
    }

    debug!(rows = records.len(), "Parsed JSON source");
    Ok(records)
}

/// Scalar value of `field` as a trimmed string, `None` when absent, null or blank.
fn field_value(
    object: &Map<String, Value>,
    field: &str,
    position: usize,
) -> SourceResult<Option<String>> {
    let value = match object.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(_) | Value::Object(_)) => {
            return Err(SourceError::InvalidRow {
                row: position,
                message: format!("field '{field}' is not a scalar value"),
            })
        }
    };

    Ok(if value.is_empty() { None } else { Some(value) })
}
