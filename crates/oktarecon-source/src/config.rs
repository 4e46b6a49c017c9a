//! Source adapter configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{SourceError, SourceResult};

/// File format of a source export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Comma (or other delimiter) separated values with a header row.
    Csv,
    /// JSON array of flat objects.
    Json,
}

impl SourceFormat {
    /// Detect the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" | "tsv" | "txt" => Some(SourceFormat::Csv),
            "json" => Some(SourceFormat::Json),
            _ => None,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Csv => write!(f, "csv"),
            SourceFormat::Json => write!(f, "json"),
        }
    }
}

/// Where the source export lives and how to map its columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to the export file.
    pub path: PathBuf,
    /// Explicit format. Inferred from the extension when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<SourceFormat>,
    /// Column (or JSON key) holding the identity key.
    pub identity_field: String,
    /// Attribute name to column name. Empty means every non-identity column,
    /// named after its header.
    ///
    /// Attribute names are what the engine pairs with the Okta side's
    /// `attribute_map` keys (`first_name`, `status`, ...). Raw headers such as
    /// `First Name` never pair with them.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
    /// CSV delimiter. When omitted: tab for `.tsv` files, comma otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
}

impl SourceConfig {
    /// Create a configuration with defaults for everything but path and identity field.
    pub fn new(path: impl Into<PathBuf>, identity_field: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            format: None,
            identity_field: identity_field.into(),
            fields: BTreeMap::new(),
            delimiter: None,
        }
    }

    /// Map an attribute to a source column.
    #[must_use]
    pub fn with_field(mut self, attribute: impl Into<String>, column: impl Into<String>) -> Self {
        self.fields.insert(attribute.into(), column.into());
        self
    }

    /// Set the format explicitly.
    #[must_use]
    pub fn with_format(mut self, format: SourceFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Format to use, explicit or inferred.
    pub fn resolve_format(&self) -> SourceResult<SourceFormat> {
        self.format
            .or_else(|| SourceFormat::from_path(&self.path))
            .ok_or_else(|| {
                SourceError::UnsupportedFormat(format!(
                    "cannot infer format of '{}'; set source.format to csv or json",
                    self.path.display()
                ))
            })
    }

    /// Set the CSV delimiter explicitly.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Delimiter to use, explicit or derived from the extension.
    #[must_use]
    pub fn resolve_delimiter(&self) -> char {
        self.delimiter.unwrap_or_else(|| {
            let is_tsv = self
                .path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
            if is_tsv {
                '\t'
            } else {
                ','
            }
        })
    }

    /// Delimiter as a byte for the CSV reader.
    pub fn delimiter_byte(&self) -> SourceResult<u8> {
        let delimiter = self.resolve_delimiter();
        u8::try_from(delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                SourceError::Config(format!(
                    "delimiter '{delimiter}' must be a single ASCII character"
                ))
            })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> SourceResult<()> {
        if self.identity_field.trim().is_empty() {
            return Err(SourceError::Config(
                "identity_field must not be empty".to_string(),
            ));
        }
        if let Some((attribute, _)) = self.fields.iter().find(|(_, col)| col.trim().is_empty()) {
            return Err(SourceError::Config(format!(
                "field '{attribute}' maps to an empty column name"
            )));
        }
        self.delimiter_byte()?;
        self.resolve_format()?;
        Ok(())
    }
}
