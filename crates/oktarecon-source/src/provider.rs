//! `RecordProvider` implementation for file exports.

use async_trait::async_trait;
use oktarecon_core::{Origin, Record, RecordProvider};
use tracing::{info, instrument};

use crate::config::{SourceConfig, SourceFormat};
use crate::csv_source::parse_csv;
use crate::error::{SourceError, SourceResult};
use crate::json_source::parse_json;

/// Reads the source of truth from a CSV or JSON export on disk.
#[derive(Debug, Clone)]
pub struct SourceProvider {
    config: SourceConfig,
    display_name: String,
}

impl SourceProvider {
    /// Create a provider after validating the configuration.
    pub fn new(config: SourceConfig) -> SourceResult<Self> {
        config.validate()?;
        let display_name = config.path.display().to_string();
        Ok(Self {
            config,
            display_name,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Parse already-loaded content according to the configured format.
    pub fn parse(&self, content: &str) -> SourceResult<Vec<Record>> {
        match self.config.resolve_format()? {
            SourceFormat::Csv => parse_csv(content.as_bytes(), &self.config),
            SourceFormat::Json => parse_json(content, &self.config),
        }
    }
}

#[async_trait]
impl RecordProvider for SourceProvider {
    type Error = SourceError;

    fn origin(&self) -> Origin {
        Origin::Source
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    #[instrument(skip(self), fields(path = %self.display_name))]
    async fn fetch_records(&self) -> SourceResult<Vec<Record>> {
        let content = tokio::fs::read_to_string(&self.config.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.config.path.clone(),
                source,
            })?;

        let records = self.parse(&content)?;
        info!("Loaded {} source records", records.len());
        Ok(records)
    }
}
