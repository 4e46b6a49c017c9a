//! Trait implemented by adapters that produce records.

use async_trait::async_trait;

use crate::record::{Origin, Record};

/// A system that can produce the full set of records for one origin.
///
/// Implementations receive their configuration and credentials through their
/// constructors; nothing is read from ambient state during a fetch.
#[async_trait]
pub trait RecordProvider: Send + Sync {
    /// Error returned when fetching fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Origin stamped on every record this provider returns.
    fn origin(&self) -> Origin;

    /// Human-readable label used in logs and reports.
    fn display_name(&self) -> &str;

    /// Fetch every record. Order is not significant.
    async fn fetch_records(&self) -> Result<Vec<Record>, Self::Error>;
}
