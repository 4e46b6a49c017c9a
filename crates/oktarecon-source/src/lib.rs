//! Source-of-truth adapters for oktarecon.
//!
//! Reads user exports from an HR system or database dump and turns each row
//! into an [`oktarecon_core::Record`] with origin `Source`.
//!
//! Supported formats:
//! - CSV with a header row
//! - JSON array of flat objects

mod config;
mod csv_source;
mod error;
mod json_source;
mod provider;

pub use config::{SourceConfig, SourceFormat};
pub use csv_source::parse_csv;
pub use error::{SourceError, SourceResult};
pub use json_source::parse_json;
pub use provider::SourceProvider;
