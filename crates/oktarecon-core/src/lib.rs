//! Record model and reconciliation engine for oktarecon.
//!
//! This crate holds the part of oktarecon that has no I/O: the normalized
//! [`Record`] shared by every adapter, the [`reconcile`] function that
//! classifies identities seen in a source of truth and in Okta, and the
//! [`ReconciliationSummary`] used by report writers.
//!
//! Adapters that produce records implement [`RecordProvider`].
//!
//! # Example
//!
//! ```
//! use oktarecon_core::{reconcile, Classification, Origin, ReconcileConfig, Record};
//!
//! let source = vec![Record::new("a", Origin::Source).with_attribute("status", "active")];
//! let okta = vec![Record::new("a", Origin::Okta).with_attribute("status", "suspended")];
//!
//! let results = reconcile(&source, &okta, &ReconcileConfig::default()).unwrap();
//! assert_eq!(results[0].classification, Classification::Mismatched);
//! assert_eq!(results[0].differing_fields, vec!["status".to_string()]);
//! ```

mod config;
mod engine;
mod error;
mod provider;
mod record;
mod result;

pub use config::{KeyNormalization, ReconcileConfig};
pub use engine::reconcile;
pub use error::{ReconcileError, ReconcileResult};
pub use provider::RecordProvider;
pub use record::{Origin, Record};
pub use result::{
    AttributeMismatchCount, Classification, ComparisonResult, ReconciliationSummary,
    EXIT_DISCREPANCIES_FOUND, EXIT_NO_DISCREPANCIES,
};
