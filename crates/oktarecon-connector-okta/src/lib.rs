//! Okta connector for identity reconciliation.
//!
//! Reads users from the Okta management API (`/api/v1/users`) and maps them
//! into [`oktarecon_core::Record`]s. Optionally resolves an origin
//! application (for example a HiBob provisioning app) so users can be
//! classified as imported or manually created.
//!
//! # Example
//!
//! ```ignore
//! use oktarecon_connector_okta::{OktaConfig, OktaProvider};
//! use oktarecon_core::RecordProvider;
//!
//! let config = OktaConfig::builder()
//!     .domain("acme.okta.com")
//!     .api_token(std::env::var("OKTA_API_TOKEN")?)
//!     .build()?;
//!
//! let provider = OktaProvider::new(config)?;
//! let records = provider.fetch_records().await?;
//! ```

pub mod apps;
pub mod client;
pub mod config;
pub mod error;
pub mod provider;
pub mod rate_limit;
pub mod users;

pub use apps::{extract_user_id, select_app, OktaApp};
pub use client::{parse_next_link, OktaClient, Page, USER_AGENT};
pub use config::{
    default_attribute_map, normalize_domain, OktaConfig, OktaConfigBuilder, OktaIdentityField,
    OriginAppConfig, MAX_PAGE_SIZE,
};
pub use error::{OktaError, OktaResult};
pub use provider::{OktaProvider, OriginReport};
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use users::{CredentialProvider, OktaUser, OriginReportRow, UserCredentials, UserOrigin};
