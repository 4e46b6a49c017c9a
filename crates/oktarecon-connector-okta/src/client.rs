//! Okta management API HTTP client with pagination and rate limiting.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, LINK};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::OktaConfig;
use crate::rate_limit::{RateLimiter, RATE_LIMIT_RESET_HEADER};
use crate::{OktaError, OktaResult};

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("oktarecon/", env!("CARGO_PKG_VERSION"));

/// Error body returned by the Okta API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OktaErrorBody {
    pub error_code: String,
    pub error_summary: String,
    #[serde(default)]
    pub error_id: Option<String>,
}

/// A single page of results and the URL of the next page, if any.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<Url>,
}

/// Okta management API client.
#[derive(Debug, Clone)]
pub struct OktaClient {
    http_client: reqwest::Client,
    base_url: Url,
    page_size: u32,
    rate_limiter: RateLimiter,
}

impl OktaClient {
    /// Creates a new client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: &OktaConfig) -> OktaResult<Self> {
        config.validate()?;
        let base_url = config.base_url()?;

        let mut auth = HeaderValue::from_str(&format!("SSWS {}", config.token()?))
            .map_err(|_| OktaError::Config("api_token contains invalid characters".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OktaError::Config(format!("Failed to create HTTP client: {e}")))?;

        let rate_limiter = RateLimiter::new(config.rate_limit.clone())
            .map_err(|e| OktaError::Config(format!("Invalid rate limit config: {e}")))?;

        Ok(Self {
            http_client,
            base_url,
            page_size: config.page_size,
            rate_limiter,
        })
    }

    /// Returns the tenant base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Configured page size.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Builds an absolute URL for an API path with query parameters.
    pub fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> OktaResult<Url> {
        let mut url = self.base_url.join(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Fetches a single page, honoring rate limits and retrying transient errors.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_page<T: DeserializeOwned>(&self, url: &Url) -> OktaResult<Page<T>> {
        let mut transient_retries = 0u32;
        let mut rate_limit_attempts = 0u32;

        loop {
            let response = self.http_client.get(url.clone()).send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let reset = response
                    .headers()
                    .get(RATE_LIMIT_RESET_HEADER)
                    .and_then(|v| v.to_str().ok());

                self.rate_limiter
                    .handle_rate_limit_response(reset, rate_limit_attempts)
                    .await?;

                rate_limit_attempts += 1;
                continue;
            }

            if matches!(
                status,
                StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
            ) && self.rate_limiter.can_retry_transient(transient_retries)
            {
                let delay = self.rate_limiter.transient_delay(transient_retries);
                transient_retries += 1;
                warn!(
                    "Transient error {}, retry {}/{} after {:?}",
                    status,
                    transient_retries,
                    self.rate_limiter.config().transient_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            if status.is_success() {
                let next = response
                    .headers()
                    .get_all(LINK)
                    .iter()
                    .filter_map(|v| v.to_str().ok())
                    .find_map(parse_next_link)
                    .map(|next| self.check_next_url(&next))
                    .transpose()?;

                let body = response.text().await?;
                let items: Vec<T> = serde_json::from_str(&body)?;
                debug!(count = items.len(), has_next = next.is_some(), "Fetched page");
                return Ok(Page { items, next });
            }

            let error_body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &error_body));
        }
    }

    /// Fetches every page starting at `initial_url`, passing each page's
    /// items to `callback`. Returns the number of pages fetched.
    #[instrument(skip(self, callback), fields(url = %initial_url))]
    pub async fn get_paginated<T, F>(&self, initial_url: Url, mut callback: F) -> OktaResult<usize>
    where
        T: DeserializeOwned,
        F: FnMut(Vec<T>) -> OktaResult<()>,
    {
        let mut url = initial_url;
        let mut pages = 0usize;

        loop {
            debug!("Fetching page: {}", url);
            let page: Page<T> = self.get_page(&url).await?;
            pages += 1;

            callback(page.items)?;

            match page.next {
                Some(next) => url = next,
                None => return Ok(pages),
            }
        }
    }

    /// Collects every item across all pages.
    pub async fn get_all<T: DeserializeOwned>(&self, initial_url: Url) -> OktaResult<Vec<T>> {
        let mut all = Vec::new();
        self.get_paginated(initial_url, |items: Vec<T>| {
            all.extend(items);
            Ok(())
        })
        .await?;
        Ok(all)
    }

    /// Rejects pagination links that leave the tenant.
    fn check_next_url(&self, next: &str) -> OktaResult<Url> {
        let url = Url::parse(next)?;
        if url.origin() != self.base_url.origin() {
            return Err(OktaError::InvalidResponse(format!(
                "next page link points outside the tenant: {next}"
            )));
        }
        Ok(url)
    }
}

/// Extracts the `rel="next"` target from a `Link` header value.
#[must_use]
pub fn parse_next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut segments = part.split(';');
        let target = segments.next()?.trim();
        let is_next = segments.any(|param| {
            let param = param.trim();
            param == r#"rel="next""# || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

fn api_error(status: StatusCode, body: &str) -> OktaError {
    match serde_json::from_str::<OktaErrorBody>(body) {
        Ok(error) => OktaError::Api {
            status: status.as_u16(),
            code: error.error_code,
            summary: error.error_summary,
        },
        Err(_) => OktaError::Api {
            status: status.as_u16(),
            code: status.to_string(),
            summary: body.to_string(),
        },
    }
}
