//! Minimal HTTP access for repository metadata lookups.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;

use crate::core::BundleError;
use crate::utils::url::redact_url;

/// Timeout for a single metadata request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Basic-auth credentials for a request.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    /// User name
    pub username: &'a str,
    /// Password or token
    pub password: &'a str,
}

impl<'a> Credentials<'a> {
    /// Credentials when both parts are present and non-empty.
    #[must_use]
    pub fn from_parts(username: Option<&'a str>, password: Option<&'a str>) -> Option<Self> {
        match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(Self {
                    username,
                    password,
                })
            }
            _ => None,
        }
    }
}

/// GET `url` and return the body as text.
///
/// A non-success status becomes [`BundleError::HttpStatus`].
pub async fn fetch_text(url: &str, credentials: Option<Credentials<'_>>) -> Result<String> {
    let display_url = redact_url(url);
    debug!("GET {}", display_url);

    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("pkg-deps/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let mut request = client.get(url);
    if let Some(credentials) = credentials {
        request = request.basic_auth(credentials.username, Some(credentials.password));
    }

    let response =
        request.send().await.with_context(|| format!("Failed to fetch {display_url}"))?;

    let status = response.status();
    if !status.is_success() {
        return Err(BundleError::HttpStatus {
            status: status.as_u16(),
            url: display_url,
        }
        .into());
    }

    response.text().await.with_context(|| format!("Failed to read response body from {display_url}"))
}
