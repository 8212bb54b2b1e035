//! CompareClient - posts images to the comparison server.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use thiserror::Error;

use super::types::{CaptureRequest, CompareResult, ErrorBody};

/// The environment variable that overrides the server URL.
pub const SERVER_URL_ENV: &str = "CARD_SCANNER_SERVER";

/// Default base URL of the comparison server.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Path of the comparison endpoint, relative to the base URL.
pub const COMPARE_PATH: &str = "/compare";

/// Message shown when a failed response carries no usable `error` field.
pub const GENERIC_SERVER_ERROR: &str = "Erreur serveur";

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors returned by [`CompareClient::compare`].
#[derive(Debug, Error)]
pub enum CompareError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// `error` field of the body, or the generic fallback
        message: String,
    },

    #[error("requête échouée: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL de serveur invalide: {0}")]
    InvalidServerUrl(String),
}

impl CompareError {
    /// Status code for server-side failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            CompareError::Server { status, .. } => Some(*status),
            CompareError::Http(e) => e.status().map(|s| s.as_u16()),
            CompareError::InvalidServerUrl(_) => None,
        }
    }
}

/// Client for the `/compare` endpoint.
///
/// One request per call: no retries and no request timeout beyond the
/// optional one given to [`CompareClient::with_timeout`].
#[derive(Debug, Clone)]
pub struct CompareClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl CompareClient {
    /// Create a client for `base_url` (scheme and host, e.g. `http://host:5000`).
    ///
    /// # Errors
    ///
    /// Returns `CompareError::InvalidServerUrl` if the URL is empty or not http(s).
    pub fn new(base_url: &str) -> Result<Self, CompareError> {
        Self::with_timeout(base_url, None)
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, CompareError> {
        let base_url = normalize_base_url(base_url)?;

        let mut builder = reqwest::Client::builder().connect_timeout(DEFAULT_CONNECT_TIMEOUT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url,
            http_client: builder.build()?,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the comparison endpoint.
    pub fn compare_url(&self) -> String {
        format!("{}{}", self.base_url, COMPARE_PATH)
    }

    /// Send one image with its hash parameters and parse the verdict.
    ///
    /// # Errors
    ///
    /// `CompareError::Server` on any non-2xx status, carrying the body's
    /// `error` message or [`GENERIC_SERVER_ERROR`] when the body has none or
    /// is not JSON. `CompareError::Http` on transport or decoding failures.
    pub async fn compare(&self, request: &CaptureRequest) -> Result<CompareResult, CompareError> {
        let form = build_form(request)?;
        let url = self.compare_url();

        log::debug!(
            "POST {} ({} bytes, {} size {})",
            url,
            request.image.bytes.len(),
            request.hash_type,
            request.hash_size
        );

        let response = self.http_client.post(&url).multipart(form).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.json::<ErrorBody>().await.unwrap_or_default();
            let message = body
                .message()
                .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string());

            log::error!("Compare request failed with status {}: {}", status, message);
            return Err(CompareError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let result: CompareResult = response.json().await?;
        log::info!(
            "Compared image: exact_match={}, total_matches={}",
            result.exact_match,
            result.total_matches
        );
        Ok(result)
    }
}

fn build_form(request: &CaptureRequest) -> Result<Form, CompareError> {
    let image = Part::bytes(request.image.bytes.clone())
        .file_name(request.image.file_name.clone())
        .mime_str(&request.image.mime)?;

    let mut form = Form::new()
        .part("image", image)
        .text("hash_type", request.hash_type.as_str())
        .text("hash_size", request.hash_size.to_string());

    if let Some(max_distance) = request.max_distance {
        form = form.text("max_distance", max_distance.to_string());
    }
    if let Some(limit) = request.limit {
        form = form.text("limit", limit.to_string());
    }

    Ok(form)
}

fn normalize_base_url(base_url: &str) -> Result<String, CompareError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(CompareError::InvalidServerUrl(base_url.to_string()));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(CompareError::InvalidServerUrl(base_url.to_string()));
    }
    Ok(trimmed.to_string())
}
