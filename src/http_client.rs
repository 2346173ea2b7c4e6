//! HTTP client abstraction for talking to the package registry.
//!
//! This module provides a trait-based abstraction over HTTP clients, enabling
//! dependency injection and easy mocking in tests.

use crate::error::RegistryError;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Trait for HTTP communication with the registry.
///
/// Only successful (2xx) responses produce a body; everything else becomes a
/// [`RegistryError`] so callers never mistake a failure for an empty result.
///
/// # Example
///
/// ```ignore
/// use yoyo::http_client::{HttpClient, ReqwestHttpClient};
///
/// let client = ReqwestHttpClient::new();
/// let body = client
///     .get_text("https://registry.npmjs.org/generator-node", &[("Accept", "application/json")])
///     .await?;
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a GET request and returns the response body as a string.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Network`] when no response arrives and
    /// [`RegistryError::Status`] for non-2xx responses.
    async fn get_text(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, RegistryError>;
}

/// HTTP client implementation using reqwest.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get_text(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, RegistryError> {
        let mut request = self.client.get(url);

        for (key, value) in headers {
            request = request.header(*key, *value);
        }

        let network = |e: reqwest::Error| RegistryError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = request.send().await.map_err(network)?;
        let status = response.status();
        debug!("GET {} -> {}", url, status);

        if !status.is_success() {
            return Err(RegistryError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(network)
    }
}
