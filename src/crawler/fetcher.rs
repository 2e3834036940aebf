//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - GET requests for pages, texts and images
//! - Redirect detection (redirects are never followed)
//! - Error classification

use crate::config::CrawlerConfig;
use crate::CatalogError;
use reqwest::{header::LOCATION, redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// A successfully fetched resource
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// URL the body was served from
    pub url: Url,

    /// Complete response body
    pub body: Vec<u8>,
}

impl FetchedResource {
    /// Decodes the body as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are disabled: the catalog answers requests for missing pages,
/// books and texts with a redirect, so a 3xx response is surfaced to the
/// caller as [`CatalogError::Redirect`] instead of being followed.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues GET requests and classifies their outcome
#[derive(Debug, Clone)]
pub struct ResourceClient {
    client: Client,
}

impl ResourceClient {
    /// Creates a client from crawler configuration
    pub fn new(config: &CrawlerConfig) -> Result<Self, CatalogError> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Wraps an already configured reqwest client
    ///
    /// The client must not follow redirects, otherwise missing resources
    /// are reported as successes.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetches a URL and returns its full body
    ///
    /// # Error Classification
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | HTTP 3xx | `Redirect` |
    /// | Other non-2xx | `Fetch` |
    /// | Connect failure, timeout, broken body | `Connection` |
    pub async fn fetch(&self, url: &Url) -> Result<FetchedResource, CatalogError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| CatalogError::Connection {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            return Err(CatalogError::Redirect {
                url: url.to_string(),
                status: status.as_u16(),
                location,
            });
        }

        if !status.is_success() {
            return Err(CatalogError::Fetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response
            .bytes()
            .await
            .map_err(|source| CatalogError::Connection {
                url: url.to_string(),
                source,
            })?;

        tracing::debug!("Fetched {} ({} bytes)", final_url, body.len());

        Ok(FetchedResource {
            url: final_url,
            body: body.to_vec(),
        })
    }
}
