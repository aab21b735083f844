//! reqwest-backed [`MetadataFetcher`].
//!
//! Classifies failures: connect/read timeout, DNS failure,
//! network error, and HTTP 5xx are retryable; HTTP 4xx and body-decoding
//! failure are permanent.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use ingestor_core::{FetchError, FetchedMetadata, MetadataFetcher, NormalizedUrl};
use reqwest::Client;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            user_agent: "metadata-ingestor/1.0".into(),
        }
    }
}

pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(config: FetcherConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .user_agent(config.user_agent)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl MetadataFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &NormalizedUrl) -> Result<FetchedMetadata, FetchError> {
        let response = self.client.get(url.as_str()).send().await.map_err(classify_request_error)?;

        let status = response.status();
        let final_url = response.url().to_string();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_str().unwrap_or_default().to_string()))
            .collect();
        let cookies: HashMap<String, String> = response
            .headers()
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|raw| parse_set_cookie(raw))
            .collect();

        if status.is_server_error() {
            return Err(FetchError::Retryable(format!("http status {}", status.as_u16())));
        }
        if status.is_client_error() {
            return Err(FetchError::Permanent(format!("http status {}", status.as_u16())));
        }

        let page_source = response.text().await.map_err(|e| {
            warn!(url = %url, error = %e, "failed to decode response body");
            FetchError::Permanent(format!("body decode failed: {e}"))
        })?;

        Ok(FetchedMetadata {
            status_code: status.as_u16(),
            headers,
            cookies,
            page_source,
            final_url,
            additional_details: None,
        })
    }
}

fn classify_request_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() || e.is_connect() {
        FetchError::Retryable(e.to_string())
    } else if e.is_status() {
        // Shouldn't happen: we don't use `error_for_status`, but guard anyway.
        FetchError::Retryable(e.to_string())
    } else if e.is_builder() || e.is_redirect() {
        FetchError::Permanent(e.to_string())
    } else {
        // DNS failures and other lower-level network errors surface as
        // generic `reqwest::Error`s with no specific predicate; treat as
        // retryable "network error".
        FetchError::Retryable(e.to_string())
    }
}

fn parse_set_cookie(raw: &str) -> Option<(String, String)> {
    let first_pair = raw.split(';').next()?;
    let (name, value) = first_pair.split_once('=')?;
    Some((name.trim().to_string(), value.trim().to_string()))
}
