// Reservation API transport
// Executes one logical request against the airline API, retrying non-200 responses
// with a fixed delay until the attempt ceiling is reached.

use async_trait::async_trait;
use reqwest::{header::HeaderMap, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};
use thiserror::Error;
use tracing::debug;

// Error types for the transport layer
#[derive(Error, Debug)]
pub enum ApiError {
    // Every attempt came back with a non-200 status
    #[error("{reason} {status_code}")]
    RequestFailed {
        reason: String,
        status_code: u16,
        attempts: u32,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Response body is not JSON: {message}")]
    Deserialization { message: String, body: String },
}

impl ApiError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status_code, .. } => Some(*status_code),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            Self::Deserialization { .. } => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}

// Fixed-delay retry policy shared by every step of a check
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 7,
            delay_ms: 500,
        }
    }
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://mobile.southwest.com/api/".to_string(),
            timeout_ms: 30_000,
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    Get,
    Post,
}

impl std::fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestMethod::Get => f.write_str("GET"),
            RequestMethod::Post => f.write_str("POST"),
        }
    }
}

// One request against a path relative to the API base.
// GET payloads become query parameters, POST payloads the JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: RequestMethod,
    pub path: String,
    pub payload: Value,
    pub max_attempts: Option<u32>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>, params: Value) -> Self {
        Self {
            method: RequestMethod::Get,
            path: path.into(),
            payload: params,
            max_attempts: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: RequestMethod::Post,
            path: path.into(),
            payload: body,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    // Flatten a JSON object into query pairs; nulls are left out entirely and
    // arrays repeat their key once per element
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let Value::Object(map) = &self.payload else {
            return vec![];
        };

        let mut pairs = Vec::with_capacity(map.len());
        for (key, value) in map {
            match value {
                Value::Array(items) => pairs.extend(
                    items
                        .iter()
                        .filter_map(query_value)
                        .map(|item| (key.clone(), item)),
                ),
                other => pairs.extend(query_value(other).map(|item| (key.clone(), item))),
            }
        }
        pairs
    }
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// The transport capability the re-shoppers depend on.
// Retries are invisible to callers: they see the final success or the final failure.
#[async_trait]
pub trait ApiClient: Send + Sync + 'static {
    async fn request(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

#[derive(Debug, Default)]
pub struct ClientStats {
    pub requests_sent: AtomicUsize,
    pub requests_succeeded: AtomicUsize,
    pub requests_failed: AtomicUsize,
    pub requests_retried: AtomicUsize,
}

// reqwest-backed client for the airline's mobile API
pub struct ReservationApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    stats: ClientStats,
}

impl ReservationApiClient {
    // Headers carry the caller's credentials and are sent unchanged on every request
    pub fn new(config: ClientConfig, headers: HeaderMap) -> Result<Self, ClientError> {
        if config.retry.max_attempts == 0 {
            return Err(ClientError::ConfigError(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::InitError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(http, config))
    }

    pub fn with_client(http: reqwest::Client, config: ClientConfig) -> Self {
        Self {
            http,
            config,
            stats: ClientStats::default(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn stats(&self) -> &ClientStats {
        &self.stats
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn send_once(&self, request: &ApiRequest) -> Result<reqwest::Response, reqwest::Error> {
        let url = self.url(&request.path);
        let builder = match request.method {
            RequestMethod::Get => self.http.get(url).query(&request.query_pairs()),
            RequestMethod::Post => self.http.post(url).json(&request.payload),
        };

        self.stats.requests_sent.fetch_add(1, Ordering::SeqCst);
        builder.send().await
    }

    async fn parse_body(response: reqwest::Response) -> Result<Value, ApiError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

#[async_trait]
impl ApiClient for ReservationApiClient {
    async fn request(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let max_attempts = request
            .max_attempts
            .unwrap_or(self.config.retry.max_attempts)
            .max(1);
        let mut attempt = 1;

        loop {
            let error = match self.send_once(&request).await {
                Ok(response) if response.status() == StatusCode::OK => {
                    debug!(
                        "Successfully made request to {} after {} attempts",
                        request.path, attempt
                    );
                    self.stats.requests_succeeded.fetch_add(1, Ordering::SeqCst);
                    return Self::parse_body(response).await;
                }
                Ok(response) => {
                    let status = response.status();
                    ApiError::RequestFailed {
                        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                        status_code: status.as_u16(),
                        attempts: attempt,
                    }
                }
                Err(e) => ApiError::Network(e),
            };

            if attempt >= max_attempts {
                debug!("Failed to make request: {}", error);
                self.stats.requests_failed.fetch_add(1, Ordering::SeqCst);
                return Err(error);
            }

            attempt += 1;
            self.stats.requests_retried.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.config.retry.delay()).await;
        }
    }
}
