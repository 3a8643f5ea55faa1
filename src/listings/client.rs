//! Client for the third-party housing listings feed.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::config::AppConfig;
use crate::error::AppError;

#[async_trait]
pub trait ListingsFeed: Send + Sync {
    /// Every listing currently published, as the feed's raw JSON objects.
    async fn fetch_all(&self) -> Result<Vec<Value>, AppError>;
}

/// The feed must answer with a JSON array; anything else is malformed.
fn expect_array(body: Value) -> Result<Vec<Value>, AppError> {
    match body {
        Value::Array(items) => Ok(items),
        other => Err(upstream(
            None,
            format!("expected a JSON array, got {}", json_type(&other)),
        )),
    }
}

fn upstream(status: Option<StatusCode>, e: impl std::fmt::Display) -> AppError {
    AppError::Upstream {
        status,
        message: e.to_string(),
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub struct HttpListingsFeed {
    http_client: reqwest::Client,
    url: String,
}

impl HttpListingsFeed {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.listings_timeout_secs))
            .build()
            .context("failed building listings HTTP client")?;
        Ok(Self {
            http_client,
            url: config.listings_url.clone(),
        })
    }
}

#[async_trait]
impl ListingsFeed for HttpListingsFeed {
    async fn fetch_all(&self) -> Result<Vec<Value>, AppError> {
        let resp = self
            .http_client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| upstream(e.status(), e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(upstream(Some(status), format!("feed answered {status}")));
        }

        let body: Value = resp.json().await.map_err(|e| upstream(None, e))?;
        let items = expect_array(body)?;
        debug!(count = items.len(), "listings fetched");
        Ok(items)
    }
}

/// Feed answering from memory; used by tests and offline runs.
pub struct StaticListingsFeed {
    body: Value,
    failure: Option<StatusCode>,
}

impl StaticListingsFeed {
    pub fn new(body: Value) -> Self {
        Self {
            body,
            failure: None,
        }
    }

    /// A feed that always fails with the given upstream status.
    pub fn failing(status: StatusCode) -> Self {
        Self {
            body: Value::Null,
            failure: Some(status),
        }
    }
}

#[async_trait]
impl ListingsFeed for StaticListingsFeed {
    async fn fetch_all(&self) -> Result<Vec<Value>, AppError> {
        if let Some(status) = self.failure {
            return Err(upstream(Some(status), format!("feed answered {status}")));
        }
        expect_array(self.body.clone())
    }
}
