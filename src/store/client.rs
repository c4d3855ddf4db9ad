//! HTTP client for the document store.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::config::schema::{StoreConfig, StoreRetryConfig};
use crate::observability::metrics;
use crate::resilience::Retrier;
use crate::store::error::{StoreError, StoreErrorKind};

/// Client for the document-store HTTP API.
///
/// Cheap to clone; document operations retry transient connectivity
/// failures per the configured policy.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    retry: StoreRetryConfig,
}

impl StoreClient {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                StoreError::new(StoreErrorKind::Other, format!("store client init failed: {}", e))
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            retry: config.retry.clone(),
        })
    }

    /// Probe store reachability with a single attempt. The admin endpoint
    /// reports what the store does right now, so no retries here.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let url = format!("{}/health", self.base_url);
        self.send(Method::GET, url, None).await?;
        Ok(())
    }

    /// Fetch one document as JSON.
    pub async fn get_document(&self, collection: &str, id: &str) -> Result<Value, StoreError> {
        let url = self.document_url(collection, id);
        let retrier = Retrier::from_config(&self.retry);
        retrier
            .run(|| async {
                let response = self.send(Method::GET, url.clone(), None).await?;
                response.json::<Value>().await.map_err(|e| {
                    StoreError::new(
                        StoreErrorKind::Other,
                        format!("store response decode failed: {}", e),
                    )
                })
            })
            .await
    }

    /// Create or replace one document.
    pub async fn put_document(
        &self,
        collection: &str,
        id: &str,
        document: &Value,
    ) -> Result<(), StoreError> {
        let url = self.document_url(collection, id);
        let retrier = Retrier::from_config(&self.retry);
        retrier
            .run(|| async {
                self.send(Method::PUT, url.clone(), Some(document)).await?;
                Ok(())
            })
            .await
    }

    /// Delete one document.
    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.document_url(collection, id);
        let retrier = Retrier::from_config(&self.retry);
        retrier
            .run(|| async {
                self.send(Method::DELETE, url.clone(), None).await?;
                Ok(())
            })
            .await
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            urlencoding::encode(collection),
            urlencoding::encode(id)
        )
    }

    /// Send one request and tag any failure with its kind.
    async fn send(
        &self,
        method: Method,
        url: String,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, StoreError> {
        let mut request = self.http.request(method, &url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            let error = classify_transport(&e);
            metrics::record_store_error(error.kind().as_str());
            error
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response.text().await.unwrap_or_default();
        let error = classify_status(status, &detail);
        metrics::record_store_error(error.kind().as_str());
        Err(error)
    }
}

/// Tag a reqwest transport failure.
fn classify_transport(error: &reqwest::Error) -> StoreError {
    let kind = if error.is_connect() || error.is_timeout() {
        StoreErrorKind::Connectivity
    } else {
        StoreErrorKind::Other
    };
    StoreError::new(kind, format!("store request failed: {}", error))
}

/// Tag a non-success store response.
fn classify_status(status: StatusCode, detail: &str) -> StoreError {
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreErrorKind::PermissionDenied,
        StatusCode::NOT_FOUND => StoreErrorKind::NotFound,
        StatusCode::CONFLICT => StoreErrorKind::AlreadyExists,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            StoreErrorKind::Connectivity
        }
        _ => StoreErrorKind::Other,
    };
    let message = if detail.is_empty() {
        format!("store returned {}", status)
    } else {
        format!("store returned {}: {}", status, detail)
    };
    StoreError::new(kind, message)
}
