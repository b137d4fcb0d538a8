//! HTTP client for the PersonalDetails collection

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use thiserror::Error;

use super::types::{ErrorBody, ListEnvelope, PersonId, PersonPayload, PersonRecord};

/// Path of the resource collection, relative to the configured base URL
pub const RESOURCE_PATH: &str = "/api/PersonalDetails";

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a usable response
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("server returned {status}")]
    Status {
        status: StatusCode,
        body: Option<ErrorBody>,
    },
    /// 2xx list response without `success: true` and a `data` array
    #[error("response is missing the success/data markers")]
    Malformed,
    #[error("failed to parse response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Structured body of an error status, if the server sent one
    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            ApiError::Status { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

/// Client for `{base_url}/api/PersonalDetails`.
pub struct PersonClient {
    client: Client,
    base_url: String,
}

impl PersonClient {
    /// Create a new client. No timeout is applied unless one is given.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ApiError::Transport)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, RESOURCE_PATH)
    }

    fn item_url(&self, id: &PersonId) -> String {
        format!("{}{}/{}", self.base_url, RESOURCE_PATH, id)
    }

    /// Send a request, turning non-2xx statuses into `ApiError::Status`
    async fn send(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let response = req.send().await.map_err(ApiError::Transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let bytes = response.bytes().await.map_err(ApiError::Transport)?;
        let body = ErrorBody::parse(&bytes);
        tracing::debug!(%status, ?body, "request rejected");
        Err(ApiError::Status { status, body })
    }

    /// Fetch the whole collection
    pub async fn list(&self) -> Result<Vec<PersonRecord>, ApiError> {
        tracing::debug!("GET {}", self.collection_url());
        let response = self.send(self.client.get(self.collection_url())).await?;
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        serde_json::from_value::<ListEnvelope>(body)
            .ok()
            .and_then(ListEnvelope::into_records)
            .ok_or(ApiError::Malformed)
    }

    pub async fn create(&self, payload: &PersonPayload) -> Result<(), ApiError> {
        tracing::debug!("POST {}", self.collection_url());
        self.send(self.client.post(self.collection_url()).json(payload))
            .await?;
        Ok(())
    }

    pub async fn update(&self, id: &PersonId, payload: &PersonPayload) -> Result<(), ApiError> {
        tracing::debug!("PUT {}", self.item_url(id));
        self.send(self.client.put(self.item_url(id)).json(payload))
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &PersonId) -> Result<(), ApiError> {
        tracing::debug!("DELETE {}", self.item_url(id));
        self.send(self.client.delete(self.item_url(id))).await?;
        Ok(())
    }
}
