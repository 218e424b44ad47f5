//! HTTP client for the persistence backend.
//!
//! The backend keeps the whole store as one JSON document and exposes it
//! through a small REST API (`/store`, `/events`, `/map-blocks`). The display
//! process loads the store once at startup and mirrors administrative
//! mutations and lifecycle status changes back in the background. A backend
//! outage never reaches the scheduler: failures are logged and dropped.

use std::future::Future;
use std::time::Duration;

use carnival_types::{
    BlockDraft, BlockId, BlockPatch, Event, EventDraft, EventId, EventPatch, EventStatus,
    MapBlock, StoreDocument,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::error::RemoteError;
use crate::store::EventStore;

/// Client for the persistence backend. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteBackend {
    /// Create a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Request`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Request(format!("client build failed: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// The backend base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    pub async fn health(&self) -> Result<(), RemoteError> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(request_failed)?;
        check_status(response).await.map(drop)
    }

    /// Fetch the whole store with `GET /store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the document is malformed.
    pub async fn fetch_store(&self) -> Result<StoreDocument, RemoteError> {
        let response = self
            .client
            .get(self.url("/store"))
            .send()
            .await
            .map_err(request_failed)?;
        decode(response).await
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Create an event with `POST /events`. The backend assigns the id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply is malformed.
    pub async fn create_event(&self, draft: &EventDraft) -> Result<Event, RemoteError> {
        self.send_json(reqwest::Method::POST, "/events", draft)
            .await
    }

    /// Apply a partial update with `PATCH /events/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply is malformed.
    pub async fn update_event(&self, id: &EventId, patch: &EventPatch) -> Result<Event, RemoteError> {
        self.send_json(reqwest::Method::PATCH, &format!("/events/{id}"), patch)
            .await
    }

    /// Persist a lifecycle status with `PATCH /events/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply is malformed.
    pub async fn update_status(&self, id: &EventId, status: EventStatus) -> Result<Event, RemoteError> {
        let body = serde_json::json!({ "status": status });
        self.send_json(reqwest::Method::PATCH, &format!("/events/{id}"), &body)
            .await
    }

    /// Delete an event with `DELETE /events/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_event(&self, id: &EventId) -> Result<(), RemoteError> {
        self.delete(&format!("/events/{id}")).await
    }

    // -----------------------------------------------------------------------
    // Map blocks
    // -----------------------------------------------------------------------

    /// Create a block with `POST /map-blocks`. The backend assigns the id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply is malformed.
    pub async fn create_block(&self, draft: &BlockDraft) -> Result<MapBlock, RemoteError> {
        self.send_json(reqwest::Method::POST, "/map-blocks", draft)
            .await
    }

    /// Apply a partial update with `PATCH /map-blocks/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply is malformed.
    pub async fn update_block(&self, id: &BlockId, patch: &BlockPatch) -> Result<MapBlock, RemoteError> {
        self.send_json(reqwest::Method::PATCH, &format!("/map-blocks/{id}"), patch)
            .await
    }

    /// Delete a block with `DELETE /map-blocks/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_block(&self, id: &BlockId) -> Result<(), RemoteError> {
        self.delete(&format!("/map-blocks/{id}")).await
    }

    // -----------------------------------------------------------------------
    // Transport helpers
    // -----------------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send_json<B, T>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .request(method, self.url(path))
            .json(body)
            .send()
            .await
            .map_err(request_failed)?;
        decode(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), RemoteError> {
        let response = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .map_err(request_failed)?;
        check_status(response).await.map(drop)
    }
}

fn request_failed(e: reqwest::Error) -> RemoteError {
    RemoteError::Request(e.to_string())
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read error body".to_owned());
    Err(RemoteError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RemoteError> {
    check_status(response)
        .await?
        .json()
        .await
        .map_err(|e| RemoteError::Decode(e.to_string()))
}

// ---------------------------------------------------------------------------
// Startup load and background mirroring
// ---------------------------------------------------------------------------

/// Populate `store` from the backend once.
///
/// A failed fetch is logged and swallowed so the display starts with an
/// empty store. Returns `true` if the store was loaded.
pub async fn initialize_from_api(store: &mut EventStore, backend: &RemoteBackend) -> bool {
    match backend.fetch_store().await {
        Ok(document) => {
            info!(
                url = backend.base_url(),
                events = document.events.len(),
                map_blocks = document.map_blocks.len(),
                "store loaded from backend"
            );
            store.replace_all(document);
            true
        }
        Err(e) => {
            warn!(
                url = backend.base_url(),
                error = %e,
                "failed to load store from backend, starting empty"
            );
            false
        }
    }
}

/// Run a backend call in the background, logging a failure instead of
/// returning it.
pub fn mirror<F, T>(operation: &'static str, call: F)
where
    F: Future<Output = Result<T, RemoteError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = call.await {
            warn!(operation, error = %e, "backend mirror failed");
        }
    });
}
