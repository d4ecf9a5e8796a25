//! HTTP client for the event API.

use std::future::Future;
use std::time::Duration;

use reqwest::Response;
use serde::Deserialize;
use url::Url;

use crate::error::{ApiError, EventsError, EventsResult};
use crate::event::{Event, EventListPayload, EventPayload};

/// Operations the views need from the event API.
///
/// Implementations are cheap to clone so the query cache can move a copy
/// into the task that performs a read.
pub trait EventsApi: Clone + Send + Sync + 'static {
    /// GET /events/{id}
    fn fetch_event(&self, id: &str) -> impl Future<Output = Result<Event, ApiError>> + Send;

    /// GET /events
    fn fetch_events(&self) -> impl Future<Output = Result<Vec<Event>, ApiError>> + Send;

    /// DELETE /events/{id}
    fn delete_event(&self, id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Error body returned by the API on non-2xx responses
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// reqwest-backed [`EventsApi`].
#[derive(Clone, Debug)]
pub struct HttpEventsApi {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpEventsApi {
    pub fn new(base_url: &str, timeout: Duration) -> EventsResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| EventsError::Config(format!("Invalid API URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(EventsError::Config(format!(
                "Invalid API URL '{base_url}': expected an http(s) address like http://localhost:3000"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EventsError::Config(format!("Could not build HTTP client: {e}")))?;

        Ok(Self { http, base_url })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Network(format!("Cannot use '{}' as a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Turn a non-2xx response into an [`ApiError`], keeping the server message if it sent one.
async fn error_from_response(resp: Response) -> ApiError {
    let status = resp.status().as_u16();
    let message = resp
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message);
    ApiError::Status { status, message }
}

impl EventsApi for HttpEventsApi {
    async fn fetch_event(&self, id: &str) -> Result<Event, ApiError> {
        let url = self.url(&["events", id])?;
        tracing::debug!(%url, "GET event");

        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let payload: EventPayload = resp.json().await?;
        Ok(payload.into())
    }

    async fn fetch_events(&self) -> Result<Vec<Event>, ApiError> {
        let url = self.url(&["events"])?;
        tracing::debug!(%url, "GET events");

        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let payload: EventListPayload = resp.json().await?;
        Ok(payload.into())
    }

    async fn delete_event(&self, id: &str) -> Result<(), ApiError> {
        let url = self.url(&["events", id])?;
        tracing::debug!(%url, "DELETE event");

        let resp = self.http.delete(url).send().await?;
        // 200 and 204 are what the API sends; any other 2xx is treated the same
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(resp).await)
        }
    }
}
