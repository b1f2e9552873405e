use std::{collections::BTreeSet, time::Duration};

use derive_more::Debug;
use reqwest::{Method, RequestBuilder, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, trace};
use url::Url;

use crate::aftership::{
    ApiError, ApiKey, ApiMode, CourierList, CreateTrackingBody, Envelope, NewTracking,
    TrackingRecord,
};

/// Upper bound for a single request, connect through body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Client for the AfterShip tracking API.
///
/// The client is bound to one API key; the key decides which API generation
/// every request targets. Requests are never retried.
#[derive(Clone, Debug)]
pub struct Client {
    #[debug("{root}")]
    root: Url,
    key: ApiKey,
    http: reqwest::Client,
}

impl Client {
    /// Create a new client for the API hosted at `root`.
    pub fn new(root: Url, key: ApiKey) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("parcel/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_http(root, key, http))
    }

    /// Create a new client sharing an existing connection pool.
    ///
    /// The pool should be configured with [`REQUEST_TIMEOUT`].
    pub fn with_http(mut root: Url, key: ApiKey, http: reqwest::Client) -> Self {
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        Self { root, key, http }
    }

    /// The API generation this client talks to.
    pub fn mode(&self) -> ApiMode {
        self.key.mode()
    }

    /// List the slugs of every courier the account can track with.
    #[instrument(skip(self), fields(mode = %self.mode()))]
    pub async fn list_couriers(&self) -> Result<BTreeSet<String>, ApiError> {
        let url = self.endpoint(["couriers"])?;
        let list = self
            .execute(self.request(Method::GET, url))
            .await
            .and_then(data::<CourierList>)?
            .unwrap_or_default();
        let slugs = list.slugs();
        debug!(count = slugs.len(), "listed couriers");
        Ok(slugs)
    }

    /// Create a tracking for the given courier and tracking number.
    #[instrument(skip(self), fields(mode = %self.mode()))]
    pub async fn create_tracking(
        &self,
        slug: &str,
        tracking_number: &str,
    ) -> Result<TrackingRecord, ApiError> {
        let url = self.endpoint(["trackings"])?;
        let tracking = NewTracking::builder()
            .slug(slug)
            .tracking_number(tracking_number)
            .build();
        let body = CreateTrackingBody::new(self.mode(), tracking);
        self.execute(self.request(Method::POST, url).json(&body))
            .await
            .and_then(record)
    }

    /// Fetch an existing tracking by its AfterShip id.
    #[instrument(skip(self), fields(mode = %self.mode()))]
    pub async fn fetch_tracking(&self, id: &str) -> Result<TrackingRecord, ApiError> {
        let url = self.endpoint(["trackings", id])?;
        self.execute(self.request(Method::GET, url))
            .await
            .and_then(record)
    }

    /// Build the URL for an endpoint under the mode's base path.
    ///
    /// Segments are percent-encoded individually, so ids can't escape their
    /// path segment.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, ApiError> {
        let mut url = self
            .root
            .join(self.mode().base_path())
            .map_err(|err| ApiError::invalid_request(format!("invalid API url: {err}")))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::invalid_request(format!("invalid API url: {}", self.root)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mode = self.mode();
        self.http
            .request(method, url)
            .header(mode.auth_header(), self.key.expose())
            .header(CONTENT_TYPE, "application/json")
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Success, ApiError> {
        let response = request.send().await.map_err(ApiError::network)?;
        let status = response.status();
        let body = response.text().await.map_err(ApiError::network)?;
        trace!(%status, len = body.len(), "received response");

        if status.is_success() {
            let status = status.as_u16();
            serde_json::from_str(&body)
                .map(|body| Success { status, body })
                .map_err(|err| ApiError::decode(status, err))
        } else {
            let err = ApiError::from_response(status.as_u16(), status.canonical_reason(), &body);
            debug!(%status, code = ?err.meta.code, message = %err, "request failed");
            Err(err)
        }
    }
}

/// A successful response with a JSON body.
struct Success {
    status: u16,
    body: Value,
}

/// Decode the `data` field of a success envelope.
fn data<T: DeserializeOwned>(Success { status, body }: Success) -> Result<Option<T>, ApiError> {
    serde_json::from_value::<Envelope<T>>(body)
        .map(|envelope| envelope.data)
        .map_err(|err| ApiError::decode(status, err))
}

/// Decode the tracking record from a success envelope.
fn record(response: Success) -> Result<TrackingRecord, ApiError> {
    data::<Value>(response).map(|data| TrackingRecord::from_data(data.unwrap_or(Value::Null)))
}
