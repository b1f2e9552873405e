//! A browser form for submitting parcel trackings.
//!
//! Every submission carries its own AfterShip API key; the server holds no
//! credentials. Shared state is limited to the API root, a connection pool
//! and the courier normalizer.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use clients::aftership::REQUEST_TIMEOUT;
use parcel::Normalizer;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};
use url::Url;

pub mod page;
pub mod track;

/// Most upstream calls a single submission makes: list, create, refetch.
const UPSTREAM_CALLS: u32 = 3;

/// Slack on top of the upstream budget for rendering and local work.
const HANDLER_SLACK: Duration = Duration::from_secs(5);

/// Form posts are a few short fields.
const MAX_BODY_SIZE: usize = 64 * 1024;

/// State shared by all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Root of the AfterShip API.
    pub api_root: Url,

    pub http: reqwest::Client,
    pub normalizer: Arc<Normalizer>,

    /// Upper bound for a single upstream request.
    pub request_timeout: Duration,
}

impl AppState {
    /// State for talking to the AfterShip API at `api_root`.
    pub fn new(api_root: Url) -> Result<Self, reqwest::Error> {
        Self::with_request_timeout(api_root, REQUEST_TIMEOUT)
    }

    /// State whose upstream requests give up after `request_timeout`.
    pub fn with_request_timeout(
        api_root: Url,
        request_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("parcel-web/", env!("CARGO_PKG_VERSION")))
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            api_root,
            http,
            normalizer: Arc::new(Normalizer::default()),
            request_timeout,
        })
    }

    /// Upper bound for handling a request.
    ///
    /// Always outlasts every upstream call a submission can make, so upstream
    /// timeouts reach the handler and are rendered on the page.
    pub fn handler_timeout(&self) -> Duration {
        self.request_timeout * UPSTREAM_CALLS + HANDLER_SLACK
    }
}

pub fn router(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::new(state.handler_timeout()));

    Router::new()
        .route("/", get(track::form))
        .route("/track", post(track::submit))
        .route("/health", get(|| async { "ok" }))
        .method_not_allowed_fallback(|| async { StatusCode::NOT_FOUND })
        .layer(middleware)
        .with_state(state)
}
