//! A stand-in for the AfterShip API.
//!
//! Serves canned responses for the three endpoints the tracker uses and
//! records every request it receives.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header::CONTENT_TYPE},
};
use color_eyre::Result;
use serde_json::{Value, json};
use url::Url;

/// A request as received by the mock.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

/// A canned response.
#[derive(Clone, Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Responses for each endpoint.
#[derive(Clone, Debug)]
pub struct Replies {
    pub couriers: Reply,
    pub create: Reply,
    pub fetch: Reply,
}

impl Default for Replies {
    fn default() -> Self {
        Self {
            couriers: couriers(&["cainiao", "dhl", "imile"]),
            create: Reply::json(
                StatusCode::CREATED,
                json!({ "meta": { "code": 201 }, "data": { "tracking": {} } }),
            ),
            fetch: Reply::json(
                StatusCode::NOT_FOUND,
                json!({ "meta": { "code": 4004, "type": "NotFound", "message": "Tracking does not exist." }, "data": {} }),
            ),
        }
    }
}

/// A successful `GET /couriers` response listing `slugs`.
pub fn couriers(slugs: &[&str]) -> Reply {
    let couriers = slugs
        .iter()
        .map(|slug| json!({ "slug": slug, "name": slug.to_uppercase() }))
        .collect::<Vec<_>>();
    Reply::json(
        StatusCode::OK,
        json!({ "meta": { "code": 200 }, "data": { "couriers": couriers } }),
    )
}

#[derive(Debug)]
struct Inner {
    replies: Replies,
    requests: Vec<Recorded>,
}

/// Handle to a running mock.
#[derive(Clone, Debug)]
pub struct MockAfterShip {
    pub url: Url,
    inner: Arc<Mutex<Inner>>,
}

impl MockAfterShip {
    /// Start the mock on an ephemeral local port.
    pub async fn spawn(replies: Replies) -> Result<Self> {
        let inner = Arc::new(Mutex::new(Inner {
            replies,
            requests: Vec::new(),
        }));
        let app = Router::new().fallback(handle).with_state(inner.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move { axum::serve(listener, app).await });

        Ok(Self {
            url: Url::parse(&format!("http://{addr}/"))?,
            inner,
        })
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().expect("lock mock").requests.clone()
    }
}

async fn handle(
    State(inner): State<Arc<Mutex<Inner>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(axum::http::HeaderName, &'static str); 1], String) {
    let path = uri.path().to_string();
    let mut inner = inner.lock().expect("lock mock");
    let reply = if path.ends_with("/couriers") {
        inner.replies.couriers.clone()
    } else if method == Method::POST && path.ends_with("/trackings") {
        inner.replies.create.clone()
    } else if path.contains("/trackings/") {
        inner.replies.fetch.clone()
    } else {
        Reply::text(StatusCode::NOT_FOUND, "")
    };

    inner.requests.push(Recorded {
        method,
        path,
        headers,
        body: serde_json::from_str(&body).ok(),
    });

    (reply.status, [(CONTENT_TYPE, "application/json")], reply.body)
}

/// An address nothing is listening on.
pub async fn closed_port() -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}
