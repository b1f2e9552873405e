//! AfterShip tracking API types and client.
//!
//! AfterShip serves two API generations. Which one a request goes to is
//! decided by the API key alone: keys minted for the current API start with
//! `asat_`, everything else is a legacy key. See [`ApiMode`].

use std::str::FromStr;

use derive_more::{Debug, Display, Error};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tap::Pipe;

pub mod couriers;
pub mod tracking;

#[cfg(feature = "client")]
mod client;

#[cfg(feature = "client")]
pub use client::{Client, REQUEST_TIMEOUT};

pub use couriers::{Courier, CourierList};
pub use tracking::{CreateTrackingBody, NewTracking, TrackingRecord};

/// The production API root; the per-mode base path is joined onto this.
pub const DEFAULT_API_URL: &str = "https://api.aftership.com/";

/// Error code AfterShip reports when the tracking already exists.
///
/// Responses carrying this code embed the existing (partial) tracking record
/// in their `data` field.
pub const DUPLICATE_TRACKING_CODE: i64 = 4003;

/// Prefix identifying keys for the current API generation.
const MODERN_KEY_PREFIX: &str = "asat_";

/// An API key for AfterShip.
///
/// The key is trimmed on construction and never printed by `Debug`.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Deserialize, Serialize)]
#[debug("ApiKey(..)")]
pub struct ApiKey(String);

impl ApiKey {
    /// Create a new key, trimming surrounding whitespace.
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(key.as_ref().trim().to_string())
    }

    /// View the key in plaintext.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the key is empty after trimming.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The API generation this key belongs to.
    pub fn mode(&self) -> ApiMode {
        ApiMode::detect(&self.0)
    }
}

impl FromStr for ApiKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

/// The API generation a request targets.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
pub enum ApiMode {
    /// The `v4` API, authenticated with `aftership-api-key`.
    #[display("legacy")]
    Legacy,

    /// The dated tracking API, authenticated with `as-api-key`.
    #[display("modern")]
    Modern,
}

impl ApiMode {
    /// Detect the mode from an API key.
    pub fn detect(key: &str) -> Self {
        if key.trim().starts_with(MODERN_KEY_PREFIX) {
            Self::Modern
        } else {
            Self::Legacy
        }
    }

    /// Path of the API relative to the API root, with a trailing slash.
    pub fn base_path(self) -> &'static str {
        match self {
            Self::Legacy => "v4/",
            Self::Modern => "tracking/2024-07/",
        }
    }

    /// Name of the header carrying the API key.
    pub fn auth_header(self) -> &'static str {
        match self {
            Self::Legacy => "aftership-api-key",
            Self::Modern => "as-api-key",
        }
    }
}

/// The `meta` object AfterShip attaches to every response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ErrorMeta {
    #[serde(default)]
    pub code: Option<i64>,

    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorMeta {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Body shape of an AfterShip error response.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    meta: ErrorMeta,

    #[serde(default)]
    data: Option<Value>,
}

/// A failed AfterShip request.
///
/// Every failure mode is folded into the same shape AfterShip uses for its
/// own errors, so network failures and unparseable bodies carry a best-effort
/// `meta.message` while real API errors keep their `code`, `type` and `data`
/// verbatim.
#[derive(Clone, Debug, Display, Error, PartialEq)]
#[display("{}", self.message())]
#[non_exhaustive]
pub struct ApiError {
    /// HTTP status, if a response was received.
    pub status: Option<u16>,

    pub meta: ErrorMeta,

    /// The `data` payload of the error response, if any.
    pub data: Option<Value>,
}

impl ApiError {
    /// The request never produced a response.
    pub fn network(reason: impl std::fmt::Display) -> Self {
        Self {
            status: None,
            meta: ErrorMeta::message(format!("Network error: {reason}")),
            data: None,
        }
    }

    /// The request could not be built.
    pub fn invalid_request(reason: impl std::fmt::Display) -> Self {
        Self {
            status: None,
            meta: ErrorMeta::message(reason.to_string()),
            data: None,
        }
    }

    /// A successful response whose body could not be decoded.
    pub fn decode(status: u16, err: impl std::fmt::Display) -> Self {
        Self {
            status: Some(status),
            meta: ErrorMeta::message(format!("decode response body: {err}")),
            data: None,
        }
    }

    /// Build the error for a non-success response.
    ///
    /// Structured bodies are kept as-is; anything else becomes the message,
    /// falling back to the status line when the body is empty.
    pub fn from_response(status: u16, reason: Option<&str>, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody { meta, data }) => Self {
                status: Some(status),
                meta,
                data,
            },
            Err(_) => {
                let message = if body.trim().is_empty() {
                    match reason {
                        Some(reason) => format!("HTTP Error {status}: {reason}"),
                        None => format!("HTTP Error {status}"),
                    }
                } else {
                    body.to_string()
                };
                Self {
                    status: Some(status),
                    meta: ErrorMeta::message(message),
                    data: None,
                }
            }
        }
    }

    /// Human readable message for the error.
    pub fn message(&self) -> &str {
        self.meta.message.as_deref().unwrap_or("API request failed.")
    }

    /// The partial record embedded in a duplicate tracking error.
    ///
    /// Returns `None` unless the error carries [`DUPLICATE_TRACKING_CODE`]
    /// together with a non-empty `data` object.
    pub fn duplicate_tracking(&self) -> Option<TrackingRecord> {
        if self.meta.code != Some(DUPLICATE_TRACKING_CODE) {
            return None;
        }
        match &self.data {
            Some(Value::Object(data)) if !data.is_empty() => {
                data.clone().pipe(TrackingRecord::from).pipe(Some)
            }
            _ => None,
        }
    }

    /// The `data` payload, if it carries anything worth showing.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref().filter(|data| match data {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        })
    }
}

/// Success envelope: `{"meta": {..}, "data": {..}}`.
#[cfg(feature = "client")]
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub(crate) data: Option<T>,
}
