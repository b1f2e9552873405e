//! Tracking API types.

use bon::Builder;
use derive_more::{AsRef, From};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::aftership::ApiMode;

/// A tracking as returned by AfterShip.
///
/// The payload is kept opaque; only the handful of fields this crate cares
/// about get typed accessors. A field counts as present only when it is a
/// JSON string.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, From, AsRef)]
#[serde(transparent)]
pub struct TrackingRecord(Map<String, Value>);

impl TrackingRecord {
    /// Extract the record from a response `data` payload.
    ///
    /// Depending on the API generation the tracking is either nested under
    /// `data.tracking` or is `data` itself.
    pub fn from_data(data: Value) -> Self {
        match data {
            Value::Object(mut data) => match data.remove("tracking") {
                Some(Value::Object(tracking)) => Self(tracking),
                Some(other) => {
                    data.insert(String::from("tracking"), other);
                    Self(data)
                }
                None => Self(data),
            },
            _ => Self::default(),
        }
    }

    /// Read a string field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// The AfterShip tracking id; empty ids are treated as absent.
    pub fn id(&self) -> Option<&str> {
        self.field("id").filter(|id| !id.is_empty())
    }

    pub fn slug(&self) -> Option<&str> {
        self.field("slug")
    }

    pub fn tracking_number(&self) -> Option<&str> {
        self.field("tracking_number")
    }

    /// The delivery status tag, e.g. `InTransit`.
    pub fn tag(&self) -> Option<&str> {
        self.field("tag")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The full payload.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// The two logical fields sent when creating a tracking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[non_exhaustive]
pub struct NewTracking {
    #[builder(into)]
    pub slug: String,

    #[builder(into)]
    pub tracking_number: String,
}

/// Body of `POST /trackings`.
///
/// The current API takes the tracking as the body itself; the legacy API
/// wants it wrapped in a `tracking` envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CreateTrackingBody {
    Flat(NewTracking),
    Nested { tracking: NewTracking },
}

impl CreateTrackingBody {
    /// Shape the body for the given API generation.
    pub fn new(mode: ApiMode, tracking: NewTracking) -> Self {
        match mode {
            ApiMode::Modern => Self::Flat(tracking),
            ApiMode::Legacy => Self::Nested { tracking },
        }
    }
}
