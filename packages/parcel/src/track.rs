//! Submitting trackings.
//!
//! [`submit`] drives one tracking request end to end:
//!
//! ```text
//! list couriers -> normalize -> create -+-> created
//!                      |                |
//!                      v                +-> duplicate -> refetch -+-> refetched
//!                   rejected                                      |
//!                                                                 +-> partial record
//! ```
//!
//! Nothing is retried; any error other than a duplicate tracking ends the
//! flow.

use std::{collections::BTreeSet, future::Future};

use clients::aftership::{ApiError, TrackingRecord};
use tracing::{debug, info, instrument, warn};

use crate::courier::{Normalized, Normalizer};

/// Error shown when the courier input can't be resolved.
pub const INVALID_COURIER: &str = "The value of courier_code is invalid.";

/// Tag reported for a new tracking that came back without one.
const DEFAULT_TAG: &str = "N/A";

/// Tag reported for an existing tracking that came back without one.
const EXISTING_TAG: &str = "Existing";

/// The tracking API operations [`submit`] depends on.
pub trait TrackingApi {
    /// Slugs of every courier the account can track with.
    fn list_couriers(&self) -> impl Future<Output = Result<BTreeSet<String>, ApiError>> + Send;

    fn create_tracking(
        &self,
        slug: &str,
        tracking_number: &str,
    ) -> impl Future<Output = Result<TrackingRecord, ApiError>> + Send;

    fn fetch_tracking(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<TrackingRecord, ApiError>> + Send;
}

impl TrackingApi for clients::AfterShip {
    fn list_couriers(&self) -> impl Future<Output = Result<BTreeSet<String>, ApiError>> + Send {
        clients::AfterShip::list_couriers(self)
    }

    fn create_tracking(
        &self,
        slug: &str,
        tracking_number: &str,
    ) -> impl Future<Output = Result<TrackingRecord, ApiError>> + Send {
        clients::AfterShip::create_tracking(self, slug, tracking_number)
    }

    fn fetch_tracking(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<TrackingRecord, ApiError>> + Send {
        clients::AfterShip::fetch_tracking(self, id)
    }
}

/// Result of a submitted tracking request.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The tracking was created, or already existed.
    Tracked(Tracked),

    /// The courier input didn't resolve; nothing was sent.
    Rejected { suggestions: Vec<String> },
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Tracked(_))
    }

    /// The user-facing error, for rejected requests.
    pub fn error(&self) -> Option<&'static str> {
        match self {
            Self::Tracked(_) => None,
            Self::Rejected { .. } => Some(INVALID_COURIER),
        }
    }
}

/// A tracking as reported back to the user.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct Tracked {
    pub courier_code: String,
    pub tracking_number: String,

    /// Delivery status tag.
    pub tag: String,

    /// The record the fields were read from.
    pub raw: TrackingRecord,
}

impl Tracked {
    /// Read the reported fields from `record`, then `partial`, then fall back
    /// to what the user submitted.
    fn resolve(
        record: TrackingRecord,
        partial: Option<&TrackingRecord>,
        courier_code: &str,
        tracking_number: &str,
        default_tag: &str,
    ) -> Self {
        let field = |name: &str, default: &str| {
            record
                .field(name)
                .or_else(|| partial.and_then(|partial| partial.field(name)))
                .unwrap_or(default)
                .to_string()
        };
        Self {
            courier_code: field("slug", courier_code),
            tracking_number: field("tracking_number", tracking_number),
            tag: field("tag", default_tag),
            raw: record,
        }
    }
}

/// How the create step concluded.
///
/// AfterShip refuses to create a tracking that already exists, but tells us
/// which one it is: the error embeds a partial record. That record is used
/// to look up the full tracking, and stands in for it if the lookup fails.
#[derive(Clone, Debug, PartialEq)]
pub enum Reconciliation {
    /// A new tracking was created.
    Created(TrackingRecord),

    /// The tracking existed and was fetched in full.
    Refetched {
        record: TrackingRecord,
        partial: TrackingRecord,
    },

    /// The tracking existed but only the partial record is available.
    ///
    /// `refetch_error` is `None` when the partial record had no id to fetch.
    Fallback {
        partial: TrackingRecord,
        refetch_error: Option<ApiError>,
    },
}

impl Reconciliation {
    /// Create the tracking, reconciling a duplicate tracking error.
    #[instrument(skip(api))]
    pub async fn create(
        api: &impl TrackingApi,
        courier_code: &str,
        tracking_number: &str,
    ) -> Result<Self, ApiError> {
        let err = match api.create_tracking(courier_code, tracking_number).await {
            Ok(record) => return Ok(Self::Created(record)),
            Err(err) => err,
        };
        let Some(partial) = err.duplicate_tracking() else {
            return Err(err);
        };

        info!(id = ?partial.id(), "tracking already exists");
        let Some(id) = partial.id().map(String::from) else {
            return Ok(Self::Fallback {
                partial,
                refetch_error: None,
            });
        };

        match api.fetch_tracking(&id).await {
            Ok(record) => Ok(Self::Refetched { record, partial }),
            Err(err) => {
                warn!(%id, ?err, "refetch existing tracking");
                Ok(Self::Fallback {
                    partial,
                    refetch_error: Some(err),
                })
            }
        }
    }

    /// Report the tracking, filling gaps with what the user submitted.
    pub fn into_tracked(self, courier_code: &str, tracking_number: &str) -> Tracked {
        match self {
            Self::Created(record) => {
                Tracked::resolve(record, None, courier_code, tracking_number, DEFAULT_TAG)
            }
            Self::Refetched { record, partial } => Tracked::resolve(
                record,
                Some(&partial),
                courier_code,
                tracking_number,
                EXISTING_TAG,
            ),
            Self::Fallback { partial, .. } => {
                Tracked::resolve(partial, None, courier_code, tracking_number, EXISTING_TAG)
            }
        }
    }
}

/// Normalize the courier input and create the tracking.
///
/// The courier listing is fetched fresh on every call.
#[instrument(skip(api, normalizer))]
pub async fn submit(
    api: &impl TrackingApi,
    normalizer: &Normalizer,
    tracking_number: &str,
    courier_input: &str,
) -> Result<Outcome, ApiError> {
    let valid = api.list_couriers().await?;
    let courier_code = match normalizer.normalize(courier_input, &valid) {
        Normalized::Resolved(code) => code,
        Normalized::Unresolved { suggestions } => {
            return Ok(Outcome::Rejected { suggestions });
        }
    };
    debug!(%courier_code, "normalized courier");

    Reconciliation::create(api, &courier_code, tracking_number)
        .await
        .map(|reconciled| reconciled.into_tracked(&courier_code, tracking_number))
        .map(Outcome::Tracked)
}
