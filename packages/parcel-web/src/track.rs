//! Form handlers.

use axum::{Form, extract::State};
use clients::{AfterShip, ApiKey, aftership::ApiError};
use derive_more::Debug;
use parcel::{Outcome, Tracked, track::INVALID_COURIER};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{AppState, page::Page};

/// Banner shown when a field is left blank.
pub const MISSING_FIELDS: &str = "Please fill in API key, tracking number, and courier code.";

/// Fields posted by the tracking form.
///
/// Missing fields read as empty.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TrackForm {
    #[debug(skip)]
    pub api_key: String,
    pub tracking_number: String,
    pub courier_code: String,
}

impl TrackForm {
    fn trimmed(self) -> Self {
        Self {
            api_key: self.api_key.trim().to_string(),
            tracking_number: self.tracking_number.trim().to_string(),
            courier_code: self.courier_code.trim().to_string(),
        }
    }
}

impl From<&TrackForm> for Page {
    fn from(form: &TrackForm) -> Self {
        Self {
            api_key: form.api_key.clone(),
            tracking_number: form.tracking_number.clone(),
            courier_code: form.courier_code.clone(),
            status: None,
        }
    }
}

/// Render the empty form.
///
/// ## Endpoint
/// ```text
/// GET /
/// ```
pub async fn form() -> Page {
    Page::default()
}

/// Submit a tracking and render the result under the re-filled form.
///
/// ## Endpoint
/// ```text
/// POST /track
/// Content-Type: application/x-www-form-urlencoded
/// ```
///
/// ## Responses
/// Always 200 with the form page; the banner reports missing fields, an
/// unresolved courier, an API error or the tracked parcel.
#[instrument(skip_all)]
pub async fn submit(State(state): State<AppState>, Form(form): Form<TrackForm>) -> Page {
    let form = form.trimmed();
    let page = Page::from(&form);
    if form.api_key.is_empty() || form.tracking_number.is_empty() || form.courier_code.is_empty() {
        return page.error(MISSING_FIELDS);
    }

    let client = AfterShip::with_http(
        state.api_root.clone(),
        ApiKey::new(&form.api_key),
        state.http.clone(),
    );
    let outcome = parcel::submit(
        &client,
        &state.normalizer,
        &form.tracking_number,
        &form.courier_code,
    )
    .await;

    match outcome {
        Ok(Outcome::Tracked(tracked)) => {
            info!(courier = %tracked.courier_code, tag = %tracked.tag, "track.submit.success");
            page.ok(tracked_message(&tracked))
        }
        Ok(Outcome::Rejected { suggestions }) => {
            info!(courier = %form.courier_code, ?suggestions, "track.submit.rejected");
            page.error(rejected_message(&suggestions))
        }
        Err(err) => {
            warn!(?err, "track.submit.error");
            page.error(api_error_message(&err))
        }
    }
}

fn tracked_message(tracked: &Tracked) -> String {
    format!(
        "Tracking created/fetched successfully.\ncourier_code: {}\ntracking_number: {}\ntag: {}",
        tracked.courier_code, tracked.tracking_number, tracked.tag
    )
}

fn rejected_message(suggestions: &[String]) -> String {
    let suggestions = if suggestions.is_empty() {
        String::from("(no close suggestions)")
    } else {
        suggestions
            .iter()
            .map(|suggestion| format!("- {suggestion}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!("{INVALID_COURIER}\nTry:\n{suggestions}")
}

/// The parts of an API error worth showing in the browser.
#[derive(Debug, Serialize)]
struct ErrorSummary<'a> {
    code: Option<i64>,
    #[serde(rename = "type")]
    kind: Option<&'a str>,
    message: &'a str,
}

fn api_error_message(err: &ApiError) -> String {
    let summary = ErrorSummary {
        code: err.meta.code,
        kind: err.meta.kind.as_deref(),
        message: err.message(),
    };
    let summary = serde_json::to_string_pretty(&summary).unwrap_or_else(|_| err.to_string());
    format!("API error:\n{summary}")
}
