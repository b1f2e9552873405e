//! Plain-text rendering of tracking results.

use clients::aftership::ApiError;
use parcel::Tracked;

/// Fields of a tracked parcel, one `- name: value` line each.
pub fn tracked(tracked: &Tracked) -> String {
    format!(
        "- courier_code: {}\n- tracking_number: {}\n- tag: {}\n",
        tracked.courier_code, tracked.tracking_number, tracked.tag
    )
}

/// Suggestions for an unresolved courier code.
pub fn suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        return String::from("No close match found. Check available codes from /couriers endpoint.\n");
    }

    suggestions
        .iter()
        .map(|suggestion| format!("- {suggestion}\n"))
        .fold(String::from("Try one of these:\n"), |out, line| out + &line)
}

/// The fields AfterShip reported for a failed request.
///
/// Fields the response didn't carry are left out; `data` is pretty printed.
pub fn api_error(err: &ApiError) -> String {
    let data = err
        .data()
        .map(|data| serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string()));
    [
        err.meta.code.map(|code| format!("- code: {code}\n")),
        err.meta.kind.as_ref().map(|kind| format!("- type: {kind}\n")),
        err.meta.message.as_ref().map(|message| format!("- message: {message}\n")),
        data.map(|data| format!("- data: {data}\n")),
    ]
    .into_iter()
    .flatten()
    .collect()
}
