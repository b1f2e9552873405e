//! The tracking form page.

use axum::response::{Html, IntoResponse, Response};
use derive_more::Debug;

/// Banner shown under the form after a submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Ok(String),
    Error(String),
}

/// The form page, optionally pre-filled and with a status banner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Page {
    #[debug(skip)]
    pub api_key: String,
    pub tracking_number: String,
    pub courier_code: String,
    pub status: Option<Status>,
}

impl Page {
    /// The page with an error banner.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.status = Some(Status::Error(message.into()));
        self
    }

    /// The page with a success banner.
    pub fn ok(mut self, message: impl Into<String>) -> Self {
        self.status = Some(Status::Ok(message.into()));
        self
    }

    pub fn render(&self) -> String {
        let status = match &self.status {
            Some(Status::Error(message)) => {
                format!(r#"<div class="status error">{}</div>"#, escape(message))
            }
            Some(Status::Ok(message)) => {
                format!(r#"<div class="status ok">{}</div>"#, escape(message))
            }
            None => String::new(),
        };

        format!(
            include_str!("page.html"),
            api_key = escape(&self.api_key),
            tracking_number = escape(&self.tracking_number),
            courier_code = escape(&self.courier_code),
            status = status,
        )
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        Html(self.render()).into_response()
    }
}

/// Escape text for use in HTML content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}
