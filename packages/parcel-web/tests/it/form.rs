//! Tests for the tracking form endpoints.

use std::time::Duration;

use color_eyre::Result;
use pretty_assertions::assert_eq as pretty_assert_eq;
use reqwest::{StatusCode, header::CONTENT_TYPE};

use crate::TestFixture;

async fn post_form(fixture: &TestFixture, fields: &[(&str, &str)]) -> Result<String> {
    let url = fixture.base_url.join("track")?;
    let response = reqwest::Client::new().post(url).form(fields).send().await?;
    pretty_assert_eq!(response.status(), StatusCode::OK);
    Ok(response.text().await?)
}

fn fields<'a>(tracking_number: &'a str, courier_code: &'a str) -> [(&'a str, &'a str); 3] {
    [
        ("api_key", "test-key"),
        ("tracking_number", tracking_number),
        ("courier_code", courier_code),
    ]
}

#[test_log::test(tokio::test)]
async fn renders_empty_form() -> Result<()> {
    let fixture = TestFixture::spawn().await?;

    let response = reqwest::get(fixture.base_url.clone()).await?;
    pretty_assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(String::from);
    pretty_assert_eq!(content_type.as_deref(), Some("text/html; charset=utf-8"));

    let body = response.text().await?;
    assert!(body.contains(r#"<form method="post" action="/track">"#));
    assert!(!body.contains(r#"class="status"#));
    Ok(())
}

#[tokio::test]
async fn health() -> Result<()> {
    let fixture = TestFixture::spawn().await?;

    let response = reqwest::get(fixture.base_url.join("health")?).await?;
    pretty_assert_eq!(response.status(), StatusCode::OK);
    pretty_assert_eq!(response.text().await?, "ok");
    Ok(())
}

#[tokio::test]
async fn unknown_path_is_not_found() -> Result<()> {
    let fixture = TestFixture::spawn().await?;

    let response = reqwest::get(fixture.base_url.join("nope")?).await?;
    pretty_assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn wrong_method_is_not_found() -> Result<()> {
    let fixture = TestFixture::spawn().await?;
    let client = reqwest::Client::new();

    let response = client.get(fixture.base_url.join("track")?).send().await?;
    pretty_assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client.post(fixture.base_url.clone()).send().await?;
    pretty_assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn tracks_parcel() -> Result<()> {
    let fixture = TestFixture::spawn().await?;

    let body = post_form(&fixture, &fields(" IM1 ", "imilie")).await?;
    assert!(
        body.contains(
            "<div class=\"status ok\">Tracking created/fetched successfully.\ncourier_code: imile\ntracking_number: IM1\ntag: N/A</div>"
        ),
        "body: {body}"
    );
    assert!(body.contains(r#"name="tracking_number" value="IM1""#));
    assert!(body.contains(r#"name="courier_code" value="imilie""#));
    pretty_assert_eq!(fixture.upstream_calls(), 2);
    Ok(())
}

#[tokio::test]
async fn existing_tracking_is_refetched() -> Result<()> {
    let fixture = TestFixture::spawn().await?;

    let body = post_form(&fixture, &fields("DUP", "imile")).await?;
    assert!(
        body.contains("courier_code: imile\ntracking_number: DUP\ntag: Delivered</div>"),
        "body: {body}"
    );
    pretty_assert_eq!(fixture.upstream_calls(), 3);
    Ok(())
}

#[tokio::test]
async fn unknown_courier_shows_suggestions() -> Result<()> {
    let fixture = TestFixture::spawn().await?;

    let body = post_form(&fixture, &fields("IM1", "cainaio")).await?;
    assert!(
        body.contains(
            "<div class=\"status error\">The value of courier_code is invalid.\nTry:\n- cainiao</div>"
        ),
        "body: {body}"
    );
    pretty_assert_eq!(fixture.upstream_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn unmatched_courier_has_no_suggestions() -> Result<()> {
    let fixture = TestFixture::spawn().await?;

    let body = post_form(&fixture, &fields("IM1", "totally-unknown-xyz")).await?;
    assert!(body.contains("Try:\n(no close suggestions)</div>"), "body: {body}");
    Ok(())
}

#[tokio::test]
async fn api_error_is_shown() -> Result<()> {
    let fixture = TestFixture::spawn().await?;

    let body = post_form(&fixture, &fields("DENY", "imile")).await?;
    assert!(
        body.contains(
            "API error:\n{\n  &quot;code&quot;: 401,\n  &quot;type&quot;: &quot;Unauthorized&quot;,\n  &quot;message&quot;: &quot;Invalid API key.&quot;\n}"
        ),
        "body: {body}"
    );
    Ok(())
}

#[tokio::test]
async fn missing_fields_skip_the_api() -> Result<()> {
    let fixture = TestFixture::spawn().await?;

    let body = post_form(&fixture, &[("api_key", "  "), ("tracking_number", "IM1")]).await?;
    assert!(
        body.contains(
            "<div class=\"status error\">Please fill in API key, tracking number, and courier code.</div>"
        ),
        "body: {body}"
    );
    assert!(body.contains(r#"name="tracking_number" value="IM1""#));
    pretty_assert_eq!(fixture.upstream_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn oversized_body_is_rejected() -> Result<()> {
    let fixture = TestFixture::spawn().await?;

    let padding = "x".repeat(100 * 1024);
    let response = reqwest::Client::new()
        .post(fixture.base_url.join("track")?)
        .form(&fields(&padding, "imile"))
        .send()
        .await?;
    pretty_assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    pretty_assert_eq!(fixture.upstream_calls(), 0);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn upstream_timeout_is_rendered() -> Result<()> {
    let fixture = TestFixture::spawn_with_request_timeout(Duration::from_millis(250)).await?;

    let body = post_form(&fixture, &fields("SLOW", "imile")).await?;
    assert!(body.contains("<div class=\"status error\">API error:\n"), "body: {body}");
    assert!(
        body.contains("&quot;message&quot;: &quot;Network error: "),
        "body: {body}"
    );
    assert!(body.contains(r#"name="tracking_number" value="SLOW""#));
    Ok(())
}
