use anyhow::{Context, anyhow};
use reqwest::header::HeaderMap;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Sends `builder` once. Non-success statuses become errors labelled with
/// `label` (method and path).
pub(crate) async fn send(builder: RequestBuilder, label: &str) -> anyhow::Result<Response> {
    send_allow_statuses(builder, label, &[]).await
}

/// Like [`send`], but statuses in `allowed` are handed back to the caller.
pub(crate) async fn send_allow_statuses(
    builder: RequestBuilder,
    label: &str,
    allowed: &[StatusCode],
) -> anyhow::Result<Response> {
    let response = builder
        .send()
        .await
        .with_context(|| format!("send {label}"))?;
    let status = response.status();
    if status.is_success() || allowed.contains(&status) {
        return Ok(response);
    }
    Err(status_error(response, label).await)
}

async fn status_error(response: Response, label: &str) -> anyhow::Error {
    let status = response.status();
    let reset = rate_limited_reset_seconds(status, response.headers());
    let body: ApiErrorBody = response.json().await.unwrap_or_default();
    let mut message = format!("{label} returned {status}");
    if let Some(detail) = body.message.filter(|detail| !detail.is_empty()) {
        message.push_str(": ");
        message.push_str(&detail);
    }
    if let Some(seconds) = reset {
        message.push_str(&format!(" (rate limit resets in {seconds}s)"));
    }
    anyhow!(message)
}

fn rate_limited_reset_seconds(status: StatusCode, headers: &HeaderMap) -> Option<u64> {
    if !matches!(status, StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS) {
        return None;
    }
    let remaining = headers
        .get("x-ratelimit-remaining")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())?;
    if remaining > 0 {
        return None;
    }
    ratelimit_reset_seconds(headers)
}

fn ratelimit_reset_seconds(headers: &HeaderMap) -> Option<u64> {
    let reset = headers
        .get("x-ratelimit-reset")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())?;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    Some(reset.saturating_sub(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers_with(remaining: &str, reset: u64) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_str(remaining).unwrap());
        headers.insert(
            "x-ratelimit-reset",
            HeaderValue::from_str(&reset.to_string()).unwrap(),
        );
        headers
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    #[test]
    fn exhausted_rate_limit_reports_reset() {
        let headers = headers_with("0", now() + 30);
        let seconds = rate_limited_reset_seconds(StatusCode::FORBIDDEN, &headers).unwrap();
        assert!(seconds > 0 && seconds <= 30);
    }

    #[test]
    fn remaining_quota_is_not_a_rate_limit() {
        let headers = headers_with("12", now() + 30);
        assert_eq!(rate_limited_reset_seconds(StatusCode::FORBIDDEN, &headers), None);
        let headers = headers_with("0", now() + 30);
        assert_eq!(rate_limited_reset_seconds(StatusCode::NOT_FOUND, &headers), None);
    }

    #[test]
    fn past_reset_is_zero() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1"));
        assert_eq!(ratelimit_reset_seconds(&headers), Some(0));
    }
}
