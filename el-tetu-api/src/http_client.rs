//! Request execution shared by every API call
//!
//! Sends a prepared `RequestBuilder`, logs the exchange, classifies transport
//! failures and transient statuses into [`ApiError`], and optionally retries
//! them with exponential backoff.

use std::time::Duration;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};
use crate::utils::log_sanitizer::truncate_for_log;

/// Longest honored `Retry-After`.
const MAX_RETRY_AFTER_SECS: u64 = 30;

/// Longest exponential backoff step.
const MAX_BACKOFF_MS: u64 = 10_000;

pub(crate) struct HttpUtils;

impl HttpUtils {
    /// Send the request and return `(status, body)`.
    ///
    /// # Arguments
    /// * `request_builder` - request with URL, headers and body already set
    /// * `method` - HTTP method name, for logging
    /// * `path` - API path relative to the base URL, for logging
    ///
    /// # Returns
    /// * `Ok((status, body))` - any status except 429 and 502/503/504
    /// * `Err(ApiError::RateLimited)` - HTTP 429, with `Retry-After` and body
    /// * `Err(ApiError::Unavailable)` - HTTP 502/503/504, with status and body
    /// * `Err(ApiError::Timeout | ApiError::NetworkError)` - no response
    pub(crate) async fn execute_request(
        request_builder: RequestBuilder,
        method: &str,
        path: &str,
    ) -> ApiResult<(u16, String)> {
        log::debug!("[api] {method} {path}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout {
                    detail: e.to_string(),
                }
            } else {
                ApiError::NetworkError {
                    detail: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        log::debug!("[api] {method} {path} -> {status}");

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        if status == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[api] Rate limited on {path}, retry_after={retry_after:?}");
            return Err(ApiError::RateLimited {
                retry_after,
                body: serde_json::from_str(&body).ok(),
            });
        }

        if matches!(status, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!(
                "[api] Upstream unavailable on {path} (HTTP {status}): {}",
                truncate_for_log(&body)
            );
            return Err(ApiError::unavailable(status, &body));
        }

        let text = response.text().await.map_err(|e| ApiError::NetworkError {
            detail: format!("Failed to read response body: {e}"),
        })?;
        log::debug!("[api] Response body: {}", truncate_for_log(&text));

        Ok((status, text))
    }

    /// Decode a success body.
    ///
    /// # Arguments
    /// * `text` - response body
    /// * `path` - API path, for the error log
    ///
    /// # Returns
    /// * `Ok(T)` - decoded body
    /// * `Err(ApiError::ParseError)` - body does not match `T`
    pub(crate) fn parse_json<T>(text: &str, path: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(text).map_err(|e| {
            log::error!("[api] JSON parse failed for {path}: {e}");
            log::error!("[api] Raw response: {}", truncate_for_log(text));
            ApiError::ParseError {
                detail: e.to_string(),
            }
        })
    }

    /// [`execute_request`](Self::execute_request) with up to `max_retries`
    /// extra attempts for transient failures.
    ///
    /// # Arguments
    /// * `request_builder` - request to send; cloned for every attempt
    /// * `method` - HTTP method name, for logging
    /// * `path` - API path, for logging
    /// * `max_retries` - extra attempts after the first (0 sends once)
    ///
    /// # Returns
    /// * `Ok((status, body))` - first attempt that got a non-transient answer
    /// * `Err(ApiError)` - the last transient error, or the first other one
    ///
    /// # Retry strategy
    /// - Network errors, timeouts, 429 and 502/503/504 are retried
    /// - Backoff doubles from 100ms up to 10s; a `Retry-After` from a 429
    ///   is honored up to 30s
    /// - Non-transient errors are returned immediately
    pub(crate) async fn execute_request_with_retry(
        request_builder: RequestBuilder,
        method: &str,
        path: &str,
        max_retries: u32,
    ) -> ApiResult<(u16, String)> {
        if max_retries == 0 {
            return Self::execute_request(request_builder, method, path).await;
        }

        let mut last_error = None;

        for attempt in 0..=max_retries {
            let Some(req) = request_builder.try_clone() else {
                log::warn!("[api] Cannot clone request for {path}, sending once");
                return Self::execute_request(request_builder, method, path).await;
            };

            match Self::execute_request(req, method, path).await {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt < max_retries && e.is_retryable() => {
                    let delay = retry_delay(&e, attempt);
                    log::warn!(
                        "[api] {method} {path} failed (attempt {}/{}), retrying in {:.1}s: {e}",
                        attempt + 1,
                        max_retries,
                        delay.as_secs_f32(),
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ApiError::NetworkError {
            detail: "All retries exhausted with no error captured".to_string(),
        }))
    }
}

fn retry_delay(error: &ApiError, attempt: u32) -> Duration {
    if let ApiError::RateLimited {
        retry_after: Some(secs),
        ..
    } = error
    {
        Duration::from_secs((*secs).min(MAX_RETRY_AFTER_SECS))
    } else {
        backoff_delay(attempt)
    }
}

/// 100ms, 200ms, 400ms, ... capped at 10s.
fn backoff_delay(attempt: u32) -> Duration {
    let shift = attempt.min(20);
    let delay_ms = 100_u64.saturating_mul(1_u64 << shift);
    Duration::from_millis(delay_ms.min(MAX_BACKOFF_MS))
}
