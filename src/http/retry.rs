//! Retry policy for upstream API calls.
//!
//! Client errors (bad token, rate limit, missing repository) will fail the
//! same way on every attempt and are reported immediately; server errors and
//! transport failures are retried.

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use thiserror::Error;

/// Maximum number of attempts for a network operation.
pub const MAX_RETRIES: usize = 3;

/// Delay between retry attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// Errors that should not be retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NonRetryableError {
    #[error(
        "Rate limit exceeded for {0}. Try again later or set the GITHUB_TOKEN environment variable."
    )]
    RateLimitExceeded(String),

    #[error("Authentication failed for {0}. Check your GITHUB_TOKEN.")]
    AuthenticationFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Access forbidden: {0}. You may need authentication.")]
    Forbidden(String),

    #[error("Request error: HTTP {status} from {url}")]
    ClientError { status: u16, url: String },
}

/// Classify a non-success response.
///
/// Returns `Some` for responses that must not be retried. GitHub reports an
/// exhausted quota as 403 with `x-ratelimit-remaining: 0`, so headers are
/// inspected before the status is treated as a plain "forbidden".
pub fn classify_response(
    status: StatusCode,
    headers: &HeaderMap,
    url: &str,
) -> Option<NonRetryableError> {
    let quota_exhausted = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "0")
        .unwrap_or(false);

    match status {
        StatusCode::UNAUTHORIZED => Some(NonRetryableError::AuthenticationFailed(url.to_string())),
        StatusCode::TOO_MANY_REQUESTS => Some(NonRetryableError::RateLimitExceeded(url.to_string())),
        StatusCode::FORBIDDEN if quota_exhausted => {
            Some(NonRetryableError::RateLimitExceeded(url.to_string()))
        }
        StatusCode::FORBIDDEN => Some(NonRetryableError::Forbidden(url.to_string())),
        StatusCode::NOT_FOUND => Some(NonRetryableError::NotFound(url.to_string())),
        s if s.is_client_error() => Some(NonRetryableError::ClientError {
            status: s.as_u16(),
            url: url.to_string(),
        }),
        // 5xx and anything unusual is worth another attempt
        _ => None,
    }
}

/// True if an error returned by an attempt may succeed when tried again.
pub fn is_retryable(error: &anyhow::Error) -> bool {
    error.downcast_ref::<NonRetryableError>().is_none()
}
