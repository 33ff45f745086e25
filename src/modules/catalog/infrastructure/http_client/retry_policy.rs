//! Retry policy for catalog requests
//!
//! Interactive search cannot afford the long backoffs a bulk sync would use,
//! so the defaults retry a couple of times quickly and honor `Retry-After`.

use reqwest::StatusCode;
use std::time::Duration;

/// Configuration for HTTP retry behavior
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay between retries
    pub base_delay: Duration,
    /// Maximum delay to wait (prevents excessive waits)
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Add up to 10% random jitter to each delay
    pub jitter: bool,
}

impl RetryPolicy {
    /// Policy for interactive search against the card catalog
    pub fn interactive() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(400),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }

    /// Calculate delay for the next retry attempt (0-based)
    pub fn calculate_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        // If server provided Retry-After header, respect it
        if let Some(server_delay) = retry_after {
            return server_delay.min(self.max_delay);
        }

        let multiplier = self.backoff_multiplier.powi(attempt as i32);
        let mut delay =
            Duration::from_millis((self.base_delay.as_millis() as f64 * multiplier) as u64)
                .min(self.max_delay);

        if self.jitter && !delay.is_zero() {
            let jitter_ms = (delay.as_millis() as f64 * 0.1 * rand::random::<f64>()) as u64;
            delay += Duration::from_millis(jitter_ms);
        }

        delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::interactive()
    }
}

/// Parse a `Retry-After` header expressed in seconds
pub fn retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Whether a response status is worth retrying
pub fn is_retryable_status(status: StatusCode) -> bool {
    match status.as_u16() {
        // Rate limiting
        429 => true,
        // Request timeout / too early
        408 | 425 => true,
        // Server errors, gateway timeouts in particular
        500..=599 => true,
        _ => false,
    }
}

/// Determines if a transport error is retryable
pub fn is_retryable_error(error: &reqwest::Error) -> bool {
    match error.status() {
        Some(status) => is_retryable_status(status),
        None => error.is_timeout() || error.is_connect(),
    }
}
