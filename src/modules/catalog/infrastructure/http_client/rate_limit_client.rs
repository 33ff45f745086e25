//! HTTP client with rate limiting, retries and cooperative cancellation
//!
//! Every await point (rate-limit wait, send, body read, backoff sleep) races
//! the caller's cancellation token, so a superseded search stops consuming
//! quota as soon as it is cancelled.

use super::retry_policy::{is_retryable_error, is_retryable_status, retry_after, RetryPolicy};
use crate::modules::catalog::domain::entities::CatalogConfig;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::LogContext;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::num::NonZeroU32;
use std::time::Instant;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Header carrying the optional catalog API key
pub const API_KEY_HEADER: &str = "X-Api-Key";

#[derive(Debug)]
pub struct RateLimitClient {
    client: Client,
    rate_limiter: DefaultDirectRateLimiter,
    retry_policy: RetryPolicy,
    provider_name: String,
}

impl RateLimitClient {
    /// Client for the card catalog.
    ///
    /// The burst has to cover one full fan-out of planned queries, otherwise
    /// the parallel requests of a single search would be serialized.
    pub fn for_catalog(config: &CatalogConfig) -> AppResult<Self> {
        Self::new("PokemonTCG", config, RetryPolicy::interactive(), 10, 10)
    }

    pub fn new(
        provider_name: &str,
        config: &CatalogConfig,
        retry_policy: RetryPolicy,
        requests_per_second: u32,
        burst_size: u32,
    ) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| AppError::ConfigError(format!("Invalid API key header: {}", e)))?;
            headers.insert(API_KEY_HEADER, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            rate_limiter: Self::create_rate_limiter(requests_per_second, burst_size),
            retry_policy,
            provider_name: provider_name.to_string(),
        })
    }

    fn create_rate_limiter(requests_per_second: u32, burst_size: u32) -> DefaultDirectRateLimiter {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(burst_size).unwrap_or(NonZeroU32::MIN);
        RateLimiter::direct(Quota::per_second(rate).allow_burst(burst))
    }

    /// GET `url` and decode the JSON body, retrying transient failures
    pub async fn get_json<T>(&self, url: &str, cancel: &CancellationToken) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let mut attempt = 0;

        loop {
            Self::cancellable(cancel, self.rate_limiter.until_ready()).await?;

            LogContext::api_call(&self.provider_name, url, "started", None);
            let started = Instant::now();

            match Self::cancellable(cancel, self.client.get(url).send()).await? {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let body = Self::cancellable(cancel, response.text()).await??;
                        LogContext::api_call(
                            &self.provider_name,
                            url,
                            status.as_str(),
                            Some(started.elapsed().as_millis() as u64),
                        );
                        return self.parse_body(&body);
                    }

                    if is_retryable_status(status) && attempt < self.retry_policy.max_retries {
                        let delay = self
                            .retry_policy
                            .calculate_delay(attempt, retry_after(response.headers()));
                        warn!(
                            "{} API returned {} (attempt {}/{}). Retrying in {:?}",
                            self.provider_name,
                            status,
                            attempt + 1,
                            self.retry_policy.max_retries + 1,
                            delay
                        );
                        Self::cancellable(cancel, sleep(delay)).await?;
                        attempt += 1;
                        continue;
                    }

                    return Err(self.status_error(status));
                }
                Err(e) => {
                    if is_retryable_error(&e) && attempt < self.retry_policy.max_retries {
                        let delay = self.retry_policy.calculate_delay(attempt, None);
                        warn!(
                            "{} API request failed (attempt {}/{}): {}. Retrying in {:?}",
                            self.provider_name,
                            attempt + 1,
                            self.retry_policy.max_retries + 1,
                            e,
                            delay
                        );
                        Self::cancellable(cancel, sleep(delay)).await?;
                        attempt += 1;
                        continue;
                    }

                    return Err(AppError::from(e));
                }
            }
        }
    }

    /// Race `fut` against the token; the token wins ties
    async fn cancellable<F>(cancel: &CancellationToken, fut: F) -> AppResult<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AppError::Cancelled("catalog request superseded".to_string())),
            output = fut => Ok(output),
        }
    }

    fn parse_body<T>(&self, body: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            AppError::SerializationError(format!(
                "Failed to parse {} response: {}. Response: {}",
                self.provider_name, e, preview
            ))
        })
    }

    fn status_error(&self, status: StatusCode) -> AppError {
        let message = format!("{} API returned {}", self.provider_name, status);
        match status.as_u16() {
            429 => AppError::RateLimitError(message),
            404 => AppError::NotFound(message),
            401 | 403 => AppError::Unauthorized(message),
            500..=599 => AppError::ExternalServiceError(message),
            _ => AppError::ApiError(message),
        }
    }

    /// Check if a request can be made now (for testing/debugging)
    pub fn can_make_request_now(&self) -> bool {
        self.rate_limiter.check().is_ok()
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }
}
