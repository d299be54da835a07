//! Bounded retry with exponential backoff for blocking HTTP calls.

use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::error::ServiceError;

/// Upper bound on a single backoff delay.
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based), capped at [`MAX_BACKOFF`].
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(retry.min(i32::MAX as u32) as i32);
        Duration::try_from_secs_f64(self.initial_backoff.as_secs_f64() * factor)
            .unwrap_or(MAX_BACKOFF)
            .min(MAX_BACKOFF)
    }

    /// Runs `operation` until it succeeds, fails permanently or the retry
    /// budget is spent.
    pub fn run<T>(
        &self,
        label: &str,
        mut operation: impl FnMut() -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let mut retry = 0;
        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && retry < self.max_retries => {
                    let delay = self.backoff(retry);
                    warn!(
                        "{}: attempt {}/{} failed ({}), retrying in {:?}",
                        label,
                        retry + 1,
                        self.max_retries + 1,
                        err,
                        delay
                    );
                    thread::sleep(delay);
                    retry += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Sends a request built by `build`, turning non-success statuses into
    /// [`ServiceError::Status`] with the service's error message.
    pub fn send(
        &self,
        label: &str,
        build: impl Fn() -> reqwest::blocking::RequestBuilder,
    ) -> Result<reqwest::blocking::Response, ServiceError> {
        self.run(label, || {
            let response = build().send()?;
            let status = response.status();
            if status.is_success() {
                Ok(response)
            } else {
                let body = response.text().unwrap_or_default();
                Err(ServiceError::Status {
                    status: status.as_u16(),
                    message: api_message(&body),
                })
            }
        })
    }
}

/// Extracts a readable message from an error body.
///
/// Handles `{"error": {"message": ...}}`, `{"error": "..."}` and
/// `{"message": "..."}`, falling back to the raw text.
pub(crate) fn api_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };

    let message = value
        .pointer("/error/message")
        .or_else(|| value.get("error"))
        .or_else(|| value.get("message"))
        .and_then(|message| message.as_str());

    match message {
        Some(message) => message.to_string(),
        None => body.trim().to_string(),
    }
}
