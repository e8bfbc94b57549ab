use reqwest::StatusCode;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{HttpError, HttpResponse, OutboundRequest, Result, RetryConfig, Transport};

/// Status codes that are retried: 408, 502, 503 and 504.
pub const RETRYABLE_STATUSES: [StatusCode; 4] = [
    StatusCode::REQUEST_TIMEOUT,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

pub fn is_retryable_status(status: StatusCode) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// [`Transport`] decorator that retries transient failures with exponential
/// backoff.
///
/// Each call to [`send`](Transport::send) runs at most
/// [`RetryConfig::max_attempts`] sequential attempts:
///
/// - a response whose status is not in [`RETRYABLE_STATUSES`] is returned
///   immediately, error statuses such as 400 or 500 included;
/// - a retryable status is retried, and the last response is returned as-is
///   once attempts run out;
/// - an [`HttpError::Request`] is retried, and the original error is returned
///   once attempts run out;
/// - any other error is returned immediately.
///
/// Attempt `n` is followed by a wait of `backoff_base_secs ^ n` seconds.
/// Cancelling the token during a send or a wait ends the sequence with
/// [`HttpError::Cancelled`]. The wrapper holds no per-call state, so
/// concurrent sends through one instance are independent.
///
/// # Example
///
/// ```no_run
/// use http_request_kit::{RequestBuilder, ReqwestTransport, RetryConfig, RetryTransport, Transport};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn run() -> http_request_kit::Result<()> {
/// let transport = RetryTransport::new(
///     ReqwestTransport::new().with_base_url("https://api.example.com/")?,
///     RetryConfig::new(3, 2.0),
/// )?;
/// let request = RequestBuilder::get("things/{0}", &[42.into()]).build()?;
/// let response = transport.send(&request, &CancellationToken::new()).await?;
/// println!("{}", response.status());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct RetryTransport<T> {
    inner: T,
    config: RetryConfig,
}

impl<T: Transport> RetryTransport<T> {
    /// Wraps `inner` with the given policy.
    ///
    /// # Errors
    ///
    /// Returns `Err(HttpError::InvalidConfig)` if `config` fails
    /// [`RetryConfig::validate`].
    pub fn new(inner: T, config: RetryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { inner, config })
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    async fn send_with_retry(
        &self,
        request: &OutboundRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse> {
        let max_attempts = self.config.max_attempts;
        let mut attempt = 1u32;
        loop {
            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(HttpError::Cancelled),
                outcome = self.inner.send(request, cancel) => outcome,
            };

            match outcome {
                Ok(response) => {
                    let status = response.status();
                    if !is_retryable_status(status) {
                        return Ok(response);
                    }
                    if attempt >= max_attempts {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(
                            path = request.target(),
                            %status,
                            attempts = attempt,
                            "retries exhausted, returning last response"
                        );
                        return Ok(response);
                    }
                    #[cfg(feature = "tracing")]
                    tracing::debug!(path = request.target(), %status, attempt, "retryable status");
                }
                Err(err) => {
                    if !err.is_transient() {
                        return Err(err);
                    }
                    if attempt >= max_attempts {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(
                            path = request.target(),
                            error = %err,
                            attempts = attempt,
                            "retries exhausted"
                        );
                        return Err(err);
                    }
                    #[cfg(feature = "tracing")]
                    tracing::debug!(path = request.target(), error = %err, attempt, "request failed");
                }
            }

            self.wait_before_retry(attempt, cancel).await?;
            attempt += 1;
        }
    }

    /// Sleeps for the backoff that follows `attempt`, or returns
    /// `Err(HttpError::Cancelled)` if the token fires first.
    async fn wait_before_retry(&self, attempt: u32, cancel: &CancellationToken) -> Result<()> {
        let delay = self.config.backoff_delay(attempt);

        #[cfg(feature = "tracing")]
        tracing::debug!("retrying request after {} ms", delay.as_millis());

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(HttpError::Cancelled),
            () = sleep(delay) => Ok(()),
        }
    }
}

impl<T: Transport> Transport for RetryTransport<T> {
    async fn send(
        &self,
        request: &OutboundRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse> {
        self.send_with_retry(request, cancel).await
    }
}
