use std::{future::Future, sync::Arc, time::Duration};

use reqwest::header::CONTENT_TYPE;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{HttpError, HttpResponse, OutboundRequest, Result, TransportOptions};

/// Capability that sends one [`OutboundRequest`] and returns its response.
///
/// Implementations should classify retry-eligible failures (connection
/// errors, timeouts) as [`HttpError::Request`] and return every other
/// failure as a non-transient variant. They must stop work and return
/// [`HttpError::Cancelled`] once `cancel` fires.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &OutboundRequest,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<HttpResponse>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    async fn send(
        &self,
        request: &OutboundRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse> {
        (**self).send(request, cancel).await
    }
}

/// [`Transport`] backed by `reqwest`.
///
/// Relative request targets are joined onto the base URL with standard URL
/// resolution: a base of `https://api.example.com/v1/` turns `users/7` into
/// `https://api.example.com/v1/users/7`. Absolute targets are used as is.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: Option<Url>,
    options: TransportOptions,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestTransport {
    /// Creates a transport without a base URL; only absolute targets resolve.
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Uses a preconfigured `reqwest::Client`.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: None,
            options: TransportOptions::default(),
        }
    }

    /// Sets the base URL relative targets are resolved against.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url).map_err(|source| HttpError::InvalidUrl {
            target: base_url.to_owned(),
            source,
        })?;
        self.base_url = Some(url);
        Ok(self)
    }

    /// Applies transport options such as the per-attempt timeout.
    pub fn with_options(mut self, opts: TransportOptions) -> Self {
        self.options = opts;
        self
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Resolves a request target into the URL that will be requested.
    pub fn resolve(&self, target: &str) -> Result<Url> {
        let invalid = |source: url::ParseError| HttpError::InvalidUrl {
            target: target.to_owned(),
            source,
        };
        match Url::parse(target) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => base.join(target).map_err(invalid),
                None => Err(invalid(url::ParseError::RelativeUrlWithoutBase)),
            },
            Err(err) => Err(invalid(err)),
        }
    }

    async fn exchange(&self, request: &OutboundRequest) -> Result<HttpResponse> {
        let url = self.resolve(request.target())?;

        let mut builder = self
            .http
            .request(request.method().clone(), url)
            .headers(request.headers().clone())
            .timeout(Duration::from_millis(self.options.timeout_ms));

        if let Some(body) = request.body() {
            // A caller-supplied content type wins over the body's default.
            if let Some(content_type) = body.content_type() {
                if !request.headers().contains_key(CONTENT_TYPE) {
                    builder = builder.header(CONTENT_TYPE, content_type.clone());
                }
            }
            builder = builder.body(body.bytes().clone());
        }

        let response = builder.send().await.map_err(classify)?;
        HttpResponse::from_reqwest(response).await.map_err(classify)
    }
}

impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: &OutboundRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(HttpError::Cancelled),
            result = self.exchange(request) => result,
        }
    }
}

/// Maps connection-level `reqwest` failures to the retryable request-failure
/// category.
fn classify(err: reqwest::Error) -> HttpError {
    if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
        HttpError::Request(Box::new(err))
    } else {
        HttpError::Transport(err)
    }
}

#[cfg(test)]
mod tests {
    use super::ReqwestTransport;
    use crate::HttpError;

    #[test]
    fn resolves_relative_targets_against_base() {
        let transport = ReqwestTransport::new()
            .with_base_url("https://api.example.com/v1/")
            .unwrap();
        let url = transport.resolve("users/this+has?page=3").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/users/this+has?page=3");
    }

    #[test]
    fn keeps_encoded_arguments_intact() {
        let transport = ReqwestTransport::new()
            .with_base_url("http://example.com/")
            .unwrap();
        let url = transport
            .resolve("foo/this+has/bar/special%2fcharacters%3f/bat/8675309")
            .unwrap();
        assert_eq!(url.path(), "/foo/this+has/bar/special%2fcharacters%3f/bat/8675309");
    }

    #[test]
    fn absolute_targets_ignore_base() {
        let transport = ReqwestTransport::new()
            .with_base_url("https://api.example.com/v1/")
            .unwrap();
        let url = transport.resolve("http://example.com/foo/bar").unwrap();
        assert_eq!(url.as_str(), "http://example.com/foo/bar");
    }

    #[test]
    fn base_url_is_parsed_once() {
        assert!(ReqwestTransport::new().base_url().is_none());
        let transport = ReqwestTransport::new()
            .with_base_url("https://api.example.com/v1/")
            .unwrap();
        let base = transport.base_url().unwrap();
        assert_eq!(base.host_str(), Some("api.example.com"));
        assert_eq!(base.path(), "/v1/");
    }

    #[test]
    fn relative_target_without_base_is_rejected() {
        let err = ReqwestTransport::new().resolve("foo/bar").unwrap_err();
        assert!(matches!(err, HttpError::InvalidUrl { ref target, .. } if target == "foo/bar"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ReqwestTransport::new().with_base_url("not a url").unwrap_err();
        assert!(matches!(err, HttpError::InvalidUrl { .. }));
    }
}
