/// Boxed error used for transport failures that do not come from `reqwest`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Path template and argument list do not line up.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// Transient request failure; retried by [`RetryTransport`](crate::RetryTransport).
    #[error("request failed: {0}")]
    Request(BoxError),
    /// Non-transient error from `reqwest` (builder, redirect, decode).
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// I/O failure surfaced by a transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Any other failure surfaced by a transport.
    #[error("{0}")]
    Other(BoxError),
    /// JSON body serialization or response decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Form body or query object serialization failed.
    #[error("form encoding error: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),
    /// Header name or value rejected when added to a request builder.
    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },
    /// Request target could not be resolved into a URL.
    #[error("invalid url '{target}': {source}")]
    InvalidUrl {
        target: String,
        #[source]
        source: url::ParseError,
    },
    /// Retry policy failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The caller's cancellation token fired before the send completed.
    #[error("request cancelled")]
    Cancelled,
}

impl HttpError {
    /// Wraps an arbitrary error as a transient request failure.
    pub fn request<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Request(err.into())
    }

    /// Wraps an arbitrary error as a non-transient failure.
    pub fn other<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Other(err.into())
    }

    /// Returns `true` if the error belongs to the request-failure category
    /// that the retry policy is allowed to retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}

/// Error raised while substituting arguments into a path template.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("placeholder {{{index}}} has no argument ({count} supplied)")]
    MissingArgument { index: usize, count: usize },
    #[error("argument {index} is not referenced by the template")]
    UnusedArgument { index: usize },
    #[error("invalid placeholder at byte {position}")]
    InvalidPlaceholder { position: usize },
    #[error("unmatched '}}' at byte {position}")]
    UnmatchedBrace { position: usize },
}

/// Error captured by a builder step and reported by `build()`.
///
/// Builders are built by reference and may be built repeatedly, so the stored
/// error has to be cloneable.
#[derive(Clone, Debug)]
pub(crate) enum DeferredError {
    Format(FormatError),
    Form(serde_urlencoded::ser::Error),
    Header { name: String, reason: String },
}

impl From<DeferredError> for HttpError {
    fn from(err: DeferredError) -> Self {
        match err {
            DeferredError::Format(err) => Self::Format(err),
            DeferredError::Form(err) => Self::Form(err),
            DeferredError::Header { name, reason } => Self::InvalidHeader { name, reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FormatError, HttpError};

    #[test]
    fn only_request_failures_are_transient() {
        assert!(HttpError::request("connection reset").is_transient());
        assert!(!HttpError::other("not implemented").is_transient());
        assert!(!HttpError::Io(std::io::Error::other("disk")).is_transient());
        assert!(!HttpError::Cancelled.is_transient());
    }

    #[test]
    fn format_error_messages() {
        let err = FormatError::MissingArgument { index: 2, count: 1 };
        assert_eq!(err.to_string(), "placeholder {2} has no argument (1 supplied)");
        let err = FormatError::UnmatchedBrace { position: 4 };
        assert_eq!(err.to_string(), "unmatched '}' at byte 4");
    }
}
