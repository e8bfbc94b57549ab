//! `http-request-kit` builds outbound HTTP requests and sends them through a
//! retrying transport.
//!
//! The crate has two halves:
//! - [`RequestBuilder`] composes method, an encoded path template, query
//!   parameters, headers and a body into an immutable [`OutboundRequest`];
//! - [`RetryTransport`] wraps any [`Transport`] (for example
//!   [`ReqwestTransport`]) and retries timeouts, gateway errors and failed
//!   connections with exponential backoff.

mod content;
mod encode;
mod error;
mod options;
mod path;
mod path_and_query;
mod query;
mod request;
mod response;
mod retry;
mod transport;
mod value;

pub use content::Content;
pub use encode::url_encode;
pub use error::{BoxError, FormatError, HttpError};
pub use options::{RetryConfig, TransportOptions};
pub use path::format_path;
pub use path_and_query::PathAndQuery;
pub use query::QueryParams;
pub use request::{OutboundRequest, RequestBuilder};
pub use response::HttpResponse;
pub use retry::{is_retryable_status, RetryTransport, RETRYABLE_STATUSES};
pub use transport::{ReqwestTransport, Transport};
pub use value::Value;

pub type Result<T> = std::result::Result<T, HttpError>;
