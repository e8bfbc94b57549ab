use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method,
};
use serde::Serialize;

use crate::{error::DeferredError, Content, HttpError, PathAndQuery, Result, Value};

/// Immutable request descriptor produced by [`RequestBuilder::build`].
///
/// `target` is either an absolute URL or a path relative to the base URL of
/// the transport that sends it.
#[derive(Clone, Debug, PartialEq)]
pub struct OutboundRequest {
    method: Method,
    target: String,
    headers: HeaderMap,
    body: Option<Content>,
}

impl OutboundRequest {
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path and query, e.g. `users/42?page=3`.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Content> {
        self.body.as_ref()
    }
}

/// Fluent builder for [`OutboundRequest`].
///
/// Steps that can fail on bad input (path templates, header names and values,
/// query objects) record the first error and report it from
/// [`build`](RequestBuilder::build). Body serializers return their error
/// immediately.
///
/// # Example
///
/// ```
/// use http_request_kit::RequestBuilder;
///
/// let request = RequestBuilder::get("users/{0}/posts", &["kit w".into()])
///     .query("page", 3)
///     .header("authorization", "Bearer qwerty")
///     .build()
///     .unwrap();
///
/// assert_eq!(request.target(), "users/kit+w/posts?page=3");
/// ```
#[derive(Clone, Debug)]
#[must_use = "RequestBuilder does nothing until .build() is called"]
pub struct RequestBuilder {
    method: Method,
    target: PathAndQuery,
    headers: HeaderMap,
    body: Option<Content>,
    error: Option<DeferredError>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self {
            method: Method::GET,
            target: PathAndQuery::new(),
            headers: HeaderMap::new(),
            body: None,
            error: None,
        }
    }
}

impl RequestBuilder {
    /// Creates a `GET` builder with an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(template: &str, args: &[Value]) -> Self {
        Self::new().method(Method::GET).path(template, args)
    }

    pub fn put(template: &str, args: &[Value]) -> Self {
        Self::new().method(Method::PUT).path(template, args)
    }

    pub fn post(template: &str, args: &[Value]) -> Self {
        Self::new().method(Method::POST).path(template, args)
    }

    pub fn delete(template: &str, args: &[Value]) -> Self {
        Self::new().method(Method::DELETE).path(template, args)
    }

    pub fn patch(template: &str, args: &[Value]) -> Self {
        Self::new().method(Method::PATCH).path(template, args)
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the path from a template; arguments are percent-encoded.
    pub fn path(mut self, template: &str, args: &[Value]) -> Self {
        self.target = self.target.path(template, args);
        self
    }

    /// Sets a pre-built path verbatim.
    pub fn path_raw(mut self, path: impl Into<String>) -> Self {
        self.target = self.target.path_raw(path);
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.target = self.target.query(name, value);
        self
    }

    pub fn query_object<T>(mut self, object: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        self.target = self.target.query_object(object);
        self
    }

    /// Appends a header. Existing values under the same name are kept.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.error.is_some() {
            return self;
        }

        let reject = |reason: String| DeferredError::Header {
            name: name.to_owned(),
            reason,
        };
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            (Err(e), _) => self.error = Some(reject(e.to_string())),
            (_, Err(e)) => self.error = Some(reject(e.to_string())),
        }
        self
    }

    /// Mutates the header collection directly.
    ///
    /// ```
    /// use http_request_kit::RequestBuilder;
    /// use reqwest::header::{HeaderValue, AUTHORIZATION};
    ///
    /// let request = RequestBuilder::post("foo/bar", &[])
    ///     .headers(|h| {
    ///         h.insert(AUTHORIZATION, HeaderValue::from_static("Bearer qwerty"));
    ///     })
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(request.headers()[AUTHORIZATION], "Bearer qwerty");
    /// ```
    pub fn headers<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&mut HeaderMap),
    {
        callback(&mut self.headers);
        self
    }

    pub fn body(mut self, content: Content) -> Self {
        self.body = Some(content);
        self
    }

    /// Sets a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `Err(HttpError::Json)` if serialization fails.
    pub fn json<T>(self, value: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        Ok(self.body(Content::json(value)?))
    }

    /// Sets a form body from the fields of a record.
    ///
    /// # Errors
    ///
    /// Returns `Err(HttpError::Form)` if `value` is not a flat record.
    pub fn form<T>(self, value: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        Ok(self.body(Content::form(value)?))
    }

    /// Sets a form body from explicit name/value pairs.
    pub fn form_pairs<I, K, V>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.body(Content::form_pairs(pairs))
    }

    /// Snapshots the builder into a request.
    ///
    /// May be called repeatedly; each call reflects the builder state at that
    /// moment and later mutation does not affect requests already built.
    pub fn build(&self) -> Result<OutboundRequest> {
        if let Some(err) = &self.error {
            return Err(err.clone().into());
        }

        Ok(OutboundRequest {
            method: self.method.clone(),
            target: self.target.build()?,
            headers: self.headers.clone(),
            body: self.body.clone(),
        })
    }
}

impl TryFrom<&RequestBuilder> for OutboundRequest {
    type Error = HttpError;

    fn try_from(builder: &RequestBuilder) -> Result<Self> {
        builder.build()
    }
}

impl TryFrom<RequestBuilder> for OutboundRequest {
    type Error = HttpError;

    fn try_from(builder: RequestBuilder) -> Result<Self> {
        builder.build()
    }
}
