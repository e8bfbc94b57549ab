use bytes::Bytes;
use reqwest::header::HeaderValue;
use serde::Serialize;

use crate::Result;

const APPLICATION_JSON: &str = "application/json";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Pre-built request body plus the content type it should be sent with.
///
/// The bytes are reference counted, so cloning a request to re-send it does
/// not copy the payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Content {
    content_type: Option<HeaderValue>,
    bytes: Bytes,
}

impl Content {
    /// Body without a content type.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(content_type: HeaderValue, bytes: impl Into<Bytes>) -> Self {
        Self {
            content_type: Some(content_type),
            bytes: bytes.into(),
        }
    }

    /// Serializes `value` as JSON with `application/json`.
    pub fn json<T>(value: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec(value)?;
        Ok(Self::with_content_type(
            HeaderValue::from_static(APPLICATION_JSON),
            bytes,
        ))
    }

    /// Serializes the fields of a record as `application/x-www-form-urlencoded`.
    ///
    /// `None` fields are left out of the body rather than sent as `name=`,
    /// the same way [`RequestBuilder::query_object`](crate::RequestBuilder::query_object)
    /// skips them. Use [`Content::form_pairs`] to send an empty value.
    pub fn form<T>(value: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        let encoded = serde_urlencoded::to_string(value)?;
        Ok(Self::with_content_type(
            HeaderValue::from_static(FORM_URLENCODED),
            encoded,
        ))
    }

    /// Encodes explicit name/value pairs as `application/x-www-form-urlencoded`.
    pub fn form_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        Self::with_content_type(HeaderValue::from_static(FORM_URLENCODED), encoded)
    }

    pub fn content_type(&self) -> Option<&HeaderValue> {
        self.content_type.as_ref()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
