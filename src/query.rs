use serde::Serialize;
use url::form_urlencoded;

use crate::{encode::url_encode, Result, Value};

/// Ordered, multi-valued query parameters.
///
/// Names and values are stored as given and only encoded by
/// [`QueryParams::render`]. Parameters keep their insertion order, and a name
/// added twice is emitted twice.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter. [`Value::Null`] (including `None`) is skipped.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        if !value.is_null() {
            self.pairs.push((name.into(), value.to_string()));
        }
        self
    }

    /// Appends one parameter per field of a serializable record, in field
    /// declaration order. `None` fields are skipped.
    ///
    /// ```
    /// use http_request_kit::QueryParams;
    ///
    /// #[derive(serde::Serialize)]
    /// struct Page {
    ///     page: u32,
    ///     cursor: Option<String>,
    /// }
    ///
    /// let mut query = QueryParams::new();
    /// query.add_object(&Page { page: 3, cursor: None }).unwrap();
    /// assert_eq!(query.render(), "page=3");
    /// ```
    pub fn add_object<T>(&mut self, object: &T) -> Result<&mut Self>
    where
        T: Serialize + ?Sized,
    {
        self.append_object(object)?;
        Ok(self)
    }

    pub(crate) fn append_object<T>(
        &mut self,
        object: &T,
    ) -> std::result::Result<(), serde_urlencoded::ser::Error>
    where
        T: Serialize + ?Sized,
    {
        let serialized = serde_urlencoded::to_string(object)?;
        self.pairs.extend(
            form_urlencoded::parse(serialized.as_bytes())
                .map(|(name, value)| (name.into_owned(), value.into_owned())),
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterates over the unencoded `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Renders `name=value&...` with both sides percent-encoded, or an empty
    /// string when no parameters were added.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (index, (name, value)) in self.pairs.iter().enumerate() {
            if index > 0 {
                out.push('&');
            }
            out.push_str(&url_encode(name));
            out.push('=');
            out.push_str(&url_encode(value));
        }
        out
    }
}
