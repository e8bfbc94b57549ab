use serde::Serialize;

use crate::{error::DeferredError, path::format_path, QueryParams, Result, Value};

/// Composes a formatted path with an optional query string.
///
/// The path is treated as an opaque string, so absolute (`http://host/...`)
/// and relative (`foo/bar`) paths behave identically. The first failing step
/// is remembered and returned by [`PathAndQuery::build`].
#[derive(Clone, Debug, Default)]
pub struct PathAndQuery {
    path: String,
    query: QueryParams,
    error: Option<DeferredError>,
}

impl PathAndQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a builder from a path template.
    pub fn create(template: &str, args: &[Value]) -> Self {
        Self::new().path(template, args)
    }

    /// Sets the path from a template, encoding each argument.
    pub fn path(mut self, template: &str, args: &[Value]) -> Self {
        match format_path(template, args) {
            Ok(path) => self.path = path,
            Err(err) => self.record(DeferredError::Format(err)),
        }
        self
    }

    /// Sets the path verbatim, without templating or encoding.
    pub fn path_raw(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Adds a query parameter; `Null` values are skipped.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.add(name, value);
        self
    }

    /// Adds one query parameter per field of `object`.
    pub fn query_object<T>(mut self, object: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        if let Err(err) = self.query.append_object(object) {
            self.record(DeferredError::Form(err));
        }
        self
    }

    pub fn query_params(&self) -> &QueryParams {
        &self.query
    }

    /// Returns `path` or `path?query`, never a trailing `?`.
    pub fn build(&self) -> Result<String> {
        if let Some(err) = &self.error {
            return Err(err.clone().into());
        }
        if self.query.is_empty() {
            return Ok(self.path.clone());
        }
        Ok(format!("{}?{}", self.path, self.query.render()))
    }

    fn record(&mut self, err: DeferredError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;
    use url::form_urlencoded;

    use super::PathAndQuery;
    use crate::{FormatError, HttpError};

    #[test]
    fn plain_path_has_no_trailing_question_mark() {
        let built = PathAndQuery::create("foo/bar", &[]).build().unwrap();
        assert_eq!(built, "foo/bar");
    }

    #[test]
    fn builds_absolute_path() {
        let built = PathAndQuery::create("http://example.com/foo/bar/{0}", &[8675309.into()])
            .build()
            .unwrap();
        assert_eq!(built, "http://example.com/foo/bar/8675309");
    }

    #[test]
    fn builds_encoded_path() {
        let built = PathAndQuery::create(
            "foo/{0}/bar/{1}/bat/{2}",
            &["this has".into(), "special/characters?".into(), 8675309.into()],
        )
        .build()
        .unwrap();
        assert_eq!(built, "foo/this+has/bar/special%2fcharacters%3f/bat/8675309");
    }

    #[test]
    fn raw_path_is_not_encoded() {
        let built = PathAndQuery::new()
            .path_raw("foo/a b/{0}")
            .query("q", "x y")
            .build()
            .unwrap();
        assert_eq!(built, "foo/a b/{0}?q=x+y");
    }

    #[test]
    fn builds_query() {
        let built = PathAndQuery::create("foo/bar", &[])
            .query("foo", "bar")
            .query("& this has", "special/characters?")
            .query("page", 3)
            .build()
            .unwrap();

        let (path, query) = built.split_once('?').expect("query must be present");
        assert_eq!(path, "foo/bar");
        let pairs: Vec<(String, String)> =
            form_urlencoded::parse(query.as_bytes()).into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("foo".to_owned(), "bar".to_owned()),
                ("& this has".to_owned(), "special/characters?".to_owned()),
                ("page".to_owned(), "3".to_owned()),
            ]
        );
    }

    #[test]
    fn exposes_accumulated_query_params() {
        let composer = PathAndQuery::create("foo", &[])
            .query("a", 1)
            .query("skipped", None::<u8>)
            .query("b", "two");
        let params = composer.query_params();
        assert_eq!(params.len(), 2);
        assert_eq!(
            params.iter().collect::<Vec<_>>(),
            vec![("a", "1"), ("b", "two")]
        );
    }

    #[derive(Serialize)]
    struct Filter {
        foo: &'static str,
        #[serde(rename = "thisHas")]
        this_has: &'static str,
        page: i32,
    }

    #[test]
    fn builds_query_from_object() {
        let built = PathAndQuery::create("foo/bar", &[])
            .query_object(&Filter {
                foo: "bar",
                this_has: "special/characters?",
                page: 3,
            })
            .build()
            .unwrap();
        assert_eq!(built, "foo/bar?foo=bar&thisHas=special%2fcharacters%3f&page=3");
    }

    #[test]
    fn template_error_surfaces_at_build() {
        let builder = PathAndQuery::create("foo/{0}/{1}", &["a".into()]).query("x", 1);
        let err = builder.build().unwrap_err();
        assert!(matches!(
            err,
            HttpError::Format(FormatError::MissingArgument { index: 1, count: 1 })
        ));
        // The error is sticky; a second build reports it again.
        assert!(builder.build().is_err());
    }

    #[test]
    fn object_error_surfaces_at_build() {
        let err = PathAndQuery::new()
            .path_raw("foo")
            .query_object(&"not a record")
            .build()
            .unwrap_err();
        assert!(matches!(err, HttpError::Form(_)));
    }
}
