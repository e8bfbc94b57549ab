use crate::{encode::url_encode, FormatError, Value};

/// Substitutes `{0}`, `{1}`, ... in `template` with the encoded string form of
/// the matching argument.
///
/// Text outside placeholders is copied verbatim; `{{` and `}}` produce literal
/// braces. Every placeholder must have an argument and every argument must be
/// referenced at least once.
///
/// ```
/// use http_request_kit::{format_path, Value};
///
/// let path = format_path("users/{0}/posts/{1}", &["a b".into(), Value::from(7)]).unwrap();
/// assert_eq!(path, "users/a+b/posts/7");
/// ```
pub fn format_path(template: &str, args: &[Value]) -> Result<String, FormatError> {
    let encoded: Vec<String> = args
        .iter()
        .map(|arg| url_encode(&arg.to_string()))
        .collect();
    let mut used = vec![false; args.len()];
    let mut out = String::with_capacity(template.len());

    let bytes = template.as_bytes();
    let mut literal_start = 0;
    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'{' if bytes.get(pos + 1) == Some(&b'{') => {
                out.push_str(&template[literal_start..=pos]);
                pos += 2;
                literal_start = pos;
            }
            b'{' => {
                out.push_str(&template[literal_start..pos]);
                let (index, end) = parse_placeholder(bytes, pos)?;
                let value = encoded.get(index).ok_or(FormatError::MissingArgument {
                    index,
                    count: args.len(),
                })?;
                out.push_str(value);
                used[index] = true;
                pos = end;
                literal_start = pos;
            }
            b'}' if bytes.get(pos + 1) == Some(&b'}') => {
                out.push_str(&template[literal_start..=pos]);
                pos += 2;
                literal_start = pos;
            }
            b'}' => return Err(FormatError::UnmatchedBrace { position: pos }),
            _ => pos += 1,
        }
    }
    out.push_str(&template[literal_start..]);

    if let Some(index) = used.iter().position(|used| !used) {
        return Err(FormatError::UnusedArgument { index });
    }
    Ok(out)
}

/// Parses `{digits}` starting at `start` and returns the index plus the
/// position just past the closing brace.
fn parse_placeholder(bytes: &[u8], start: usize) -> Result<(usize, usize), FormatError> {
    let invalid = FormatError::InvalidPlaceholder { position: start };
    let digits_start = start + 1;
    let digits_len = bytes[digits_start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    let close = digits_start + digits_len;
    if digits_len == 0 || bytes.get(close) != Some(&b'}') {
        return Err(invalid);
    }
    let index = std::str::from_utf8(&bytes[digits_start..close])
        .ok()
        .and_then(|digits| digits.parse::<usize>().ok())
        .ok_or(invalid)?;
    Ok((index, close + 1))
}

#[cfg(test)]
mod tests {
    use super::format_path;
    use crate::{FormatError, Value};

    #[test]
    fn encodes_arguments_but_not_literal_text() {
        let path = format_path(
            "foo/{0}/bar/{1}/bat/{2}",
            &["this has".into(), "special/characters?".into(), 8675309.into()],
        )
        .expect("template must format");
        assert_eq!(path, "foo/this+has/bar/special%2fcharacters%3f/bat/8675309");
    }

    #[test]
    fn template_without_placeholders_is_returned_verbatim() {
        assert_eq!(format_path("foo/bar?x=a b", &[]).unwrap(), "foo/bar?x=a b");
    }

    #[test]
    fn absolute_templates_keep_scheme_and_host() {
        let path = format_path("http://example.com/foo/bar/{0}", &[8675309.into()]).unwrap();
        assert_eq!(path, "http://example.com/foo/bar/8675309");
    }

    #[test]
    fn placeholders_may_repeat_and_reorder() {
        let path = format_path("{1}/{0}/{1}", &["a".into(), "b".into()]).unwrap();
        assert_eq!(path, "b/a/b");
    }

    #[test]
    fn doubled_braces_are_literal() {
        let path = format_path("{{id}}/{0}", &["x".into()]).unwrap();
        assert_eq!(path, "{id}/x");
    }

    #[test]
    fn null_argument_renders_empty() {
        assert_eq!(format_path("a/{0}/b", &[Value::Null]).unwrap(), "a//b");
    }

    #[test]
    fn missing_argument_is_rejected() {
        let err = format_path("foo/{0}/{1}", &["a".into()]).unwrap_err();
        assert_eq!(err, FormatError::MissingArgument { index: 1, count: 1 });
    }

    #[test]
    fn unused_argument_is_rejected() {
        let err = format_path("foo/{0}", &["a".into(), "b".into()]).unwrap_err();
        assert_eq!(err, FormatError::UnusedArgument { index: 1 });

        let err = format_path("foo", &["a".into()]).unwrap_err();
        assert_eq!(err, FormatError::UnusedArgument { index: 0 });
    }

    #[test]
    fn malformed_placeholders_are_rejected() {
        assert_eq!(
            format_path("foo/{x}", &[]).unwrap_err(),
            FormatError::InvalidPlaceholder { position: 4 }
        );
        assert_eq!(
            format_path("foo/{0", &["a".into()]).unwrap_err(),
            FormatError::InvalidPlaceholder { position: 4 }
        );
        assert_eq!(
            format_path("foo}", &[]).unwrap_err(),
            FormatError::UnmatchedBrace { position: 3 }
        );
    }
}
