//! Form-style percent-encoding shared by path arguments and query strings.

use url::form_urlencoded;

/// Percent-encodes `raw` using `application/x-www-form-urlencoded` rules.
///
/// Space becomes `+` and escapes use lowercase hex, so an argument such as
/// `"special/characters?"` encodes to `special%2fcharacters%3f` and can never
/// introduce a path separator or query delimiter.
pub fn url_encode(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for chunk in form_urlencoded::byte_serialize(raw.as_bytes()) {
        if chunk.starts_with('%') {
            encoded.extend(chunk.chars().map(|c| c.to_ascii_lowercase()));
        } else {
            encoded.push_str(chunk);
        }
    }
    encoded
}
