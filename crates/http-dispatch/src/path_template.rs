//! `{name}` placeholder substitution for path templates.
//!
//! A placeholder is `{` + one or more characters other than `}` and `/` + `}`. Braces that do not
//! form a placeholder (e.g. `{}` or `{a/b}`) are left as literal text.
//!
//! Substituted values are percent-encoded as a single path segment: every byte outside the
//! RFC 3986 unreserved set is escaped, so a value can never introduce a `/`, `?` or `#` into the
//! path. The values `.` and `..` are rejected outright: URL parsing removes dot segments (encoded or
//! not), which would move the request to another endpoint. The template text itself is never
//! re-encoded.

use crate::error::{DispatchError, Result};
use serde_json::{Map, Value};

/// A parsed piece of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// Substitute every `{name}` in `template` with the matching value from `params`.
///
/// Templates without any `{` are returned unchanged without being scanned.
///
/// # Errors
///
/// Returns [`DispatchError::MissingParameter`] naming the first placeholder (in template order)
/// that has no value in `params`. A `null` value counts as missing. Returns
/// [`DispatchError::InvalidPathValue`] for a value of `.` or `..`. Nothing is returned on
/// failure, so partial substitutions are never observable.
pub fn resolve_path(template: &str, params: &Map<String, Value>) -> Result<String> {
    if !template.contains('{') {
        return Ok(template.to_string());
    }

    let mut out = String::with_capacity(template.len());
    for segment in parse(template) {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(name) => {
                let value = params
                    .get(name)
                    .filter(|v| !v.is_null())
                    .ok_or_else(|| DispatchError::MissingParameter {
                        name: name.to_string(),
                    })?;
                let text = value_to_string(value);
                if text == "." || text == ".." {
                    return Err(DispatchError::InvalidPathValue {
                        name: name.to_string(),
                        value: text,
                    });
                }
                out.push_str(&encode_path_segment(&text));
            }
        }
    }
    Ok(out)
}

fn parse(template: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut literal_start = 0usize;
    let mut cursor = 0usize;

    while let Some(offset) = template[cursor..].find('{') {
        let open = cursor + offset;
        let rest = &template[open + 1..];
        let name = rest.find('}').map(|close| &rest[..close]);

        match name {
            Some(name) if !name.is_empty() && !name.contains('/') => {
                if literal_start < open {
                    segments.push(Segment::Literal(&template[literal_start..open]));
                }
                segments.push(Segment::Placeholder(name));
                // Skip `{`, the name and `}`.
                cursor = open + name.len() + 2;
                literal_start = cursor;
            }
            _ => {
                cursor = open + 1;
            }
        }
    }

    if literal_start < template.len() {
        segments.push(Segment::Literal(&template[literal_start..]));
    }
    segments
}

/// Stringify a JSON value for use in a URL or header.
///
/// Strings are used verbatim; numbers and booleans use their textual form; arrays and objects use
/// compact JSON.
#[must_use]
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}

fn encode_path_segment(s: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if is_unreserved(b) {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0F) as usize] as char);
        }
    }
    out
}

fn is_unreserved(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn substitutes_every_placeholder() {
        let p = params(json!({"org": "acme", "id": 42}));
        let out = resolve_path("/orgs/{org}/widgets/{id}", &p).unwrap();
        assert_eq!(out, "/orgs/acme/widgets/42");
        assert!(!out.contains('{') && !out.contains('}'));
    }

    #[test]
    fn repeated_placeholder_uses_same_value() {
        let p = params(json!({"id": "x"}));
        assert_eq!(resolve_path("/{id}/copy/{id}", &p).unwrap(), "/x/copy/x");
    }

    #[test]
    fn stringifies_scalars() {
        let p = params(json!({"flag": true, "ratio": 1.5, "n": -3}));
        assert_eq!(
            resolve_path("/{flag}/{ratio}/{n}", &p).unwrap(),
            "/true/1.5/-3"
        );
    }

    #[test]
    fn missing_placeholder_names_the_first_gap() {
        let p = params(json!({"org": "acme"}));
        let err = resolve_path("/orgs/{org}/widgets/{id}/parts/{part}", &p).unwrap_err();
        assert!(matches!(err, DispatchError::MissingParameter { ref name } if name == "id"));
        assert_eq!(err.to_string(), "Missing path parameter: id");
    }

    #[test]
    fn null_value_counts_as_missing() {
        let p = params(json!({"id": null}));
        let err = resolve_path("/widgets/{id}", &p).unwrap_err();
        assert!(matches!(err, DispatchError::MissingParameter { ref name } if name == "id"));
    }

    #[test]
    fn template_without_braces_is_returned_unchanged() {
        let p = params(json!({"unused": 1}));
        assert_eq!(resolve_path("/v1/items", &p).unwrap(), "/v1/items");
        assert_eq!(resolve_path("", &p).unwrap(), "");
    }

    #[test]
    fn non_placeholder_braces_stay_literal() {
        let p = Map::new();
        assert_eq!(resolve_path("/a/{}/b", &p).unwrap(), "/a/{}/b");
        assert_eq!(resolve_path("/a/{b/c}", &p).unwrap(), "/a/{b/c}");
        assert_eq!(resolve_path("/a/{open", &p).unwrap(), "/a/{open");
    }

    #[test]
    fn values_are_encoded_as_a_single_segment() {
        let p = params(json!({"name": "a/b c?d#e", "brace": "{x}", "ok": "A-z_0.9~"}));
        assert_eq!(
            resolve_path("/files/{name}", &p).unwrap(),
            "/files/a%2Fb%20c%3Fd%23e"
        );
        assert_eq!(resolve_path("/{brace}", &p).unwrap(), "/%7Bx%7D");
        assert_eq!(resolve_path("/{ok}", &p).unwrap(), "/A-z_0.9~");
    }

    #[test]
    fn dot_segment_values_are_rejected() {
        for dots in [".", ".."] {
            let p = params(json!({"id": dots}));
            let err = resolve_path("/widgets/{id}/parts", &p).unwrap_err();
            assert!(matches!(
                err,
                DispatchError::InvalidPathValue { ref name, ref value }
                    if name == "id" && value == dots
            ));
        }

        // Dots inside a longer value are ordinary characters.
        let p = params(json!({"id": "...", "file": "a..b"}));
        assert_eq!(
            resolve_path("/widgets/{id}/{file}", &p).unwrap(),
            "/widgets/.../a..b"
        );
    }

    #[test]
    fn encodes_multibyte_utf8_per_byte() {
        let p = params(json!({"city": "Zürich"}));
        assert_eq!(resolve_path("/{city}", &p).unwrap(), "/Z%C3%BCrich");
    }

    #[test]
    fn value_to_string_matches_textual_forms() {
        assert_eq!(value_to_string(&json!("hello")), "hello");
        assert_eq!(value_to_string(&json!(123)), "123");
        assert_eq!(value_to_string(&json!(false)), "false");
        assert_eq!(value_to_string(&json!(null)), "");
        assert_eq!(value_to_string(&json!([1, "a"])), "[1,\"a\"]");
    }
}
