//! Argument parsers for the `call` subcommand.

use serde_json::{Map, Value};

/// Parse `KEY=VALUE`. The value is read as JSON when it parses (`42`, `true`, `[1,2]`), and as a
/// plain string otherwise.
pub fn parse_pair(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    let value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

pub fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {e}"))
}

/// Later pairs win over earlier ones with the same key.
pub fn pairs_to_map(pairs: Vec<(String, Value)>) -> Map<String, Value> {
    pairs.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pair_values_prefer_json() {
        assert_eq!(parse_pair("id=42").unwrap(), ("id".to_string(), json!(42)));
        assert_eq!(parse_pair("on=true").unwrap().1, json!(true));
        assert_eq!(parse_pair("ids=[1,2]").unwrap().1, json!([1, 2]));
        assert_eq!(parse_pair("name=widget").unwrap().1, json!("widget"));
        assert_eq!(parse_pair("code=007").unwrap().1, json!("007"));
        assert_eq!(parse_pair("expr=a=b").unwrap().1, json!("a=b"));
        assert_eq!(parse_pair("empty=").unwrap().1, json!(""));
    }

    #[test]
    fn malformed_pairs_are_rejected() {
        assert!(parse_pair("novalue").is_err());
        assert!(parse_pair("=x").is_err());
    }

    #[test]
    fn body_must_be_json() {
        assert_eq!(parse_json(r#"{"a":1}"#).unwrap(), json!({"a": 1}));
        assert!(parse_json("{oops").is_err());
    }

    #[test]
    fn later_pairs_win() {
        let map = pairs_to_map(vec![
            ("a".to_string(), json!(1)),
            ("a".to_string(), json!(2)),
        ]);
        assert_eq!(map["a"], json!(2));
    }
}
