//! Owned JSON value tree consumed by inference.
//!
//! Numbers are kept as `f64` only; whether a number "was" an integer is
//! recovered later from its decimal rendering. Object keys are held in a
//! sorted map so traversal order never depends on the source document.
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Parse JSON text. Duplicate keys resolve the way `serde_json` does (last wins).
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let raw = serde_json::from_str::<serde_json::Value>(text)?;
        Ok(Self::from(raw))
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            // without `arbitrary_precision` every number has an f64 view
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(xs) => Value::Array(xs.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(m) => {
                Value::Object(m.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_are_floats() {
        assert_eq!(Value::from(json!(12345)), Value::Number(12345.0));
        assert_eq!(Value::from(json!(12.5)), Value::Number(12.5));
    }

    #[test]
    fn object_keys_are_sorted() {
        let v = Value::parse(r#"{"b": 1, "a": null, "c": [true]}"#).unwrap();
        let Value::Object(map) = v else { panic!("expected object") };
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(map["c"], Value::Array(vec![Value::Bool(true)]));
    }

    #[test]
    fn duplicate_keys_keep_last() {
        let v = Value::parse(r#"{"k": "x", "k": 2}"#).unwrap();
        let Value::Object(map) = v else { panic!("expected object") };
        assert_eq!(map.len(), 1);
        assert_eq!(map["k"], Value::Number(2.0));
    }

    #[test]
    fn malformed_text_is_an_error() {
        assert!(Value::parse("aaaaa").is_err());
        assert!(Value::parse("").is_err());
        assert!(Value::parse(r#"{"a":}"#).is_err());
    }
}
