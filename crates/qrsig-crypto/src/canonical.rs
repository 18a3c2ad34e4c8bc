//! Canonical JSON: object keys sorted, no insignificant whitespace.
//!
//! Used for JOSE headers and structured JWS payloads so that the same value
//! always serializes to the same bytes, independent of map insertion order.

use serde_json::Value;

use crate::error::CryptoError;

/// Serialize a JSON value canonically.
pub fn canonical_json(value: &Value) -> Result<String, CryptoError> {
    let mut out = String::new();
    write_canonical(value, &mut out)?;
    Ok(out)
}

fn write_canonical(value: &Value, out: &mut String) -> Result<(), CryptoError> {
    match value {
        Value::Number(n) if !n.as_f64().is_some_and(f64::is_finite) => {
            return Err(CryptoError::NonFiniteNumber)
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        Value::Object(members) => {
            let mut sorted: Vec<(&String, &Value)> = members.iter().collect();
            sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, member)) in sorted.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_scalar(key, out)?;
                out.push(':');
                write_canonical(member, out)?;
            }
            out.push('}');
        }
        scalar => write_scalar(scalar, out)?,
    }
    Ok(())
}

fn write_scalar<T: serde::Serialize + ?Sized>(value: &T, out: &mut String) -> Result<(), CryptoError> {
    let text =
        serde_json::to_string(value).map_err(|e| CryptoError::SerializationError(e.to_string()))?;
    out.push_str(&text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_keys_recursively() {
        let value = json!({"zip": "DEF", "alg": "HS256", "nested": {"b": 1, "a": [true, null]}});
        assert_eq!(
            canonical_json(&value).unwrap(),
            r#"{"alg":"HS256","nested":{"a":[true,null],"b":1},"zip":"DEF"}"#
        );
    }

    #[test]
    fn escapes_strings() {
        let value = json!({"q": "say \"hi\"\n"});
        assert_eq!(canonical_json(&value).unwrap(), r#"{"q":"say \"hi\"\n"}"#);
    }

    #[test]
    fn scalars() {
        assert_eq!(canonical_json(&json!(42)).unwrap(), "42");
        assert_eq!(canonical_json(&json!(-1.5)).unwrap(), "-1.5");
        assert_eq!(canonical_json(&json!("x")).unwrap(), "\"x\"");
        assert_eq!(canonical_json(&Value::Null).unwrap(), "null");
    }

    #[test]
    fn empty_containers() {
        assert_eq!(canonical_json(&json!({})).unwrap(), "{}");
        assert_eq!(canonical_json(&json!([])).unwrap(), "[]");
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let a: Value = serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"a":1,"b":2}"#).unwrap();
        assert_eq!(canonical_json(&a).unwrap(), canonical_json(&b).unwrap());
    }
}
