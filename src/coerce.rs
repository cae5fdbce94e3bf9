// 🔢 Value Coercion - loose JSON scalars into the types the schema wants
//
// Input files are hand-assembled by providers: ids arrive as numbers or
// numeric strings, flags as bools or strings. These helpers are the only
// place that decides what "readable" means.

use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    Missing,
    Null,
    NotAnInteger(String),
    OutOfRange(String),
    Unsupported(&'static str),
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoercionError::Missing => write!(f, "value is missing"),
            CoercionError::Null => write!(f, "value is null"),
            CoercionError::NotAnInteger(raw) => {
                write!(f, "invalid literal for integer: {:?}", raw)
            }
            CoercionError::OutOfRange(raw) => write!(f, "integer out of range: {}", raw),
            CoercionError::Unsupported(kind) => write!(f, "cannot convert {} to integer", kind),
        }
    }
}

impl std::error::Error for CoercionError {}

/// Coerce an id-like value to `i64`.
///
/// Integers pass through, finite floats truncate toward zero, strings are
/// trimmed and parsed as signed base-10 (digit separators allowed), bools
/// become 0/1. Anything outside `i64` is `OutOfRange`. Negative results
/// are returned as-is; rejecting them is the caller's `id >= 0` check.
pub fn coerce_int(value: Option<&Value>) -> Result<i64, CoercionError> {
    let value = value.ok_or(CoercionError::Missing)?;

    match value {
        Value::Null => Err(CoercionError::Null),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            if n.is_u64() {
                return Err(CoercionError::OutOfRange(n.to_string()));
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                    Ok(f.trunc() as i64)
                }
                _ => Err(CoercionError::OutOfRange(n.to_string())),
            }
        }
        Value::String(s) => parse_int_literal(s),
        other => Err(CoercionError::Unsupported(type_name(other))),
    }
}

/// Signed base-10 literal with optional single `_` separators between digits
/// (`"1_000"`), surrounded by optional whitespace.
fn parse_int_literal(raw: &str) -> Result<i64, CoercionError> {
    let invalid = || CoercionError::NotAnInteger(raw.to_string());
    let trimmed = raw.trim();
    let digits = trimmed.trim_start_matches(['+', '-']);

    if trimmed.len() - digits.len() > 1
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return Err(invalid());
    }

    let literal: String = trimmed.chars().filter(|c| *c != '_').collect();
    if !literal.trim_start_matches(['+', '-']).bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    literal.parse::<i64>().map_err(|e| match e.kind() {
        std::num::IntErrorKind::PosOverflow | std::num::IntErrorKind::NegOverflow => {
            CoercionError::OutOfRange(raw.to_string())
        }
        _ => invalid(),
    })
}

/// JSON truthiness: empty/zero/null/false are falsy, everything else truthy.
/// Note that the string "false" is non-empty and therefore truthy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Natural string form of a scalar: numbers print in shortest round-trip
/// form, strings as themselves. Anything else has no text form.
pub fn natural_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Text form of a coordinate: bools print as `True`/`False`, everything else
/// as its natural string.
pub fn coordinate_text(value: &Value) -> Option<String> {
    match value {
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        other => natural_string(other),
    }
}

/// Optional text field: missing, null and non-scalar values all read as `None`.
pub fn optional_text(value: Option<&Value>) -> Option<String> {
    value.and_then(natural_string)
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_int_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_int(Some(&json!(10000032))), Ok(10000032));
        assert_eq!(coerce_int(Some(&json!("1"))), Ok(1));
        assert_eq!(coerce_int(Some(&json!(" 7 "))), Ok(7));
        assert_eq!(coerce_int(Some(&json!(3.9))), Ok(3));
        assert_eq!(coerce_int(Some(&json!(-3.9))), Ok(-3));
        assert_eq!(coerce_int(Some(&json!(true))), Ok(1));
    }

    #[test]
    fn test_coerce_int_keeps_negative_strings_for_caller_check() {
        assert_eq!(coerce_int(Some(&json!("-5"))), Ok(-5));
        assert_eq!(coerce_int(Some(&json!(-1))), Ok(-1));
    }

    #[test]
    fn test_coerce_int_digit_separators() {
        assert_eq!(coerce_int(Some(&json!("1_000"))), Ok(1000));
        assert_eq!(coerce_int(Some(&json!(" -2_5 "))), Ok(-25));
        assert!(coerce_int(Some(&json!("_1"))).is_err());
        assert!(coerce_int(Some(&json!("1_"))).is_err());
        assert!(coerce_int(Some(&json!("1__0"))).is_err());
        assert!(coerce_int(Some(&json!("+-1"))).is_err());
        assert!(coerce_int(Some(&json!(""))).is_err());
        assert_eq!(
            coerce_int(Some(&json!("99999999999999999999"))),
            Err(CoercionError::OutOfRange("99999999999999999999".to_string()))
        );
    }

    #[test]
    fn test_coordinate_text() {
        assert_eq!(coordinate_text(&json!(true)), Some("True".to_string()));
        assert_eq!(coordinate_text(&json!(false)), Some("False".to_string()));
        assert_eq!(coordinate_text(&json!(8.86)), Some("8.86".to_string()));
        assert_eq!(coordinate_text(&json!(null)), None);
    }

    #[test]
    fn test_coerce_int_failures() {
        assert_eq!(coerce_int(None), Err(CoercionError::Missing));
        assert_eq!(coerce_int(Some(&Value::Null)), Err(CoercionError::Null));
        assert_eq!(
            coerce_int(Some(&json!("invalid"))),
            Err(CoercionError::NotAnInteger("invalid".to_string()))
        );
        assert_eq!(
            coerce_int(Some(&json!("1.5"))),
            Err(CoercionError::NotAnInteger("1.5".to_string()))
        );
        assert_eq!(
            coerce_int(Some(&json!(u64::MAX))),
            Err(CoercionError::OutOfRange(u64::MAX.to_string()))
        );
        assert_eq!(
            coerce_int(Some(&json!({"id": 1}))),
            Err(CoercionError::Unsupported("object"))
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&Value::Null)));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(is_truthy(Some(&json!(true))));
        assert!(is_truthy(Some(&json!(1))));
        assert!(is_truthy(Some(&json!("false"))));
    }

    #[test]
    fn test_natural_string() {
        assert_eq!(natural_string(&json!(11.111)), Some("11.111".to_string()));
        assert_eq!(natural_string(&json!(42)), Some("42".to_string()));
        assert_eq!(natural_string(&json!("8.86")), Some("8.86".to_string()));
        assert_eq!(natural_string(&json!(null)), None);
        assert_eq!(natural_string(&json!([1, 2])), None);
    }
}
