//! Normalised join keys.

use serde_json::Value;

/// Hashable key derived from a scalar cell.
///
/// Integral numbers compare equal regardless of their JSON representation,
/// so `10` joins with `10.0`. Nulls, arrays and objects have no key and never
/// match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JoinKey {
    Bool(bool),
    Int(i64),
    /// Unsigned integer above `i64::MAX`.
    UInt(u64),
    /// Non-integral float, stored by bit pattern.
    Float(u64),
    Text(String),
}

impl JoinKey {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Some(Self::UInt(u))
                } else {
                    n.as_f64().map(Self::from_float)
                }
            }
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn from_float(f: f64) -> Self {
        // `i64::MAX as f64` rounds up to 2^63, the first value outside i64.
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
            Self::Int(f as i64)
        } else if f.fract() == 0.0 && f >= 0.0 && f < u64::MAX as f64 {
            Self::UInt(f as u64)
        } else {
            Self::Float(f.to_bits())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integral_float_matches_int() {
        assert_eq!(JoinKey::from_value(&json!(10)), JoinKey::from_value(&json!(10.0)));
    }

    #[test]
    fn test_string_does_not_match_number() {
        assert_ne!(JoinKey::from_value(&json!("10")), JoinKey::from_value(&json!(10)));
    }

    #[test]
    fn test_large_unsigned_is_numeric() {
        let key = JoinKey::from_value(&json!(u64::MAX));

        assert_eq!(key, Some(JoinKey::UInt(u64::MAX)));
        assert_ne!(key, JoinKey::from_value(&json!(u64::MAX.to_string())));
        assert_eq!(key, JoinKey::from_value(&json!(u64::MAX)));
    }

    #[test]
    fn test_null_and_containers_have_no_key() {
        assert_eq!(JoinKey::from_value(&Value::Null), None);
        assert_eq!(JoinKey::from_value(&json!([1])), None);
        assert_eq!(JoinKey::from_value(&json!({"a": 1})), None);
    }

    #[test]
    fn test_fractional_float_key() {
        assert_eq!(
            JoinKey::from_value(&json!(1.5)),
            Some(JoinKey::Float(1.5f64.to_bits()))
        );
    }
}
