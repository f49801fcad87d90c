//! Sample payloads
//!
//! Most accumulators are numeric but [`crate::Set`] counts distinct values of
//! any kind, statsd sets being commonly keyed by user or session id strings.
//! [`Value`] carries either.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
/// The payload of a single `sample` call.
pub enum Value {
    /// A floating point, 64 bits wide
    Number(f64),
    /// An arbitrary string
    Text(String),
}

impl Value {
    /// Numeric reading of this value.
    ///
    /// Text is parsed as a float, surrounding whitespace ignored. Returns
    /// `None` if the text does not parse.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Hashable identity of a [`Value`] for set membership.
///
/// Numbers compare by value: `-0.0` and `0.0` are one member and every NaN is
/// the same member. Text never equals a number, even `"1"` and `1.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Member {
    Number(u64),
    Text(String),
}

impl From<Value> for Member {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) if n == 0.0 => Member::Number(0.0f64.to_bits()),
            Value::Number(n) if n.is_nan() => Member::Number(f64::NAN.to_bits()),
            Value::Number(n) => Member::Number(n.to_bits()),
            Value::Text(s) => Member::Text(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_parses_as_number() {
        assert_eq!(Value::from(" 12.5 ").as_f64(), Some(12.5));
        assert_eq!(Value::from("nope").as_f64(), None);
        assert_eq!(Value::from(7_i64).as_f64(), Some(7.0));
    }

    #[test]
    fn signed_zeroes_are_one_member() {
        assert_eq!(Member::from(Value::from(0.0)), Member::from(Value::from(-0.0)));
    }

    #[test]
    fn text_and_number_members_differ() {
        assert_ne!(Member::from(Value::from("1")), Member::from(Value::from(1.0)));
        assert_eq!(Member::from(Value::from(1_u64)), Member::from(Value::from(1.0)));
    }
}
