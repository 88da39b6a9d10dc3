//! Scalar values used to describe domain bounds.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kind::ScalarKind;

/// A single typed value.
///
/// Values appear in domain bounds and discrete sets, and in the probe rows
/// handed to [`crate::Domain::includes`]. Integers and floats compare with
/// each other numerically; other cross-kind comparisons are undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Integer(i64),
    Floating(f64),
    Text(String),
    Boolean(bool),
}

macro_rules! impl_from_for_scalar {
    ($variant:ident, $($t:ty),*) => {
        $(
            impl From<$t> for ScalarValue {
                fn from(v: $t) -> Self {
                    ScalarValue::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for_scalar!(Integer, i8, i16, i32, i64, u8, u16, u32);
impl_from_for_scalar!(Floating, f32, f64);
impl_from_for_scalar!(Text, String);
impl_from_for_scalar!(Boolean, bool);

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Text(v.to_string())
    }
}

impl ScalarValue {
    /// Kind this value naturally belongs to.
    pub fn kind(&self) -> ScalarKind {
        match self {
            ScalarValue::Integer(_) => ScalarKind::Integer,
            ScalarValue::Floating(_) => ScalarKind::Floating,
            ScalarValue::Text(_) => ScalarKind::Text,
            ScalarValue::Boolean(_) => ScalarKind::Boolean,
        }
    }
}

impl PartialOrd for ScalarValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        use ScalarValue::*;
        match (self, other) {
            (Integer(a), Integer(b)) => Some(a.cmp(b)),
            (Floating(a), Floating(b)) => a.partial_cmp(b),
            (Integer(a), Floating(b)) => (*a as f64).partial_cmp(b),
            (Floating(a), Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Text(a), Text(b)) => Some(a.cmp(b)),
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Integer(v) => write!(f, "{v}"),
            ScalarValue::Floating(v) => write!(f, "{v}"),
            ScalarValue::Text(v) => write!(f, "'{v}'"),
            ScalarValue::Boolean(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_values_compare_across_width() {
        assert!(ScalarValue::from(3) < ScalarValue::from(3.5));
        assert!(ScalarValue::from(4.0) > ScalarValue::from(3i64));
        assert_eq!(
            ScalarValue::from(2).partial_cmp(&ScalarValue::from(2.0)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn mismatched_kinds_are_unordered() {
        assert_eq!(
            ScalarValue::from("a").partial_cmp(&ScalarValue::from(1)),
            None
        );
        assert_eq!(
            ScalarValue::from(true).partial_cmp(&ScalarValue::from("true")),
            None
        );
    }
}
