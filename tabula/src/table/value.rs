//! Cell values and their natural ordering.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

/// A single attribute value read out of a row.
///
/// Comparison follows the value's natural ordering: numbers numerically,
/// text lexicographically, dates chronologically. Values of different kinds
/// are ordered by kind (`Empty` < `Bool` < numbers < `Text` < `Date`), so a
/// column with a few missing attributes still sorts deterministically.
#[derive(Debug, Clone, Default)]
pub enum CellValue {
    /// Missing or null attribute.
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Date(NaiveDateTime),
    Text(String),
}

impl CellValue {
    /// Rank of the value's kind for cross-kind comparison.
    fn rank(&self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::Text(_) => 3,
            Self::Date(_) => 4,
        }
    }

    /// Returns `true` for [`CellValue::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the text content if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Empty, Self::Empty) => Ordering::Equal,
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => cmp_floats(*a, *b),
            (Self::Int(i), Self::Float(f)) => cmp_int_float(*i, *f),
            (Self::Float(f), Self::Int(i)) => cmp_int_float(*i, *f).reverse(),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

/// Floats compare numerically with `-0.0 == 0.0`. NaN sorts above every
/// number, or below when its sign bit is set.
fn cmp_floats(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

/// Exact comparison of an integer against a float.
///
/// Casting the integer to `f64` loses precision past 2^53, so the float's
/// integral part is compared as `i128` instead.
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    if f.is_nan() {
        return if f.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    let floor = f.floor();
    // `as` saturates, so infinities land beyond every i64
    match i128::from(i).cmp(&(floor as i128)) {
        Ordering::Equal if f != floor => Ordering::Less,
        ordering => ordering,
    }
}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            // 999.0 displays as "999", 4.5 as "4.5"
            Self::Float(x) if x.fract() == 0.0 && x.is_finite() && x.abs() < 1e15 => {
                write!(f, "{}", *x as i64)
            }
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

macro_rules! int_from {
    ($($t:ty),*) => {
        $(impl From<$t> for CellValue {
            fn from(value: $t) -> Self {
                Self::Int(value as i64)
            }
        })*
    };
}

int_from!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for CellValue {
    fn from(value: f32) -> Self {
        Self::Float(value as f64)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value.and_time(chrono::NaiveTime::MIN))
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Empty)
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Empty,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map(Self::Float).unwrap_or(Self::Empty),
            },
            Value::String(s) => Self::Text(s.clone()),
            // Nested structures are displayed as their JSON text
            other => Self::Text(other.to_string()),
        }
    }
}
