//! Loosely-typed values as they come out of a cookie container.
//!
//! Container readers hand back cells whose storage type drifts between
//! browser releases (the same `expiry` column has been written as a 32-bit
//! and as a 64-bit integer). [`RawValue`] keeps the observed encoding so the
//! record decoders can accept exactly the encodings they know about and
//! reject everything else with a typed diagnostic.

use std::fmt;

/// One stored cell.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Int32(i32),
    Int64(i64),
    UInt64(u64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl RawValue {
    /// Name of the observed storage type, used in decode diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Int32(_) => "int32",
            RawValue::Int64(_) => "int64",
            RawValue::UInt64(_) => "uint64",
            RawValue::Real(_) => "float64",
            RawValue::Text(_) => "string",
            RawValue::Blob(_) => "blob",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Any integer encoding, widened to `i128` so no encoding can overflow.
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            RawValue::Int32(v) => Some(i128::from(*v)),
            RawValue::Int64(v) => Some(i128::from(*v)),
            RawValue::UInt64(v) => Some(i128::from(*v)),
            _ => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => f.write_str("<nil>"),
            RawValue::Int32(v) => write!(f, "{}", v),
            RawValue::Int64(v) => write!(f, "{}", v),
            RawValue::UInt64(v) => write!(f, "{}", v),
            RawValue::Real(v) => write!(f, "{}", v),
            RawValue::Text(s) => f.write_str(s),
            RawValue::Blob(b) => write!(f, "{:?}", b),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<i32> for RawValue {
    fn from(v: i32) -> Self {
        RawValue::Int32(v)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Int64(v)
    }
}

impl From<u64> for RawValue {
    fn from(v: u64) -> Self {
        RawValue::UInt64(v)
    }
}

impl From<Vec<u8>> for RawValue {
    fn from(b: Vec<u8>) -> Self {
        RawValue::Blob(b)
    }
}

/// One stored row: an optional row identifier plus the cells in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub row_id: Option<i64>,
    pub values: Vec<RawValue>,
}

impl Record {
    pub fn new(values: Vec<RawValue>) -> Self {
        Self {
            row_id: None,
            values,
        }
    }

    pub fn with_row_id(mut self, row_id: i64) -> Self {
        self.row_id = Some(row_id);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
