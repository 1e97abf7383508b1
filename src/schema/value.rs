//! Dynamically-typed field values
//!
//! A `Value` is the tagged union stored in a record slot. The tag always
//! matches the declared `FieldType` of the slot once a record is built.

use std::fmt;

use super::types::FieldType;

/// A single field value.
///
/// Equality is exact: floats compare by bit pattern, so `NaN` equals
/// itself and `0.0` differs from `-0.0`.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit IEEE-754 float
    Float(f32),
    /// 64-bit IEEE-754 float
    Double(f64),
    Bytes(Vec<u8>),
    String(String),
}

impl Value {
    /// Returns the primitive type this value carries.
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Null => FieldType::Null,
            Value::Boolean(_) => FieldType::Boolean,
            Value::Int(_) => FieldType::Int,
            Value::Long(_) => FieldType::Long,
            Value::Float(_) => FieldType::Float,
            Value::Double(_) => FieldType::Double,
            Value::Bytes(_) => FieldType::Bytes,
            Value::String(_) => FieldType::String,
        }
    }

    /// Converts this value to `target`, applying numeric promotion.
    ///
    /// Returns `None` when the value cannot be stored in a field of type
    /// `target`. Promotions follow `FieldType::accepts`.
    pub fn promote_to(self, target: FieldType) -> Option<Value> {
        if !target.accepts(self.field_type()) {
            return None;
        }

        let promoted = match (self, target) {
            (Value::Int(v), FieldType::Long) => Value::Long(i64::from(v)),
            (Value::Int(v), FieldType::Float) => Value::Float(v as f32),
            (Value::Int(v), FieldType::Double) => Value::Double(f64::from(v)),
            (Value::Long(v), FieldType::Float) => Value::Float(v as f32),
            (Value::Long(v), FieldType::Double) => Value::Double(v as f64),
            (Value::Float(v), FieldType::Double) => Value::Double(f64::from(v)),
            (value, _) => value,
        };

        Some(promoted)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as i64 for `Int` and `Long`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as f64 for `Float` and `Double`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Renders the value as JSON text.
    ///
    /// Bytes become a string of code points 0-255. Non-finite floats become
    /// the strings "NaN", "Infinity" and "-Infinity".
    pub fn write_json<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        match self {
            Value::Null => out.write_str("null"),
            Value::Boolean(b) => write!(out, "{}", b),
            Value::Int(v) => write!(out, "{}", v),
            Value::Long(v) => write!(out, "{}", v),
            Value::Float(v) => write_json_float(out, f64::from(*v), format_args!("{:?}", v)),
            Value::Double(v) => write_json_float(out, *v, format_args!("{:?}", v)),
            Value::Bytes(b) => write_json_string(out, &bytes_to_latin1(b)),
            Value::String(s) => write_json_string(out, s),
        }
    }
}

fn write_json_float<W: fmt::Write>(out: &mut W, v: f64, repr: fmt::Arguments<'_>) -> fmt::Result {
    if v.is_nan() {
        out.write_str("\"NaN\"")
    } else if v.is_infinite() && v > 0.0 {
        out.write_str("\"Infinity\"")
    } else if v.is_infinite() {
        out.write_str("\"-Infinity\"")
    } else {
        out.write_fmt(repr)
    }
}

fn write_json_string<W: fmt::Write>(out: &mut W, s: &str) -> fmt::Result {
    let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
    out.write_str(&quoted)
}

/// Maps each byte to the char with the same code point.
pub(crate) fn bytes_to_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Inverse of `bytes_to_latin1`; `None` if any char is above U+00FF.
pub(crate) fn latin1_to_bytes(s: &str) -> Option<Vec<u8>> {
    s.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect()
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

/// Plain rendering: strings print without quotes, everything else as JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            other => other.write_json(f),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}
