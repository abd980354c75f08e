//! Typed slot values and raw telemetry readings.
//!
//! Slots in the configuration model are typed ([`ValueType`]); the monitoring
//! channel delivers untyped primitives ([`RawValue`]). [`ValueType::coerce`]
//! bridges the two.

use serde::{Deserialize, Serialize};

/// Declared type of a scalar slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Integer,
    Real,
    Boolean,
    Text,
}

impl ValueType {
    /// Build a typed value from a raw reading, applying the telemetry
    /// coercion rules first and the plain value factory otherwise.
    ///
    /// - integer slot, floating-point reading: truncate toward zero
    /// - boolean slot, floating-point reading: `raw >= 0.5`
    ///
    /// Returns `None` when the reading does not fit the slot, including
    /// NaN, infinite and out-of-range readings for integer slots.
    pub fn coerce(self, raw: &RawValue) -> Option<Value> {
        match (self, raw) {
            (ValueType::Integer, RawValue::Real(v)) => truncate(*v).map(Value::Integer),
            (ValueType::Boolean, RawValue::Real(v)) => Some(Value::Boolean(*v >= 0.5)),
            _ => self.construct(raw),
        }
    }

    /// Value factory: exact kind matches plus integer-to-real widening.
    pub fn construct(self, raw: &RawValue) -> Option<Value> {
        match (self, raw) {
            (ValueType::Integer, RawValue::Integer(v)) => Some(Value::Integer(*v)),
            (ValueType::Real, RawValue::Real(v)) => Some(Value::Real(*v)),
            (ValueType::Real, RawValue::Integer(v)) => Some(Value::Real(*v as f64)),
            (ValueType::Boolean, RawValue::Boolean(v)) => Some(Value::Boolean(*v)),
            (ValueType::Text, RawValue::Text(v)) => Some(Value::Text(v.clone())),
            _ => None,
        }
    }
}

/// `v` truncated toward zero, if that is representable as an `i64`.
fn truncate(v: f64) -> Option<i64> {
    let t = v.trunc();
    // i64::MAX rounds up to 2^63 as f64, which is already out of range.
    (t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64).then_some(t as i64)
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::Integer => write!(f, "Integer"),
            ValueType::Real => write!(f, "Real"),
            ValueType::Boolean => write!(f, "Boolean"),
            ValueType::Text => write!(f, "Text"),
        }
    }
}

/// A typed value stored in a scalar slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Text(String),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Integer(_) => ValueType::Integer,
            Value::Real(_) => ValueType::Real,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Text(_) => ValueType::Text,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Real(v) => write!(f, "{}", v),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "\"{}\"", v),
        }
    }
}

/// A primitive reading as serialized by the monitoring channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Text(String),
}

impl RawValue {
    /// Short name of the reading's primitive kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Integer(_) => "integer",
            RawValue::Real(_) => "floating-point",
            RawValue::Boolean(_) => "boolean",
            RawValue::Text(_) => "text",
        }
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Real(v)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Integer(v)
    }
}

impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        RawValue::Boolean(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}
