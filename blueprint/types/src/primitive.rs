//! Primitive types and their coercion rules.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::IncompatibleValue;
use crate::kind::Kind;
use crate::value::Value;

/// A type without nested structure.
///
/// ## Examples
///
/// ```
/// use blueprint_types::{Primitive, Value};
///
/// assert_eq!(Primitive::Integer.load(&Value::from("42")).unwrap(), Value::Int(42));
/// assert_eq!(Primitive::Boolean.load(&Value::from(1)).unwrap(), Value::Bool(true));
/// assert!(Primitive::Integer.load(&Value::from("abc")).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Primitive {
    Null,
    Boolean,
    Integer,
    Number,
    String,
}

impl Primitive {
    pub fn kind(self) -> Kind {
        match self {
            Primitive::Null => Kind::Null,
            Primitive::Boolean => Kind::Boolean,
            Primitive::Integer => Kind::Integer,
            Primitive::Number => Kind::Number,
            Primitive::String => Kind::String,
        }
    }

    /// Coerces `value` into this primitive.
    ///
    /// - Boolean: booleans, boolean literals (`true`, `f`, `1`, ...) or the
    ///   integers 0 and 1
    /// - Integer: any integer, or a base-10 integer string
    /// - Number: any number, or a float string
    /// - String: strings, or times rendered as RFC3339
    /// - Null: only null
    ///
    /// ## Errors
    ///
    /// Returns [`IncompatibleValue`] when the value cannot be represented.
    pub fn load(self, value: &Value) -> Result<Value, IncompatibleValue> {
        let incompatible = || IncompatibleValue::new(value.clone(), self.kind());
        match self {
            Primitive::Null => match value {
                Value::Null => Ok(Value::Null),
                _ => Err(incompatible()),
            },
            Primitive::Boolean => match value {
                Value::Bool(b) => Ok(Value::Bool(*b)),
                Value::String(s) => parse_bool(s).map(Value::Bool).ok_or_else(incompatible),
                Value::Int(0) | Value::UInt(0) => Ok(Value::Bool(false)),
                Value::Int(1) | Value::UInt(1) => Ok(Value::Bool(true)),
                Value::Int(_) | Value::UInt(_) => Err(IncompatibleValue::with_detail(
                    value.clone(),
                    Kind::Boolean,
                    "integer value must be 0 or 1",
                )),
                _ => Err(incompatible()),
            },
            Primitive::Integer => match value {
                Value::Int(i) => Ok(Value::Int(*i)),
                Value::UInt(u) => i64::try_from(*u).map(Value::Int).map_err(|_| {
                    IncompatibleValue::with_detail(value.clone(), Kind::Integer, "value out of range")
                }),
                Value::String(s) => s.parse::<i64>().map(Value::Int).map_err(|_| incompatible()),
                _ => Err(incompatible()),
            },
            Primitive::Number => match value {
                Value::Float(f) => Ok(Value::Float(*f)),
                Value::Int(i) => Ok(Value::Float(*i as f64)),
                Value::UInt(u) => Ok(Value::Float(*u as f64)),
                Value::String(s) => s.parse::<f64>().map(Value::Float).map_err(|_| incompatible()),
                _ => Err(incompatible()),
            },
            Primitive::String => match value {
                Value::String(s) => Ok(Value::String(s.clone())),
                Value::Time(t) => Ok(Value::String(
                    t.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                )),
                _ => Err(incompatible()),
            },
        }
    }
}

/// Boolean literals accepted in strings.
fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
