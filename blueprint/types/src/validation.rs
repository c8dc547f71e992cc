//! Validation predicates.
//!
//! Each [`Validation`] is a pure check of a named value. Checks that do not
//! apply to the value's kind pass, so `MinLength` on an integer is a no-op
//! rather than an error.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::format::Format;
use crate::value::Value;

/// A single validation rule attached to an attribute.
///
/// ## Examples
///
/// ```
/// use blueprint_types::{Format, Validation, Value};
///
/// let v = Validation::Format(Format::Email);
/// assert!(v.check("email", &Value::from("a@b.io")).is_ok());
/// assert!(v.check("email", &Value::from("nope")).is_err());
///
/// let v = Validation::MinLength(2);
/// assert!(v.check("tags", &Value::from(vec!["a"])).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validation {
    /// Member names an object value must contain.
    Required(Vec<String>),
    /// The value must equal one of these.
    Enum(Vec<Value>),
    Format(Format),
    /// Inclusive lower bound.
    Minimum(i64),
    /// Inclusive upper bound.
    Maximum(i64),
    /// Minimum string length in characters, or collection size.
    MinLength(usize),
    MaxLength(usize),
}

impl Validation {
    /// Shorthand for [`Validation::Required`].
    pub fn required<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Validation::Required(names.into_iter().map(Into::into).collect())
    }

    /// Checks `value`, naming it `name` in any error.
    ///
    /// ## Errors
    ///
    /// Returns the [`ValidationError`] describing the first violation.
    pub fn check(&self, name: &str, value: &Value) -> Result<(), ValidationError> {
        match self {
            Validation::Required(members) => {
                if let Value::Object(map) = value
                    && let Some(missing) = members.iter().find(|m| !map.contains_key(*m))
                {
                    return Err(ValidationError::MissingMember {
                        name: name.to_string(),
                        member: missing.clone(),
                    });
                }
                Ok(())
            }
            Validation::Enum(allowed) => {
                if allowed.contains(value) {
                    Ok(())
                } else {
                    Err(ValidationError::NotInEnum {
                        name: name.to_string(),
                        value: value.to_string(),
                        allowed: Value::Array(allowed.clone()).to_string(),
                    })
                }
            }
            Validation::Format(format) => match value {
                Value::String(s) if !format.matches(s) => Err(ValidationError::InvalidFormat {
                    name: name.to_string(),
                    format: *format,
                    value: s.clone(),
                }),
                _ => Ok(()),
            },
            Validation::Minimum(min) => match compare_bound(value, *min) {
                Some(Ordering::Less) => Err(ValidationError::BelowMinimum {
                    name: name.to_string(),
                    min: *min,
                    value: value.to_string(),
                }),
                _ => Ok(()),
            },
            Validation::Maximum(max) => match compare_bound(value, *max) {
                Some(Ordering::Greater) => Err(ValidationError::AboveMaximum {
                    name: name.to_string(),
                    max: *max,
                    value: value.to_string(),
                }),
                _ => Ok(()),
            },
            Validation::MinLength(min) => match length(value) {
                Some(len) if len < *min => Err(ValidationError::TooShort {
                    name: name.to_string(),
                    min: *min,
                    len,
                }),
                _ => Ok(()),
            },
            Validation::MaxLength(max) => match length(value) {
                Some(len) if len > *max => Err(ValidationError::TooLong {
                    name: name.to_string(),
                    max: *max,
                    len,
                }),
                _ => Ok(()),
            },
        }
    }
}

// Integers compare exactly; only floats go through f64.
fn compare_bound(value: &Value, bound: i64) -> Option<Ordering> {
    match value {
        Value::Int(i) => Some(i.cmp(&bound)),
        Value::UInt(u) => Some(match i64::try_from(*u) {
            Ok(i) => i.cmp(&bound),
            Err(_) => Ordering::Greater,
        }),
        Value::Float(f) => f.partial_cmp(&(bound as f64)),
        _ => None,
    }
}

/// Runs every validation in order, stopping at the first failure.
pub fn check_all(validations: &[Validation], name: &str, value: &Value) -> Result<(), ValidationError> {
    validations.iter().try_for_each(|v| v.check(name, value))
}

fn length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        _ => None,
    }
}
