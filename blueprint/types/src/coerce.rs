//! Typed coercion helpers used by generated `load` functions.
//!
//! Each helper runs the matching [`Primitive::load`] rule and hands back the
//! native Rust value. The structural helpers ([`elements`], [`member`],
//! [`param`], [`payload`]) take a loader closure for the inner type and
//! attach position information to its errors.

use std::collections::BTreeMap;

use crate::error::{FieldError, IncompatibleValue, LoadError, RequestErrors};
use crate::kind::Kind;
use crate::primitive::Primitive;
use crate::schema::{decode_array, decode_object};
use crate::value::Value;

pub fn null(value: &Value) -> Result<(), LoadError> {
    Primitive::Null.load(value)?;
    Ok(())
}

pub fn boolean(value: &Value) -> Result<bool, LoadError> {
    match Primitive::Boolean.load(value)? {
        Value::Bool(b) => Ok(b),
        _ => Err(IncompatibleValue::new(value.clone(), Primitive::Boolean.kind()).into()),
    }
}

pub fn integer(value: &Value) -> Result<i64, LoadError> {
    match Primitive::Integer.load(value)? {
        Value::Int(i) => Ok(i),
        _ => Err(IncompatibleValue::new(value.clone(), Primitive::Integer.kind()).into()),
    }
}

pub fn number(value: &Value) -> Result<f64, LoadError> {
    match Primitive::Number.load(value)? {
        Value::Float(f) => Ok(f),
        _ => Err(IncompatibleValue::new(value.clone(), Primitive::Number.kind()).into()),
    }
}

pub fn string(value: &Value) -> Result<String, LoadError> {
    match Primitive::String.load(value)? {
        Value::String(s) => Ok(s),
        _ => Err(IncompatibleValue::new(value.clone(), Primitive::String.kind()).into()),
    }
}

pub fn array(value: &Value) -> Result<Vec<Value>, LoadError> {
    Ok(decode_array(value)?)
}

pub fn object(value: &Value) -> Result<BTreeMap<String, Value>, LoadError> {
    Ok(decode_object(value)?)
}

/// Loads every element of an array, naming the index of the first failure.
pub fn elements<T>(
    value: &Value,
    mut load: impl FnMut(&Value) -> Result<T, LoadError>,
) -> Result<Vec<T>, LoadError> {
    let items = decode_array(value)?;
    let mut loaded = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        loaded.push(load(item).map_err(|e| e.at_index(value, i))?);
    }
    Ok(loaded)
}

/// Loads member `name` of a decoded object, falling back to `default`.
///
/// Returns `None` when the member is absent and has no default.
pub fn member<T>(
    value: &Value,
    object: &BTreeMap<String, Value>,
    name: &str,
    default: Option<Value>,
    load: impl FnOnce(&Value) -> Result<T, LoadError>,
) -> Result<Option<T>, LoadError> {
    let item = match object.get(name) {
        Some(item) => item.clone(),
        None => match default {
            Some(default) => default,
            None => return Ok(None),
        },
    };
    load(&item)
        .map(Some)
        .map_err(|e| e.in_member(value, name))
}

/// Loads a request parameter, recording failures in `errors`.
///
/// A missing parameter is only an error when `required` is set.
pub fn param<T>(
    errors: &mut RequestErrors,
    name: &str,
    raw: Option<Value>,
    required: bool,
    load: impl FnOnce(&Value) -> Result<T, LoadError>,
) -> Option<T> {
    let Some(raw) = raw else {
        if required {
            errors.push(FieldError::MissingParam {
                name: name.to_string(),
            });
        }
        return None;
    };
    match load(&raw) {
        Ok(value) => Some(value),
        Err(source) => {
            errors.push(FieldError::InvalidParam {
                name: name.to_string(),
                source,
            });
            None
        }
    }
}

/// Loads a request payload, recording failures in `errors`.
///
/// A missing payload is reported as a load failure of kind `expected`.
pub fn payload<T>(
    errors: &mut RequestErrors,
    raw: Option<Value>,
    expected: Kind,
    load: impl FnOnce(&Value) -> Result<T, LoadError>,
) -> Option<T> {
    let result = match raw {
        Some(raw) => load(&raw),
        None => Err(IncompatibleValue::with_detail(Value::Null, expected, "payload is required").into()),
    };
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(FieldError::InvalidPayload(e));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_return_native_values() {
        assert_eq!(integer(&Value::from("42")), Ok(42));
        assert_eq!(number(&Value::from(2)), Ok(2.0));
        assert_eq!(boolean(&Value::from("t")), Ok(true));
        assert_eq!(string(&Value::from("x")), Ok("x".to_string()));
        assert_eq!(null(&Value::Null), Ok(()));
    }

    #[test]
    fn helper_errors_carry_target_kind() {
        let err = integer(&Value::from("abc")).unwrap_err();
        assert_eq!(err.expected_kind(), Some(Kind::Integer));
    }

    #[test]
    fn containers_decode_json_strings() {
        assert_eq!(array(&Value::from("[1]")).unwrap(), vec![Value::Int(1)]);
        assert_eq!(object(&Value::from("{}")).unwrap(), BTreeMap::new());
    }

    #[test]
    fn elements_name_the_failing_index() {
        let err = elements(&Value::from("[1, \"x\"]"), integer).unwrap_err();
        assert!(err.to_string().contains("index 1"));
        assert_eq!(elements(&Value::from(vec![1, 2]), integer), Ok(vec![1, 2]));
    }

    #[test]
    fn member_falls_back_to_default() {
        let value = Value::object([("id", 1)]);
        let object = object(&value).unwrap();
        assert_eq!(member(&value, &object, "id", None, integer), Ok(Some(1)));
        assert_eq!(member(&value, &object, "page", Some(Value::from(3)), integer), Ok(Some(3)));
        assert_eq!(member(&value, &object, "sort", None, string), Ok(None));
    }

    #[test]
    fn param_records_missing_and_invalid() {
        let mut errors = RequestErrors::new();
        assert_eq!(param(&mut errors, "id", Some(Value::from("7")), true, integer), Some(7));
        assert_eq!(param(&mut errors, "id", Some(Value::from("x")), true, integer), None);
        assert_eq!(param(&mut errors, "sort", None, true, string), None);
        assert_eq!(param(&mut errors, "page", None, false, integer), None);
        let fields: Vec<_> = errors.iter().map(FieldError::field).collect();
        assert_eq!(fields, vec!["id", "sort"]);
    }

    #[test]
    fn missing_payload_is_an_error() {
        let mut errors = RequestErrors::new();
        assert_eq!(payload(&mut errors, None, Kind::Object, object), None);
        assert!(matches!(errors.iter().next(), Some(FieldError::InvalidPayload(_))));
    }
}
