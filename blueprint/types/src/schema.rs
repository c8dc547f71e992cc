//! Structural types: arrays and objects built from primitives.
//!
//! ## Examples
//!
//! ```
//! use blueprint_types::{Member, Object, Primitive, Type, Validation, Value};
//!
//! let bottle = Type::Object(
//!     Object::new()
//!         .member("id", Member::new(Primitive::Integer))
//!         .member("vintage", Member::new(Primitive::Integer).with_default(2000))
//!         .member("tags", Member::new(Type::array(Primitive::String))
//!             .with_validation(Validation::MaxLength(3))),
//! );
//!
//! let loaded = bottle.load(&Value::from(r#"{"id": "1", "tags": ["a"]}"#)).unwrap();
//! assert_eq!(loaded.get("id"), Some(&Value::Int(1)));
//! assert_eq!(loaded.get("vintage"), Some(&Value::Int(2000)));
//! ```

use std::collections::BTreeMap;

use tracing::trace;

use crate::error::{IncompatibleValue, LoadError};
use crate::kind::Kind;
use crate::primitive::Primitive;
use crate::validation::{Validation, check_all};
use crate::value::Value;

/// A declared type: a primitive, an array of some type, or an object.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Primitive(Primitive),
    Array(Box<Type>),
    Object(Object),
}

impl From<Primitive> for Type {
    fn from(p: Primitive) -> Self {
        Type::Primitive(p)
    }
}

impl From<Object> for Type {
    fn from(o: Object) -> Self {
        Type::Object(o)
    }
}

impl Type {
    pub fn array(element: impl Into<Type>) -> Self {
        Type::Array(Box::new(element.into()))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Type::Primitive(p) => p.kind(),
            Type::Array(_) => Kind::Array,
            Type::Object(_) => Kind::Object,
        }
    }

    /// Coerces `value` into this type.
    ///
    /// Arrays and objects also accept strings holding a JSON literal of the
    /// right shape. Array elements are loaded recursively and the first
    /// failing element is reported with its index. Objects load each
    /// declared member in name order, fill in defaults for absent members
    /// and return the first member error; undeclared keys are dropped.
    ///
    /// ## Errors
    ///
    /// Returns a [`LoadError`] describing the first failure.
    pub fn load(&self, value: &Value) -> Result<Value, LoadError> {
        match self {
            Type::Primitive(p) => Ok(p.load(value)?),
            Type::Array(element) => {
                let items = decode_array(value)?;
                let mut loaded = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    loaded.push(element.load(item).map_err(|e| e.at_index(value, i))?);
                }
                Ok(Value::Array(loaded))
            }
            Type::Object(object) => object.load(value),
        }
    }
}

/// A declared object type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object {
    pub members: BTreeMap<String, Member>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member, builder style.
    pub fn member(mut self, name: impl Into<String>, member: Member) -> Self {
        self.members.insert(name.into(), member);
        self
    }

    fn load(&self, value: &Value) -> Result<Value, LoadError> {
        let raw = decode_object(value)?;
        let mut loaded = BTreeMap::new();
        let mut errors = Vec::new();
        for (name, member) in &self.members {
            match member.load(name, raw.get(name)) {
                Ok(Some(v)) => {
                    loaded.insert(name.clone(), v);
                }
                Ok(None) => {}
                Err(e) => errors.push(e.in_member(value, name)),
            }
        }
        for key in raw.keys().filter(|k| !self.members.contains_key(*k)) {
            trace!(key = %key, "dropping undeclared object key");
        }
        // Only the first member error is surfaced.
        match errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(Value::Object(loaded)),
        }
    }
}

/// A member of an object type.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub ty: Type,
    pub default: Option<Value>,
    pub validations: Vec<Validation>,
    pub description: Option<String>,
}

impl Member {
    pub fn new(ty: impl Into<Type>) -> Self {
        Self {
            ty: ty.into(),
            default: None,
            validations: Vec::new(),
            description: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validations.push(validation);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Loads the member's value, falling back to its default, then runs
    /// its validations. Returns `None` when the value is absent and there
    /// is no default.
    pub fn load(&self, name: &str, value: Option<&Value>) -> Result<Option<Value>, LoadError> {
        let Some(value) = value.or(self.default.as_ref()) else {
            return Ok(None);
        };
        let loaded = self.ty.load(value)?;
        check_all(&self.validations, name, &loaded)?;
        Ok(Some(loaded))
    }
}

/// Reads a sequence, or a string holding a JSON array literal.
///
/// ## Errors
///
/// Returns [`IncompatibleValue`] targeting [`Kind::Array`] otherwise.
pub fn decode_array(value: &Value) -> Result<Vec<Value>, IncompatibleValue> {
    match value {
        Value::Array(items) => Ok(items.clone()),
        Value::String(s) => match Value::from_json_str(s) {
            Ok(Value::Array(items)) => Ok(items),
            _ => Err(IncompatibleValue::with_detail(
                value.clone(),
                Kind::Array,
                "string is not a JSON array",
            )),
        },
        _ => Err(IncompatibleValue::new(value.clone(), Kind::Array)),
    }
}

/// Reads a string-keyed mapping, or a string holding a JSON object literal.
///
/// ## Errors
///
/// Returns [`IncompatibleValue`] targeting [`Kind::Object`] otherwise.
pub fn decode_object(value: &Value) -> Result<BTreeMap<String, Value>, IncompatibleValue> {
    match value {
        Value::Object(map) => Ok(map.clone()),
        Value::String(s) => match Value::from_json_str(s) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Err(IncompatibleValue::with_detail(
                value.clone(),
                Kind::Object,
                "string is not a JSON object",
            )),
        },
        _ => Err(IncompatibleValue::new(value.clone(), Kind::Object)),
    }
}
