//! Attribute definitions: the recursive building block of every design.
//!
//! An attribute pairs a [`DataType`] with validations, a default value, the
//! names of required members and, for media-typed attributes, the view used
//! to render them.
//!
//! ## Examples
//!
//! ```
//! use blueprint_define::{AttributeDefinition, DataType};
//! use blueprint_types::Primitive;
//!
//! let mut bottle = AttributeDefinition::new(DataType::object());
//! bottle.add_member("id", Primitive::Integer.into());
//! bottle.add_member("account", DataType::media_type("Account").into());
//! bottle.required.push("id".to_string());
//!
//! assert!(bottle.is_required("id"));
//! assert_eq!(bottle.member_names(), vec!["account", "id"]);
//! ```

use std::collections::BTreeMap;

use blueprint_types::{Primitive, Validation, Value};
use serde::Serialize;

/// Type tag of an attribute.
///
/// User types and media types are referenced by name rather than embedded,
/// so recursive designs stay finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "of")]
pub enum DataType {
    Primitive(Primitive),
    Array(Box<AttributeDefinition>),
    Object(BTreeMap<String, AttributeDefinition>),
    UserType(String),
    MediaType(String),
}

impl DataType {
    /// An empty object.
    pub fn object() -> Self {
        DataType::Object(BTreeMap::new())
    }

    pub fn array(element: impl Into<AttributeDefinition>) -> Self {
        DataType::Array(Box::new(element.into()))
    }

    pub fn user_type(name: impl Into<String>) -> Self {
        DataType::UserType(name.into())
    }

    pub fn media_type(name: impl Into<String>) -> Self {
        DataType::MediaType(name.into())
    }

    pub fn is_object(&self) -> bool {
        matches!(self, DataType::Object(_))
    }

    pub fn is_media_type(&self) -> bool {
        matches!(self, DataType::MediaType(_))
    }

    /// Name of the referenced user type or media type.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            DataType::UserType(n) | DataType::MediaType(n) => Some(n),
            _ => None,
        }
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            DataType::Primitive(p) => p.to_string(),
            DataType::Array(e) => format!("array of {}", e.data_type.describe()),
            DataType::Object(_) => "object".to_string(),
            DataType::UserType(n) => format!("user type {n}"),
            DataType::MediaType(n) => format!("media type {n}"),
        }
    }
}

impl From<Primitive> for DataType {
    fn from(p: Primitive) -> Self {
        DataType::Primitive(p)
    }
}

/// A typed, validated attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeDefinition {
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Validations other than `Required`, in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<Validation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Names of required members; only meaningful on objects.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// View used when rendering a media-typed attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    /// User type or media type whose members this attribute inherits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
}

impl Default for AttributeDefinition {
    fn default() -> Self {
        Self::new(DataType::object())
    }
}

impl From<DataType> for AttributeDefinition {
    fn from(data_type: DataType) -> Self {
        Self::new(data_type)
    }
}

impl From<Primitive> for AttributeDefinition {
    fn from(p: Primitive) -> Self {
        Self::new(DataType::Primitive(p))
    }
}

impl AttributeDefinition {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            description: None,
            validations: Vec::new(),
            default: None,
            required: Vec::new(),
            view: None,
            base_type: None,
        }
    }

    pub fn members(&self) -> Option<&BTreeMap<String, AttributeDefinition>> {
        match &self.data_type {
            DataType::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn members_mut(&mut self) -> Option<&mut BTreeMap<String, AttributeDefinition>> {
        match &mut self.data_type {
            DataType::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn member(&self, name: &str) -> Option<&AttributeDefinition> {
        self.members().and_then(|m| m.get(name))
    }

    /// Member names in order; empty for non-objects.
    pub fn member_names(&self) -> Vec<&str> {
        self.members()
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Adds or replaces a member. Returns `false` if this is not an object.
    pub fn add_member(&mut self, name: impl Into<String>, member: AttributeDefinition) -> bool {
        match self.members_mut() {
            Some(m) => {
                m.insert(name.into(), member);
                true
            }
            None => false,
        }
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// All validations including a `Required` rule for the required names.
    pub fn all_validations(&self) -> Vec<Validation> {
        let mut all = Vec::with_capacity(self.validations.len() + 1);
        if !self.required.is_empty() {
            all.push(Validation::Required(self.required.clone()));
        }
        all.extend(self.validations.iter().cloned());
        all
    }

    /// Merges the members of `base` that this attribute does not declare
    /// itself. Own members win on collision. Required names of the base are
    /// added when missing.
    ///
    /// Returns `true` if anything changed.
    pub fn inherit(&mut self, base: &AttributeDefinition) -> bool {
        let (Some(own), Some(inherited)) = (self.members_mut(), base.members()) else {
            return false;
        };
        let mut changed = false;
        for (name, member) in inherited {
            if !own.contains_key(name) {
                own.insert(name.clone(), member.clone());
                changed = true;
            }
        }
        for name in &base.required {
            if !self.is_required(name) {
                self.required.push(name.clone());
                changed = true;
            }
        }
        changed
    }
}
