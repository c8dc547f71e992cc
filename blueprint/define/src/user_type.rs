//! Named user types.

use serde::Serialize;

use crate::attribute::AttributeDefinition;

/// A named type reusable across payloads, params and media types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserTypeDefinition {
    pub name: String,
    pub attribute: AttributeDefinition,
}

impl UserTypeDefinition {
    pub fn new(name: impl Into<String>, attribute: AttributeDefinition) -> Self {
        Self {
            name: name.into(),
            attribute,
        }
    }
}
