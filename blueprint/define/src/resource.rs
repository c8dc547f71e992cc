//! Resource definitions.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::action::ActionDefinition;
use crate::attribute::AttributeDefinition;
use crate::response::ResponseDefinition;

/// A group of actions sharing a base path and, usually, a media type.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResourceDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Prefix of every action route; a leading `//` ignores the API base
    /// path.
    pub base_path: String,
    /// Object attribute describing the base path wildcards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_params: Option<AttributeDefinition>,
    /// Resource whose canonical path prefixes this one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Name of the media type representing the resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Action whose first route identifies a single resource instance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_action: Option<String>,
    pub actions: BTreeMap<String, ActionDefinition>,
    /// Defaults for same-named action responses.
    pub responses: BTreeMap<String, ResponseDefinition>,
}

impl ResourceDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn action(&self, name: &str) -> Option<&ActionDefinition> {
        self.actions.get(name)
    }
}
