//! Action definitions.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::attribute::AttributeDefinition;
use crate::response::ResponseDefinition;
use crate::route::RouteDefinition;

/// An operation of a resource, reachable through one or more routes.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ActionDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub routes: Vec<RouteDefinition>,
    /// Object attribute of path and query parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<AttributeDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<AttributeDefinition>,
    /// Object attribute of request headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<AttributeDefinition>,
    /// Parameters usable to filter the listed results.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,
    /// Views of the resource media type this action may render.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub views: Vec<String>,
    pub responses: BTreeMap<String, ResponseDefinition>,
}

impl ActionDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn param(&self, name: &str) -> Option<&AttributeDefinition> {
        self.params.as_ref().and_then(|p| p.member(name))
    }

    pub fn param_names(&self) -> Vec<&str> {
        self.params
            .as_ref()
            .map(AttributeDefinition::member_names)
            .unwrap_or_default()
    }

    /// Names of the headers the request must carry.
    pub fn required_headers(&self) -> Vec<&str> {
        self.headers
            .as_ref()
            .map(|h| h.required.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
