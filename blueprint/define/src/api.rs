//! The API definition: root of the design tree.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::action::ActionDefinition;
use crate::attribute::AttributeDefinition;
use crate::dsl::ActionBuilder;
use crate::media_type::MediaTypeDefinition;
use crate::resource::ResourceDefinition;
use crate::response::{ResponseDefinition, ResponseTemplateDefinition};
use crate::route::{RouteDefinition, join_paths};
use crate::user_type::UserTypeDefinition;

/// Body of a trait, applied to the action that uses it.
pub type TraitBody = Rc<dyn Fn(&mut ActionBuilder<'_>)>;

/// A named set of action properties applied with `use_trait`.
#[derive(Clone)]
pub struct TraitDefinition {
    pub name: String,
    pub body: TraitBody,
}

impl fmt::Debug for TraitDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraitDefinition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl PartialEq for TraitDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Rc::ptr_eq(&self.body, &other.body)
    }
}

/// Root of a design.
///
/// Holds everything the DSL produced. Traits and response templates only
/// matter while the DSL runs; the passes and the generator read the rest.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ApiDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Prefix of every resource path.
    pub base_path: String,
    /// Object attribute describing the base path wildcards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_params: Option<AttributeDefinition>,
    #[serde(skip)]
    pub traits: BTreeMap<String, TraitDefinition>,
    #[serde(skip)]
    pub response_templates: BTreeMap<String, ResponseTemplateDefinition>,
    /// Defaults for same-named action responses.
    pub responses: BTreeMap<String, ResponseDefinition>,
    pub resources: BTreeMap<String, ResourceDefinition>,
    pub user_types: BTreeMap<String, UserTypeDefinition>,
    pub media_types: BTreeMap<String, MediaTypeDefinition>,
}

impl ApiDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceDefinition> {
        self.resources.get(name)
    }

    pub fn user_type(&self, name: &str) -> Option<&UserTypeDefinition> {
        self.user_types.get(name)
    }

    pub fn media_type(&self, name: &str) -> Option<&MediaTypeDefinition> {
        self.media_types.get(name)
    }

    /// Media type named `name`, or else the one whose identifier is `name`.
    pub fn find_media_type(&self, name: &str) -> Option<&MediaTypeDefinition> {
        self.media_types
            .get(name)
            .or_else(|| self.media_types.values().find(|mt| mt.identifier == name))
    }

    /// Attribute of the user type or media type called `name`.
    pub fn named_attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.user_types
            .get(name)
            .map(|ut| &ut.attribute)
            .or_else(|| self.media_types.get(name).map(|mt| &mt.attribute))
    }

    /// Path every route of `resource` is relative to.
    ///
    /// A resource with a parent is nested under the parent's canonical
    /// path; otherwise it is nested under the API base path. A base path
    /// starting with `//` is used as is.
    pub fn resource_base_path(&self, resource: &ResourceDefinition) -> String {
        let mut seen = vec![resource.name.as_str()];
        self.resource_base_path_inner(resource, &mut seen)
    }

    fn resource_base_path_inner<'a>(
        &'a self,
        resource: &'a ResourceDefinition,
        seen: &mut Vec<&'a str>,
    ) -> String {
        if let Some(absolute) = resource.base_path.strip_prefix("//") {
            return join_paths("", absolute);
        }
        let prefix = match resource.parent.as_deref().and_then(|p| self.resources.get(p)) {
            Some(parent) if !seen.contains(&parent.name.as_str()) => {
                seen.push(&parent.name);
                let parent_base = self.resource_base_path_inner(parent, seen);
                match canonical_route(parent) {
                    Some(route) if route.is_absolute() => join_paths("", &route.path[2..]),
                    Some(route) => join_paths(&parent_base, &route.path),
                    None => parent_base,
                }
            }
            _ => self.base_path.clone(),
        };
        join_paths(&prefix, &resource.base_path)
    }

    /// Full path of `route`, an action route of `resource`.
    pub fn full_path(&self, resource: &ResourceDefinition, route: &RouteDefinition) -> String {
        if route.is_absolute() {
            return join_paths("", &route.path[2..]);
        }
        join_paths(&self.resource_base_path(resource), &route.path)
    }

    /// Full path of the first route of the canonical action, if any.
    pub fn canonical_path(&self, resource: &ResourceDefinition) -> Option<String> {
        canonical_route(resource).map(|route| self.full_path(resource, route))
    }

    /// Whether `name` is a wildcard of one of the action's routes.
    pub fn is_path_param(
        &self,
        resource: &ResourceDefinition,
        action: &ActionDefinition,
        name: &str,
    ) -> bool {
        action.routes.iter().any(|route| {
            crate::route::extract_wildcards(&self.full_path(resource, route))
                .iter()
                .any(|w| w == name)
        })
    }
}

fn canonical_route(resource: &ResourceDefinition) -> Option<&RouteDefinition> {
    resource
        .canonical_action
        .as_deref()
        .and_then(|a| resource.actions.get(a))
        .and_then(|a| a.routes.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::HttpVerb;

    fn make_resource(name: &str, base_path: &str, routes: &[(&str, &str)]) -> ResourceDefinition {
        let mut resource = ResourceDefinition::new(name);
        resource.base_path = base_path.to_string();
        for (action, path) in routes {
            let mut a = ActionDefinition::new(*action);
            a.routes.push(RouteDefinition::new(HttpVerb::Get, *path));
            resource.actions.insert(action.to_string(), a);
        }
        resource
    }

    fn make_api() -> ApiDefinition {
        let mut api = ApiDefinition::new("cellar");
        api.base_path = "/:accountID".to_string();
        let mut account = make_resource("account", "/accounts", &[("show", "/:id")]);
        account.base_path = "//accounts".to_string();
        account.canonical_action = Some("show".to_string());
        let mut bottle = make_resource("bottle", "/bottles", &[("show", "/:id"), ("health", "//health")]);
        bottle.parent = Some("account".to_string());
        let wine = make_resource("wine", "/wines", &[("list", "")]);
        api.resources.insert("account".into(), account);
        api.resources.insert("bottle".into(), bottle);
        api.resources.insert("wine".into(), wine);
        api
    }

    #[test]
    fn base_path_prefixes_resources() {
        let api = make_api();
        assert_eq!(api.resource_base_path(&api.resources["wine"]), "/:accountID/wines");
    }

    #[test]
    fn absolute_base_path_skips_api_base_path() {
        let api = make_api();
        assert_eq!(api.resource_base_path(&api.resources["account"]), "/accounts");
    }

    #[test]
    fn parent_canonical_path_prefixes_child() {
        let api = make_api();
        let bottle = &api.resources["bottle"];
        assert_eq!(api.resource_base_path(bottle), "/accounts/:id/bottles");
        let show = &bottle.actions["show"];
        assert_eq!(api.full_path(bottle, &show.routes[0]), "/accounts/:id/bottles/:id");
    }

    #[test]
    fn absolute_route_ignores_every_prefix() {
        let api = make_api();
        let bottle = &api.resources["bottle"];
        let health = &bottle.actions["health"];
        assert_eq!(api.full_path(bottle, &health.routes[0]), "/health");
    }

    #[test]
    fn canonical_path_of_resource() {
        let api = make_api();
        assert_eq!(
            api.canonical_path(&api.resources["account"]).as_deref(),
            Some("/accounts/:id")
        );
        assert_eq!(api.canonical_path(&api.resources["wine"]), None);
    }

    #[test]
    fn parent_cycles_terminate() {
        let mut api = make_api();
        if let Some(account) = api.resources.get_mut("account") {
            account.base_path = "/accounts".to_string();
            account.parent = Some("bottle".to_string());
        }
        // Terminates; the exact path is irrelevant since validation rejects cycles.
        let _ = api.resource_base_path(&api.resources["bottle"]);
    }

    #[test]
    fn path_params_come_from_full_paths() {
        let api = make_api();
        let wine = &api.resources["wine"];
        let list = &wine.actions["list"];
        assert!(api.is_path_param(wine, list, "accountID"));
        assert!(!api.is_path_param(wine, list, "id"));
    }
}
