//! Structural validation of an evaluated design.
//!
//! [`validate_api`] walks the API, its types and its resources and collects
//! every problem it finds. It never mutates the tree and always reports the
//! same errors, in the same order, for the same tree.

use std::collections::BTreeMap;

use regex::Regex;
use tracing::{debug, instrument};

use crate::action::ActionDefinition;
use crate::api::ApiDefinition;
use crate::attribute::{AttributeDefinition, DataType};
use crate::error::{DesignError, DesignErrors};
use crate::load::load_attribute;
use crate::media_type::{MediaTypeDefinition, is_valid_identifier};
use crate::resource::ResourceDefinition;
use crate::response::{HeaderPattern, ResponseDefinition, builtin_response};
use crate::route::extract_wildcards;

/// Validates an evaluated, not yet finalized, design.
///
/// ## Errors
///
/// Returns every [`DesignError`] found, in walk order.
#[instrument(skip_all, fields(api = %api.name))]
pub fn validate_api(api: &ApiDefinition) -> Result<(), DesignErrors> {
    let mut validator = Validator::new(api);
    validator.api();
    validator.finish()
}

/// Validates a finalized design.
///
/// Runs every check of [`validate_api`] and additionally requires each
/// route wildcard to have a matching parameter, which finalize guarantees.
///
/// ## Errors
///
/// Returns every [`DesignError`] found, in walk order.
#[instrument(skip_all, fields(api = %api.name))]
pub fn validate_finalized(api: &ApiDefinition) -> Result<(), DesignErrors> {
    let mut validator = Validator::new(api);
    validator.api();
    for resource in api.resources.values() {
        for action in resource.actions.values() {
            validator.wildcard_params(resource, action);
        }
    }
    validator.finish()
}

struct Validator<'a> {
    api: &'a ApiDefinition,
    errors: Vec<DesignError>,
}

impl<'a> Validator<'a> {
    fn new(api: &'a ApiDefinition) -> Self {
        Self {
            api,
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Result<(), DesignErrors> {
        debug!(errors = self.errors.len(), "validation done");
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DesignErrors(self.errors))
        }
    }

    fn api(&mut self) {
        let api = self.api;
        let context = format!("API {:?}", api.name);
        if api.name.is_empty() {
            self.errors.push(DesignError::EmptyName {
                context: context.clone(),
            });
        }
        if let Some(params) = &api.base_params {
            self.base_params(&context, params, &api.base_path);
        }
        for response in api.responses.values() {
            self.response(&context, response);
        }
        for user_type in api.user_types.values() {
            let context = format!("user type {:?}", user_type.name);
            if user_type.name.is_empty() {
                self.errors.push(DesignError::EmptyName {
                    context: context.clone(),
                });
            }
            self.attribute(&context, &user_type.attribute);
        }
        for media_type in api.media_types.values() {
            self.media_type(media_type);
        }
        for resource in api.resources.values() {
            self.resource(resource);
        }
    }

    fn base_params(&mut self, context: &str, params: &'a AttributeDefinition, path: &str) {
        let context = format!("{context} base params");
        let Some(members) = params.members() else {
            self.errors
                .push(DesignError::BaseParamsNotObject { context });
            return;
        };
        let wildcards = extract_wildcards(path);
        for name in members.keys() {
            if !wildcards.contains(name) {
                self.errors.push(DesignError::BaseParamNotInPath {
                    context: context.clone(),
                    param: name.clone(),
                    path: path.to_string(),
                });
            }
        }
        self.attribute(&context, params);
    }

    fn response(&mut self, context: &str, response: &ResponseDefinition) {
        let context = format!("{context} response {:?}", response.name);
        if let Some(status) = response.status
            && !(100..=599).contains(&status)
        {
            self.errors.push(DesignError::InvalidStatus {
                context: context.clone(),
                response: response.name.clone(),
                status,
            });
        }
        if let Some(media_type) = &response.media_type
            && self.api.find_media_type(media_type).is_none()
        {
            self.errors.push(DesignError::UnknownMediaType {
                context: context.clone(),
                name: media_type.clone(),
            });
        }
        for (header, pattern) in &response.headers {
            if let HeaderPattern::Regex(re) = pattern
                && Regex::new(re).is_err()
            {
                self.errors.push(DesignError::InvalidHeaderPattern {
                    context: context.clone(),
                    header: header.clone(),
                    pattern: re.clone(),
                });
            }
        }
    }

    fn media_type(&mut self, media_type: &'a MediaTypeDefinition) {
        let context = format!("media type {:?}", media_type.name);
        if media_type.name.is_empty() {
            self.errors.push(DesignError::EmptyName {
                context: context.clone(),
            });
        }
        if !is_valid_identifier(&media_type.identifier) {
            self.errors.push(DesignError::InvalidIdentifier {
                context: context.clone(),
                identifier: media_type.identifier.clone(),
            });
        }
        self.attribute(&context, &media_type.attribute);

        for link in media_type.links.values() {
            let target = self
                .effective_member(&media_type.attribute, &link.name)
                .and_then(|m| match &m.data_type {
                    DataType::MediaType(n) => Some(n),
                    _ => None,
                });
            match target {
                None => self.errors.push(DesignError::InvalidLink {
                    context: context.clone(),
                    link: link.name.clone(),
                }),
                Some(target) => self.target_view(&context, target, &link.view),
            }
        }

        for view in media_type.views.values() {
            for entry in &view.members {
                let Some(member) = self.effective_member(&media_type.attribute, &entry.name) else {
                    self.errors.push(DesignError::UnknownViewMember {
                        context: context.clone(),
                        view: view.name.clone(),
                        member: entry.name.clone(),
                    });
                    continue;
                };
                if let Some(nested) = &entry.view {
                    match &member.data_type {
                        DataType::MediaType(target) => self.target_view(&context, target, nested),
                        _ => self.errors.push(DesignError::ViewOnNonMediaType {
                            context: format!("{context} view {:?}", view.name),
                            view: nested.clone(),
                        }),
                    }
                }
            }
            for link in &view.links {
                if !media_type.links.contains_key(link) {
                    self.errors.push(DesignError::UnknownViewLink {
                        context: context.clone(),
                        view: view.name.clone(),
                        link: link.clone(),
                    });
                }
            }
        }
    }

    // Unknown targets are reported where the attribute type is checked.
    fn target_view(&mut self, context: &str, target: &str, view: &str) {
        if let Some(mt) = self.api.media_type(target)
            && !mt.views.contains_key(view)
        {
            self.errors.push(DesignError::UnknownView {
                context: context.to_string(),
                media_type: target.to_string(),
                view: view.to_string(),
            });
        }
    }

    fn attribute(&mut self, context: &str, attribute: &'a AttributeDefinition) {
        match &attribute.data_type {
            DataType::Primitive(_) | DataType::Array(_) if !attribute.required.is_empty() => {
                self.errors.push(DesignError::RequiredOnNonObject {
                    context: context.to_string(),
                    data_type: attribute.data_type.describe(),
                });
            }
            DataType::Object(_) => self.required_members(context, attribute, attribute),
            DataType::UserType(name) | DataType::MediaType(name) => {
                match self.api.named_attribute(name) {
                    Some(named) if matches_kind(&attribute.data_type, self.api, name) => {
                        self.required_members(context, attribute, named)
                    }
                    _ => self.errors.push(DesignError::UnknownType {
                        context: context.to_string(),
                        name: name.clone(),
                    }),
                }
            }
            _ => {}
        }

        if let Some(view) = &attribute.view {
            match &attribute.data_type {
                DataType::MediaType(target) => self.target_view(context, target, view),
                _ => self.errors.push(DesignError::ViewOnNonMediaType {
                    context: context.to_string(),
                    view: view.clone(),
                }),
            }
        }

        if let Some(base) = &attribute.base_type {
            match self.api.named_attribute(base) {
                None => self.errors.push(DesignError::UnknownBaseType {
                    context: context.to_string(),
                    name: base.clone(),
                }),
                Some(base_attribute)
                    if !(base_attribute.data_type.is_object()
                        && attribute.data_type.is_object()) =>
                {
                    self.errors.push(DesignError::InvalidBaseType {
                        context: context.to_string(),
                        name: base.clone(),
                    })
                }
                Some(_) => {}
            }
        }

        if let Some(default) = &attribute.default
            && matches!(
                attribute.data_type,
                DataType::Primitive(_) | DataType::Array(_)
            )
            && let Err(e) = load_attribute(self.api, "default", attribute, default)
        {
            self.errors.push(DesignError::InvalidDefault {
                context: context.to_string(),
                detail: e.to_string(),
            });
        }

        match &attribute.data_type {
            DataType::Array(element) => self.attribute(&format!("{context} element"), element),
            DataType::Object(members) => {
                for (name, member) in members {
                    self.attribute(&format!("{context} attribute {name:?}"), member);
                }
            }
            _ => {}
        }
    }

    /// Checks the required names of `attribute` against the members of
    /// `object`, inherited ones included.
    fn required_members(
        &mut self,
        context: &str,
        attribute: &AttributeDefinition,
        object: &'a AttributeDefinition,
    ) {
        for name in &attribute.required {
            if self.effective_member(object, name).is_none() {
                self.errors.push(DesignError::UnknownRequired {
                    context: context.to_string(),
                    member: name.clone(),
                });
            }
        }
    }

    /// Member `name` of `attribute` or of its base types.
    fn effective_member(
        &self,
        attribute: &'a AttributeDefinition,
        name: &str,
    ) -> Option<&'a AttributeDefinition> {
        let mut current = attribute;
        // Bounded so base type cycles terminate.
        for _ in 0..=self.api.user_types.len() + self.api.media_types.len() {
            if let Some(member) = current.member(name) {
                return Some(member);
            }
            current = self.api.named_attribute(current.base_type.as_deref()?)?;
        }
        None
    }

    fn resource(&mut self, resource: &'a ResourceDefinition) {
        let api = self.api;
        let context = format!("resource {:?}", resource.name);
        if resource.name.is_empty() {
            self.errors.push(DesignError::EmptyName {
                context: context.clone(),
            });
        }
        if let Some(parent) = &resource.parent {
            if !api.resources.contains_key(parent) {
                self.errors.push(DesignError::UnknownParent {
                    context: context.clone(),
                    parent: parent.clone(),
                });
            } else if has_parent_cycle(api, resource) {
                self.errors.push(DesignError::ParentCycle {
                    context: context.clone(),
                });
            }
        }
        if let Some(action) = &resource.canonical_action
            && !resource.actions.contains_key(action)
        {
            self.errors.push(DesignError::UnknownCanonicalAction {
                context: context.clone(),
                action: action.clone(),
            });
        }
        if let Some(media_type) = &resource.media_type
            && api.find_media_type(media_type).is_none()
        {
            self.errors.push(DesignError::UnknownMediaType {
                context: context.clone(),
                name: media_type.clone(),
            });
        }
        if let Some(params) = &resource.base_params {
            self.base_params(&context, params, &api.resource_base_path(resource));
        }
        for response in resource.responses.values() {
            self.response(&context, response);
        }
        for action in resource.actions.values() {
            self.action(resource, action);
        }
    }

    fn action(&mut self, resource: &'a ResourceDefinition, action: &'a ActionDefinition) {
        let api = self.api;
        let context = format!("resource {:?} action {:?}", resource.name, action.name);
        if action.name.is_empty() {
            self.errors.push(DesignError::EmptyName {
                context: context.clone(),
            });
        }
        if action.routes.is_empty() {
            self.errors.push(DesignError::NoRoute {
                context: context.clone(),
            });
        }

        if let Some(params) = &action.params {
            for (name, param) in params.members().into_iter().flatten() {
                if !is_param_type(api, param) {
                    self.errors.push(DesignError::ObjectParam {
                        context: context.clone(),
                        param: name.clone(),
                    });
                }
            }
            self.attribute(&format!("{context} params"), params);
        }
        if let Some(headers) = &action.headers {
            self.attribute(&format!("{context} headers"), headers);
        }
        if let Some(payload) = &action.payload {
            self.attribute(&format!("{context} payload"), payload);
        }

        for filter in &action.filters {
            if action.param(filter).is_none() {
                self.errors.push(DesignError::UnknownFilter {
                    context: context.clone(),
                    filter: filter.clone(),
                });
            }
        }
        if !action.views.is_empty() {
            let media_type = resource
                .media_type
                .as_deref()
                .and_then(|m| api.find_media_type(m));
            for view in &action.views {
                if !media_type.is_some_and(|mt| mt.views.contains_key(view)) {
                    self.errors.push(DesignError::UnknownView {
                        context: context.clone(),
                        media_type: resource.media_type.clone().unwrap_or_default(),
                        view: view.clone(),
                    });
                }
            }
        }

        let mut statuses: BTreeMap<u16, &str> = BTreeMap::new();
        for (name, response) in &action.responses {
            self.response(&context, response);
            match effective_status(api, resource, response) {
                None => self.errors.push(DesignError::MissingStatus {
                    context: context.clone(),
                    response: name.clone(),
                }),
                Some(status) => match statuses.get(&status) {
                    Some(first) => self.errors.push(DesignError::DuplicateStatus {
                        context: context.clone(),
                        status,
                        first: (*first).to_string(),
                        second: name.clone(),
                    }),
                    None => {
                        statuses.insert(status, name);
                    }
                },
            }
        }
    }

    fn wildcard_params(&mut self, resource: &ResourceDefinition, action: &ActionDefinition) {
        let context = format!("resource {:?} action {:?}", resource.name, action.name);
        for route in &action.routes {
            let path = self.api.full_path(resource, route);
            for wildcard in extract_wildcards(&path) {
                if action.param(&wildcard).is_none() {
                    self.errors.push(DesignError::MissingWildcardParam {
                        context: context.clone(),
                        wildcard,
                        path: path.clone(),
                    });
                }
            }
        }
    }
}

fn matches_kind(data_type: &DataType, api: &ApiDefinition, name: &str) -> bool {
    match data_type {
        DataType::UserType(_) => api.user_types.contains_key(name),
        DataType::MediaType(_) => api.media_types.contains_key(name),
        _ => false,
    }
}

/// Status a response ends up with once finalize has merged it.
pub fn effective_status(
    api: &ApiDefinition,
    resource: &ResourceDefinition,
    response: &ResponseDefinition,
) -> Option<u16> {
    response
        .status
        .or_else(|| resource.responses.get(&response.name)?.status)
        .or_else(|| api.responses.get(&response.name)?.status)
        .or_else(|| builtin_response(&response.name)?.status)
}

/// Parameters are primitives or arrays of primitives, possibly through a
/// user type.
fn is_param_type(api: &ApiDefinition, param: &AttributeDefinition) -> bool {
    fn scalar_or_list(data_type: &DataType) -> bool {
        match data_type {
            DataType::Primitive(_) => true,
            DataType::Array(element) => matches!(element.data_type, DataType::Primitive(_)),
            _ => false,
        }
    }
    match &param.data_type {
        DataType::UserType(name) => api
            .user_type(name)
            .is_some_and(|ut| scalar_or_list(&ut.attribute.data_type)),
        other => scalar_or_list(other),
    }
}

fn has_parent_cycle(api: &ApiDefinition, resource: &ResourceDefinition) -> bool {
    let mut seen = vec![resource.name.as_str()];
    let mut current = resource;
    while let Some(parent) = current.parent.as_deref().and_then(|p| api.resource(p)) {
        if seen.contains(&parent.name.as_str()) {
            return parent.name == resource.name;
        }
        seen.push(&parent.name);
        current = parent;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_type::{LinkDefinition, ViewDefinition, ViewMember};
    use crate::route::{HttpVerb, RouteDefinition};
    use crate::user_type::UserTypeDefinition;
    use blueprint_types::{Primitive, Value};

    fn make_action(name: &str, path: &str) -> ActionDefinition {
        let mut action = ActionDefinition::new(name);
        action.routes.push(RouteDefinition::new(HttpVerb::Get, path));
        action
    }

    fn make_api(action: ActionDefinition) -> ApiDefinition {
        let mut api = ApiDefinition::new("cellar");
        let mut resource = ResourceDefinition::new("bottle");
        resource.base_path = "/bottles".to_string();
        resource.actions.insert(action.name.clone(), action);
        api.resources.insert("bottle".to_string(), resource);
        api
    }

    fn errors(api: &ApiDefinition) -> Vec<DesignError> {
        validate_api(api).err().map(|e| e.0).unwrap_or_default()
    }

    fn with_status(name: &str, status: Option<u16>) -> ResponseDefinition {
        ResponseDefinition {
            name: name.to_string(),
            status,
            ..ResponseDefinition::default()
        }
    }

    #[test]
    fn valid_design_passes() {
        let mut action = make_action("show", "/:id");
        let mut params = AttributeDefinition::default();
        params.add_member("id", Primitive::Integer.into());
        params.required.push("id".to_string());
        action.params = Some(params);
        action
            .responses
            .insert("NotFound".into(), ResponseDefinition::new("NotFound"));
        assert_eq!(validate_api(&make_api(action)), Ok(()));
    }

    #[test]
    fn duplicate_status_codes() {
        let mut action = make_action("show", "/:id");
        action
            .responses
            .insert("Found".into(), with_status("Found", Some(200)));
        action.responses.insert("OK".into(), ResponseDefinition::new("OK"));

        let errors = errors(&make_api(action));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_duplicate_status());
        assert_eq!(
            errors[0].to_string(),
            r#"resource "bottle" action "show": responses "Found" and "OK" share status 200"#
        );
    }

    #[test]
    fn missing_status() {
        let mut action = make_action("show", "/:id");
        action
            .responses
            .insert("Custom".into(), ResponseDefinition::new("Custom"));
        let errors = errors(&make_api(action));
        assert!(matches!(errors[0], DesignError::MissingStatus { .. }));
    }

    #[test]
    fn resource_default_provides_status() {
        let mut action = make_action("show", "/:id");
        action
            .responses
            .insert("Custom".into(), ResponseDefinition::new("Custom"));
        let mut api = make_api(action);
        if let Some(resource) = api.resources.get_mut("bottle") {
            resource
                .responses
                .insert("Custom".into(), with_status("Custom", Some(299)));
        }
        assert_eq!(validate_api(&api), Ok(()));
    }

    #[test]
    fn required_checked_at_depth() {
        let mut leaf = AttributeDefinition::default();
        leaf.add_member("a", Primitive::String.into());
        leaf.required.push("b".to_string());
        let mut middle = AttributeDefinition::default();
        middle.add_member("leaf", leaf);
        let mut payload = AttributeDefinition::default();
        payload.add_member("middle", middle);

        let mut action = make_action("create", "");
        action.payload = Some(payload);
        let errors = errors(&make_api(action));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_unknown_required());
        assert_eq!(
            errors[0].context(),
            r#"resource "bottle" action "create" payload attribute "middle" attribute "leaf""#
        );
    }

    #[test]
    fn object_params_rejected() {
        let mut params = AttributeDefinition::default();
        params.add_member("filter", AttributeDefinition::default());
        params.add_member("ids", DataType::array(Primitive::Integer).into());
        let mut action = make_action("list", "");
        action.params = Some(params);
        let errors = errors(&make_api(action));
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], DesignError::ObjectParam { param, .. } if param == "filter"));
    }

    #[test]
    fn unknown_references() {
        let mut action = make_action("show", "/:id");
        action.payload = Some(DataType::user_type("Missing").into());
        action.filters.push("nope".into());
        let mut api = make_api(action);
        if let Some(resource) = api.resources.get_mut("bottle") {
            resource.parent = Some("account".into());
            resource.canonical_action = Some("get".into());
        }
        let errors = errors(&api);
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn parent_cycles() {
        let mut api = make_api(make_action("show", "/:id"));
        let mut account = ResourceDefinition::new("account");
        account.parent = Some("bottle".into());
        account
            .actions
            .insert("show".into(), make_action("show", "/:id"));
        api.resources.insert("account".into(), account);
        if let Some(bottle) = api.resources.get_mut("bottle") {
            bottle.parent = Some("account".into());
        }
        let errors = errors(&api);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e, DesignError::ParentCycle { .. })));
    }

    #[test]
    fn media_type_views_and_links() {
        let mut api = make_api(make_action("show", "/:id"));
        let mut account = MediaTypeDefinition::new("Account", "application/vnd.account+json");
        account.attribute.add_member("id", Primitive::Integer.into());
        account.views.insert("default".into(), account.implicit_default_view());

        let mut bottle = MediaTypeDefinition::new("Bottle", "bottle");
        bottle
            .attribute
            .add_member("account", DataType::media_type("Account").into());
        bottle.links.insert(
            "account".into(),
            LinkDefinition {
                name: "account".into(),
                view: "link".into(),
            },
        );
        bottle.views.insert(
            "default".into(),
            ViewDefinition {
                name: "default".into(),
                members: vec![ViewMember::parse("account:tiny"), ViewMember::parse("name")],
                links: vec!["origin".into()],
            },
        );
        api.media_types.insert("Account".into(), account);
        api.media_types.insert("Bottle".into(), bottle);

        let errors = errors(&api);
        let kinds: Vec<_> = errors
            .iter()
            .map(|e| match e {
                DesignError::InvalidIdentifier { .. } => "identifier",
                DesignError::UnknownView { view, .. } => view.as_str(),
                DesignError::UnknownViewMember { .. } => "member",
                DesignError::UnknownViewLink { .. } => "link",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["identifier", "link", "tiny", "member", "link"]);
    }

    #[test]
    fn inherited_members_satisfy_required() {
        let mut api = make_api(make_action("show", "/:id"));
        let mut base = AttributeDefinition::default();
        base.add_member("id", Primitive::Integer.into());
        api.user_types
            .insert("Base".into(), UserTypeDefinition::new("Base", base));
        let mut derived = AttributeDefinition::default();
        derived.base_type = Some("Base".into());
        derived.required.push("id".into());
        api.user_types
            .insert("Derived".into(), UserTypeDefinition::new("Derived", derived));
        assert_eq!(validate_api(&api), Ok(()));
    }

    #[test]
    fn invalid_defaults() {
        let mut params = AttributeDefinition::default();
        let mut page = AttributeDefinition::from(Primitive::Integer);
        page.default = Some(Value::from("first"));
        params.add_member("page", page);
        let mut action = make_action("list", "");
        action.params = Some(params);
        let errors = errors(&make_api(action));
        assert!(matches!(errors[0], DesignError::InvalidDefault { .. }));
    }

    #[test]
    fn validation_is_deterministic() {
        let mut action = make_action("show", "/:id");
        action
            .responses
            .insert("A".into(), with_status("A", Some(200)));
        action
            .responses
            .insert("B".into(), with_status("B", Some(200)));
        action.responses.insert("C".into(), ResponseDefinition::new("C"));
        action.filters.push("nope".into());
        let api = make_api(action);
        let first = validate_api(&api);
        for _ in 0..5 {
            assert_eq!(validate_api(&api), first);
        }
    }

    #[test]
    fn finalized_validation_requires_wildcard_params() {
        let api = make_api(make_action("show", "/:id"));
        assert_eq!(validate_api(&api), Ok(()));
        let errors = validate_finalized(&api).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.0[0].is_missing_wildcard_param());
    }
}
