use std::rc::Rc;

use super::Evaluator;
use super::api::{ResponseBuilder, expand_template, run_response};
use super::attribute::{AttributeBuilder, run_attribute};
use crate::action::ActionDefinition;
use crate::api::ApiDefinition;
use crate::attribute::AttributeDefinition;
use crate::resource::ResourceDefinition;
use crate::response::ResponseDefinition;
use crate::route::{HttpVerb, RouteDefinition};

/// Builds a resource and its actions.
pub struct ResourceBuilder<'a> {
    eval: &'a mut Evaluator,
    api: &'a ApiDefinition,
    def: ResourceDefinition,
    traits: Vec<String>,
}

pub(crate) fn run_resource(
    eval: &mut Evaluator,
    api: &ApiDefinition,
    name: &str,
    body: impl FnOnce(&mut ResourceBuilder<'_>),
) -> ResourceDefinition {
    eval.enter(format!("resource {name:?}"));
    let mut builder = ResourceBuilder {
        eval: &mut *eval,
        api,
        def: ResourceDefinition::new(name),
        traits: Vec::new(),
    };
    body(&mut builder);
    let def = builder.def;
    eval.exit();
    def
}

impl<'a> ResourceBuilder<'a> {
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.def.description = Some(description.into());
        self
    }

    /// Prefix of the action routes; `//` at the start ignores the API base
    /// path.
    pub fn base_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.def.base_path = path.into();
        self
    }

    /// Describes the wildcards of the base path.
    pub fn base_params(&mut self, body: impl FnOnce(&mut AttributeBuilder<'_>)) -> &mut Self {
        let current = self.def.base_params.take().unwrap_or_default();
        self.def.base_params = Some(run_attribute(
            self.eval,
            Some("base params".to_string()),
            current,
            body,
        ));
        self
    }

    /// Nests this resource under the canonical path of `parent`.
    pub fn parent(&mut self, parent: &str) -> &mut Self {
        self.def.parent = Some(parent.to_string());
        self
    }

    /// Media type representing the resource, by name or identifier.
    pub fn media_type(&mut self, media_type: &str) -> &mut Self {
        self.def.media_type = Some(media_type.to_string());
        self
    }

    /// Action whose first route identifies one instance of the resource.
    pub fn canonical_action(&mut self, action: &str) -> &mut Self {
        self.def.canonical_action = Some(action.to_string());
        self
    }

    /// Declares a default for same-named action responses.
    #[track_caller]
    pub fn response(
        &mut self,
        name: &str,
        body: impl FnOnce(&mut ResponseBuilder<'_>),
    ) -> &mut Self {
        if self.def.responses.contains_key(name) {
            self.eval
                .report(format!("response {name:?} is already declared"));
            return self;
        }
        let response = run_response(self.eval, ResponseDefinition::new(name), body);
        self.def.responses.insert(name.to_string(), response);
        self
    }

    /// Applies the trait to every action declared after this call.
    #[track_caller]
    pub fn use_trait(&mut self, name: &str) -> &mut Self {
        if !self.api.traits.contains_key(name) {
            self.eval.report(format!("unknown trait {name:?}"));
            return self;
        }
        self.traits.push(name.to_string());
        self
    }

    #[track_caller]
    pub fn action(&mut self, name: &str, body: impl FnOnce(&mut ActionBuilder<'_>)) -> &mut Self {
        if self.def.actions.contains_key(name) {
            self.eval
                .report(format!("action {name:?} is already declared"));
            return self;
        }
        self.eval.enter(format!("action {name:?}"));
        let mut action = ActionBuilder {
            eval: &mut *self.eval,
            api: self.api,
            def: ActionDefinition::new(name),
        };
        for name in &self.traits {
            action.apply_trait(name);
        }
        body(&mut action);
        let def = action.def;
        self.eval.exit();
        self.def.actions.insert(name.to_string(), def);
        self
    }
}

/// Builds one action.
pub struct ActionBuilder<'a> {
    eval: &'a mut Evaluator,
    api: &'a ApiDefinition,
    def: ActionDefinition,
}

impl<'a> ActionBuilder<'a> {
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.def.description = Some(description.into());
        self
    }

    /// Adds a route, relative to the resource base path unless `path`
    /// starts with `//`.
    pub fn route(&mut self, verb: HttpVerb, path: &str) -> &mut Self {
        self.def.routes.push(RouteDefinition::new(verb, path));
        self
    }

    pub fn get(&mut self, path: &str) -> &mut Self {
        self.route(HttpVerb::Get, path)
    }

    pub fn post(&mut self, path: &str) -> &mut Self {
        self.route(HttpVerb::Post, path)
    }

    pub fn put(&mut self, path: &str) -> &mut Self {
        self.route(HttpVerb::Put, path)
    }

    pub fn patch(&mut self, path: &str) -> &mut Self {
        self.route(HttpVerb::Patch, path)
    }

    pub fn delete(&mut self, path: &str) -> &mut Self {
        self.route(HttpVerb::Delete, path)
    }

    /// Declares path and query parameters. Repeated calls add to the same
    /// object.
    pub fn params(&mut self, body: impl FnOnce(&mut AttributeBuilder<'_>)) -> &mut Self {
        let current = self.def.params.take().unwrap_or_default();
        self.def.params = Some(run_attribute(
            self.eval,
            Some("params".to_string()),
            current,
            body,
        ));
        self
    }

    /// Declares request headers. Repeated calls add to the same object.
    pub fn headers(&mut self, body: impl FnOnce(&mut AttributeBuilder<'_>)) -> &mut Self {
        let current = self.def.headers.take().unwrap_or_default();
        self.def.headers = Some(run_attribute(
            self.eval,
            Some("headers".to_string()),
            current,
            body,
        ));
        self
    }

    pub fn payload(&mut self, ty: impl Into<AttributeDefinition>) -> &mut Self {
        self.payload_with(ty, |_| {})
    }

    pub fn payload_with(
        &mut self,
        ty: impl Into<AttributeDefinition>,
        body: impl FnOnce(&mut AttributeBuilder<'_>),
    ) -> &mut Self {
        self.def.payload = Some(run_attribute(
            self.eval,
            Some("payload".to_string()),
            ty.into(),
            body,
        ));
        self
    }

    /// Declares a response whose fields all come from the same-named
    /// resource, API or built-in response.
    #[track_caller]
    pub fn response(&mut self, name: &str) -> &mut Self {
        self.response_with(name, |_| {})
    }

    #[track_caller]
    pub fn response_with(
        &mut self,
        name: &str,
        body: impl FnOnce(&mut ResponseBuilder<'_>),
    ) -> &mut Self {
        if self.def.responses.contains_key(name) {
            self.eval
                .report(format!("response {name:?} is already declared"));
            return self;
        }
        let response = run_response(self.eval, ResponseDefinition::new(name), body);
        self.def.responses.insert(name.to_string(), response);
        self
    }

    /// Declares the response produced by the API template `name`.
    #[track_caller]
    pub fn response_template(&mut self, name: &str, args: &[&str]) -> &mut Self {
        let api = self.api;
        let Some(template) = api.response_templates.get(name) else {
            self.eval
                .report(format!("unknown response template {name:?}"));
            return self;
        };
        if template.arity != args.len() {
            self.eval.report(format!(
                "response template {name:?} expects {} argument(s), got {}",
                template.arity,
                args.len()
            ));
            return self;
        }
        if self.def.responses.contains_key(name) {
            self.eval
                .report(format!("response {name:?} is already declared"));
            return self;
        }
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let response = expand_template(self.eval, template, &args);
        self.def.responses.insert(name.to_string(), response);
        self
    }

    /// Applies an API trait to this action.
    #[track_caller]
    pub fn use_trait(&mut self, name: &str) -> &mut Self {
        if !self.api.traits.contains_key(name) {
            self.eval.report(format!("unknown trait {name:?}"));
            return self;
        }
        self.apply_trait(name);
        self
    }

    /// Parameters the action accepts as result filters.
    pub fn filters<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.def.filters.extend(names.into_iter().map(Into::into));
        self
    }

    /// Views of the resource media type this action may render.
    pub fn views<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.def.views.extend(names.into_iter().map(Into::into));
        self
    }

    fn apply_trait(&mut self, name: &str) {
        let Some(body) = self.api.traits.get(name).map(|t| Rc::clone(&t.body)) else {
            return;
        };
        self.eval.enter(format!("trait {name:?}"));
        body(self);
        self.eval.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::api::run_api;
    use blueprint_types::Primitive;

    fn make_api() -> ApiDefinition {
        let mut eval = Evaluator::default();
        run_api(&mut eval, "cellar", |api| {
            api.trait_def("Authenticated", |a| {
                a.headers(|h| {
                    h.attribute("Authorization", Primitive::String);
                    h.required(["Authorization"]);
                });
                a.response("Unauthorized");
            });
            api.response_template("Created", 1, |r, args| {
                r.status(201);
                r.header("Location", &args[0]);
            });
        })
    }

    fn build(
        api: &ApiDefinition,
        body: impl FnOnce(&mut ResourceBuilder<'_>),
    ) -> (ResourceDefinition, Evaluator) {
        let mut eval = Evaluator::default();
        let def = run_resource(&mut eval, api, "bottle", body);
        (def, eval)
    }

    #[test]
    fn actions_and_routes() {
        let api = make_api();
        let (def, eval) = build(&api, |r| {
            r.base_path("/bottles");
            r.canonical_action("show");
            r.action("show", |a| {
                a.get("/:id");
                a.route(HttpVerb::Head, "/:id");
                a.params(|p| {
                    p.attribute("id", Primitive::Integer);
                });
            });
        });
        assert!(eval.errors.is_empty());
        let show = &def.actions["show"];
        assert_eq!(show.routes.len(), 2);
        assert_eq!(show.routes[1].verb, HttpVerb::Head);
        assert_eq!(show.param_names(), vec!["id"]);
    }

    #[test]
    fn resource_traits_apply_to_later_actions() {
        let api = make_api();
        let (def, eval) = build(&api, |r| {
            r.action("list", |a| {
                a.get("");
            });
            r.use_trait("Authenticated");
            r.action("show", |a| {
                a.get("/:id");
            });
        });
        assert!(eval.errors.is_empty());
        assert!(def.actions["list"].required_headers().is_empty());
        assert_eq!(def.actions["show"].required_headers(), vec!["Authorization"]);
        assert!(def.actions["show"].responses.contains_key("Unauthorized"));
    }

    #[test]
    fn templates_expand_with_arguments() {
        let api = make_api();
        let (def, eval) = build(&api, |r| {
            r.action("create", |a| {
                a.post("");
                a.response_template("Created", &["/^/bottles/[0-9]+$/"]);
            });
        });
        assert!(eval.errors.is_empty());
        let created = &def.actions["create"].responses["Created"];
        assert_eq!(created.status, Some(201));
        assert!(created.header_matches("Location", "/bottles/12"));
    }

    #[test]
    fn errors_inside_traits_name_the_trait() {
        let mut eval = Evaluator::default();
        let api = run_api(&mut eval, "cellar", |api| {
            api.trait_def("Broken", |a| {
                a.response_template("Nope", &[]);
            });
        });
        let (_, eval) = build(&api, |r| {
            r.action("show", |a| {
                a.use_trait("Broken");
            });
        });
        assert_eq!(eval.errors.len(), 1);
        assert_eq!(
            eval.errors[0].context.as_deref(),
            Some(r#"resource "bottle" action "show" trait "Broken""#)
        );
    }

    #[test]
    fn duplicate_action_and_response() {
        let api = make_api();
        let (_, eval) = build(&api, |r| {
            r.action("show", |a| {
                a.response("NotFound");
                a.response("NotFound");
            });
            r.action("show", |_| {});
        });
        assert_eq!(eval.errors.len(), 2);
    }
}
