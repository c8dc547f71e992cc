use std::rc::Rc;

use super::Evaluator;
use super::attribute::{AttributeBuilder, run_attribute};
use super::resource::ActionBuilder;
use crate::api::{ApiDefinition, TraitDefinition};
use crate::response::{HeaderPattern, OK, ResponseDefinition, ResponseTemplateDefinition};

/// Builds the API definition: metadata, base path, and the traits,
/// templates and default responses resources can use.
pub struct ApiBuilder<'a> {
    eval: &'a mut Evaluator,
    def: ApiDefinition,
}

pub(crate) fn run_api(
    eval: &mut Evaluator,
    name: &str,
    body: impl FnOnce(&mut ApiBuilder<'_>),
) -> ApiDefinition {
    eval.enter(format!("API {name:?}"));
    let mut builder = ApiBuilder {
        eval: &mut *eval,
        def: ApiDefinition::new(name),
    };
    body(&mut builder);
    let mut def = builder.def;
    eval.exit();

    // A template of the same name declared by the body wins.
    def.response_templates
        .entry(OK.to_string())
        .or_insert_with(|| {
            template(OK, 1, |r, args| {
                r.status(200);
                if let Some(media_type) = args.first() {
                    r.media_type(media_type);
                }
            })
        });
    def
}

fn template(
    name: &str,
    arity: usize,
    body: impl Fn(&mut ResponseBuilder<'_>, &[String]) + 'static,
) -> ResponseTemplateDefinition {
    ResponseTemplateDefinition {
        name: name.to_string(),
        arity,
        body: Rc::new(body),
    }
}

impl<'a> ApiBuilder<'a> {
    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.def.title = Some(title.into());
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.def.description = Some(description.into());
        self
    }

    /// Prefix of every resource path.
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

    /// Declares a response template taking `arity` string arguments.
    #[track_caller]
    pub fn response_template(
        &mut self,
        name: &str,
        arity: usize,
        body: impl Fn(&mut ResponseBuilder<'_>, &[String]) + 'static,
    ) -> &mut Self {
        if self.def.response_templates.contains_key(name) {
            self.eval
                .report(format!("response template {name:?} is already declared"));
            return self;
        }
        self.def
            .response_templates
            .insert(name.to_string(), template(name, arity, body));
        self
    }

    /// Declares a trait actions and resources can apply with `use_trait`.
    #[track_caller]
    pub fn trait_def(
        &mut self,
        name: &str,
        body: impl Fn(&mut ActionBuilder<'_>) + 'static,
    ) -> &mut Self {
        if self.def.traits.contains_key(name) {
            self.eval.report(format!("trait {name:?} is already declared"));
            return self;
        }
        self.def.traits.insert(
            name.to_string(),
            TraitDefinition {
                name: name.to_string(),
                body: Rc::new(body),
            },
        );
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
}

/// Builds one response.
pub struct ResponseBuilder<'a> {
    eval: &'a mut Evaluator,
    def: ResponseDefinition,
}

pub(crate) fn run_response(
    eval: &mut Evaluator,
    def: ResponseDefinition,
    body: impl FnOnce(&mut ResponseBuilder<'_>),
) -> ResponseDefinition {
    eval.enter(format!("response {:?}", def.name));
    let mut builder = ResponseBuilder {
        eval: &mut *eval,
        def,
    };
    body(&mut builder);
    let def = builder.def;
    eval.exit();
    def
}

/// Expands `template` with `args` into a response named after it.
pub(crate) fn expand_template(
    eval: &mut Evaluator,
    template: &ResponseTemplateDefinition,
    args: &[String],
) -> ResponseDefinition {
    let body = Rc::clone(&template.body);
    run_response(eval, ResponseDefinition::new(&template.name), |r| {
        body(r, args)
    })
}

impl<'a> ResponseBuilder<'a> {
    /// HTTP status, between 100 and 599.
    #[track_caller]
    pub fn status(&mut self, status: u16) -> &mut Self {
        if !(100..=599).contains(&status) {
            self.eval
                .report(format!("{status} is not a valid HTTP status"));
            return self;
        }
        self.def.status = Some(status);
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.def.description = Some(description.into());
        self
    }

    /// Media type of the body, by name or identifier.
    pub fn media_type(&mut self, media_type: impl Into<String>) -> &mut Self {
        self.def.media_type = Some(media_type.into());
        self
    }

    /// Expected value of a header: a literal, or a `/regex/`.
    #[track_caller]
    pub fn header(&mut self, name: &str, pattern: &str) -> &mut Self {
        if self.def.headers.contains_key(name) {
            self.eval
                .report(format!("header {name:?} is already declared"));
            return self;
        }
        self.def
            .headers
            .insert(name.to_string(), HeaderPattern::parse(pattern));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(body: impl FnOnce(&mut ApiBuilder<'_>)) -> (ApiDefinition, Evaluator) {
        let mut eval = Evaluator::default();
        let def = run_api(&mut eval, "cellar", body);
        (def, eval)
    }

    #[test]
    fn ok_template_is_always_available() {
        let (def, _) = build(|_| {});
        let ok = &def.response_templates[OK];
        assert_eq!(ok.arity, 1);

        let mut eval = Evaluator::default();
        let response = expand_template(&mut eval, ok, &["Bottle".to_string()]);
        assert_eq!(response.name, OK);
        assert_eq!(response.status, Some(200));
        assert_eq!(response.media_type.as_deref(), Some("Bottle"));
    }

    #[test]
    fn declared_ok_template_wins() {
        let (def, eval) = build(|api| {
            api.response_template(OK, 0, |r, _| {
                r.status(200);
            });
        });
        assert!(eval.errors.is_empty());
        assert_eq!(def.response_templates[OK].arity, 0);
    }

    #[test]
    fn api_responses_and_base_params() {
        let (def, eval) = build(|api| {
            api.base_path("/:accountID");
            api.base_params(|p| {
                p.attribute("accountID", blueprint_types::Primitive::Integer);
            });
            api.response("NotFound", |r| {
                r.description("Resource not found");
                r.header("Cache-Control", "no-cache");
            });
        });
        assert!(eval.errors.is_empty());
        assert_eq!(def.base_path, "/:accountID");
        assert!(def.base_params.unwrap().member("accountID").is_some());
        let not_found = &def.responses["NotFound"];
        assert_eq!(not_found.status, None);
        assert!(not_found.header_matches("Cache-Control", "no-cache"));
    }

    #[test]
    fn invalid_status_and_duplicates() {
        let (_, eval) = build(|api| {
            api.response("Weird", |r| {
                r.status(42);
                r.header("ETag", "x");
                r.header("ETag", "y");
            });
            api.trait_def("Auth", |_| {});
            api.trait_def("Auth", |_| {});
        });
        assert_eq!(eval.errors.len(), 3);
        assert_eq!(
            eval.errors[0].context.as_deref(),
            Some(r#"API "cellar" response "Weird""#)
        );
    }
}
