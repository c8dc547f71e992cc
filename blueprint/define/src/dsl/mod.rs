//! The design DSL.
//!
//! A design is declared by registering named bodies on a [`Design`]. Each
//! body is a closure receiving a builder for the definition it describes:
//!
//! ```
//! use blueprint_define::prelude::*;
//!
//! let mut design = Design::new();
//! design.api("cellar", |api| {
//!     api.title("The virtual wine cellar");
//! });
//! design.media_type("Bottle", "application/vnd.bottle+json", |mt| {
//!     mt.attributes(|a| {
//!         a.attribute("id", Primitive::Integer);
//!         a.attribute("name", Primitive::String);
//!         a.required(["id"]);
//!     });
//! });
//! design.resource("bottle", |r| {
//!     r.base_path("/bottles");
//!     r.media_type("Bottle");
//!     r.action("show", |a| {
//!         a.get("/:id");
//!         a.params(|p| {
//!             p.attribute("id", Primitive::Integer);
//!         });
//!         a.response_template(OK, &["Bottle"]);
//!         a.response("NotFound");
//!     });
//! });
//!
//! let api = design.run().unwrap();
//! assert_eq!(api.resources["bottle"].actions["show"].responses.len(), 2);
//! ```
//!
//! Bodies run in a fixed order regardless of the order they were
//! registered in: the API first, then user types, media types and finally
//! resources. Errors raised by builders are recorded with the path of the
//! enclosing definitions and the call site; evaluation never stops at the
//! first one.

mod api;
mod attribute;
mod media_type;
mod resource;

use std::panic::Location;

use tracing::{debug, info, instrument, trace};

pub use api::{ApiBuilder, ResponseBuilder};
pub use attribute::AttributeBuilder;
pub use media_type::{MediaTypeBuilder, ViewBuilder};
pub use resource::{ActionBuilder, ResourceBuilder};

use crate::api::ApiDefinition;
use crate::attribute::AttributeDefinition;
use crate::error::{DslError, DslErrors, RunError};
use crate::finalize::finalize_api;
use crate::media_type::MediaTypeDefinition;
use crate::user_type::UserTypeDefinition;
use crate::validation::{validate_api, validate_finalized};

type ApiBody = Box<dyn FnOnce(&mut ApiBuilder<'_>)>;
type AttributeBody = Box<dyn FnOnce(&mut AttributeBuilder<'_>)>;
type MediaTypeBody = Box<dyn FnOnce(&mut MediaTypeBuilder<'_>)>;
type ResourceBody = Box<dyn FnOnce(&mut ResourceBuilder<'_>)>;

struct Registered<B> {
    name: String,
    body: B,
}

struct RegisteredMediaType {
    name: String,
    identifier: String,
    body: MediaTypeBody,
}

/// Registry of the bodies making up one design.
///
/// Registering only stores the bodies; nothing runs until [`Design::run`]
/// or [`Design::evaluate`], which consume the registry so every run starts
/// from fresh state.
#[derive(Default)]
pub struct Design {
    api: Option<Registered<ApiBody>>,
    user_types: Vec<Registered<AttributeBody>>,
    media_types: Vec<RegisteredMediaType>,
    resources: Vec<Registered<ResourceBody>>,
    errors: Vec<DslError>,
}

impl Design {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the API body. A design has exactly one.
    #[track_caller]
    pub fn api(
        &mut self,
        name: &str,
        body: impl FnOnce(&mut ApiBuilder<'_>) + 'static,
    ) -> &mut Self {
        if let Some(existing) = &self.api {
            let message = format!("API {name:?} defined but API {:?} already exists", existing.name);
            self.duplicate(message);
            return self;
        }
        self.api = Some(Registered {
            name: name.to_string(),
            body: Box::new(body),
        });
        self
    }

    /// Registers a user type. The body describes an object attribute.
    #[track_caller]
    pub fn user_type(
        &mut self,
        name: &str,
        body: impl FnOnce(&mut AttributeBuilder<'_>) + 'static,
    ) -> &mut Self {
        if self.type_exists(name) {
            self.duplicate(format!("type {name:?} is already defined"));
            return self;
        }
        self.user_types.push(Registered {
            name: name.to_string(),
            body: Box::new(body),
        });
        self
    }

    /// Registers a media type with its MIME identifier.
    #[track_caller]
    pub fn media_type(
        &mut self,
        name: &str,
        identifier: &str,
        body: impl FnOnce(&mut MediaTypeBuilder<'_>) + 'static,
    ) -> &mut Self {
        if self.type_exists(name) {
            self.duplicate(format!("type {name:?} is already defined"));
            return self;
        }
        self.media_types.push(RegisteredMediaType {
            name: name.to_string(),
            identifier: identifier.to_string(),
            body: Box::new(body),
        });
        self
    }

    #[track_caller]
    pub fn resource(
        &mut self,
        name: &str,
        body: impl FnOnce(&mut ResourceBuilder<'_>) + 'static,
    ) -> &mut Self {
        if self.resources.iter().any(|r| r.name == name) {
            self.duplicate(format!("resource {name:?} is already defined"));
            return self;
        }
        self.resources.push(Registered {
            name: name.to_string(),
            body: Box::new(body),
        });
        self
    }

    // User types and media types share one namespace: generated code
    // exports both from the crate root.
    fn type_exists(&self, name: &str) -> bool {
        self.user_types.iter().any(|t| t.name == name)
            || self.media_types.iter().any(|t| t.name == name)
    }

    #[track_caller]
    fn duplicate(&mut self, message: String) {
        self.errors
            .push(DslError::new(message, None, Some(Location::caller())));
    }

    /// Runs every body and assembles the raw definition tree.
    ///
    /// No cross validation happens here; see [`validate_api`].
    pub fn evaluate(self) -> Evaluation {
        let Design {
            api,
            user_types,
            media_types,
            resources,
            errors,
        } = self;
        let mut eval = Evaluator {
            errors,
            contexts: Vec::new(),
        };

        let mut def = match api {
            Some(Registered { name, body }) => api::run_api(&mut eval, &name, body),
            None => {
                eval.errors.push(DslError::new("no API is defined", None, None));
                ApiDefinition::default()
            }
        };

        for Registered { name, body } in user_types {
            let attribute = attribute::run_attribute(
                &mut eval,
                Some(format!("user type {name:?}")),
                AttributeDefinition::default(),
                body,
            );
            debug!(user_type = %name, "evaluated user type");
            def.user_types
                .insert(name.clone(), UserTypeDefinition::new(name, attribute));
        }

        for RegisteredMediaType {
            name,
            identifier,
            body,
        } in media_types
        {
            let media_type = media_type::run_media_type(
                &mut eval,
                MediaTypeDefinition::new(name.clone(), identifier),
                body,
            );
            debug!(media_type = %name, "evaluated media type");
            def.media_types.insert(name, media_type);
        }

        let mut evaluated = Vec::with_capacity(resources.len());
        for Registered { name, body } in resources {
            let resource = resource::run_resource(&mut eval, &def, &name, body);
            debug!(resource = %name, actions = resource.actions.len(), "evaluated resource");
            evaluated.push((name, resource));
        }
        def.resources.extend(evaluated);

        Evaluation {
            api: def,
            errors: eval.errors,
        }
    }

    /// Evaluates, validates and finalizes the design.
    ///
    /// ## Errors
    ///
    /// - [`RunError::Dsl`] if any body misused the DSL
    /// - [`RunError::Invalid`] if the evaluated tree is structurally invalid
    #[instrument(skip(self))]
    pub fn run(self) -> Result<ApiDefinition, RunError> {
        let mut api = self.evaluate().into_result()?;
        validate_api(&api)?;
        finalize_api(&mut api);
        validate_finalized(&api)?;
        info!(
            api = %api.name,
            resources = api.resources.len(),
            media_types = api.media_types.len(),
            user_types = api.user_types.len(),
            "design ready"
        );
        Ok(api)
    }
}

/// Outcome of [`Design::evaluate`]: the raw tree and every DSL error.
#[derive(Debug)]
pub struct Evaluation {
    pub api: ApiDefinition,
    pub errors: Vec<DslError>,
}

impl Evaluation {
    /// The tree, or the DSL errors when there are any.
    pub fn into_result(self) -> Result<ApiDefinition, DslErrors> {
        if self.errors.is_empty() {
            Ok(self.api)
        } else {
            Err(DslErrors(self.errors))
        }
    }
}

/// Error list and context chain of one evaluation.
#[derive(Debug, Default)]
pub(crate) struct Evaluator {
    errors: Vec<DslError>,
    contexts: Vec<String>,
}

impl Evaluator {
    pub(crate) fn enter(&mut self, context: String) {
        trace!(context = %context, "entering");
        self.contexts.push(context);
    }

    pub(crate) fn exit(&mut self) {
        self.contexts.pop();
    }

    /// Space separated path of the definitions being built.
    pub(crate) fn context(&self) -> Option<String> {
        if self.contexts.is_empty() {
            None
        } else {
            Some(self.contexts.join(" "))
        }
    }

    /// Records an error at the caller's location.
    #[track_caller]
    pub(crate) fn report(&mut self, message: impl Into<String>) {
        let error = DslError::new(message, self.context(), Some(Location::caller()));
        debug!(error = %error, "DSL error");
        self.errors.push(error);
    }
}
