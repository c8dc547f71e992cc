use std::mem;

use tracing::debug;

use super::Evaluator;
use super::attribute::{AttributeBuilder, run_attribute};
use crate::attribute::AttributeDefinition;
use crate::media_type::{
    DEFAULT_IDENTIFIER, DEFAULT_LINK_VIEW, LinkDefinition, MediaTypeDefinition, ViewDefinition,
    ViewMember,
};

/// Builds a media type: members, views and links.
pub struct MediaTypeBuilder<'a> {
    eval: &'a mut Evaluator,
    def: MediaTypeDefinition,
}

pub(crate) fn run_media_type(
    eval: &mut Evaluator,
    def: MediaTypeDefinition,
    body: impl FnOnce(&mut MediaTypeBuilder<'_>),
) -> MediaTypeDefinition {
    eval.enter(format!("media type {:?}", def.name));
    let mut builder = MediaTypeBuilder {
        eval: &mut *eval,
        def,
    };
    body(&mut builder);
    let mut def = builder.def;
    eval.exit();

    // Malformed identifiers are left for validation to report.
    if def.identifier.is_empty() {
        debug!(media_type = %def.name, "no identifier, using the default");
        def.identifier = DEFAULT_IDENTIFIER.to_string();
    }
    if def.views.is_empty() {
        let view = def.implicit_default_view();
        def.views.insert(view.name.clone(), view);
        def.implicit_view = true;
    }
    def
}

impl<'a> MediaTypeBuilder<'a> {
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.def.description = Some(description.into());
        self
    }

    /// Runs `body` against the object attribute holding the members.
    pub fn attributes(&mut self, body: impl FnOnce(&mut AttributeBuilder<'_>)) -> &mut Self {
        let current = mem::take(&mut self.def.attribute);
        self.def.attribute = run_attribute(self.eval, None, current, body);
        self
    }

    /// Shorthand for declaring a single member.
    #[track_caller]
    pub fn attribute(&mut self, name: &str, ty: impl Into<AttributeDefinition>) -> &mut Self {
        self.attribute_with(name, ty, |_| {})
    }

    #[track_caller]
    pub fn attribute_with(
        &mut self,
        name: &str,
        ty: impl Into<AttributeDefinition>,
        body: impl FnOnce(&mut AttributeBuilder<'_>),
    ) -> &mut Self {
        let mut attribute = AttributeBuilder {
            eval: &mut *self.eval,
            def: mem::take(&mut self.def.attribute),
        };
        attribute.attribute_with(name, ty, body);
        self.def.attribute = attribute.def;
        self
    }

    #[track_caller]
    pub fn required<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut attribute = AttributeBuilder {
            eval: &mut *self.eval,
            def: mem::take(&mut self.def.attribute),
        };
        attribute.required(names);
        self.def.attribute = attribute.def;
        self
    }

    /// Inherits the members of another user type or media type.
    pub fn reference(&mut self, base_type: &str) -> &mut Self {
        self.def.attribute.base_type = Some(base_type.to_string());
        self
    }

    /// Declares a view listing the members and links to render.
    #[track_caller]
    pub fn view(&mut self, name: &str, body: impl FnOnce(&mut ViewBuilder<'_>)) -> &mut Self {
        if self.def.views.contains_key(name) {
            self.eval.report(format!("view {name:?} is already declared"));
            return self;
        }
        self.eval.enter(format!("view {name:?}"));
        let mut view = ViewBuilder {
            eval: &mut *self.eval,
            def: ViewDefinition {
                name: name.to_string(),
                members: Vec::new(),
                links: Vec::new(),
            },
        };
        body(&mut view);
        let def = view.def;
        self.eval.exit();
        self.def.views.insert(name.to_string(), def);
        self
    }

    /// Links the member `name`, rendered with its `link` view.
    #[track_caller]
    pub fn link(&mut self, name: &str) -> &mut Self {
        self.link_view(name, DEFAULT_LINK_VIEW)
    }

    /// Links the member `name`, rendered with `view`.
    #[track_caller]
    pub fn link_view(&mut self, name: &str, view: &str) -> &mut Self {
        if self.def.links.contains_key(name) {
            self.eval.report(format!("link {name:?} is already declared"));
            return self;
        }
        self.def.links.insert(
            name.to_string(),
            LinkDefinition {
                name: name.to_string(),
                view: view.to_string(),
            },
        );
        self
    }
}

/// Builds one view of a media type.
pub struct ViewBuilder<'a> {
    eval: &'a mut Evaluator,
    def: ViewDefinition,
}

impl<'a> ViewBuilder<'a> {
    /// Lists a member, `name` or `name:view` to pick the view of a nested
    /// media type.
    #[track_caller]
    pub fn attribute(&mut self, entry: &str) -> &mut Self {
        let member = ViewMember::parse(entry);
        if self.def.members.iter().any(|m| m.name == member.name) {
            self.eval
                .report(format!("member {:?} is already listed", member.name));
            return self;
        }
        self.def.members.push(member);
        self
    }

    /// Lists a link of the media type.
    #[track_caller]
    pub fn link(&mut self, name: &str) -> &mut Self {
        if self.def.links.iter().any(|l| l == name) {
            self.eval.report(format!("link {name:?} is already listed"));
            return self;
        }
        self.def.links.push(name.to_string());
        self
    }
}
