use std::mem;

use blueprint_types::{Format, Kind, Validation, Value};

use super::Evaluator;
use crate::attribute::{AttributeDefinition, DataType};

/// Builds one attribute: its members when it is an object, its validations
/// and its metadata.
pub struct AttributeBuilder<'a> {
    pub(crate) eval: &'a mut Evaluator,
    pub(crate) def: AttributeDefinition,
}

/// Runs `body` against `def`, under `context` when given.
pub(crate) fn run_attribute(
    eval: &mut Evaluator,
    context: Option<String>,
    def: AttributeDefinition,
    body: impl FnOnce(&mut AttributeBuilder<'_>),
) -> AttributeDefinition {
    let nested = context.is_some();
    if let Some(context) = context {
        eval.enter(context);
    }
    let mut builder = AttributeBuilder {
        eval: &mut *eval,
        def,
    };
    body(&mut builder);
    let def = builder.def;
    if nested {
        eval.exit();
    }
    def
}

impl<'a> AttributeBuilder<'a> {
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.def.description = Some(description.into());
        self
    }

    /// Value used when the attribute is absent from the input.
    pub fn default(&mut self, value: impl Into<Value>) -> &mut Self {
        self.def.default = Some(value.into());
        self
    }

    /// Declares a member of type `ty`.
    #[track_caller]
    pub fn attribute(&mut self, name: &str, ty: impl Into<AttributeDefinition>) -> &mut Self {
        self.attribute_with(name, ty, |_| {})
    }

    /// Declares a member of type `ty` and runs `body` to refine it.
    #[track_caller]
    pub fn attribute_with(
        &mut self,
        name: &str,
        ty: impl Into<AttributeDefinition>,
        body: impl FnOnce(&mut AttributeBuilder<'_>),
    ) -> &mut Self {
        let Some(members) = self.def.members() else {
            let message = format!(
                "attribute {name:?} can only be declared inside an object, not {}",
                self.def.data_type.describe()
            );
            self.eval.report(message);
            return self;
        };
        if members.contains_key(name) {
            self.eval
                .report(format!("attribute {name:?} is already declared"));
            return self;
        }
        let member = run_attribute(
            self.eval,
            Some(format!("attribute {name:?}")),
            ty.into(),
            body,
        );
        self.def.add_member(name, member);
        self
    }

    /// Refines the element attribute of an array.
    #[track_caller]
    pub fn element(&mut self, body: impl FnOnce(&mut AttributeBuilder<'_>)) -> &mut Self {
        let DataType::Array(element) = &mut self.def.data_type else {
            let message = format!(
                "element only applies to arrays, not {}",
                self.def.data_type.describe()
            );
            self.eval.report(message);
            return self;
        };
        let current = mem::take(&mut **element);
        **element = run_attribute(self.eval, Some("element".to_string()), current, body);
        self
    }

    /// Marks members as required.
    #[track_caller]
    pub fn required<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if matches!(
            self.def.data_type,
            DataType::Primitive(_) | DataType::Array(_)
        ) {
            let message = format!(
                "required only applies to objects, not {}",
                self.def.data_type.describe()
            );
            self.eval.report(message);
            return self;
        }
        for name in names {
            let name = name.into();
            if !self.def.is_required(&name) {
                self.def.required.push(name);
            }
        }
        self
    }

    /// Restricts the value to one of `values`.
    pub fn enum_values<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.def.validations.push(Validation::Enum(values));
        self
    }

    #[track_caller]
    pub fn format(&mut self, format: Format) -> &mut Self {
        self.validation(Validation::Format(format), &[Kind::String], "format")
    }

    #[track_caller]
    pub fn minimum(&mut self, min: i64) -> &mut Self {
        self.validation(
            Validation::Minimum(min),
            &[Kind::Integer, Kind::Number],
            "minimum",
        )
    }

    #[track_caller]
    pub fn maximum(&mut self, max: i64) -> &mut Self {
        self.validation(
            Validation::Maximum(max),
            &[Kind::Integer, Kind::Number],
            "maximum",
        )
    }

    #[track_caller]
    pub fn min_length(&mut self, min: usize) -> &mut Self {
        self.validation(
            Validation::MinLength(min),
            &[Kind::String, Kind::Array],
            "min length",
        )
    }

    #[track_caller]
    pub fn max_length(&mut self, max: usize) -> &mut Self {
        self.validation(
            Validation::MaxLength(max),
            &[Kind::String, Kind::Array],
            "max length",
        )
    }

    /// View used to render this attribute; only for media-typed attributes.
    #[track_caller]
    pub fn view(&mut self, view: &str) -> &mut Self {
        if !self.def.data_type.is_media_type() {
            let message = format!(
                "view {view:?} only applies to media types, not {}",
                self.def.data_type.describe()
            );
            self.eval.report(message);
            return self;
        }
        self.def.view = Some(view.to_string());
        self
    }

    /// Inherits the members of the named user type or media type.
    pub fn reference(&mut self, base_type: &str) -> &mut Self {
        self.def.base_type = Some(base_type.to_string());
        self
    }

    #[track_caller]
    fn validation(&mut self, validation: Validation, kinds: &[Kind], what: &str) -> &mut Self {
        let applies = match &self.def.data_type {
            DataType::Primitive(p) => kinds.contains(&p.kind()),
            DataType::Array(_) => kinds.contains(&Kind::Array),
            DataType::Object(_) => kinds.contains(&Kind::Object),
            // Resolved later.
            DataType::UserType(_) | DataType::MediaType(_) => true,
        };
        if applies {
            self.def.validations.push(validation);
        } else {
            let message = format!(
                "{what} does not apply to {}",
                self.def.data_type.describe()
            );
            self.eval.report(message);
        }
        self
    }
}
