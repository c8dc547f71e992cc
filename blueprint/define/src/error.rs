//! Errors raised while evaluating, validating and running a design.

use std::fmt;
use std::panic::Location;

use thiserror::Error;

fn location_prefix(location: &Option<&'static Location<'static>>) -> String {
    location
        .map(|l| format!("[{}:{}] ", l.file(), l.line()))
        .unwrap_or_default()
}

fn context_suffix(context: &Option<String>) -> String {
    match context {
        Some(c) => format!(" in {c}"),
        None => " (top level)".to_string(),
    }
}

/// Misuse of the DSL: wrong context, duplicate registration or a malformed
/// argument.
///
/// Recorded by the evaluator; evaluation keeps going after one.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}{message}{}", location_prefix(.location), context_suffix(.context))]
pub struct DslError {
    pub message: String,
    /// Descriptive path of the enclosing definitions, e.g.
    /// `resource "bottle" action "show"`.
    pub context: Option<String>,
    /// Call site of the builder method that raised the error.
    pub location: Option<&'static Location<'static>>,
}

impl DslError {
    pub fn new(
        message: impl Into<String>,
        context: Option<String>,
        location: Option<&'static Location<'static>>,
    ) -> Self {
        Self {
            message: message.into(),
            context,
            location,
        }
    }
}

/// Every DSL error of one evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DslErrors(pub Vec<DslError>);

impl DslErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DslError> {
        self.0.iter()
    }
}

impl fmt::Display for DslErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&lines.join("\n"))
    }
}

impl std::error::Error for DslErrors {}

/// A structural problem found by validation.
///
/// Every variant carries the descriptive path of the definition at fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DesignError {
    #[error("{context}: name must not be empty")]
    EmptyName { context: String },

    #[error("{context}: parent resource {parent:?} does not exist")]
    UnknownParent { context: String, parent: String },

    #[error("{context}: parent chain loops back to this resource")]
    ParentCycle { context: String },

    #[error("{context}: canonical action {action:?} does not exist")]
    UnknownCanonicalAction { context: String, action: String },

    #[error("{context}: base params must be an object")]
    BaseParamsNotObject { context: String },

    #[error("{context}: base param {param:?} does not appear in base path {path:?}")]
    BaseParamNotInPath {
        context: String,
        param: String,
        path: String,
    },

    #[error("{context}: action has no route")]
    NoRoute { context: String },

    #[error("{context}: responses {first:?} and {second:?} share status {status}")]
    DuplicateStatus {
        context: String,
        status: u16,
        first: String,
        second: String,
    },

    #[error("{context}: response {response:?} has no status")]
    MissingStatus { context: String, response: String },

    #[error("{context}: status {status} of response {response:?} is not a valid HTTP status")]
    InvalidStatus {
        context: String,
        response: String,
        status: u16,
    },

    #[error("{context}: parameter {param:?} must be a primitive or an array of primitives")]
    ObjectParam { context: String, param: String },

    #[error("{context}: required members only apply to objects, not {data_type}")]
    RequiredOnNonObject { context: String, data_type: String },

    #[error("{context}: required member {member:?} is not declared")]
    UnknownRequired { context: String, member: String },

    #[error("{context}: view {view:?} set on an attribute that is not a media type")]
    ViewOnNonMediaType { context: String, view: String },

    #[error("{context}: unknown type {name:?}")]
    UnknownType { context: String, name: String },

    #[error("{context}: unknown media type {name:?}")]
    UnknownMediaType { context: String, name: String },

    #[error("{context}: media type {media_type:?} has no view {view:?}")]
    UnknownView {
        context: String,
        media_type: String,
        view: String,
    },

    #[error("{context}: {identifier:?} is not a valid media type identifier")]
    InvalidIdentifier { context: String, identifier: String },

    #[error("{context}: link {link:?} must name a member whose type is a media type")]
    InvalidLink { context: String, link: String },

    #[error("{context}: view {view:?} lists undeclared member {member:?}")]
    UnknownViewMember {
        context: String,
        view: String,
        member: String,
    },

    #[error("{context}: view {view:?} lists undeclared link {link:?}")]
    UnknownViewLink {
        context: String,
        view: String,
        link: String,
    },

    #[error("{context}: header {header:?} pattern {pattern:?} is not a valid regular expression")]
    InvalidHeaderPattern {
        context: String,
        header: String,
        pattern: String,
    },

    #[error("{context}: wildcard {wildcard:?} of route {path:?} has no matching parameter")]
    MissingWildcardParam {
        context: String,
        wildcard: String,
        path: String,
    },

    #[error("{context}: unknown base type {name:?}")]
    UnknownBaseType { context: String, name: String },

    #[error("{context}: base type {name:?} and the type using it must both be objects")]
    InvalidBaseType { context: String, name: String },

    #[error("{context}: filter {filter:?} is not a parameter")]
    UnknownFilter { context: String, filter: String },

    #[error("{context}: invalid default value: {detail}")]
    InvalidDefault { context: String, detail: String },
}

impl DesignError {
    /// Descriptive path of the definition at fault.
    pub fn context(&self) -> &str {
        match self {
            Self::EmptyName { context }
            | Self::UnknownParent { context, .. }
            | Self::ParentCycle { context }
            | Self::UnknownCanonicalAction { context, .. }
            | Self::BaseParamsNotObject { context }
            | Self::BaseParamNotInPath { context, .. }
            | Self::NoRoute { context }
            | Self::DuplicateStatus { context, .. }
            | Self::MissingStatus { context, .. }
            | Self::InvalidStatus { context, .. }
            | Self::ObjectParam { context, .. }
            | Self::RequiredOnNonObject { context, .. }
            | Self::UnknownRequired { context, .. }
            | Self::ViewOnNonMediaType { context, .. }
            | Self::UnknownType { context, .. }
            | Self::UnknownMediaType { context, .. }
            | Self::UnknownView { context, .. }
            | Self::InvalidIdentifier { context, .. }
            | Self::InvalidLink { context, .. }
            | Self::UnknownViewMember { context, .. }
            | Self::UnknownViewLink { context, .. }
            | Self::InvalidHeaderPattern { context, .. }
            | Self::MissingWildcardParam { context, .. }
            | Self::UnknownBaseType { context, .. }
            | Self::InvalidBaseType { context, .. }
            | Self::UnknownFilter { context, .. }
            | Self::InvalidDefault { context, .. } => context,
        }
    }

    pub fn is_duplicate_status(&self) -> bool {
        matches!(self, Self::DuplicateStatus { .. })
    }

    pub fn is_unknown_required(&self) -> bool {
        matches!(self, Self::UnknownRequired { .. })
    }

    pub fn is_missing_wildcard_param(&self) -> bool {
        matches!(self, Self::MissingWildcardParam { .. })
    }
}

/// Every structural error of one validation run, in walk order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DesignErrors(pub Vec<DesignError>);

impl DesignErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DesignError> {
        self.0.iter()
    }
}

impl fmt::Display for DesignErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&lines.join("\n"))
    }
}

impl std::error::Error for DesignErrors {}

/// Why running a design failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    #[error("design has {n} DSL error(s):\n{0}", n = .0.len())]
    Dsl(#[from] DslErrors),

    #[error("design is invalid:\n{0}")]
    Invalid(#[from] DesignErrors),
}

impl RunError {
    pub fn dsl_errors(&self) -> Option<&DslErrors> {
        match self {
            Self::Dsl(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }

    pub fn design_errors(&self) -> Option<&DesignErrors> {
        match self {
            Self::Invalid(e) => Some(e),
            Self::Dsl(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dsl_error_with_context() {
        let err = DslError::new(
            "required only applies to objects",
            Some(r#"resource "bottle" action "show""#.to_string()),
            None,
        );
        assert_eq!(
            err.to_string(),
            r#"required only applies to objects in resource "bottle" action "show""#
        );
    }

    #[test]
    fn dsl_error_top_level_with_location() {
        let location = Location::caller();
        let err = DslError::new("API \"cellar\" is already defined", None, Some(location));
        let msg = err.to_string();
        assert!(msg.starts_with(&format!("[{}:{}] ", location.file(), location.line())));
        assert!(msg.ends_with("(top level)"));
    }

    #[test]
    fn design_errors_join_lines() {
        let errors = DesignErrors(vec![
            DesignError::NoRoute {
                context: "a".into(),
            },
            DesignError::EmptyName {
                context: "b".into(),
            },
        ]);
        assert_eq!(
            errors.to_string(),
            "a: action has no route\nb: name must not be empty"
        );
        assert_eq!(errors.0[1].context(), "b");
    }

    #[test]
    fn run_error_display_lists_errors() {
        let errors = DslErrors(vec![
            DslError::new("first", None, None),
            DslError::new("second", None, None),
        ]);
        let err = RunError::from(errors);
        assert!(err.to_string().starts_with("design has 2 DSL error(s):\n"));
        assert_eq!(err.dsl_errors().map(DslErrors::len), Some(2));

        let err = RunError::from(DesignErrors(vec![DesignError::EmptyName {
            context: "b".into(),
        }]));
        assert_eq!(err.to_string(), "design is invalid:\nb: name must not be empty");
    }

    #[test]
    fn run_error_counts_dsl_errors() {
        let err = RunError::from(DslErrors(vec![DslError::new("boom", None, None)]));
        assert!(err.to_string().starts_with("design has 1 DSL error(s):"));
        assert!(err.dsl_errors().is_some());
        assert!(err.design_errors().is_none());
    }
}
