//! Error types for coercion, validation, request binding and rendering.

use thiserror::Error;

use crate::format::Format;
use crate::kind::Kind;
use crate::value::Value;

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

/// A value could not be coerced into the target kind.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot load value {value} into a {to}{}", detail_suffix(.detail))]
pub struct IncompatibleValue {
    /// The offending input.
    pub value: Value,
    /// The kind the value was being loaded into.
    pub to: Kind,
    /// Extra context, e.g. which array index or object member failed.
    pub detail: Option<String>,
}

impl IncompatibleValue {
    pub fn new(value: Value, to: Kind) -> Self {
        Self {
            value,
            to,
            detail: None,
        }
    }

    pub fn with_detail(value: Value, to: Kind, detail: impl Into<String>) -> Self {
        Self {
            value,
            to,
            detail: Some(detail.into()),
        }
    }
}

/// A validation predicate rejected a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// An object lacks a member listed as required.
    #[error("attribute {name} is missing required member {member}")]
    MissingMember { name: String, member: String },

    /// The value is not one of the allowed values.
    #[error("value of {name} must be one of {allowed}, got {value}")]
    NotInEnum {
        name: String,
        value: String,
        allowed: String,
    },

    /// A string does not match its declared format.
    #[error("value of {name} must be a valid {format}, got {value}")]
    InvalidFormat {
        name: String,
        format: Format,
        value: String,
    },

    #[error("value of {name} must be greater or equal than {min}, got {value}")]
    BelowMinimum { name: String, min: i64, value: String },

    #[error("value of {name} must be lower or equal than {max}, got {value}")]
    AboveMaximum { name: String, max: i64, value: String },

    /// String length in characters, or collection size.
    #[error("length of {name} must be greater or equal than {min}, got {len}")]
    TooShort { name: String, min: usize, len: usize },

    #[error("length of {name} must be lower or equal than {max}, got {len}")]
    TooLong { name: String, max: usize, len: usize },
}

impl ValidationError {
    /// Name of the attribute that failed validation.
    pub fn name(&self) -> &str {
        match self {
            Self::MissingMember { name, .. }
            | Self::NotInEnum { name, .. }
            | Self::InvalidFormat { name, .. }
            | Self::BelowMinimum { name, .. }
            | Self::AboveMaximum { name, .. }
            | Self::TooShort { name, .. }
            | Self::TooLong { name, .. } => name,
        }
    }

    /// Returns `true` if this is a required-member violation.
    pub fn is_missing_member(&self) -> bool {
        matches!(self, Self::MissingMember { .. })
    }

    /// Returns `true` if this is a numeric bound violation.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::BelowMinimum { .. } | Self::AboveMaximum { .. })
    }

    /// Returns `true` if this is a length bound violation.
    pub fn is_bad_length(&self) -> bool {
        matches!(self, Self::TooShort { .. } | Self::TooLong { .. })
    }
}

/// Failure of a load: either coercion or a validation run after it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error(transparent)]
    Incompatible(#[from] IncompatibleValue),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl LoadError {
    /// Wraps a member failure with the enclosing object's context.
    pub fn in_member(self, object: &Value, member: &str) -> Self {
        LoadError::Incompatible(IncompatibleValue::with_detail(
            object.clone(),
            Kind::Object,
            format!("could not load member {member}: {self}"),
        ))
    }

    /// Wraps an element failure with its position in the enclosing array.
    pub fn at_index(self, array: &Value, index: usize) -> Self {
        LoadError::Incompatible(IncompatibleValue::with_detail(
            array.clone(),
            Kind::Array,
            format!("cannot load value at index {index}: {self}"),
        ))
    }

    /// The kind that was expected, for coercion failures.
    pub fn expected_kind(&self) -> Option<Kind> {
        match self {
            LoadError::Incompatible(e) => Some(e.to),
            LoadError::Invalid(_) => None,
        }
    }

    pub fn is_incompatible(&self) -> bool {
        matches!(self, LoadError::Incompatible(_))
    }
}

/// One problem found while binding a request to an action context.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("missing required parameter {name}")]
    MissingParam { name: String },

    #[error("missing required header {name}")]
    MissingHeader { name: String },

    #[error("invalid value for parameter {name}: {source}")]
    InvalidParam {
        name: String,
        #[source]
        source: LoadError,
    },

    #[error("invalid payload: {0}")]
    InvalidPayload(#[source] LoadError),
}

impl FieldError {
    /// Parameter or header name this error is attached to (`payload` for
    /// payload errors).
    pub fn field(&self) -> &str {
        match self {
            Self::MissingParam { name }
            | Self::MissingHeader { name }
            | Self::InvalidParam { name, .. } => name,
            Self::InvalidPayload(_) => "payload",
        }
    }

    /// The kind the offending value should have had, for coercion failures.
    pub fn expected_kind(&self) -> Option<Kind> {
        match self {
            Self::InvalidParam { source, .. } | Self::InvalidPayload(source) => {
                source.expected_kind()
            }
            _ => None,
        }
    }
}

/// Every problem found while binding one request.
///
/// Binding keeps going after a field fails so a single request reports all
/// of its problems at once.
#[derive(Debug, Clone, PartialEq, Default, Error)]
#[error("{}", join_errors(.0))]
pub struct RequestErrors(pub Vec<FieldError>);

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl RequestErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// First error attached to the given field.
    pub fn field(&self, name: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field() == name)
    }

    /// Returns `Ok(value)` when no error was collected.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// A value could not be rendered through a media type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DumpError {
    #[error("media type {media_type} has no view {view}")]
    UnknownView { media_type: String, view: String },

    #[error("media type {media_type} defines several views, one must be selected")]
    ViewRequired { media_type: String },

    #[error("cannot render {media_type}: {source}")]
    Incompatible {
        media_type: String,
        #[source]
        source: IncompatibleValue,
    },
}

impl DumpError {
    pub fn is_view_required(&self) -> bool {
        matches!(self, Self::ViewRequired { .. })
    }
}

/// Error returned by a mounted handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The request could not be bound to the action context.
    #[error(transparent)]
    Request(#[from] RequestErrors),

    /// A response body could not be rendered.
    #[error(transparent)]
    Response(#[from] DumpError),

    /// The controller itself failed.
    #[error("controller failed: {0}")]
    Controller(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    pub fn controller(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Controller(err.into())
    }

    pub fn is_request(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incompatible_display_without_detail() {
        let err = IncompatibleValue::new(Value::from("abc"), Kind::Integer);
        assert_eq!(err.to_string(), "cannot load value \"abc\" into a integer");
    }

    #[test]
    fn incompatible_display_with_detail() {
        let err = IncompatibleValue::with_detail(Value::from(3), Kind::Boolean, "integer value must be 0 or 1");
        assert_eq!(
            err.to_string(),
            "cannot load value 3 into a boolean: integer value must be 0 or 1"
        );
    }

    #[test]
    fn member_context_wraps_inner_message() {
        let inner = LoadError::from(IncompatibleValue::new(Value::from("x"), Kind::Integer));
        let outer = inner.in_member(&Value::object([("id", "x")]), "id");
        assert_eq!(outer.expected_kind(), Some(Kind::Object));
        assert!(outer.to_string().contains("could not load member id"));
        assert!(outer.to_string().contains("into a integer"));
    }

    #[test]
    fn field_error_reports_expected_kind() {
        let err = FieldError::InvalidParam {
            name: "id".to_string(),
            source: IncompatibleValue::new(Value::from("abc"), Kind::Integer).into(),
        };
        assert_eq!(err.field(), "id");
        assert_eq!(err.expected_kind(), Some(Kind::Integer));
    }

    #[test]
    fn request_errors_join_messages() {
        let mut errors = RequestErrors::new();
        assert!(errors.clone().into_result(()).is_ok());
        errors.push(FieldError::MissingParam { name: "a".into() });
        errors.push(FieldError::MissingHeader { name: "X-Auth".into() });
        assert_eq!(
            errors.to_string(),
            "missing required parameter a; missing required header X-Auth"
        );
        assert!(errors.field("X-Auth").is_some());
        assert!(errors.into_result(()).is_err());
    }

    #[test]
    fn validation_error_helpers() {
        let err = ValidationError::BelowMinimum {
            name: "age".into(),
            min: 0,
            value: "-1".into(),
        };
        assert!(err.is_out_of_range());
        assert!(!err.is_bad_length());
        assert_eq!(err.name(), "age");
    }

    #[test]
    fn handler_error_from_request_errors() {
        let err = HandlerError::from(RequestErrors(vec![FieldError::MissingParam {
            name: "id".into(),
        }]));
        assert!(err.is_request());
    }
}
