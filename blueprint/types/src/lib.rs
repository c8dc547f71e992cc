//! Runtime value model for blueprint.
//!
//! This crate is shared by the design model (`blueprint-define`) and by the
//! code `blueprint-gen` emits. It provides:
//!
//! - [`Value`] - dynamically typed values
//! - [`Kind`], [`Primitive`] and [`Type`] - the closed type system and its
//!   coercion rules (`load`)
//! - [`Validation`] and [`Format`] - validation predicates
//! - [`RequestAccessor`], [`ResponseSender`] and [`Router`] - the
//!   capabilities generated contexts and mount functions are written against
//! - error types for each of the above
//!
//! ## Modules
//!
//! - [`coerce`] - typed load helpers called by generated code
//! - [`memory`] - in-memory request, response and router implementations
//!
//! ## Examples
//!
//! ```
//! use blueprint_types::{Kind, Primitive, Value};
//!
//! let err = Primitive::Integer.load(&Value::from("abc")).unwrap_err();
//! assert_eq!(err.to, Kind::Integer);
//! ```

pub mod coerce;
pub mod error;
pub mod format;
pub mod kind;
pub mod memory;
pub mod primitive;
pub mod request;
pub mod schema;
pub mod validation;
pub mod value;

pub use error::{
    DumpError, FieldError, HandlerError, IncompatibleValue, LoadError, RequestErrors,
    ValidationError,
};
pub use format::Format;
pub use kind::Kind;
pub use primitive::Primitive;
pub use request::{Handler, RequestAccessor, ResponseSender, Router};
pub use schema::{Member, Object, Type};
pub use validation::Validation;
pub use value::Value;

/// Re-exported so generated code can log without its own dependency.
pub use tracing;
