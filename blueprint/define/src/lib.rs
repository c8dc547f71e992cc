//! Blueprint design model.
//!
//! This crate turns a design written with the builder DSL into a validated,
//! finalized [`ApiDefinition`] tree that `blueprint-gen` reads to emit code.
//!
//! ## Pipeline
//!
//! 1. [`dsl`] - evaluates the bodies registered on a [`Design`], collecting
//!    every DSL error along the way
//! 2. [`validation`] - checks the tree for unresolved references, duplicate
//!    statuses and other structural errors
//! 3. [`finalize`] - inherits base types, merges responses and declares
//!    missing route wildcard parameters
//!
//! [`Design::run`] runs all three.
//!
//! ## Definition Types
//!
//! - [`ApiDefinition`] - the root, holding resources and types
//! - [`ResourceDefinition`] and [`ActionDefinition`] - endpoints
//! - [`AttributeDefinition`] and [`DataType`] - the type of every value
//! - [`MediaTypeDefinition`] and [`UserTypeDefinition`] - named types
//! - [`ResponseDefinition`] and [`RouteDefinition`]
//!
//! ## Interpreter
//!
//! [`load`] and [`render`] apply the semantics of generated code to dynamic
//! [`Value`](blueprint_types::Value)s.

pub mod action;
pub mod api;
pub mod attribute;
pub mod dsl;
pub mod error;
pub mod finalize;
pub mod load;
pub mod media_type;
pub mod prelude;
pub mod render;
pub mod resource;
pub mod response;
pub mod route;
pub mod user_type;
pub mod validation;

pub use action::ActionDefinition;
pub use api::{ApiDefinition, TraitDefinition};
pub use attribute::{AttributeDefinition, DataType};
pub use dsl::Design;
pub use error::{DesignError, DesignErrors, DslError, DslErrors, RunError};
pub use media_type::{LinkDefinition, MediaTypeDefinition, ViewDefinition, ViewMember};
pub use resource::ResourceDefinition;
pub use response::{HeaderPattern, ResponseDefinition, ResponseTemplateDefinition};
pub use route::{HttpVerb, RouteDefinition};
pub use user_type::UserTypeDefinition;
