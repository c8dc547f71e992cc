//! Blueprint code generator library.
//!
//! This crate turns a finalized design from `blueprint-define` into the
//! source of a service crate. The generated code includes:
//!
//! - One struct per media type with `load`, per-view `dump`, `dump_view`
//!   and `validate`, plus a view enum when there are several views
//! - One struct per user type with `load`, `dump` and `validate`
//! - Per action, a context struct whose `new` binds a request and reports
//!   every invalid field, with one sender method per response
//! - Per resource, a controller trait, a `mount_*_controller` function and
//!   an href helper for the canonical route
//!
//! ## Modules
//!
//! - [`codegen`] - token generation for every output file
//! - [`output`] - validation, formatting and atomic file writing
//! - [`validation`] - identifier collision checks run before generation
//! - [`cargo_gen`] - Cargo.toml for a standalone generated crate
//! - [`names`] - identifier conversion and temporary names
//! - [`config`] - generator settings
//! - [`errors`] - error types for the generator
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use blueprint_definitions::define_cellar_design;
//! use blueprint_gen::config::GeneratorConfig;
//! use blueprint_gen::output::generate_and_write;
//!
//! let api = define_cellar_design().run().unwrap();
//! let written = generate_and_write(&api, &GeneratorConfig::default(), Path::new("generated"), false).unwrap();
//! println!("{written:?}");
//! ```
//!
//! ## Generated Code Structure
//!
//! For a `bottle` resource with a `show` action:
//!
//! ```text
//! pub struct ShowBottleContext { pub id: i64 }
//!
//! impl ShowBottleContext {
//!     pub fn new(req: &dyn RequestAccessor) -> Result<Self, RequestErrors>;
//!     pub fn ok(&self, resp: &mut dyn ResponseSender, body: &Bottle, view: BottleView) -> Result<(), DumpError>;
//!     pub fn not_found(&self, resp: &mut dyn ResponseSender);
//! }
//!
//! pub trait BottleController: Send + Sync {
//!     fn show(&self, ctx: ShowBottleContext, resp: &mut dyn ResponseSender) -> Result<(), HandlerError>;
//! }
//!
//! pub fn mount_bottle_controller<C: BottleController + 'static>(router: &mut dyn Router, controller: C);
//! pub fn bottle_href(id: impl Display) -> String;
//! ```

pub mod cargo_gen;
pub mod codegen;
pub mod config;
pub mod errors;
pub mod names;
pub mod output;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_utils;
