//! Blueprint Designs
//!
//! Service designs written with the `blueprint-define` DSL. Each design is
//! organized in its own module and exposed as a function returning an
//! unevaluated [`Design`].
//!
//! ## Available Designs
//!
//! - [`cellar`] - a virtual wine cellar with accounts and bottles
//!
//! ## Examples
//!
//! ```
//! use blueprint_definitions::cellar::define_cellar_design;
//!
//! let api = define_cellar_design().run().unwrap();
//! assert_eq!(api.name, "cellar");
//! assert_eq!(api.resources.len(), 3);
//! ```

use blueprint_define::Design;

pub mod cellar;

pub use cellar::define_cellar_design;

/// Names accepted by [`design`].
pub const DESIGN_NAMES: &[&str] = &["cellar"];

/// Looks up a design by name.
pub fn design(name: &str) -> Option<Design> {
    match name {
        "cellar" => Some(define_cellar_design()),
        _ => None,
    }
}
