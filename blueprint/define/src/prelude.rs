//! Convenient re-exports for writing designs.
//!
//! ## Examples
//!
//! ```
//! use blueprint_define::prelude::*;
//!
//! let mut design = Design::new();
//! design.api("cellar", |api| {
//!     api.base_path("/:accountID");
//!     api.response("NoContent", |r| {
//!         r.status(204);
//!     });
//! });
//! let api = design.run().unwrap();
//! assert_eq!(api.responses["NoContent"].status, Some(204));
//! ```

pub use crate::api::ApiDefinition;
pub use crate::attribute::{AttributeDefinition, DataType};
pub use crate::dsl::{
    ActionBuilder, ApiBuilder, AttributeBuilder, Design, MediaTypeBuilder, ResourceBuilder,
    ResponseBuilder, ViewBuilder,
};
pub use crate::error::{DesignError, DslError, RunError};
pub use crate::response::OK;
pub use crate::route::HttpVerb;
pub use blueprint_types::{Format, Primitive, Value};
