//! Token generation for every output file.
//!
//! Each function here returns the tokens of one file. Nothing is
//! validated or formatted at this stage; see [`crate::output`].
//!
//! ## Generated Layout
//!
//! ```text
//! src/
//! ├── lib.rs          # module declarations and re-exports
//! ├── media_types.rs  # one struct per media type, view enums
//! ├── user_types.rs   # one struct per user type
//! └── <resource>.rs   # contexts, controller trait, mount function
//! ```

pub mod media_types;
pub mod resources;
pub mod types;
pub mod user_types;

use blueprint_define::ApiDefinition;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Path;
use tracing::{instrument, warn};

use crate::errors::GeneratorError;
use self::types::TypeEmitter;

pub const MEDIA_TYPES_MODULE: &str = "media_types";
pub const USER_TYPES_MODULE: &str = "user_types";

/// Tokens of one generated module.
#[derive(Debug, Clone)]
pub struct GeneratedModule {
    /// Module name, also the file stem.
    pub name: String,
    pub tokens: TokenStream,
}

/// Generates every module of `api`.
///
/// A module that fails is left out and its error returned alongside the
/// modules that succeeded.
#[instrument(skip_all, fields(api = %api.name))]
pub fn generate_modules(api: &ApiDefinition, rt: &Path) -> (Vec<GeneratedModule>, Vec<GeneratorError>) {
    let mut emitter = TypeEmitter::new(api, rt);
    let mut modules = Vec::new();
    let mut errors = Vec::new();

    let mut push = |name: String, result: Result<TokenStream, GeneratorError>| match result {
        Ok(tokens) => modules.push(GeneratedModule { name, tokens }),
        Err(e) => {
            warn!(module = %name, error = %e, "module generation failed");
            errors.push(e);
        }
    };

    if !api.media_types.is_empty() {
        let result = media_types::generate_media_types_module(&mut emitter).map_err(collapse);
        push(MEDIA_TYPES_MODULE.to_string(), result);
    }
    if !api.user_types.is_empty() {
        let result = user_types::generate_user_types_module(&mut emitter).map_err(collapse);
        push(USER_TYPES_MODULE.to_string(), result);
    }
    for resource in api.resources.values() {
        let result = resources::generate_resource(&mut emitter, resource)
            .map_err(|e| e.in_artifact(format!("resource \"{}\"", resource.name)));
        push(resources::module_name(resource), result);
    }

    (modules, errors)
}

/// Names of the modules [`generate_modules`] produces when nothing fails.
pub fn module_names(api: &ApiDefinition) -> Vec<String> {
    let mut names = Vec::with_capacity(api.resources.len() + 2);
    if !api.media_types.is_empty() {
        names.push(MEDIA_TYPES_MODULE.to_string());
    }
    if !api.user_types.is_empty() {
        names.push(USER_TYPES_MODULE.to_string());
    }
    names.extend(api.resources.values().map(resources::module_name));
    names
}

fn collapse(mut errors: Vec<GeneratorError>) -> GeneratorError {
    if errors.len() == 1 {
        errors.remove(0)
    } else {
        GeneratorError::Artifacts(errors)
    }
}

/// The `lib.rs` of the generated crate, declaring `modules`.
pub fn assemble_lib_rs(api: &ApiDefinition, modules: &[GeneratedModule]) -> TokenStream {
    let title = api.title.as_deref().unwrap_or(&api.name);
    let mut docs = vec![format!(" {title}")];
    if let Some(description) = &api.description {
        docs.push(String::new());
        docs.push(format!(" {description}"));
    }
    docs.push(String::new());
    docs.push(" Mount each controller on a router with its `mount_*_controller` function.".to_string());

    let decls = modules.iter().map(|m| {
        let ident = format_ident!("{}", m.name);
        quote!(pub mod #ident;)
    });
    let reexports = modules
        .iter()
        .filter(|m| m.name == MEDIA_TYPES_MODULE || m.name == USER_TYPES_MODULE)
        .map(|m| {
            let ident = format_ident!("{}", m.name);
            quote!(pub use #ident::*;)
        });

    quote! {
        #(#![doc = #docs])*

        #(#decls)*

        #(#reexports)*
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{make_api, runtime_path};

    #[test]
    fn one_module_per_resource_plus_types() {
        let api = make_api();
        let (modules, errors) = generate_modules(&api, &runtime_path());
        assert!(errors.is_empty());
        let names: Vec<_> = modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["media_types", "user_types", "bottle"]);
    }

    #[test]
    fn lib_rs_declares_and_reexports() {
        let api = make_api();
        let (modules, _) = generate_modules(&api, &runtime_path());
        let code = assemble_lib_rs(&api, &modules).to_string();
        assert!(code.contains("pub mod bottle ;"));
        assert!(code.contains("pub use media_types :: * ;"));
        assert!(!code.contains("pub use bottle"));
    }

    #[test]
    fn failed_modules_are_left_out() {
        let mut api = make_api();
        if let Some(bottle) = api.media_types.get_mut("Bottle") {
            bottle.views.clear();
        }
        let (modules, errors) = generate_modules(&api, &runtime_path());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("media type \"Bottle\""));
        assert!(modules.iter().all(|m| m.name != "media_types"));
        assert!(modules.iter().any(|m| m.name == "bottle"));
    }
}
