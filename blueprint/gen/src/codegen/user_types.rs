//! User type structs.
//!
//! Object user types become plain structs. Any other user type wraps its
//! value in a single-field tuple struct so it still gets `load`, `dump`
//! and `validate`.

use blueprint_define::UserTypeDefinition;
use proc_macro2::TokenStream;
use quote::quote;
use tracing::debug;

use super::types::TypeEmitter;
use crate::errors::GeneratorError;
use crate::names::{NameAllocator, pascal_ident, pascal_name};

pub fn generate_user_type(
    emitter: &mut TypeEmitter<'_>,
    user_type: &UserTypeDefinition,
) -> Result<TokenStream, GeneratorError> {
    let name = &user_type.name;
    let attribute = &user_type.attribute;
    debug!(user_type = %name, "generating user type");

    if attribute.data_type.is_object() {
        let item = emitter.object_struct(name, attribute, attribute.description.as_deref())?;
        let items = emitter.take_items();
        return Ok(quote! {
            #item

            #(#items)*
        });
    }

    let rt = emitter.rt;
    let ident = pascal_ident(name)?;
    let owner = format!("{}Item", pascal_name(name));
    let ty = emitter.field_type(attribute, &owner)?;
    let doc = attribute
        .description
        .clone()
        .unwrap_or_else(|| format!("{name} type."));

    let mut names = NameAllocator::new();
    let value = names.fresh("value");
    let load = emitter.load_body(attribute, &owner, name, &value, &mut names)?;
    let mut names = NameAllocator::new();
    let inner = names.fresh("inner");
    let dump = emitter.dump_expr(attribute, &quote!(#inner), None, &mut names.clone())?;
    let validate = emitter.validate_stmts(attribute, name, &quote!(#inner), &mut names)?;
    let validate = if validate.is_empty() {
        quote!(Ok(()))
    } else {
        quote! {
            let Self(#inner) = self;
            #validate
            Ok(())
        }
    };
    let items = emitter.take_items();

    Ok(quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, PartialEq)]
        pub struct #ident(pub #ty);

        impl #ident {
            pub fn load(#value: &#rt::Value) -> Result<Self, #rt::LoadError> {
                Ok(Self(#load?))
            }

            pub fn dump(&self) -> Result<#rt::Value, #rt::DumpError> {
                let Self(#inner) = self;
                Ok(#dump)
            }

            /// Checks the wrapped value against its validations.
            pub fn validate(&self) -> Result<(), #rt::ValidationError> {
                #validate
            }
        }

        #(#items)*
    })
}

/// The `user_types.rs` module.
pub fn generate_user_types_module(
    emitter: &mut TypeEmitter<'_>,
) -> Result<TokenStream, Vec<GeneratorError>> {
    let api = emitter.api;
    let mut items = Vec::new();
    let mut errors = Vec::new();
    for user_type in api.user_types.values() {
        match generate_user_type(emitter, user_type) {
            Ok(tokens) => items.push(tokens),
            Err(e) => errors.push(e.in_artifact(format!("user type \"{}\"", user_type.name))),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(quote! {
        //! Types shared by payloads and media types.

        #(#items)*
    })
}
