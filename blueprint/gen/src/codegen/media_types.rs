//! Media type structs with one dump function per view.

use std::collections::BTreeSet;

use blueprint_define::{MediaTypeDefinition, ViewDefinition};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use tracing::debug;

use super::types::{Field, TypeEmitter};
use crate::errors::GeneratorError;
use crate::names::{NameAllocator, pascal_ident, pascal_name, snake_name};

/// Name of the enum listing the views of a media type.
pub fn view_enum_name(media_type: &str) -> String {
    format!("{}View", pascal_name(media_type))
}

/// Struct, view enum and inline member structs for one media type.
pub fn generate_media_type(
    emitter: &mut TypeEmitter<'_>,
    media_type: &MediaTypeDefinition,
) -> Result<TokenStream, GeneratorError> {
    let name = &media_type.name;
    if media_type.views.is_empty() {
        return Err(GeneratorError::CodeGenError(format!(
            "media type {name} has no views"
        )));
    }
    debug!(media_type = %name, views = media_type.views.len(), "generating media type");

    let rt = emitter.rt;
    let ident = pascal_ident(name)?;
    let fields = emitter.object_fields(name, &media_type.attribute)?;
    let definition = emitter.struct_definition(
        name,
        media_type.description.as_deref(),
        &fields,
    )?;
    let load = emitter.load_fn(name, &media_type.attribute, &fields)?;
    let validate = emitter.validate_fn(&fields)?;

    let mut view_fns = Vec::with_capacity(media_type.views.len());
    let mut arms = Vec::with_capacity(media_type.views.len());
    for view in media_type.views.values() {
        let fn_ident = view_fn_ident(view);
        view_fns.push(view_fn(emitter, media_type, view, &fields, &fn_ident)?);
        let view_name = &view.name;
        arms.push(quote!(Some(#view_name) => self.#fn_ident()));
    }

    let missing_view = match media_type.views.values().collect::<Vec<_>>().as_slice() {
        [only] => {
            let fn_ident = view_fn_ident(only);
            quote!(None => self.#fn_ident())
        }
        _ => quote!(None => Err(#rt::DumpError::ViewRequired {
            media_type: #name.to_string(),
        })),
    };

    let (view_enum, dump) = dump_entry_point(rt, media_type)?;
    let identifier = &media_type.identifier;
    let items = emitter.take_items();

    Ok(quote! {
        #definition

        impl #ident {
            /// MIME identifier of this media type.
            pub const IDENTIFIER: &'static str = #identifier;

            #load

            #dump

            /// Renders the view named `view`.
            ///
            /// Without a name, a type with a single view renders it and
            /// any other type fails.
            pub fn dump_view(&self, view: Option<&str>) -> Result<#rt::Value, #rt::DumpError> {
                match view {
                    #(#arms,)*
                    Some(other) => Err(#rt::DumpError::UnknownView {
                        media_type: #name.to_string(),
                        view: other.to_string(),
                    }),
                    #missing_view,
                }
            }

            #(#view_fns)*

            #validate
        }

        #view_enum

        #(#items)*
    })
}

/// Name of the method rendering `view`.
pub fn view_fn_name(view: &str) -> String {
    format!("dump_{}", snake_name(view).trim_end_matches('_'))
}

fn view_fn_ident(view: &ViewDefinition) -> proc_macro2::Ident {
    format_ident!("{}", view_fn_name(&view.name))
}

// Public `dump`: takes the view enum when there is a choice to make.
fn dump_entry_point(
    rt: &syn::Path,
    media_type: &MediaTypeDefinition,
) -> Result<(TokenStream, TokenStream), GeneratorError> {
    let views: Vec<&ViewDefinition> = media_type.views.values().collect();
    if let [view] = views.as_slice() {
        let fn_ident = view_fn_ident(view);
        return Ok((
            TokenStream::new(),
            quote! {
                /// Renders the only view of this media type.
                pub fn dump(&self) -> Result<#rt::Value, #rt::DumpError> {
                    self.#fn_ident()
                }
            },
        ));
    }

    let enum_ident = pascal_ident(&view_enum_name(&media_type.name))?;
    let mut variants = Vec::with_capacity(views.len());
    let mut names = Vec::with_capacity(views.len());
    let mut calls = Vec::with_capacity(views.len());
    for view in &views {
        let variant = pascal_ident(&view.name)?;
        let fn_ident = view_fn_ident(view);
        let view_name = &view.name;
        names.push(quote!(Self::#variant => #view_name));
        calls.push(quote!(#enum_ident::#variant => self.#fn_ident()));
        variants.push(variant);
    }
    let doc = format!("Views of the {} media type.", media_type.name);
    let view_enum = quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum #enum_ident {
            #(#variants,)*
        }

        impl #enum_ident {
            /// Name of the view in the design.
            pub fn name(self) -> &'static str {
                match self {
                    #(#names,)*
                }
            }
        }
    };
    let dump = quote! {
        /// Renders this value with `view`.
        pub fn dump(&self, view: #enum_ident) -> Result<#rt::Value, #rt::DumpError> {
            match view {
                #(#calls,)*
            }
        }
    };
    Ok((view_enum, dump))
}

fn view_fn(
    emitter: &TypeEmitter<'_>,
    media_type: &MediaTypeDefinition,
    view: &ViewDefinition,
    fields: &[Field],
    fn_ident: &proc_macro2::Ident,
) -> Result<TokenStream, GeneratorError> {
    let rt = emitter.rt;
    let mut names = NameAllocator::new();
    for f in fields {
        names.reserve(&f.ident.to_string());
    }
    let object = names.fresh("object");
    let links = names.fresh("links");
    let field = |name: &str| fields.iter().find(|f| f.name == name);

    let mut bound = BTreeSet::new();
    let mut inserts = Vec::new();
    for entry in &view.members {
        let Some(f) = field(&entry.name) else {
            continue;
        };
        bound.insert(f.ident.to_string());
        inserts.push(emitter.insert_stmt(&object, f, entry.view.as_deref(), &mut names)?);
    }

    let mut link_inserts = Vec::new();
    for name in &view.links {
        let Some((link, f)) = media_type
            .links
            .get(name)
            .and_then(|link| Some((link, field(&link.name)?)))
        else {
            continue;
        };
        bound.insert(f.ident.to_string());
        link_inserts.push(emitter.insert_stmt(&links, f, Some(link.view.as_str()), &mut names)?);
    }
    let links_block = if link_inserts.is_empty() {
        TokenStream::new()
    } else {
        quote! {
            let mut #links = std::collections::BTreeMap::new();
            #(#link_inserts)*
            if !#links.is_empty() {
                #object.insert("links".to_string(), #rt::Value::Object(#links));
            }
        }
    };

    let bind = if bound.is_empty() {
        TokenStream::new()
    } else {
        let idents = fields
            .iter()
            .filter(|f| bound.contains(&f.ident.to_string()))
            .map(|f| &f.ident);
        quote!(let Self { #(#idents,)* .. } = self;)
    };
    let object_mut = if inserts.is_empty() && link_inserts.is_empty() {
        quote!(let #object = std::collections::BTreeMap::new();)
    } else {
        quote!(let mut #object = std::collections::BTreeMap::new();)
    };

    Ok(quote! {
        fn #fn_ident(&self) -> Result<#rt::Value, #rt::DumpError> {
            #bind
            #object_mut
            #(#inserts)*
            #links_block
            Ok(#rt::Value::Object(#object))
        }
    })
}

/// The `media_types.rs` module.
pub fn generate_media_types_module(
    emitter: &mut TypeEmitter<'_>,
) -> Result<TokenStream, Vec<GeneratorError>> {
    let api = emitter.api;
    let mut items = Vec::new();
    let mut errors = Vec::new();
    for media_type in api.media_types.values() {
        match generate_media_type(emitter, media_type) {
            Ok(tokens) => items.push(tokens),
            Err(e) => errors.push(e.in_artifact(format!("media type \"{}\"", media_type.name))),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(quote! {
        //! Media types rendered in responses.

        #(#items)*
    })
}
