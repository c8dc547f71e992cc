//! Per-resource modules: action contexts, response senders, the
//! controller trait and its mount function.

use blueprint_define::route::{extract_wildcards, format_template};
use blueprint_define::{
    ActionDefinition, ApiDefinition, AttributeDefinition, DataType, ResourceDefinition,
    ResponseDefinition,
};
use blueprint_types::Kind;
use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote};
use tracing::{debug, instrument};

use super::media_types::view_enum_name;
use super::types::{TypeEmitter, value_tokens};
use crate::errors::GeneratorError;
use crate::names::{NameAllocator, pascal_ident, pascal_name, snake_ident, snake_name};

/// Name of the context struct of `action`.
pub fn context_name(resource: &ResourceDefinition, action: &ActionDefinition) -> String {
    format!("{}{}Context", pascal_name(&action.name), pascal_name(&resource.name))
}

/// Name of the controller trait of `resource`.
pub fn controller_name(resource: &ResourceDefinition) -> String {
    format!("{}Controller", pascal_name(&resource.name))
}

/// Module (and file stem) of `resource`.
pub fn module_name(resource: &ResourceDefinition) -> String {
    snake_name(&resource.name)
}

// A context field loaded from a request parameter.
struct Param<'d> {
    name: &'d str,
    ident: Ident,
    attribute: &'d AttributeDefinition,
    ty: TokenStream,
    path: bool,
    required: bool,
    optional: bool,
}

/// The module of one resource.
///
/// ## Errors
///
/// Fails when any action fails; each failure names its action.
#[instrument(skip_all, fields(resource = %resource.name))]
pub fn generate_resource(
    emitter: &mut TypeEmitter<'_>,
    resource: &ResourceDefinition,
) -> Result<TokenStream, GeneratorError> {
    let api = emitter.api;
    let mut items = Vec::new();
    let mut errors = Vec::new();
    for action in resource.actions.values() {
        match generate_action(emitter, resource, action) {
            Ok(tokens) => items.push(tokens),
            Err(e) => errors.push(e.in_artifact(format!("action \"{}\"", action.name))),
        }
    }
    match errors.len() {
        0 => {}
        1 => return Err(errors.remove(0)),
        _ => return Err(GeneratorError::Artifacts(errors)),
    }

    let controller = controller_trait(emitter.rt, resource)?;
    let mount = mount_fn(emitter.rt, api, resource)?;
    let href = href_fn(api, resource)?;
    let doc = match &resource.description {
        Some(description) => format!("The {} resource: {description}", resource.name),
        None => format!("The {} resource.", resource.name),
    };
    debug!(actions = resource.actions.len(), "generated resource");

    Ok(quote! {
        #![doc = #doc]

        #(#items)*

        #controller

        #mount

        #href
    })
}

fn generate_action(
    emitter: &mut TypeEmitter<'_>,
    resource: &ResourceDefinition,
    action: &ActionDefinition,
) -> Result<TokenStream, GeneratorError> {
    let api = emitter.api;
    let rt = emitter.rt;
    let context_name = context_name(resource, action);
    let context = pascal_ident(&context_name)?;
    let prefix = format!("{}{}", pascal_name(&action.name), pascal_name(&resource.name));

    let mut params = Vec::new();
    if let Some(attribute) = &action.params {
        for (name, param) in attribute.members().into_iter().flatten() {
            let owner = format!("{prefix}{}", pascal_name(name));
            let path = api.is_path_param(resource, action, name);
            let required = attribute.is_required(name);
            params.push(Param {
                name,
                ident: snake_ident(name)?,
                attribute: param,
                ty: emitter.field_type(param, &owner)?,
                path,
                required,
                optional: !required && !path && param.default.is_none(),
            });
        }
    }
    let payload = match &action.payload {
        Some(attribute) => Some((attribute, emitter.field_type(attribute, &format!("{prefix}Payload"))?)),
        None => None,
    };

    let mut names = NameAllocator::new();
    for param in &params {
        names.reserve(&param.ident.to_string());
    }
    names.reserve("payload");
    let req = names.fresh("req");
    let errors = names.fresh("errors");

    let header_checks = action.required_headers().into_iter().map(|header| {
        quote! {
            if #req.header(#header).is_none() {
                #errors.push(#rt::FieldError::MissingHeader {
                    name: #header.to_string(),
                });
            }
        }
    });
    let header_checks: Vec<_> = header_checks.collect();

    let mut loads = Vec::new();
    let mut unwraps = Vec::new();
    for param in &params {
        let Param { name, ident, attribute, .. } = param;
        let raw = if is_array(api, attribute) {
            let values = names.fresh("values");
            quote! {
                #req.get_many(#name).map(|#values| {
                    #rt::Value::Array(#values.into_iter().map(#rt::Value::from).collect())
                })
            }
        } else {
            quote!(#req.get(#name).map(#rt::Value::from))
        };
        let raw = match &attribute.default {
            Some(default) => {
                let default = value_tokens(default, rt);
                quote!(#raw.or_else(|| Some(#default)))
            }
            None => raw,
        };
        let loader = emitter.loader(attribute, &format!("{prefix}{}", pascal_name(name)), name, &mut names)?;
        // Wildcards are supplied by the router; only declared requirements
        // are checked here.
        let required = param.required && !param.path;
        loads.push(quote! {
            let #ident = #rt::coerce::param(&mut #errors, #name, #raw, #required, #loader);
        });
        if param.optional {
            continue;
        }
        let on_missing = if param.path {
            quote! {
                if #errors.field(#name).is_none() {
                    #errors.push(#rt::FieldError::MissingParam {
                        name: #name.to_string(),
                    });
                }
            }
        } else {
            TokenStream::new()
        };
        unwraps.push(quote! {
            let Some(#ident) = #ident else {
                #on_missing
                return Err(#errors);
            };
        });
    }

    let mut fields = Vec::new();
    let mut idents: Vec<Ident> = params.iter().map(|p| p.ident.clone()).collect();
    for param in &params {
        let Param { ident, ty, .. } = param;
        let doc = param.attribute.description.iter();
        let ty = if param.optional {
            quote!(Option<#ty>)
        } else {
            quote!(#ty)
        };
        fields.push(quote! {
            #(#[doc = #doc])*
            pub #ident: #ty,
        });
    }
    if let Some((attribute, ty)) = &payload {
        let kind = kind_ident(expected_kind(api, attribute));
        let loader = emitter.loader(attribute, &format!("{prefix}Payload"), "payload", &mut names)?;
        loads.push(quote! {
            let payload = #rt::coerce::payload(&mut #errors, #req.payload(), #rt::Kind::#kind, #loader);
        });
        unwraps.push(quote! {
            let Some(payload) = payload else {
                return Err(#errors);
            };
        });
        fields.push(quote! {
            /// Decoded request body.
            pub payload: #ty,
        });
        idents.push(Ident::new("payload", Span::call_site()));
    }

    let constructor = if loads.is_empty() && header_checks.is_empty() {
        quote! {
            pub fn new(_req: &dyn #rt::RequestAccessor) -> Result<Self, #rt::RequestErrors> {
                Ok(Self {})
            }
        }
    } else {
        quote! {
            pub fn new(#req: &dyn #rt::RequestAccessor) -> Result<Self, #rt::RequestErrors> {
                let mut #errors = #rt::RequestErrors::new();
                #(#header_checks)*
                #(#loads)*
                #(#unwraps)*
                #errors.into_result(Self { #(#idents),* })
            }
        }
    };

    let senders = action
        .responses
        .values()
        .map(|response| {
            response_sender(rt, api, response)
                .map_err(|e| e.in_artifact(format!("response \"{}\"", response.name)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let doc = match &action.description {
        Some(description) => format!("Request context of {} {}: {description}", resource.name, action.name),
        None => format!("Request context of {} {}.", resource.name, action.name),
    };
    let new_doc = format!(
        "Binds a request to the {} action, collecting every invalid field.",
        action.name
    );
    let inline = emitter.take_items();
    debug!(action = %action.name, params = params.len(), "generated action context");

    Ok(quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, PartialEq)]
        pub struct #context {
            #(#fields)*
        }

        impl #context {
            #[doc = #new_doc]
            #constructor

            #(#senders)*
        }

        #(#inline)*
    })
}

fn response_sender(
    rt: &syn::Path,
    api: &ApiDefinition,
    response: &ResponseDefinition,
) -> Result<TokenStream, GeneratorError> {
    let Some(status) = response.status else {
        return Err(GeneratorError::CodeGenError(format!(
            "response {} has no status",
            response.name
        )));
    };
    let method = snake_ident(&response.name)?;
    let doc = match &response.description {
        Some(description) => format!("Sends {} ({status}): {description}", response.name),
        None => format!("Sends {} ({status}).", response.name),
    };

    let Some(media_type) = &response.media_type else {
        return Ok(quote! {
            #[doc = #doc]
            pub fn #method(&self, resp: &mut dyn #rt::ResponseSender) {
                resp.send(#status, None);
            }
        });
    };
    let Some(media_type) = api.find_media_type(media_type) else {
        return Err(GeneratorError::CodeGenError(format!(
            "unknown media type {media_type}"
        )));
    };
    let ty = pascal_ident(&media_type.name)?;
    if media_type.has_multiple_views() {
        let view = pascal_ident(&view_enum_name(&media_type.name))?;
        Ok(quote! {
            #[doc = #doc]
            pub fn #method(
                &self,
                resp: &mut dyn #rt::ResponseSender,
                body: &crate::#ty,
                view: crate::#view,
            ) -> Result<(), #rt::DumpError> {
                resp.send(#status, Some(body.dump(view)?));
                Ok(())
            }
        })
    } else {
        Ok(quote! {
            #[doc = #doc]
            pub fn #method(
                &self,
                resp: &mut dyn #rt::ResponseSender,
                body: &crate::#ty,
            ) -> Result<(), #rt::DumpError> {
                resp.send(#status, Some(body.dump()?));
                Ok(())
            }
        })
    }
}

fn controller_trait(rt: &syn::Path, resource: &ResourceDefinition) -> Result<TokenStream, GeneratorError> {
    let ident = pascal_ident(&controller_name(resource))?;
    let methods = resource
        .actions
        .values()
        .map(|action| {
            let method = snake_ident(&action.name)?;
            let context = pascal_ident(&context_name(resource, action))?;
            let doc = action.description.iter();
            Ok(quote! {
                #(#[doc = #doc])*
                fn #method(
                    &self,
                    ctx: #context,
                    resp: &mut dyn #rt::ResponseSender,
                ) -> Result<(), #rt::HandlerError>;
            })
        })
        .collect::<Result<Vec<_>, GeneratorError>>()?;
    let doc = format!("Handlers of the {} actions.", resource.name);
    Ok(quote! {
        #[doc = #doc]
        pub trait #ident: Send + Sync {
            #(#methods)*
        }
    })
}

fn mount_fn(
    rt: &syn::Path,
    api: &ApiDefinition,
    resource: &ResourceDefinition,
) -> Result<TokenStream, GeneratorError> {
    let controller_ident = pascal_ident(&controller_name(resource))?;
    let fn_ident = format_ident!("mount_{}_controller", module_name(resource).trim_end_matches('_'));
    let mut routes = Vec::new();
    for action in resource.actions.values() {
        let method = snake_ident(&action.name)?;
        let context = pascal_ident(&context_name(resource, action))?;
        let action_name = &action.name;
        for route in &action.routes {
            let verb = route.verb.to_string();
            let path = api.full_path(resource, route);
            routes.push(quote! {
                {
                    let controller = std::sync::Arc::clone(&controller);
                    router.handle(
                        #verb,
                        #path,
                        Box::new(
                            move |req: &dyn #rt::RequestAccessor,
                                  resp: &mut dyn #rt::ResponseSender|
                                  -> Result<(), #rt::HandlerError> {
                                let ctx = #context::new(req)?;
                                controller.#method(ctx, resp)
                            },
                        ),
                    );
                    #rt::tracing::debug!(action = #action_name, verb = #verb, path = #path, "mounted route");
                }
            });
        }
    }
    let doc = format!(
        "Registers every route of the {} resource with `router`.",
        resource.name
    );
    let controller_binding = if routes.is_empty() {
        quote!(let _ = (router, controller);)
    } else {
        quote!(let controller = std::sync::Arc::new(controller);)
    };
    Ok(quote! {
        #[doc = #doc]
        pub fn #fn_ident<C: #controller_ident + 'static>(router: &mut dyn #rt::Router, controller: C) {
            #controller_binding
            #(#routes)*
        }
    })
}

fn href_fn(api: &ApiDefinition, resource: &ResourceDefinition) -> Result<TokenStream, GeneratorError> {
    let Some(path) = api.canonical_path(resource) else {
        return Ok(TokenStream::new());
    };
    let fn_ident = format_ident!("{}_href", module_name(resource).trim_end_matches('_'));
    let doc = format!("Canonical path of a {}.", resource.name);
    let mut names = NameAllocator::new();
    let args: Vec<Ident> = extract_wildcards(&path)
        .iter()
        .map(|w| names.fresh(&snake_name(w)))
        .collect();
    if args.is_empty() {
        return Ok(quote! {
            #[doc = #doc]
            pub fn #fn_ident() -> String {
                #path.to_string()
            }
        });
    }
    let template = format_template(&path.replace('{', "{{").replace('}', "}}"));
    Ok(quote! {
        #[doc = #doc]
        pub fn #fn_ident(#(#args: impl std::fmt::Display),*) -> String {
            format!(#template, #(#args),*)
        }
    })
}

fn is_array(api: &ApiDefinition, attribute: &AttributeDefinition) -> bool {
    match &attribute.data_type {
        DataType::Array(_) => true,
        DataType::UserType(name) => api
            .user_type(name)
            .is_some_and(|ut| matches!(ut.attribute.data_type, DataType::Array(_))),
        _ => false,
    }
}

fn expected_kind(api: &ApiDefinition, attribute: &AttributeDefinition) -> Kind {
    match &attribute.data_type {
        DataType::Primitive(p) => p.kind(),
        DataType::Array(_) => Kind::Array,
        DataType::Object(_) | DataType::MediaType(_) => Kind::Object,
        DataType::UserType(name) => match api.user_type(name) {
            Some(ut) => expected_kind(api, &ut.attribute),
            None => Kind::Object,
        },
    }
}

fn kind_ident(kind: Kind) -> Ident {
    Ident::new(&format!("{kind:?}"), Span::call_site())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{make_api, runtime_path};

    fn generate(resource: &str) -> String {
        let api = make_api();
        let rt = runtime_path();
        let mut emitter = TypeEmitter::new(&api, &rt);
        generate_resource(&mut emitter, api.resource(resource).unwrap())
            .unwrap()
            .to_string()
    }

    // === context tests ===

    #[test]
    fn contexts_are_named_after_action_and_resource() {
        let code = generate("bottle");
        assert!(code.contains("pub struct ShowBottleContext"));
        assert!(code.contains("pub struct ListBottleContext"));
    }

    #[test]
    fn path_params_are_not_optional() {
        let code = generate("bottle");
        assert!(code.contains("pub id : i64"));
        assert!(code.contains("\"id\" , req . get (\"id\") . map (blueprint_types :: Value :: from) , false"));
    }

    #[test]
    fn array_params_read_every_value() {
        let code = generate("bottle");
        assert!(code.contains("req . get_many (\"years\")"));
        assert!(code.contains("pub years : Option < Vec < i64 > >"));
    }

    #[test]
    fn defaults_make_params_present() {
        let code = generate("bottle");
        assert!(code.contains("pub page : i64"));
        assert!(code.contains("or_else (|| Some (blueprint_types :: Value :: Int (1i64)))"));
    }

    #[test]
    fn required_headers_are_checked() {
        let code = generate("bottle");
        assert!(code.contains("req . header (\"Authorization\") . is_none ()"));
        assert!(code.contains("MissingHeader"));
    }

    #[test]
    fn inline_payloads_get_structs() {
        let code = generate("bottle");
        assert!(code.contains("pub struct CreateBottlePayload"));
        assert!(code.contains("pub payload : CreateBottlePayload"));
        assert!(code.contains("Kind :: Object"));
    }

    // === response tests ===

    #[test]
    fn bodyless_responses_send_status_only() {
        let code = generate("bottle");
        assert!(code.contains("pub fn not_found (& self , resp : & mut dyn blueprint_types :: ResponseSender)"));
        assert!(code.contains("resp . send (404u16 , None)"));
    }

    #[test]
    fn media_type_responses_take_a_view() {
        let code = generate("bottle");
        assert!(code.contains("body : & crate :: Bottle , view : crate :: BottleView"));
        assert!(code.contains("resp . send (200u16 , Some (body . dump (view) ?))"));
    }

    // === controller tests ===

    #[test]
    fn mount_registers_every_route() {
        let code = generate("bottle");
        assert!(code.contains("pub trait BottleController : Send + Sync"));
        assert!(code.contains("pub fn mount_bottle_controller < C : BottleController + 'static >"));
        assert!(code.contains("\"GET\" , \"/bottles/:id\""));
        assert!(code.contains("ShowBottleContext :: new (req) ?"));
    }

    #[test]
    fn href_uses_canonical_route() {
        let code = generate("bottle");
        assert!(code.contains("pub fn bottle_href (id : impl std :: fmt :: Display) -> String"));
        assert!(code.contains("\"/bottles/{}\""));
    }

    #[test]
    fn resource_modules_parse() {
        let api = make_api();
        let rt = runtime_path();
        let mut emitter = TypeEmitter::new(&api, &rt);
        let tokens = generate_resource(&mut emitter, api.resource("bottle").unwrap()).unwrap();
        assert!(syn::parse2::<syn::File>(tokens).is_ok());
    }

    #[test]
    fn failing_actions_name_themselves() {
        let mut api = make_api();
        if let Some(show) = api
            .resources
            .get_mut("bottle")
            .and_then(|r| r.actions.get_mut("show"))
        {
            show.responses.values_mut().for_each(|r| r.status = None);
        }
        let rt = runtime_path();
        let mut emitter = TypeEmitter::new(&api, &rt);
        let err = generate_resource(&mut emitter, api.resource("bottle").unwrap()).unwrap_err();
        assert!(err.to_string().contains("action \"show\""));
    }
}
