//! Type-directed emission shared by every generated file.
//!
//! Everything here is a recursive walk over [`DataType`]: the Rust type of
//! an attribute, the expression loading it from a dynamic value, the
//! expression dumping it back and the statements validating it. Inline
//! objects have no name in the design, so the walk emits a struct for each
//! one, named after its owner, and collects it in [`TypeEmitter::take_items`].

use std::mem;

use blueprint_define::media_type::DEFAULT_VIEW;
use blueprint_define::{ApiDefinition, AttributeDefinition, DataType};
use blueprint_types::{Primitive, Validation, Value};
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::Path;

use crate::errors::GeneratorError;
use crate::names::{NameAllocator, pascal_ident, pascal_name, snake_ident};

/// A struct field generated for an object member.
#[derive(Debug, Clone)]
pub struct Field {
    /// Member name in the design.
    pub name: String,
    pub ident: Ident,
    pub attribute: AttributeDefinition,
    /// Name given to the member type if it is an inline object.
    pub owner: String,
    /// Field type, without the `Option` of optional fields.
    pub ty: TokenStream,
    pub optional: bool,
}

/// Emits code for attributes of one API.
pub struct TypeEmitter<'a> {
    pub api: &'a ApiDefinition,
    pub rt: &'a Path,
    items: Vec<TokenStream>,
}

impl<'a> TypeEmitter<'a> {
    pub fn new(api: &'a ApiDefinition, rt: &'a Path) -> Self {
        Self {
            api,
            rt,
            items: Vec::new(),
        }
    }

    /// Structs emitted for inline objects since the last call.
    pub fn take_items(&mut self) -> Vec<TokenStream> {
        mem::take(&mut self.items)
    }

    /// Rust type of `attribute`. An inline object becomes a struct named
    /// `owner`.
    pub fn field_type(
        &mut self,
        attribute: &AttributeDefinition,
        owner: &str,
    ) -> Result<TokenStream, GeneratorError> {
        match &attribute.data_type {
            DataType::Primitive(p) => Ok(primitive_type(*p)),
            DataType::Array(element) => {
                let inner = self.field_type(element, owner)?;
                Ok(quote!(Vec<#inner>))
            }
            DataType::Object(_) => {
                let item = self.object_struct(owner, attribute, None)?;
                self.items.push(item);
                self.type_path(attribute, owner)
            }
            DataType::UserType(_) | DataType::MediaType(_) => self.type_path(attribute, owner),
        }
    }

    /// Path of the struct for an object or named type.
    pub fn type_path(
        &self,
        attribute: &AttributeDefinition,
        owner: &str,
    ) -> Result<TokenStream, GeneratorError> {
        match &attribute.data_type {
            DataType::Object(_) => {
                let ty = pascal_ident(owner)?;
                Ok(quote!(#ty))
            }
            DataType::UserType(name) | DataType::MediaType(name) => {
                let ty = pascal_ident(name)?;
                Ok(quote!(crate::#ty))
            }
            other => Err(GeneratorError::CodeGenError(format!(
                "{} has no struct",
                other.describe()
            ))),
        }
    }

    // === load ===

    /// Expression of type `Result<T, LoadError>` loading `src`, a
    /// `&Value`. Failed validations are reported under `name`.
    pub fn load_body(
        &self,
        attribute: &AttributeDefinition,
        owner: &str,
        name: &str,
        src: &Ident,
        names: &mut NameAllocator,
    ) -> Result<TokenStream, GeneratorError> {
        let rt = self.rt;
        let checks = self.checks(attribute);
        match &attribute.data_type {
            DataType::Primitive(p) => {
                let helper = coerce_helper(*p);
                if checks.is_empty() {
                    return Ok(quote!(#rt::coerce::#helper(#src)));
                }
                let variant = primitive_variant(*p);
                let raw = names.fresh("raw");
                Ok(quote! {{
                    let #raw = #rt::Primitive::#variant.load(#src)?;
                    #rt::validation::check_all(&[#(#checks),*], #name, &#raw)?;
                    #rt::coerce::#helper(&#raw)
                }})
            }
            DataType::Array(element) => {
                let loader = self.loader(element, owner, name, names)?;
                let call = quote!(#rt::coerce::elements(#src, #loader));
                if checks.is_empty() {
                    return Ok(call);
                }
                Ok(quote! {{
                    #rt::validation::check_all(
                        &[#(#checks),*],
                        #name,
                        &#rt::Value::Array(#rt::coerce::array(#src)?),
                    )?;
                    #call
                }})
            }
            DataType::Object(_) | DataType::UserType(_) | DataType::MediaType(_) => {
                let ty = self.type_path(attribute, owner)?;
                let call = quote!(#ty::load(#src));
                if checks.is_empty() {
                    return Ok(call);
                }
                Ok(quote! {{
                    #rt::validation::check_all(
                        &[#(#checks),*],
                        #name,
                        &#rt::Value::Object(#rt::coerce::object(#src)?),
                    )?;
                    #call
                }})
            }
        }
    }

    /// Something callable as `FnOnce(&Value) -> Result<T, LoadError>`: a
    /// plain function path when possible, a closure otherwise.
    pub fn loader(
        &self,
        attribute: &AttributeDefinition,
        owner: &str,
        name: &str,
        names: &mut NameAllocator,
    ) -> Result<TokenStream, GeneratorError> {
        let rt = self.rt;
        if self.checks(attribute).is_empty() {
            match &attribute.data_type {
                DataType::Primitive(p) => {
                    let helper = coerce_helper(*p);
                    return Ok(quote!(#rt::coerce::#helper));
                }
                DataType::Array(_) => {}
                _ => {
                    let ty = self.type_path(attribute, owner)?;
                    return Ok(quote!(#ty::load));
                }
            }
        }
        let value = names.fresh("value");
        let body = self.load_body(attribute, owner, name, &value, names)?;
        Ok(quote!(|#value: &#rt::Value| #body))
    }

    // === dump ===

    /// Expression of type `Value` dumping `expr`, a `&T`. May use `?` on
    /// a `DumpError`. `view` selects the view of nested media types.
    pub fn dump_expr(
        &self,
        attribute: &AttributeDefinition,
        expr: &TokenStream,
        view: Option<&str>,
        names: &mut NameAllocator,
    ) -> Result<TokenStream, GeneratorError> {
        if is_plain(attribute) {
            self.dump_value(attribute, expr, names)
        } else {
            let result = self.dump_result(attribute, expr, view, names)?;
            Ok(quote!(#result?))
        }
    }

    // Infallible dump of primitives and arrays of them.
    fn dump_value(
        &self,
        attribute: &AttributeDefinition,
        expr: &TokenStream,
        names: &mut NameAllocator,
    ) -> Result<TokenStream, GeneratorError> {
        let rt = self.rt;
        match &attribute.data_type {
            DataType::Primitive(Primitive::Null) => Ok(quote!(#rt::Value::Null)),
            DataType::Primitive(Primitive::String) => Ok(quote!(#rt::Value::from(#expr.as_str()))),
            DataType::Primitive(_) => Ok(quote!(#rt::Value::from(*#expr))),
            DataType::Array(element) => {
                let item = names.fresh("item");
                let inner = self.dump_value(element, &quote!(#item), names)?;
                Ok(quote!(#rt::Value::Array(#expr.iter().map(|#item| #inner).collect())))
            }
            other => Err(GeneratorError::CodeGenError(format!(
                "{} cannot be dumped without a view",
                other.describe()
            ))),
        }
    }

    // Expression of type `Result<Value, DumpError>`.
    fn dump_result(
        &self,
        attribute: &AttributeDefinition,
        expr: &TokenStream,
        view: Option<&str>,
        names: &mut NameAllocator,
    ) -> Result<TokenStream, GeneratorError> {
        let rt = self.rt;
        match &attribute.data_type {
            DataType::Primitive(_) => {
                let value = self.dump_value(attribute, expr, names)?;
                Ok(quote!(Ok::<_, #rt::DumpError>(#value)))
            }
            DataType::Array(element) => {
                let item = names.fresh("item");
                let inner = self.dump_result(element, &quote!(#item), view, names)?;
                Ok(quote! {
                    #expr.iter()
                        .map(|#item| #inner)
                        .collect::<Result<Vec<_>, _>>()
                        .map(#rt::Value::Array)
                })
            }
            DataType::Object(_) | DataType::UserType(_) => Ok(quote!(#expr.dump())),
            DataType::MediaType(name) => {
                let view = view.map(str::to_string).or_else(|| {
                    self.api
                        .find_media_type(name)
                        .filter(|mt| mt.views.contains_key(DEFAULT_VIEW))
                        .map(|_| DEFAULT_VIEW.to_string())
                });
                let view = match view {
                    Some(v) => quote!(Some(#v)),
                    None => quote!(None),
                };
                Ok(quote!(#expr.dump_view(#view)))
            }
        }
    }

    // === validate ===

    /// Statements checking `expr`, a `&T`, returning early with a
    /// `ValidationError`.
    pub fn validate_stmts(
        &self,
        attribute: &AttributeDefinition,
        name: &str,
        expr: &TokenStream,
        names: &mut NameAllocator,
    ) -> Result<TokenStream, GeneratorError> {
        let rt = self.rt;
        let mut stmts = TokenStream::new();
        let checks = self.checks(attribute);
        if !checks.is_empty() && is_plain(attribute) {
            let value = self.dump_value(attribute, expr, names)?;
            stmts.extend(quote! {
                #rt::validation::check_all(&[#(#checks),*], #name, &#value)?;
            });
        }
        match &attribute.data_type {
            DataType::Primitive(_) => {}
            DataType::Array(element) => {
                let item = names.fresh("item");
                let inner = self.validate_stmts(element, name, &quote!(#item), names)?;
                if !inner.is_empty() {
                    stmts.extend(quote! {
                        for #item in #expr.iter() {
                            #inner
                        }
                    });
                }
            }
            DataType::Object(_) | DataType::UserType(_) | DataType::MediaType(_) => {
                stmts.extend(quote!(#expr.validate()?;));
            }
        }
        Ok(stmts)
    }

    fn checks(&self, attribute: &AttributeDefinition) -> Vec<TokenStream> {
        attribute
            .validations
            .iter()
            .filter(|v| !matches!(v, Validation::Required(_)))
            .map(|v| validation_tokens(v, self.rt))
            .collect()
    }

    // === structs ===

    /// Fields of the struct generated for object `attribute` named
    /// `type_name`. Inline member objects are emitted along the way.
    pub fn object_fields(
        &mut self,
        type_name: &str,
        attribute: &AttributeDefinition,
    ) -> Result<Vec<Field>, GeneratorError> {
        let Some(members) = attribute.members() else {
            return Err(GeneratorError::CodeGenError(format!(
                "{type_name} is a {}, not an object",
                attribute.data_type.describe()
            )));
        };
        let mut fields = Vec::with_capacity(members.len());
        for (name, member) in members {
            let owner = format!("{}{}", pascal_name(type_name), pascal_name(name));
            let ty = self.field_type(member, &owner)?;
            fields.push(Field {
                name: name.clone(),
                ident: snake_ident(name)?,
                attribute: member.clone(),
                owner,
                ty,
                optional: !attribute.is_required(name) && member.default.is_none(),
            });
        }
        Ok(fields)
    }

    /// `pub struct` definition with one field per member.
    pub fn struct_definition(
        &self,
        type_name: &str,
        description: Option<&str>,
        fields: &[Field],
    ) -> Result<TokenStream, GeneratorError> {
        let ident = pascal_ident(type_name)?;
        let doc = description
            .map(str::to_string)
            .unwrap_or_else(|| format!("{type_name} type."));
        let field_defs = fields.iter().map(|f| {
            let Field { ident, ty, .. } = f;
            let doc = f.attribute.description.iter();
            let ty = if f.optional {
                quote!(Option<#ty>)
            } else {
                quote!(#ty)
            };
            quote! {
                #(#[doc = #doc])*
                pub #ident: #ty,
            }
        });
        Ok(quote! {
            #[doc = #doc]
            #[derive(Debug, Clone, PartialEq)]
            pub struct #ident {
                #(#field_defs)*
            }
        })
    }

    /// `load` for the struct generated for `attribute`.
    pub fn load_fn(
        &self,
        type_name: &str,
        attribute: &AttributeDefinition,
        fields: &[Field],
    ) -> Result<TokenStream, GeneratorError> {
        let rt = self.rt;
        let mut names = allocator_for(fields);
        let value = names.fresh("value");
        let doc = format!("Loads a {type_name} from a dynamic value.");
        if fields.is_empty() {
            return Ok(quote! {
                #[doc = #doc]
                pub fn load(#value: &#rt::Value) -> Result<Self, #rt::LoadError> {
                    #rt::coerce::object(#value)?;
                    Ok(Self {})
                }
            });
        }

        let object = names.fresh("object");
        let checks = self.checks(attribute);
        let object_checks = if checks.is_empty() {
            TokenStream::new()
        } else {
            quote! {
                #rt::validation::check_all(
                    &[#(#checks),*],
                    #type_name,
                    &#rt::Value::Object(#object.clone()),
                )?;
            }
        };

        let mut members = Vec::with_capacity(fields.len());
        for f in fields {
            let Field { ident, name, .. } = f;
            let default = match &f.attribute.default {
                Some(default) => {
                    let default = value_tokens(default, rt);
                    quote!(Some(#default))
                }
                None => quote!(None),
            };
            let loader = self.loader(&f.attribute, &f.owner, name, &mut names)?;
            members.push(quote! {
                let #ident = #rt::coerce::member(#value, &#object, #name, #default, #loader)?;
            });
        }
        let present = fields.iter().filter(|f| !f.optional).map(|f| {
            let Field { ident, name, .. } = f;
            quote! {
                let Some(#ident) = #ident else {
                    return Err(#rt::ValidationError::MissingMember {
                        name: #type_name.to_string(),
                        member: #name.to_string(),
                    }
                    .into());
                };
            }
        });
        let idents = fields.iter().map(|f| &f.ident);

        Ok(quote! {
            #[doc = #doc]
            pub fn load(#value: &#rt::Value) -> Result<Self, #rt::LoadError> {
                let #object = #rt::coerce::object(#value)?;
                #object_checks
                #(#members)*
                #(#present)*
                Ok(Self { #(#idents),* })
            }
        })
    }

    /// `dump` rendering every field.
    pub fn dump_fn(&self, fields: &[Field]) -> Result<TokenStream, GeneratorError> {
        let rt = self.rt;
        if fields.is_empty() {
            return Ok(quote! {
                pub fn dump(&self) -> Result<#rt::Value, #rt::DumpError> {
                    Ok(#rt::Value::Object(std::collections::BTreeMap::new()))
                }
            });
        }
        let mut names = allocator_for(fields);
        let object = names.fresh("object");
        let inserts = fields
            .iter()
            .map(|f| self.insert_stmt(&object, f, None, &mut names))
            .collect::<Result<Vec<_>, _>>()?;
        let idents = fields.iter().map(|f| &f.ident);
        Ok(quote! {
            pub fn dump(&self) -> Result<#rt::Value, #rt::DumpError> {
                let Self { #(#idents),* } = self;
                let mut #object = std::collections::BTreeMap::new();
                #(#inserts)*
                Ok(#rt::Value::Object(#object))
            }
        })
    }

    /// `object.insert(..)` for field `f`, skipped when an optional field is
    /// unset. The field must be bound by reference to its own name.
    pub fn insert_stmt(
        &self,
        object: &Ident,
        f: &Field,
        view: Option<&str>,
        names: &mut NameAllocator,
    ) -> Result<TokenStream, GeneratorError> {
        let Field { ident, name, .. } = f;
        let value = self.dump_expr(&f.attribute, &quote!(#ident), view, names)?;
        let insert = quote!(#object.insert(#name.to_string(), #value););
        Ok(if f.optional {
            quote! {
                if let Some(#ident) = #ident {
                    #insert
                }
            }
        } else {
            insert
        })
    }

    /// `validate` re-running every field validation.
    pub fn validate_fn(&self, fields: &[Field]) -> Result<TokenStream, GeneratorError> {
        let rt = self.rt;
        let mut names = allocator_for(fields);
        let mut used = Vec::new();
        let mut stmts = Vec::new();
        for f in fields {
            let Field { ident, name, .. } = f;
            let inner = self.validate_stmts(&f.attribute, name, &quote!(#ident), &mut names)?;
            if inner.is_empty() {
                continue;
            }
            used.push(ident);
            stmts.push(if f.optional {
                quote! {
                    if let Some(#ident) = #ident {
                        #inner
                    }
                }
            } else {
                inner
            });
        }
        let bind = if used.is_empty() {
            TokenStream::new()
        } else {
            quote!(let Self { #(#used,)* .. } = self;)
        };
        Ok(quote! {
            /// Checks every field against its validations.
            pub fn validate(&self) -> Result<(), #rt::ValidationError> {
                #bind
                #(#stmts)*
                Ok(())
            }
        })
    }

    /// Struct with `load`, `dump` and `validate` for an object attribute.
    pub fn object_struct(
        &mut self,
        type_name: &str,
        attribute: &AttributeDefinition,
        description: Option<&str>,
    ) -> Result<TokenStream, GeneratorError> {
        let fields = self.object_fields(type_name, attribute)?;
        let definition = self.struct_definition(
            type_name,
            description.or(attribute.description.as_deref()),
            &fields,
        )?;
        let load = self.load_fn(type_name, attribute, &fields)?;
        let dump = self.dump_fn(&fields)?;
        let validate = self.validate_fn(&fields)?;
        let ident = pascal_ident(type_name)?;
        Ok(quote! {
            #definition

            impl #ident {
                #load

                #dump

                #validate
            }
        })
    }
}

fn allocator_for(fields: &[Field]) -> NameAllocator {
    let mut names = NameAllocator::new();
    for f in fields {
        names.reserve(&f.ident.to_string());
    }
    names
}

/// Whether dumping `attribute` can never fail.
pub fn is_plain(attribute: &AttributeDefinition) -> bool {
    match &attribute.data_type {
        DataType::Primitive(_) => true,
        DataType::Array(element) => is_plain(element),
        _ => false,
    }
}

pub fn primitive_type(p: Primitive) -> TokenStream {
    match p {
        Primitive::Null => quote!(()),
        Primitive::Boolean => quote!(bool),
        Primitive::Integer => quote!(i64),
        Primitive::Number => quote!(f64),
        Primitive::String => quote!(String),
    }
}

fn primitive_variant(p: Primitive) -> Ident {
    let name = match p {
        Primitive::Null => "Null",
        Primitive::Boolean => "Boolean",
        Primitive::Integer => "Integer",
        Primitive::Number => "Number",
        Primitive::String => "String",
    };
    Ident::new(name, proc_macro2::Span::call_site())
}

fn coerce_helper(p: Primitive) -> Ident {
    let name = match p {
        Primitive::Null => "null",
        Primitive::Boolean => "boolean",
        Primitive::Integer => "integer",
        Primitive::Number => "number",
        Primitive::String => "string",
    };
    Ident::new(name, proc_macro2::Span::call_site())
}

/// Expression constructing `validation` at runtime.
pub fn validation_tokens(validation: &Validation, rt: &Path) -> TokenStream {
    match validation {
        Validation::Required(names) => quote!(#rt::Validation::required([#(#names),*])),
        Validation::Enum(values) => {
            let values = values.iter().map(|v| value_tokens(v, rt));
            quote!(#rt::Validation::Enum(vec![#(#values),*]))
        }
        Validation::Format(format) => {
            let variant = Ident::new(&format!("{format:?}"), proc_macro2::Span::call_site());
            quote!(#rt::Validation::Format(#rt::Format::#variant))
        }
        Validation::Minimum(min) => quote!(#rt::Validation::Minimum(#min)),
        Validation::Maximum(max) => quote!(#rt::Validation::Maximum(#max)),
        Validation::MinLength(min) => quote!(#rt::Validation::MinLength(#min)),
        Validation::MaxLength(max) => quote!(#rt::Validation::MaxLength(#max)),
    }
}

/// Expression constructing `value` at runtime.
pub fn value_tokens(value: &Value, rt: &Path) -> TokenStream {
    match value {
        Value::Null => quote!(#rt::Value::Null),
        Value::Bool(b) => quote!(#rt::Value::Bool(#b)),
        Value::Int(i) => quote!(#rt::Value::Int(#i)),
        Value::UInt(u) => quote!(#rt::Value::UInt(#u)),
        Value::Float(f) if f.is_finite() => quote!(#rt::Value::Float(#f)),
        // JSON has no representation for these either.
        Value::Float(_) => quote!(#rt::Value::Null),
        Value::String(s) => quote!(#rt::Value::String(#s.to_string())),
        Value::Time(_) => {
            let s = value.to_literal();
            quote!(#rt::Value::String(#s.to_string()))
        }
        Value::Array(items) => {
            let items = items.iter().map(|v| value_tokens(v, rt));
            quote!(#rt::Value::Array(vec![#(#items),*]))
        }
        Value::Object(map) if map.is_empty() => {
            quote!(#rt::Value::Object(std::collections::BTreeMap::new()))
        }
        Value::Object(map) => {
            let entries = map.iter().map(|(k, v)| {
                let v = value_tokens(v, rt);
                quote!((#k, #v))
            });
            quote!(#rt::Value::object([#(#entries),*]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{make_api, runtime_path};
    use blueprint_types::Format;

    fn render(tokens: &TokenStream) -> String {
        tokens.to_string()
    }

    // === field_type tests ===

    #[test]
    fn primitive_and_array_types() {
        let api = make_api();
        let rt = runtime_path();
        let mut emitter = TypeEmitter::new(&api, &rt);
        let ty = emitter
            .field_type(&DataType::array(Primitive::Integer).into(), "Unused")
            .unwrap();
        assert_eq!(render(&ty), "Vec < i64 >");
        assert!(emitter.take_items().is_empty());
    }

    #[test]
    fn named_types_live_at_the_crate_root() {
        let api = make_api();
        let rt = runtime_path();
        let mut emitter = TypeEmitter::new(&api, &rt);
        let ty = emitter
            .field_type(&DataType::media_type("Bottle").into(), "Unused")
            .unwrap();
        assert_eq!(render(&ty), "crate :: Bottle");
    }

    #[test]
    fn inline_objects_become_owner_named_structs() {
        let api = make_api();
        let rt = runtime_path();
        let mut emitter = TypeEmitter::new(&api, &rt);
        let mut origin = AttributeDefinition::default();
        origin.add_member("country", Primitive::String.into());
        let ty = emitter.field_type(&origin, "BottleOrigin").unwrap();
        assert_eq!(render(&ty), "BottleOrigin");
        let items = emitter.take_items();
        assert_eq!(items.len(), 1);
        assert!(render(&items[0]).contains("pub struct BottleOrigin"));
    }

    // === load tests ===

    #[test]
    fn simple_loaders_are_function_paths() {
        let api = make_api();
        let rt = runtime_path();
        let emitter = TypeEmitter::new(&api, &rt);
        let mut names = NameAllocator::new();
        let loader = emitter
            .loader(&Primitive::Integer.into(), "X", "id", &mut names)
            .unwrap();
        assert_eq!(render(&loader), "blueprint_types :: coerce :: integer");
    }

    #[test]
    fn validated_loaders_check_the_coerced_value() {
        let api = make_api();
        let rt = runtime_path();
        let emitter = TypeEmitter::new(&api, &rt);
        let mut names = NameAllocator::new();
        let mut rating = AttributeDefinition::from(Primitive::Integer);
        rating.validations.push(Validation::Minimum(1));
        let loader = emitter.loader(&rating, "X", "rating", &mut names).unwrap();
        let code = render(&loader);
        assert!(code.contains("Primitive :: Integer . load (value)"));
        assert!(code.contains("check_all"));
        assert!(code.contains("\"rating\""));
    }

    #[test]
    fn nested_arrays_use_distinct_temporaries() {
        let api = make_api();
        let rt = runtime_path();
        let emitter = TypeEmitter::new(&api, &rt);
        let mut names = NameAllocator::new();
        let mut inner = AttributeDefinition::from(Primitive::String);
        inner.validations.push(Validation::Format(Format::Email));
        let mut middle = AttributeDefinition::new(DataType::array(inner));
        middle.validations.push(Validation::MinLength(1));
        let outer = AttributeDefinition::new(DataType::array(middle));
        let code = render(&emitter.loader(&outer, "X", "emails", &mut names).unwrap());
        assert!(code.contains("| value :"));
        assert!(code.contains("| value_1 :"));
        assert!(code.contains("Format :: Email"));
    }

    // === dump tests ===

    #[test]
    fn plain_dumps_do_not_propagate_errors() {
        let api = make_api();
        let rt = runtime_path();
        let emitter = TypeEmitter::new(&api, &rt);
        let mut names = NameAllocator::new();
        let code = render(
            &emitter
                .dump_expr(&DataType::array(Primitive::String).into(), &quote!(tags), None, &mut names)
                .unwrap(),
        );
        assert!(!code.contains('?'));
        assert!(code.contains("as_str"));
    }

    #[test]
    fn media_type_dumps_pick_default_view() {
        let api = make_api();
        let rt = runtime_path();
        let emitter = TypeEmitter::new(&api, &rt);
        let mut names = NameAllocator::new();
        let attribute = DataType::media_type("Bottle").into();
        let code = render(&emitter.dump_expr(&attribute, &quote!(bottle), None, &mut names).unwrap());
        assert_eq!(code, "bottle . dump_view (Some (\"default\")) ?");
        let code = render(
            &emitter
                .dump_expr(&attribute, &quote!(bottle), Some("tiny"), &mut names)
                .unwrap(),
        );
        assert!(code.contains("Some (\"tiny\")"));
    }

    // === value_tokens tests ===

    #[test]
    fn value_literals() {
        let rt = runtime_path();
        assert_eq!(
            render(&value_tokens(&Value::from("x"), &rt)),
            "blueprint_types :: Value :: String (\"x\" . to_string ())"
        );
        assert_eq!(
            render(&value_tokens(&Value::Int(3), &rt)),
            "blueprint_types :: Value :: Int (3i64)"
        );
        assert!(render(&value_tokens(&Value::Object(Default::default()), &rt)).contains("BTreeMap :: new"));
    }

    // === struct tests ===

    #[test]
    fn optional_fields_are_options() {
        let api = make_api();
        let rt = runtime_path();
        let mut emitter = TypeEmitter::new(&api, &rt);
        let mut attribute = AttributeDefinition::default();
        attribute.add_member("id", Primitive::Integer.into());
        attribute.add_member("note", Primitive::String.into());
        let mut page = AttributeDefinition::from(Primitive::Integer);
        page.default = Some(Value::from(1));
        attribute.add_member("page", page);
        attribute.required.push("id".into());
        let code = render(&emitter.object_struct("Query", &attribute, None).unwrap());
        assert!(code.contains("pub id : i64"));
        assert!(code.contains("pub note : Option < String >"));
        assert!(code.contains("pub page : i64"));
        assert!(code.contains("MissingMember"));
    }

    #[test]
    fn structs_parse_as_rust() {
        let api = make_api();
        let rt = runtime_path();
        let mut emitter = TypeEmitter::new(&api, &rt);
        let bottle = api.media_type("Bottle").unwrap();
        let tokens = emitter.object_struct("BottleCopy", &bottle.attribute, None).unwrap();
        assert!(syn::parse2::<syn::File>(tokens).is_ok());
    }
}
