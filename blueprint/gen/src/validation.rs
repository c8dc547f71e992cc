//! Pre-generation checks for identifier collisions.
//!
//! Design names are free-form; generated identifiers are their snake or
//! Pascal case forms. Two distinct names may map to the same identifier
//! (`accountID` and `account_id`), which would only surface as a compile
//! error in the generated crate. These checks catch that before anything
//! is written.
//!
//! ## Validation Checks
//!
//! - **Crate types**: user types, media types, view enums, inline object
//!   structs, contexts and controllers share one namespace
//! - **Fields**: members of one object, parameters of one action
//! - **Methods**: actions of one resource, responses of one action, view
//!   renderers of one media type next to its fixed items
//! - **Modules**: resource modules and the fixed type modules

use std::collections::BTreeMap;

use blueprint_define::{ApiDefinition, AttributeDefinition, DataType};

use crate::codegen::media_types::{view_enum_name, view_fn_name};
use crate::codegen::resources::{context_name, controller_name, module_name};
use crate::codegen::{MEDIA_TYPES_MODULE, USER_TYPES_MODULE};
use crate::errors::GeneratorError;
use crate::names::{pascal_name, snake_name};

// Items every generated media type impl defines besides its view methods.
const MEDIA_TYPE_ITEMS: [&str; 5] = ["IDENTIFIER", "load", "dump", "dump_view", "validate"];

// Identifiers already taken in one scope, mapped to the name that took them.
struct Namespace {
    scope: String,
    seen: BTreeMap<String, String>,
}

impl Namespace {
    fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            seen: BTreeMap::new(),
        }
    }

    fn insert(&mut self, ident: String, name: &str) -> Result<(), GeneratorError> {
        match self.seen.get(&ident) {
            Some(first) => Err(GeneratorError::NamingCollision {
                scope: self.scope.clone(),
                first: first.clone(),
                second: name.to_string(),
                ident,
            }),
            None => {
                self.seen.insert(ident, name.to_string());
                Ok(())
            }
        }
    }
}

/// Checks that every generated identifier is unique in its scope.
///
/// ## Errors
///
/// Returns `GeneratorError::NamingCollision` naming both design names for
/// the first collision found.
///
/// ## Examples
///
/// ```
/// use blueprint_define::{ApiDefinition, ResourceDefinition};
/// use blueprint_gen::validation::check_naming_collisions;
///
/// let mut api = ApiDefinition::new("cellar");
/// api.resources.insert("bottle".into(), ResourceDefinition::new("bottle"));
/// assert!(check_naming_collisions(&api).is_ok());
///
/// api.resources.insert("Bottle".into(), ResourceDefinition::new("Bottle"));
/// assert!(check_naming_collisions(&api).is_err());
/// ```
pub fn check_naming_collisions(api: &ApiDefinition) -> Result<(), GeneratorError> {
    let mut types = Namespace::new("crate types");
    let mut modules = Namespace::new("crate modules");
    modules.insert(MEDIA_TYPES_MODULE.to_string(), "media types")?;
    modules.insert(USER_TYPES_MODULE.to_string(), "user types")?;
    modules.insert("lib".to_string(), "lib.rs")?;

    for user_type in api.user_types.values() {
        let name = &user_type.name;
        types.insert(pascal_name(name), name)?;
        if user_type.attribute.data_type.is_object() {
            check_object(&mut types, name, &user_type.attribute)?;
        } else {
            check_nested(&mut types, &format!("{}Item", pascal_name(name)), &user_type.attribute)?;
        }
    }

    for media_type in api.media_types.values() {
        let name = &media_type.name;
        types.insert(pascal_name(name), name)?;
        let multiple = media_type.has_multiple_views();
        if multiple {
            types.insert(view_enum_name(name), &format!("views of {name}"))?;
        }
        let mut methods = Namespace::new(format!("media type \"{name}\" methods"));
        for fixed in MEDIA_TYPE_ITEMS {
            methods.insert(fixed.to_string(), fixed)?;
        }
        let mut views = Namespace::new(format!("media type \"{name}\" views"));
        for view in media_type.views.keys() {
            methods.insert(view_fn_name(view), view)?;
            if multiple {
                views.insert(pascal_name(view), view)?;
            }
        }
        check_object(&mut types, name, &media_type.attribute)?;
    }

    for resource in api.resources.values() {
        modules.insert(module_name(resource), &resource.name)?;
        types.insert(controller_name(resource), &format!("controller of {}", resource.name))?;

        let mut actions = Namespace::new(format!("resource \"{}\" actions", resource.name));
        for action in resource.actions.values() {
            actions.insert(snake_name(&action.name), &action.name)?;
            let context = context_name(resource, action);
            types.insert(context.clone(), &format!("{} {}", resource.name, action.name))?;
            let prefix = context.trim_end_matches("Context").to_string();

            let scope = format!("resource \"{}\" action \"{}\"", resource.name, action.name);
            let mut fields = Namespace::new(format!("{scope} params"));
            if let Some(params) = &action.params {
                for (name, param) in params.members().into_iter().flatten() {
                    fields.insert(snake_name(name), name)?;
                    check_nested(&mut types, &format!("{prefix}{}", pascal_name(name)), param)?;
                }
            }
            if let Some(payload) = &action.payload {
                fields.insert("payload".to_string(), "payload")?;
                check_nested(&mut types, &format!("{prefix}Payload"), payload)?;
            }

            let mut senders = Namespace::new(format!("{scope} responses"));
            senders.insert("new".to_string(), "constructor")?;
            for response in action.responses.keys() {
                senders.insert(snake_name(response), response)?;
            }
        }
    }

    Ok(())
}

// Members of an object type and the inline structs they generate.
fn check_object(
    types: &mut Namespace,
    type_name: &str,
    attribute: &AttributeDefinition,
) -> Result<(), GeneratorError> {
    let mut fields = Namespace::new(format!("type \"{type_name}\" members"));
    for (name, member) in attribute.members().into_iter().flatten() {
        fields.insert(snake_name(name), name)?;
        check_nested(types, &format!("{}{}", pascal_name(type_name), pascal_name(name)), member)?;
    }
    Ok(())
}

// Inline objects become structs named `owner`.
fn check_nested(
    types: &mut Namespace,
    owner: &str,
    attribute: &AttributeDefinition,
) -> Result<(), GeneratorError> {
    match &attribute.data_type {
        DataType::Object(_) => {
            types.insert(pascal_name(owner), owner)?;
            check_object(types, owner, attribute)
        }
        DataType::Array(element) => check_nested(types, owner, element),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::make_api;
    use blueprint_define::{ActionDefinition, MediaTypeDefinition, ResourceDefinition, UserTypeDefinition};
    use blueprint_types::Primitive;

    fn collision(api: &ApiDefinition) -> (String, String) {
        match check_naming_collisions(api) {
            Err(GeneratorError::NamingCollision { scope, ident, .. }) => (scope, ident),
            other => panic!("expected a naming collision, got {other:?}"),
        }
    }

    #[test]
    fn fixture_design_has_no_collisions() {
        assert!(check_naming_collisions(&make_api()).is_ok());
    }

    #[test]
    fn params_differing_only_in_case() {
        let mut api = make_api();
        let show = api
            .resources
            .get_mut("bottle")
            .and_then(|r| r.actions.get_mut("show"))
            .unwrap();
        show.params
            .get_or_insert_with(AttributeDefinition::default)
            .add_member("ID", Primitive::Integer.into());
        let (scope, ident) = collision(&api);
        assert!(scope.contains("action \"show\" params"));
        assert_eq!(ident, "id");
    }

    #[test]
    fn user_type_shadowing_a_media_type() {
        let mut api = make_api();
        let mut attribute = AttributeDefinition::default();
        attribute.add_member("id", Primitive::Integer.into());
        api.user_types
            .insert("bottle".into(), UserTypeDefinition::new("bottle", attribute));
        let (scope, ident) = collision(&api);
        assert_eq!(scope, "crate types");
        assert_eq!(ident, "Bottle");
    }

    #[test]
    fn inline_struct_shadowing_a_named_type() {
        let mut api = make_api();
        let mut origin = AttributeDefinition::default();
        origin.add_member("country", Primitive::String.into());
        let mut bottle_origin = MediaTypeDefinition::new("BottleOrigin", "application/vnd.origin+json");
        bottle_origin.attribute = origin.clone();
        api.media_types.insert("BottleOrigin".into(), bottle_origin);
        if let Some(bottle) = api.media_types.get_mut("Bottle") {
            bottle.attribute.add_member("origin", origin);
        }
        let (_, ident) = collision(&api);
        assert_eq!(ident, "BottleOrigin");
    }

    #[test]
    fn view_method_shadowing_a_fixed_method() {
        let mut api = make_api();
        if let Some(page) = api.media_types.get_mut("BottlePage")
            && let Some(mut view) = page.views.remove("default")
        {
            view.name = "view".to_string();
            page.views.insert("view".into(), view);
        }
        let (scope, ident) = collision(&api);
        assert_eq!(scope, "media type \"BottlePage\" methods");
        assert_eq!(ident, "dump_view");
    }

    #[test]
    fn resource_named_like_a_type_module() {
        let mut api = make_api();
        api.resources
            .insert("media_types".into(), ResourceDefinition::new("media_types"));
        let (scope, ident) = collision(&api);
        assert_eq!(scope, "crate modules");
        assert_eq!(ident, "media_types");
    }

    #[test]
    fn response_named_new() {
        let mut api = make_api();
        let mut action = ActionDefinition::new("ping");
        action
            .responses
            .insert("New".into(), blueprint_define::ResponseDefinition::new("New").with_status(200));
        if let Some(bottle) = api.resources.get_mut("bottle") {
            bottle.actions.insert("ping".into(), action);
        }
        let (scope, ident) = collision(&api);
        assert!(scope.ends_with("responses"));
        assert_eq!(ident, "new");
    }
}
