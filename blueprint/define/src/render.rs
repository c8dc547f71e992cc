//! Rendering values through media type views.
//!
//! The interpreted counterpart of the generated `dump` methods.

use std::collections::BTreeMap;

use blueprint_types::schema::{decode_array, decode_object};
use blueprint_types::{DumpError, IncompatibleValue, Kind, Value};

use crate::api::ApiDefinition;
use crate::attribute::{AttributeDefinition, DataType};
use crate::media_type::{DEFAULT_VIEW, MediaTypeDefinition};

/// Renders `value` as media type `media_type` using `view`.
///
/// Without a view name the media type must have exactly one view. Only
/// the members listed by the view are rendered; members that are media
/// types themselves use the view named by the view entry, else their
/// `default` view. Links listed by the view are rendered under `links`.
///
/// ## Errors
///
/// - [`DumpError::ViewRequired`] when `view` is `None` and there are
///   several views
/// - [`DumpError::UnknownView`] when `view` names no view of the type
/// - [`DumpError::Incompatible`] when `value` does not fit the type
pub fn render(
    api: &ApiDefinition,
    media_type: &MediaTypeDefinition,
    value: &Value,
    view: Option<&str>,
) -> Result<Value, DumpError> {
    let view = media_type.select_view(view)?;
    let object = decode_object(value).map_err(|source| incompatible(media_type, source))?;

    let mut rendered = BTreeMap::new();
    for entry in &view.members {
        let (Some(item), Some(member)) = (object.get(&entry.name), media_type.attribute.member(&entry.name))
        else {
            continue;
        };
        let item = render_attribute(api, media_type, member, item, entry.view.as_deref())?;
        rendered.insert(entry.name.clone(), item);
    }

    let mut links = BTreeMap::new();
    for name in &view.links {
        let Some(link) = media_type.links.get(name) else {
            continue;
        };
        let (Some(item), Some(member)) = (object.get(&link.name), media_type.attribute.member(&link.name))
        else {
            continue;
        };
        let item = render_attribute(api, media_type, member, item, Some(&link.view))?;
        links.insert(link.name.clone(), item);
    }
    if !links.is_empty() {
        rendered.insert("links".to_string(), Value::Object(links));
    }

    Ok(Value::Object(rendered))
}

fn render_attribute(
    api: &ApiDefinition,
    owner: &MediaTypeDefinition,
    attribute: &AttributeDefinition,
    value: &Value,
    view: Option<&str>,
) -> Result<Value, DumpError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    match &attribute.data_type {
        DataType::Primitive(_) => Ok(value.clone()),
        DataType::Array(element) => {
            let items = decode_array(value).map_err(|source| incompatible(owner, source))?;
            items
                .iter()
                .map(|item| render_attribute(api, owner, element, item, view))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        DataType::Object(members) => {
            let object = decode_object(value).map_err(|source| incompatible(owner, source))?;
            let mut rendered = BTreeMap::new();
            for (name, item) in &object {
                if let Some(member) = members.get(name) {
                    rendered.insert(name.clone(), render_attribute(api, owner, member, item, None)?);
                }
            }
            Ok(Value::Object(rendered))
        }
        DataType::UserType(name) => match api.user_type(name) {
            Some(ut) => render_attribute(api, owner, &ut.attribute, value, view),
            None => Err(unknown_type(owner, value, name)),
        },
        DataType::MediaType(name) => {
            let Some(nested) = api.find_media_type(name) else {
                return Err(unknown_type(owner, value, name));
            };
            let view = view.or_else(|| nested.views.contains_key(DEFAULT_VIEW).then_some(DEFAULT_VIEW));
            render(api, nested, value, view)
        }
    }
}

fn incompatible(media_type: &MediaTypeDefinition, source: IncompatibleValue) -> DumpError {
    DumpError::Incompatible {
        media_type: media_type.name.clone(),
        source,
    }
}

fn unknown_type(media_type: &MediaTypeDefinition, value: &Value, name: &str) -> DumpError {
    incompatible(
        media_type,
        IncompatibleValue::with_detail(value.clone(), Kind::Object, format!("unknown type {name}")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::load_attribute;
    use crate::media_type::{LinkDefinition, ViewDefinition, ViewMember};
    use blueprint_types::Primitive;
    use proptest::prelude::*;

    fn view(name: &str, members: &[&str], links: &[&str]) -> ViewDefinition {
        ViewDefinition {
            name: name.to_string(),
            members: members.iter().map(|m| ViewMember::parse(m)).collect(),
            links: links.iter().map(|l| l.to_string()).collect(),
        }
    }

    fn make_api() -> ApiDefinition {
        let mut api = ApiDefinition::new("cellar");

        let mut account = MediaTypeDefinition::new("Account", "application/vnd.account+json");
        account.attribute.add_member("id", Primitive::Integer.into());
        account.attribute.add_member("name", Primitive::String.into());
        account.attribute.add_member("href", Primitive::String.into());
        account.views.insert("default".into(), view("default", &["id", "name", "href"], &[]));
        account.views.insert("tiny".into(), view("tiny", &["id", "name"], &[]));
        account.views.insert("link".into(), view("link", &["href"], &[]));
        api.media_types.insert("Account".into(), account);

        let mut bottle = MediaTypeDefinition::new("Bottle", "application/vnd.bottle+json");
        bottle.attribute.add_member("id", Primitive::Integer.into());
        bottle.attribute.add_member("name", Primitive::String.into());
        bottle.attribute.add_member("vintage", Primitive::Integer.into());
        bottle.attribute.add_member("account", DataType::media_type("Account").into());
        bottle.links.insert(
            "account".into(),
            LinkDefinition {
                name: "account".into(),
                view: "link".into(),
            },
        );
        bottle.views.insert(
            "default".into(),
            view("default", &["id", "name", "vintage", "account:tiny"], &["account"]),
        );
        bottle.views.insert("tiny".into(), view("tiny", &["id", "name"], &[]));
        api.media_types.insert("Bottle".into(), bottle);
        api
    }

    fn make_bottle() -> Value {
        Value::object([
            ("id", Value::from(1)),
            ("name", Value::from("Number 8")),
            ("vintage", Value::from(2012)),
            (
                "account",
                Value::object([
                    ("id", Value::from(7)),
                    ("name", Value::from("cellar")),
                    ("href", Value::from("/accounts/7")),
                ]),
            ),
        ])
    }

    #[test]
    fn view_is_required_with_several_views() {
        let api = make_api();
        let err = render(&api, &api.media_types["Bottle"], &make_bottle(), None).unwrap_err();
        assert!(err.is_view_required());
    }

    #[test]
    fn tiny_renders_only_its_members() {
        let api = make_api();
        let rendered = render(&api, &api.media_types["Bottle"], &make_bottle(), Some("tiny")).unwrap();
        assert_eq!(
            rendered,
            Value::object([("id", Value::from(1)), ("name", Value::from("Number 8"))])
        );
    }

    #[test]
    fn nested_views_and_links() {
        let api = make_api();
        let rendered = render(&api, &api.media_types["Bottle"], &make_bottle(), Some("default")).unwrap();
        assert_eq!(
            rendered.get("account"),
            Some(&Value::object([("id", Value::from(7)), ("name", Value::from("cellar"))]))
        );
        assert_eq!(
            rendered.get("links"),
            Some(&Value::object([(
                "account",
                Value::object([("href", "/accounts/7")])
            )]))
        );
    }

    #[test]
    fn unknown_view() {
        let api = make_api();
        let err = render(&api, &api.media_types["Bottle"], &make_bottle(), Some("full")).unwrap_err();
        assert!(matches!(err, DumpError::UnknownView { ref view, .. } if view == "full"));
    }

    #[test]
    fn incompatible_value() {
        let api = make_api();
        let err = render(&api, &api.media_types["Bottle"], &Value::from(3), Some("tiny")).unwrap_err();
        assert!(matches!(err, DumpError::Incompatible { ref media_type, .. } if media_type == "Bottle"));
    }

    #[test]
    fn null_members_pass_through() {
        let api = make_api();
        let value = Value::object([("id", Value::from(1)), ("account", Value::Null)]);
        let rendered = render(&api, &api.media_types["Bottle"], &value, Some("default")).unwrap();
        assert_eq!(rendered.get("account"), Some(&Value::Null));
    }

    fn make_wine() -> (ApiDefinition, MediaTypeDefinition) {
        let mut wine = MediaTypeDefinition::new("Wine", "application/vnd.wine+json");
        wine.attribute.add_member("id", Primitive::Integer.into());
        wine.attribute.add_member("name", Primitive::String.into());
        wine.attribute.add_member("rating", Primitive::Number.into());
        wine.attribute.add_member("tags", DataType::array(Primitive::String).into());
        wine.views.insert("default".into(), wine.implicit_default_view());
        (ApiDefinition::new("cellar"), wine)
    }

    proptest! {
        #[test]
        fn load_after_render_is_identity(
            id in any::<i64>(),
            name in ".*",
            rating in -1.0e6f64..1.0e6,
            tags in proptest::collection::vec("[a-z]{1,8}", 0..4),
        ) {
            let (api, wine) = make_wine();
            let value = Value::object([
                ("id", Value::from(id)),
                ("name", Value::from(name)),
                ("rating", Value::Float(rating)),
                ("tags", Value::from(tags)),
            ]);
            let rendered = render(&api, &wine, &value, None).unwrap();
            let loaded = load_attribute(&api, "wine", &wine.attribute, &rendered).unwrap();
            prop_assert_eq!(loaded, value);
        }
    }
}
