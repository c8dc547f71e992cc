//! Loading dynamic values against attribute definitions.
//!
//! This is the interpreted counterpart of the code `blueprint-gen` emits:
//! the same coercion, defaulting and validation rules applied to a
//! [`Value`] directly, without compiling anything.

use std::collections::BTreeMap;

use blueprint_types::schema::{decode_array, decode_object};
use blueprint_types::validation::check_all;
use blueprint_types::{
    FieldError, IncompatibleValue, Kind, LoadError, RequestAccessor, RequestErrors, Value,
};
use tracing::trace;

use crate::action::ActionDefinition;
use crate::api::ApiDefinition;
use crate::attribute::{AttributeDefinition, DataType};
use crate::resource::ResourceDefinition;

/// Loads `value` into the type of `attribute`, then runs its validations.
///
/// Object members missing from the input fall back to their default;
/// undeclared keys are dropped. Only the first failing member is reported.
///
/// ## Examples
///
/// ```
/// use blueprint_define::load::load_attribute;
/// use blueprint_define::{ApiDefinition, AttributeDefinition, DataType};
/// use blueprint_types::{Primitive, Value};
///
/// let api = ApiDefinition::default();
/// let ids = AttributeDefinition::new(DataType::array(Primitive::Integer));
/// let loaded = load_attribute(&api, "ids", &ids, &Value::from("[1, 2]")).unwrap();
/// assert_eq!(loaded, Value::from(vec![1, 2]));
/// ```
pub fn load_attribute(
    api: &ApiDefinition,
    name: &str,
    attribute: &AttributeDefinition,
    value: &Value,
) -> Result<Value, LoadError> {
    let loaded = match &attribute.data_type {
        DataType::Primitive(p) => p.load(value)?,
        DataType::Array(element) => {
            let items = decode_array(value)?;
            let mut loaded = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let item = load_attribute(api, name, element, item).map_err(|e| e.at_index(value, i))?;
                loaded.push(item);
            }
            Value::Array(loaded)
        }
        DataType::Object(members) => load_members(api, members, value)?,
        DataType::UserType(type_name) | DataType::MediaType(type_name) => {
            let Some(named) = api.named_attribute(type_name) else {
                return Err(IncompatibleValue::with_detail(
                    value.clone(),
                    Kind::Object,
                    format!("unknown type {type_name}"),
                )
                .into());
            };
            load_attribute(api, name, named, value)?
        }
    };
    check_all(&attribute.all_validations(), name, &loaded)?;
    Ok(loaded)
}

fn load_members(
    api: &ApiDefinition,
    members: &BTreeMap<String, AttributeDefinition>,
    value: &Value,
) -> Result<Value, LoadError> {
    let raw = decode_object(value)?;
    let mut loaded = BTreeMap::new();
    for (name, member) in members {
        let Some(item) = raw.get(name).or(member.default.as_ref()) else {
            continue;
        };
        let item = load_attribute(api, name, member, item).map_err(|e| e.in_member(value, name))?;
        loaded.insert(name.clone(), item);
    }
    for key in raw.keys().filter(|k| !members.contains_key(*k)) {
        trace!(key = %key, "dropping undeclared object key");
    }
    Ok(Value::Object(loaded))
}

/// Parameters and payload of a request bound to an action.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundAction {
    /// Loaded parameters; absent optional parameters are left out.
    pub params: BTreeMap<String, Value>,
    pub payload: Option<Value>,
}

/// Binds a request to `action` the way a generated context constructor
/// does.
///
/// Checks required headers, checks presence of required parameters
/// (except route wildcards, which the router guarantees), loads every
/// parameter and the payload. Every field is attempted even after one
/// fails.
///
/// ## Errors
///
/// Returns one [`FieldError`] per failing field.
pub fn bind_action(
    api: &ApiDefinition,
    resource: &ResourceDefinition,
    action: &ActionDefinition,
    req: &dyn RequestAccessor,
) -> Result<BoundAction, RequestErrors> {
    let mut errors = RequestErrors::new();
    let mut bound = BoundAction::default();

    for name in action.required_headers() {
        if req.header(name).is_none() {
            errors.push(FieldError::MissingHeader {
                name: name.to_string(),
            });
        }
    }

    if let Some(params) = &action.params {
        for (name, param) in params.members().into_iter().flatten() {
            let raw = if is_array(api, param) {
                req.get_many(name)
                    .map(|values| Value::Array(values.into_iter().map(Value::from).collect()))
            } else {
                req.get(name).map(Value::from)
            };
            let Some(raw) = raw.or_else(|| param.default.clone()) else {
                if params.is_required(name) && !api.is_path_param(resource, action, name) {
                    errors.push(FieldError::MissingParam { name: name.clone() });
                }
                continue;
            };
            match load_attribute(api, name, param, &raw) {
                Ok(value) => {
                    bound.params.insert(name.clone(), value);
                }
                Err(source) => errors.push(FieldError::InvalidParam {
                    name: name.clone(),
                    source,
                }),
            }
        }
    }

    if let Some(payload) = &action.payload {
        match req.payload() {
            Some(raw) => match load_attribute(api, "payload", payload, &raw) {
                Ok(value) => bound.payload = Some(value),
                Err(e) => errors.push(FieldError::InvalidPayload(e)),
            },
            None => errors.push(FieldError::InvalidPayload(
                IncompatibleValue::with_detail(
                    Value::Null,
                    expected_kind(api, payload),
                    "payload is required",
                )
                .into(),
            )),
        }
    }

    errors.into_result(bound)
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
        DataType::UserType(name) => match api.user_type(name).map(|ut| &ut.attribute.data_type) {
            Some(DataType::Primitive(p)) => p.kind(),
            Some(DataType::Array(_)) => Kind::Array,
            _ => Kind::Object,
        },
    }
}
