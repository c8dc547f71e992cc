//! Finalization: the only pass allowed to change already-built definitions.
//!
//! Runs on a valid tree and:
//!
//! - merges base type members into user types and media types that
//!   reference one, then refreshes implicit default views
//! - resolves media types given by identifier to their names
//! - fills unset response fields from same-named resource, API and
//!   built-in responses, in that order
//! - declares a parameter for every route wildcard lacking one
//!
//! Every step only fills what is missing, so finalizing twice changes
//! nothing.

use std::collections::BTreeMap;

use blueprint_types::Primitive;
use tracing::{debug, info, instrument};

use crate::api::ApiDefinition;
use crate::attribute::AttributeDefinition;
use crate::media_type::DEFAULT_VIEW;
use crate::response::builtin_response;
use crate::route::extract_wildcards;

/// Finalizes a validated design in place.
#[instrument(skip_all, fields(api = %api.name))]
pub fn finalize_api(api: &mut ApiDefinition) {
    let inherited = inherit_base_types(api);
    let refreshed = refresh_implicit_views(api);
    let resolved = resolve_media_type_identifiers(api);
    let merged = merge_responses(api);
    let synthesized = synthesize_wildcard_params(api);
    info!(
        inherited,
        refreshed, resolved, merged, synthesized, "design finalized"
    );
}

fn inherit_base_types(api: &mut ApiDefinition) -> usize {
    let mut count = 0;
    // Chains of base types need one round per link.
    loop {
        let mut changed = false;
        let user_types: Vec<(String, String)> = api
            .user_types
            .values()
            .filter_map(|ut| Some((ut.name.clone(), ut.attribute.base_type.clone()?)))
            .collect();
        for (name, base) in user_types {
            let Some(base) = api.named_attribute(&base).cloned() else {
                continue;
            };
            if let Some(ut) = api.user_types.get_mut(&name)
                && ut.attribute.inherit(&base)
            {
                debug!(user_type = %name, "inherited base type members");
                changed = true;
                count += 1;
            }
        }
        let media_types: Vec<(String, String)> = api
            .media_types
            .values()
            .filter_map(|mt| Some((mt.name.clone(), mt.attribute.base_type.clone()?)))
            .collect();
        for (name, base) in media_types {
            let Some(base) = api.named_attribute(&base).cloned() else {
                continue;
            };
            if let Some(mt) = api.media_types.get_mut(&name)
                && mt.attribute.inherit(&base)
            {
                debug!(media_type = %name, "inherited base type members");
                changed = true;
                count += 1;
            }
        }
        if !changed {
            return count;
        }
    }
}

fn refresh_implicit_views(api: &mut ApiDefinition) -> usize {
    let mut count = 0;
    for mt in api.media_types.values_mut().filter(|mt| mt.implicit_view) {
        let view = mt.implicit_default_view();
        if mt.views.get(DEFAULT_VIEW) != Some(&view) {
            mt.views.insert(DEFAULT_VIEW.to_string(), view);
            count += 1;
        }
    }
    count
}

fn resolve_media_type_identifiers(api: &mut ApiDefinition) -> usize {
    let by_identifier: BTreeMap<String, String> = api
        .media_types
        .values()
        .filter(|mt| !api.media_types.contains_key(&mt.identifier))
        .map(|mt| (mt.identifier.clone(), mt.name.clone()))
        .collect();
    let resolve = |slot: &mut Option<String>| -> bool {
        match slot.as_deref().and_then(|id| by_identifier.get(id)) {
            Some(name) => {
                *slot = Some(name.clone());
                true
            }
            None => false,
        }
    };

    let mut count = 0;
    for response in api.responses.values_mut() {
        count += usize::from(resolve(&mut response.media_type));
    }
    for resource in api.resources.values_mut() {
        count += usize::from(resolve(&mut resource.media_type));
        for response in resource.responses.values_mut() {
            count += usize::from(resolve(&mut response.media_type));
        }
        for action in resource.actions.values_mut() {
            for response in action.responses.values_mut() {
                count += usize::from(resolve(&mut response.media_type));
            }
        }
    }
    count
}

fn merge_responses(api: &mut ApiDefinition) -> usize {
    let api_responses = api.responses.clone();
    let mut count = 0;
    for resource in api.resources.values_mut() {
        for action in resource.actions.values_mut() {
            for (name, response) in &mut action.responses {
                let mut changed = false;
                if let Some(outer) = resource.responses.get(name) {
                    changed |= response.merge(outer);
                }
                if let Some(outer) = api_responses.get(name) {
                    changed |= response.merge(outer);
                }
                if let Some(builtin) = builtin_response(name) {
                    changed |= response.merge(&builtin);
                }
                count += usize::from(changed);
            }
        }
    }
    count
}

fn synthesize_wildcard_params(api: &mut ApiDefinition) -> usize {
    let mut missing: Vec<(String, String, String, AttributeDefinition)> = Vec::new();
    for resource in api.resources.values() {
        for action in resource.actions.values() {
            for route in &action.routes {
                for wildcard in extract_wildcards(&api.full_path(resource, route)) {
                    let seen = missing.iter().any(|(r, a, w, _)| {
                        *r == resource.name && *a == action.name && *w == wildcard
                    });
                    if seen || action.param(&wildcard).is_some() {
                        continue;
                    }
                    // Base params describe base path wildcards; anything
                    // else becomes a plain string.
                    let param = resource
                        .base_params
                        .as_ref()
                        .and_then(|p| p.member(&wildcard))
                        .or_else(|| api.base_params.as_ref().and_then(|p| p.member(&wildcard)))
                        .cloned()
                        .unwrap_or_else(|| Primitive::String.into());
                    missing.push((
                        resource.name.clone(),
                        action.name.clone(),
                        wildcard,
                        param,
                    ));
                }
            }
        }
    }

    let count = missing.len();
    for (resource, action, wildcard, param) in missing {
        debug!(%resource, %action, %wildcard, "declaring implicit wildcard parameter");
        if let Some(action) = api
            .resources
            .get_mut(&resource)
            .and_then(|r| r.actions.get_mut(&action))
        {
            action
                .params
                .get_or_insert_with(AttributeDefinition::default)
                .add_member(wildcard, param);
        }
    }
    count
}
