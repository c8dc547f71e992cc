//! Routes and path wildcards.
//!
//! Paths use `:name` for a single segment wildcard and `*name` for a
//! wildcard matching the rest of the path.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

static WILDCARD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(?::|\*)([a-zA-Z0-9_]+)").expect("valid regex"));

/// HTTP verbs a route may use.
///
/// ## Examples
///
/// ```
/// use std::str::FromStr;
/// use blueprint_define::HttpVerb;
///
/// assert_eq!(HttpVerb::from_str("GET").unwrap(), HttpVerb::Get);
/// assert_eq!(HttpVerb::Patch.to_string(), "PATCH");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Trace,
    Connect,
    Patch,
    Options,
}

/// A verb and a path, relative to the resource base path unless the path
/// starts with `//`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDefinition {
    pub verb: HttpVerb,
    pub path: String,
}

impl RouteDefinition {
    pub fn new(verb: HttpVerb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
        }
    }

    /// Whether the path ignores the resource base path.
    pub fn is_absolute(&self) -> bool {
        self.path.starts_with("//")
    }
}

/// Extracts wildcard names from a path, in order of appearance.
///
/// ## Examples
///
/// ```
/// use blueprint_define::route::extract_wildcards;
///
/// assert_eq!(extract_wildcards("/bottles"), Vec::<String>::new());
/// assert_eq!(
///     extract_wildcards("/accounts/:accountID/bottles/:id"),
///     vec!["accountID", "id"]
/// );
/// assert_eq!(extract_wildcards("/files/*path"), vec!["path"]);
/// ```
pub fn extract_wildcards(path: &str) -> Vec<String> {
    WILDCARD
        .captures_iter(path)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Joins two path fragments with exactly one `/` between them.
///
/// ## Examples
///
/// ```
/// use blueprint_define::route::join_paths;
///
/// assert_eq!(join_paths("/accounts/:id", "/bottles"), "/accounts/:id/bottles");
/// assert_eq!(join_paths("/accounts/", "bottles"), "/accounts/bottles");
/// assert_eq!(join_paths("", "/bottles"), "/bottles");
/// assert_eq!(join_paths("/bottles", ""), "/bottles");
/// ```
pub fn join_paths(prefix: &str, suffix: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let suffix = suffix.trim_start_matches('/');
    match (prefix.is_empty(), suffix.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{suffix}"),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}/{suffix}"),
    }
}

/// Replaces each wildcard segment with `{}` for use as a format string.
///
/// ## Examples
///
/// ```
/// use blueprint_define::route::format_template;
///
/// assert_eq!(format_template("/accounts/:accountID/bottles/:id"), "/accounts/{}/bottles/{}");
/// ```
pub fn format_template(path: &str) -> String {
    WILDCARD.replace_all(path, "/{}").into_owned()
}
