//! Media types, views and links.
//!
//! A media type is an object attribute with an identifier (a MIME string),
//! named views selecting which members get rendered, and links embedding
//! related media types in a `links` member.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use blueprint_types::DumpError;
use regex::Regex;
use serde::Serialize;

use crate::attribute::AttributeDefinition;

/// Identifier used when none is given or the given one does not parse.
pub const DEFAULT_IDENTIFIER: &str = "plain/text";

/// Name of the view rendered when nothing else is specified.
pub const DEFAULT_VIEW: &str = "default";

/// View a link renders its target with unless told otherwise.
pub const DEFAULT_LINK_VIEW: &str = "link";

// RFC 2045 tokens for type and subtype, then optional parameters.
static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([!#$%&'*+.^_`|~0-9A-Za-z-]+)/([!#$%&'*+.^_`|~0-9A-Za-z-]+)\s*(;\s*[!#$%&'*+.^_`|~0-9A-Za-z-]+=(?:[!#$%&'*+.^_`|~0-9A-Za-z-]+|\x22[^\x22]*\x22)\s*)*$",
    )
    .expect("valid regex")
});

/// Returns `true` when `identifier` is a well-formed MIME type string.
///
/// ## Examples
///
/// ```
/// use blueprint_define::media_type::is_valid_identifier;
///
/// assert!(is_valid_identifier("application/vnd.goa.example.bottle+json"));
/// assert!(is_valid_identifier("application/json; charset=utf-8"));
/// assert!(!is_valid_identifier("bottle"));
/// ```
pub fn is_valid_identifier(identifier: &str) -> bool {
    IDENTIFIER.is_match(identifier)
}

/// A media type definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaTypeDefinition {
    /// Type name, used for generated code.
    pub name: String,
    /// MIME identifier, e.g. `application/vnd.example.bottle+json`.
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Object attribute holding the members.
    pub attribute: AttributeDefinition,
    pub views: BTreeMap<String, ViewDefinition>,
    pub links: BTreeMap<String, LinkDefinition>,
    /// Whether `views` only holds the implicit default view, which finalize
    /// refreshes once inherited members are known.
    #[serde(skip)]
    pub implicit_view: bool,
}

/// A named subset of a media type's members and links.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewDefinition {
    pub name: String,
    pub members: Vec<ViewMember>,
    pub links: Vec<String>,
}

/// A member listed in a view, with the view to render it with when the
/// member is itself a media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewMember {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
}

impl ViewMember {
    /// Parses `name` or `name:view`.
    pub fn parse(entry: &str) -> Self {
        match entry.split_once(':') {
            Some((name, view)) => Self {
                name: name.to_string(),
                view: Some(view.to_string()),
            },
            None => Self {
                name: entry.to_string(),
                view: None,
            },
        }
    }
}

/// A link to the media type of one of the members.
///
/// The link name is the name of the member it renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkDefinition {
    pub name: String,
    pub view: String,
}

impl MediaTypeDefinition {
    pub fn new(name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: identifier.into(),
            description: None,
            attribute: AttributeDefinition::default(),
            views: BTreeMap::new(),
            links: BTreeMap::new(),
            implicit_view: false,
        }
    }

    pub fn view(&self, name: &str) -> Option<&ViewDefinition> {
        self.views.get(name)
    }

    pub fn has_multiple_views(&self) -> bool {
        self.views.len() > 1
    }

    /// Picks the view to render.
    ///
    /// Without an explicit name the single view is used; when there are
    /// several the caller must choose.
    ///
    /// ## Errors
    ///
    /// - [`DumpError::UnknownView`] if `name` is not a view of this type
    /// - [`DumpError::ViewRequired`] if `name` is `None` and there is more
    ///   than one view
    pub fn select_view(&self, name: Option<&str>) -> Result<&ViewDefinition, DumpError> {
        match name {
            Some(view) => self.views.get(view).ok_or_else(|| DumpError::UnknownView {
                media_type: self.name.clone(),
                view: view.to_string(),
            }),
            None if self.views.len() == 1 => self
                .views
                .values()
                .next()
                .ok_or_else(|| DumpError::ViewRequired {
                    media_type: self.name.clone(),
                }),
            None => Err(DumpError::ViewRequired {
                media_type: self.name.clone(),
            }),
        }
    }

    /// The view listing every member, used when a media type declares none.
    pub fn implicit_default_view(&self) -> ViewDefinition {
        ViewDefinition {
            name: DEFAULT_VIEW.to_string(),
            members: self
                .attribute
                .member_names()
                .into_iter()
                .map(|n| ViewMember {
                    name: n.to_string(),
                    view: None,
                })
                .collect(),
            links: Vec::new(),
        }
    }
}
