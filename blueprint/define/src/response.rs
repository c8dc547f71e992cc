//! Response definitions, header patterns and the built-in response table.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use regex::Regex;
use serde::Serialize;

use crate::dsl::ResponseBuilder;

/// Name of the built-in template producing a 200 response with the media
/// type given as its only argument.
pub const OK: &str = "OK";

/// A response an action may send.
///
/// Fields left unset are filled in by finalize from same-named responses of
/// the resource, the API and the built-in table, in that order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResponseDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Name of the media type of the body, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, HeaderPattern>,
}

impl ResponseDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Fills fields this response leaves unset from `outer`.
    ///
    /// Returns `true` if anything changed.
    pub fn merge(&mut self, outer: &ResponseDefinition) -> bool {
        let mut changed = false;
        if self.status.is_none() && outer.status.is_some() {
            self.status = outer.status;
            changed = true;
        }
        if self.description.is_none() && outer.description.is_some() {
            self.description = outer.description.clone();
            changed = true;
        }
        if self.media_type.is_none() && outer.media_type.is_some() {
            self.media_type = outer.media_type.clone();
            changed = true;
        }
        for (name, pattern) in &outer.headers {
            if !self.headers.contains_key(name) {
                self.headers.insert(name.clone(), pattern.clone());
                changed = true;
            }
        }
        changed
    }

    /// Checks a response header value against this definition.
    ///
    /// Headers the definition does not mention always match.
    pub fn header_matches(&self, name: &str, value: &str) -> bool {
        self.headers
            .get(name)
            .is_none_or(|pattern| pattern.matches(value))
    }
}

/// Expected value of a response header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderPattern {
    Exact(String),
    Regex(String),
}

impl HeaderPattern {
    /// Values enclosed in `/` are regular expressions, anything else must
    /// match exactly.
    ///
    /// ## Examples
    ///
    /// ```
    /// use blueprint_define::HeaderPattern;
    ///
    /// let p = HeaderPattern::parse("/^bottles/[0-9]+$/");
    /// assert!(p.matches("bottles/42"));
    /// assert!(!p.matches("bottles/x"));
    /// assert!(HeaderPattern::parse("no-cache").matches("no-cache"));
    /// ```
    pub fn parse(pattern: &str) -> Self {
        match pattern
            .strip_prefix('/')
            .and_then(|p| p.strip_suffix('/'))
        {
            Some(re) if pattern.len() >= 2 => HeaderPattern::Regex(re.to_string()),
            _ => HeaderPattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            HeaderPattern::Exact(expected) => expected == value,
            HeaderPattern::Regex(re) => Regex::new(re).is_ok_and(|re| re.is_match(value)),
        }
    }
}

/// Body of a response template: receives the builder and the template
/// arguments.
pub type TemplateBody = Rc<dyn Fn(&mut ResponseBuilder<'_>, &[String])>;

/// A named, parametrized response.
#[derive(Clone)]
pub struct ResponseTemplateDefinition {
    pub name: String,
    /// Number of arguments the template expects.
    pub arity: usize,
    pub body: TemplateBody,
}

impl fmt::Debug for ResponseTemplateDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseTemplateDefinition")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ResponseTemplateDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.arity == other.arity && Rc::ptr_eq(&self.body, &other.body)
    }
}

/// Built-in responses: name, status and standard description.
pub const BUILTIN_RESPONSES: &[(&str, u16, &str)] = &[
    ("Continue", 100, "Continue"),
    ("SwitchingProtocols", 101, "Switching Protocols"),
    (OK, 200, "OK"),
    ("Created", 201, "Created"),
    ("Accepted", 202, "Accepted"),
    ("NonAuthoritativeInfo", 203, "Non-Authoritative Information"),
    ("NoContent", 204, "No Content"),
    ("ResetContent", 205, "Reset Content"),
    ("PartialContent", 206, "Partial Content"),
    ("MultipleChoices", 300, "Multiple Choices"),
    ("MovedPermanently", 301, "Moved Permanently"),
    ("Found", 302, "Found"),
    ("SeeOther", 303, "See Other"),
    ("NotModified", 304, "Not Modified"),
    ("UseProxy", 305, "Use Proxy"),
    ("TemporaryRedirect", 307, "Temporary Redirect"),
    ("BadRequest", 400, "Bad Request"),
    ("Unauthorized", 401, "Unauthorized"),
    ("PaymentRequired", 402, "Payment Required"),
    ("Forbidden", 403, "Forbidden"),
    ("NotFound", 404, "Not Found"),
    ("MethodNotAllowed", 405, "Method Not Allowed"),
    ("NotAcceptable", 406, "Not Acceptable"),
    ("ProxyAuthRequired", 407, "Proxy Authentication Required"),
    ("RequestTimeout", 408, "Request Timeout"),
    ("Conflict", 409, "Conflict"),
    ("Gone", 410, "Gone"),
    ("LengthRequired", 411, "Length Required"),
    ("PreconditionFailed", 412, "Precondition Failed"),
    ("RequestEntityTooLarge", 413, "Request Entity Too Large"),
    ("RequestURITooLong", 414, "Request URI Too Long"),
    ("UnsupportedMediaType", 415, "Unsupported Media Type"),
    ("RequestedRangeNotSatisfiable", 416, "Requested Range Not Satisfiable"),
    ("ExpectationFailed", 417, "Expectation Failed"),
    ("Teapot", 418, "I'm a teapot"),
    ("InternalServerError", 500, "Internal Server Error"),
    ("NotImplemented", 501, "Not Implemented"),
    ("BadGateway", 502, "Bad Gateway"),
    ("ServiceUnavailable", 503, "Service Unavailable"),
    ("GatewayTimeout", 504, "Gateway Timeout"),
    ("HTTPVersionNotSupported", 505, "HTTP Version Not Supported"),
];

/// Looks up a built-in response by name.
///
/// ## Examples
///
/// ```
/// use blueprint_define::response::builtin_response;
///
/// let not_found = builtin_response("NotFound").unwrap();
/// assert_eq!(not_found.status, Some(404));
/// assert!(builtin_response("Nope").is_none());
/// ```
pub fn builtin_response(name: &str) -> Option<ResponseDefinition> {
    BUILTIN_RESPONSES
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(n, status, description)| ResponseDefinition {
            name: (*n).to_string(),
            status: Some(*status),
            description: Some((*description).to_string()),
            media_type: None,
            headers: BTreeMap::new(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn builtin_names_and_statuses_are_unique() {
        let names: HashSet<_> = BUILTIN_RESPONSES.iter().map(|(n, _, _)| n).collect();
        let statuses: HashSet<_> = BUILTIN_RESPONSES.iter().map(|(_, s, _)| s).collect();
        assert_eq!(names.len(), BUILTIN_RESPONSES.len());
        assert_eq!(statuses.len(), BUILTIN_RESPONSES.len());
    }

    #[test]
    fn merge_fills_only_unset_fields() {
        let mut own = ResponseDefinition::new("NotFound");
        own.description = Some("Bottle not found".into());
        let builtin = builtin_response("NotFound").unwrap();

        assert!(own.merge(&builtin));
        assert_eq!(own.status, Some(404));
        assert_eq!(own.description.as_deref(), Some("Bottle not found"));
        assert!(!own.merge(&builtin));
    }

    #[test]
    fn merge_adds_missing_headers() {
        let mut own = ResponseDefinition::new("Created");
        own.headers
            .insert("Location".into(), HeaderPattern::parse("/bottles/"));
        let mut outer = ResponseDefinition::new("Created");
        outer
            .headers
            .insert("Location".into(), HeaderPattern::parse("x"));
        outer
            .headers
            .insert("X-Request-Id".into(), HeaderPattern::parse("/.+/"));

        assert!(own.merge(&outer));
        assert_eq!(own.headers["Location"], HeaderPattern::parse("/bottles/"));
        assert!(own.headers.contains_key("X-Request-Id"));
    }

    #[test]
    fn single_slash_is_exact() {
        assert_eq!(HeaderPattern::parse("/"), HeaderPattern::Exact("/".into()));
    }

    #[test]
    fn header_matches_unknown_headers() {
        let mut resp = ResponseDefinition::new("Created");
        resp.headers
            .insert("Location".into(), HeaderPattern::parse("/^/bottles/[0-9]+$/"));
        assert!(resp.header_matches("Location", "/bottles/1"));
        assert!(!resp.header_matches("Location", "/wines/1"));
        assert!(resp.header_matches("ETag", "anything"));
    }

    #[test]
    fn invalid_regex_never_matches() {
        assert!(!HeaderPattern::Regex("(".into()).matches("("));
    }
}
