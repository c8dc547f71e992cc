//! In-memory implementations of the request capabilities.
//!
//! Useful to drive generated contexts and mounted handlers without an HTTP
//! server, e.g. in tests.
//!
//! ## Examples
//!
//! ```
//! use blueprint_types::memory::{MemoryRequest, RecordedResponses};
//! use blueprint_types::{RequestAccessor, ResponseSender, Value};
//!
//! let req = MemoryRequest::new()
//!     .with_param("id", "42")
//!     .with_header("X-Account", "1");
//! assert_eq!(req.get("id").as_deref(), Some("42"));
//!
//! let mut resp = RecordedResponses::default();
//! resp.send(404, None);
//! assert_eq!(resp.last_status(), Some(404));
//! ```

use std::collections::BTreeMap;

use crate::error::HandlerError;
use crate::request::{Handler, RequestAccessor, ResponseSender, Router};
use crate::value::Value;

/// A request assembled by hand.
#[derive(Debug, Clone, Default)]
pub struct MemoryRequest {
    params: BTreeMap<String, Vec<String>>,
    headers: BTreeMap<String, String>,
    payload: Option<Value>,
}

impl MemoryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter value; repeated calls accumulate values.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Header lookups are case-insensitive.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

impl RequestAccessor for MemoryRequest {
    fn get(&self, name: &str) -> Option<String> {
        self.params.get(name).and_then(|v| v.first().cloned())
    }

    fn get_many(&self, name: &str) -> Option<Vec<String>> {
        self.params.get(name).cloned()
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers.get(&name.to_ascii_lowercase()).cloned()
    }

    fn payload(&self) -> Option<Value> {
        self.payload.clone()
    }
}

/// Records every response sent through it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedResponses {
    pub sent: Vec<(u16, Option<Value>)>,
}

impl RecordedResponses {
    pub fn last_status(&self) -> Option<u16> {
        self.sent.last().map(|(status, _)| *status)
    }

    pub fn last_body(&self) -> Option<&Value> {
        self.sent.last().and_then(|(_, body)| body.as_ref())
    }
}

impl ResponseSender for RecordedResponses {
    fn send(&mut self, status: u16, body: Option<Value>) {
        self.sent.push((status, body));
    }
}

/// A router that keeps handlers in registration order and dispatches on
/// exact verb and path template.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<(String, String, Handler)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered `(verb, path)` pairs.
    pub fn routes(&self) -> Vec<(&str, &str)> {
        self.routes
            .iter()
            .map(|(verb, path, _)| (verb.as_str(), path.as_str()))
            .collect()
    }

    /// Runs the handler registered for `verb` and `path`.
    ///
    /// Returns `None` when no handler matches.
    pub fn dispatch(
        &self,
        verb: &str,
        path: &str,
        req: &dyn RequestAccessor,
        resp: &mut dyn ResponseSender,
    ) -> Option<Result<(), HandlerError>> {
        self.routes
            .iter()
            .find(|(v, p, _)| v == verb && p == path)
            .map(|(_, _, handler)| handler(req, resp))
    }
}

impl Router for RouteTable {
    fn handle(&mut self, verb: &str, path: &str, handler: Handler) {
        self.routes.push((verb.to_string(), path.to_string(), handler));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_params_accumulate() {
        let req = MemoryRequest::new().with_param("tag", "a").with_param("tag", "b");
        assert_eq!(req.get("tag").as_deref(), Some("a"));
        assert_eq!(req.get_many("tag"), Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(req.get_many("missing"), None);
    }

    #[test]
    fn headers_are_case_insensitive() {
        let req = MemoryRequest::new().with_header("X-Account", "1");
        assert_eq!(req.header("x-account").as_deref(), Some("1"));
    }

    #[test]
    fn route_table_dispatches_registered_handler() {
        let mut table = RouteTable::new();
        table.handle(
            "GET",
            "/bottles/:id",
            Box::new(
                |_req: &dyn RequestAccessor,
                 resp: &mut dyn ResponseSender|
                 -> Result<(), HandlerError> {
                    resp.send(204, None);
                    Ok(())
                },
            ),
        );
        let mut resp = RecordedResponses::default();
        let outcome = table.dispatch("GET", "/bottles/:id", &MemoryRequest::new(), &mut resp);
        assert!(matches!(outcome, Some(Ok(()))));
        assert_eq!(resp.last_status(), Some(204));
        assert!(table
            .dispatch("POST", "/bottles/:id", &MemoryRequest::new(), &mut resp)
            .is_none());
        assert_eq!(table.routes(), vec![("GET", "/bottles/:id")]);
    }
}
