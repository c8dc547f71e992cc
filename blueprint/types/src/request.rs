//! Capabilities generated code talks to.
//!
//! Generated action contexts read requests through [`RequestAccessor`],
//! answer through [`ResponseSender`] and are registered with a [`Router`].
//! The HTTP server behind these traits is not part of this crate.

use crate::error::HandlerError;
use crate::value::Value;

/// Read access to an incoming request.
pub trait RequestAccessor {
    /// Single value of a path or query parameter.
    fn get(&self, name: &str) -> Option<String>;

    /// Every value of a repeated query parameter.
    fn get_many(&self, name: &str) -> Option<Vec<String>>;

    fn header(&self, name: &str) -> Option<String>;

    /// Decoded request body.
    fn payload(&self) -> Option<Value>;
}

/// Write access to the response of a request.
pub trait ResponseSender {
    /// Sends `status` with an optional body.
    fn send(&mut self, status: u16, body: Option<Value>);
}

/// A mounted action: binds the request, then runs the controller.
pub type Handler =
    Box<dyn Fn(&dyn RequestAccessor, &mut dyn ResponseSender) -> Result<(), HandlerError> + Send + Sync>;

/// Something handlers can be registered with.
pub trait Router {
    /// Registers `handler` for requests matching `verb` and `path`.
    ///
    /// Paths use `:name` and `*name` wildcards.
    fn handle(&mut self, verb: &str, path: &str, handler: Handler);
}
