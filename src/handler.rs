//! Request/response model shared by handlers, middleware, and the reference
//! router.
//!
//! Handlers are plain callables registered by name; they receive a
//! [`HandlerRequest`] and return a [`HandlerResponse`] or a [`HandlerError`].
//! Errors returned by a handler never cross into the host framework
//! unhandled: the registration wrapper either routes them through the
//! configured error handler or converts them with
//! [`HandlerError::into_response`].

use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use std::sync::Arc;

/// Maximum number of path/query parameters held inline before spilling to
/// the heap. Most routes have well under eight.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Parameter storage for path and query parameters.
pub type ParamVec = SmallVec<[(String, String); MAX_INLINE_PARAMS]>;

/// An incoming request as seen by middleware and handlers.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// HTTP method of the request.
    pub method: Method,
    /// Request path as received (no query string).
    pub path: String,
    /// Path parameters extracted from the matched route pattern.
    pub path_params: ParamVec,
    /// Query string parameters (populated by the host).
    pub query_params: ParamVec,
    /// Request headers, lowercase names.
    pub headers: Vec<(String, String)>,
    /// Request body parsed as JSON, if present.
    pub body: Option<Value>,
}

impl HandlerRequest {
    /// Build a request with empty parameter bags and no body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            path_params: ParamVec::new(),
            query_params: ParamVec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Get a path parameter by name. Last write wins when duplicate names
    /// exist at different path depths.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name. Last write wins for repeated keys.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Response produced by a handler or a short-circuiting middleware.
#[derive(Debug, Clone)]
pub struct HandlerResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// Response body as JSON.
    pub body: Value,
}

impl HandlerResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// A JSON response with the content-type header set.
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body,
        }
    }

    /// A JSON error response of the shape `{ "error": message }`.
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }
}

/// Error raised by a handler or a request validator.
///
/// `status` drives the response code when the error reaches the default
/// mapping; validation failures use 400 and carry the underlying schema
/// error entries in `errors`.
#[derive(Debug, Clone)]
pub struct HandlerError {
    pub status: u16,
    pub message: String,
    pub errors: Vec<Value>,
}

impl HandlerError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// A 400 validation error carrying the underlying schema errors.
    pub fn validation(message: impl Into<String>, errors: Vec<Value>) -> Self {
        Self {
            status: 400,
            message: message.into(),
            errors,
        }
    }

    /// The default error mapping: `{ "error": message, "errors": [...] }`.
    pub fn into_response(self) -> HandlerResponse {
        HandlerResponse::json(
            self.status,
            serde_json::json!({ "error": self.message, "errors": self.errors }),
        )
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

impl std::error::Error for HandlerError {}

/// A request handler: the unit of work a route registration points at.
pub type Handler =
    Arc<dyn Fn(&HandlerRequest) -> Result<HandlerResponse, HandlerError> + Send + Sync>;

/// Caller-supplied error-to-response mapping with the
/// `(response, error, request)` contract. The response argument arrives
/// prefilled with the default mapping and may be rewritten in place.
pub type ErrHandler = Arc<dyn Fn(&mut HandlerResponse, &HandlerError, &HandlerRequest) + Send + Sync>;

/// Convert a handler error into a response, routing through the configured
/// error handler when one is present.
pub fn error_response(
    err: HandlerError,
    req: &HandlerRequest,
    err_handler: Option<&ErrHandler>,
) -> HandlerResponse {
    match err_handler {
        Some(handler) => {
            let mut res = err.clone().into_response();
            handler(&mut res, &err, req);
            res
        }
        None => err.into_response(),
    }
}
