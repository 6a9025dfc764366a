use serde_json::Value;

use crate::routing::RouteMethod;

/// Where a method's handler comes from, decided once at load time.
///
/// The raw file shapes (bare name, `handler:`, `createHandler:`) are
/// normalized into this sum type immediately after parsing; nothing
/// downstream sniffs shapes again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerSource {
    /// A handler registered under this name.
    Handler(String),
    /// A handler factory registered under this name, invoked at apply time
    /// with `(route, method)`. Takes priority over `handler` when an
    /// endpoint declares both.
    Factory(String),
}

impl HandlerSource {
    /// The referenced registry name, whichever table it lives in.
    pub fn name(&self) -> &str {
        match self {
            HandlerSource::Handler(name) | HandlerSource::Factory(name) => name,
        }
    }
}

/// One normalized HTTP-method definition from an endpoint file.
#[derive(Debug, Clone)]
pub struct MethodSpec {
    pub method: RouteMethod,
    pub source: HandlerSource,
    /// Method-level middleware names, innermost tier of the chain.
    pub middleware: Vec<String>,
    /// Operation schema fragment merged into `paths` of the document.
    pub schema_paths: Option<Value>,
    /// Component-schema fragment merged into `components.schemas`.
    pub schema_components: Option<Value>,
    /// Per-method opt-in for the parameter validator.
    pub validate_params: bool,
    /// Per-method opt-in for the request-body validator.
    pub validate_request_body: bool,
}

/// A parsed endpoint file: module-level middleware plus its method entries,
/// in canonical method order.
#[derive(Debug, Clone, Default)]
pub struct EndpointFile {
    /// Module-level middleware names, applied to every method in the file.
    pub middleware: Vec<String>,
    pub methods: Vec<MethodSpec>,
}
