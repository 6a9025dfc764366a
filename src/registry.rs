//! Name-to-callable registries.
//!
//! Endpoint files reference handlers and middleware by string name; the
//! registry maps those names to Rust callables registered at startup. Lookup
//! misses surface as configuration errors during the build, never as panics.

use std::collections::HashMap;
use std::sync::Arc;

use crate::handler::{Handler, HandlerError, HandlerRequest, HandlerResponse};
use crate::middleware::{FnMiddleware, Middleware};
use crate::routing::RouteMethod;

/// A handler factory: invoked at apply time with the route and method it is
/// being registered for, enabling per-route dependency injection.
pub type HandlerFactory = Arc<dyn Fn(&str, RouteMethod) -> Handler + Send + Sync>;

/// Registry of handlers, handler factories, and middleware, keyed by the
/// names endpoint files use to reference them.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
    factories: HashMap<String, HandlerFactory>,
    middleware: HashMap<String, Arc<dyn Middleware>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`. Replaces any previous registration.
    pub fn register_handler(&mut self, name: impl Into<String>, handler: Handler) -> &mut Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    /// Register a plain closure as a handler.
    pub fn register_handler_fn<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&HandlerRequest) -> Result<HandlerResponse, HandlerError> + Send + Sync + 'static,
    {
        self.register_handler(name, Arc::new(f))
    }

    /// Register a handler factory under `name`.
    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        factory: HandlerFactory,
    ) -> &mut Self {
        self.factories.insert(name.into(), factory);
        self
    }

    /// Register a plain closure as a handler factory.
    pub fn register_factory_fn<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&str, RouteMethod) -> Handler + Send + Sync + 'static,
    {
        self.register_factory(name, Arc::new(f))
    }

    /// Register a middleware under `name`.
    pub fn register_middleware(
        &mut self,
        name: impl Into<String>,
        middleware: Arc<dyn Middleware>,
    ) -> &mut Self {
        self.middleware.insert(name.into(), middleware);
        self
    }

    /// Register a plain closure as a `before`-only middleware.
    pub fn register_middleware_fn<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&HandlerRequest) -> Option<HandlerResponse> + Send + Sync + 'static,
    {
        self.register_middleware(name, Arc::new(FnMiddleware(f)))
    }

    pub fn handler(&self, name: &str) -> Option<Handler> {
        self.handlers.get(name).cloned()
    }

    pub fn factory(&self, name: &str) -> Option<HandlerFactory> {
        self.factories.get(name).cloned()
    }

    pub fn middleware(&self, name: &str) -> Option<Arc<dyn Middleware>> {
        self.middleware.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde_json::json;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_handler_fn("hello", |_req| Ok(HandlerResponse::json(200, json!("hi"))))
            .register_middleware_fn("noop", |_req| None)
            .register_factory_fn("make", |route, method| {
                let route = route.to_string();
                let method = method.to_string();
                Arc::new(move |_req| {
                    Ok(HandlerResponse::json(
                        200,
                        json!({ "route": route, "method": method }),
                    ))
                })
            });

        assert!(registry.handler("hello").is_some());
        assert!(registry.handler("missing").is_none());
        assert!(registry.middleware("noop").is_some());

        let factory = registry.factory("make").unwrap();
        let handler = factory("/a/:b", RouteMethod::Get);
        let res = handler(&HandlerRequest::new(Method::GET, "/a/1")).unwrap();
        assert_eq!(res.body["route"], "/a/:b");
        assert_eq!(res.body["method"], "GET");
    }
}
