//! The host-router seam and a reference implementation.
//!
//! [`RouterLike`] is what [`RoutesBuild::apply`](crate::builder::RoutesBuild::apply)
//! registers into: any framework adapter implements it by mapping
//! `(method, path, middleware, handler)` onto its own registration calls.
//!
//! [`Router`] is the in-crate reference implementation: registration-order
//! storage with `:name` patterns compiled to regexes, first match wins. It
//! exists so the full build/apply/request cycle can be exercised without a
//! host framework, and doubles as a minimal embeddable router.

use std::sync::Arc;
use std::time::Instant;

use http::Method;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::handler::{Handler, HandlerRequest, HandlerResponse, ParamVec};
use crate::middleware::Middleware;
use crate::routing::RouteMethod;

/// Registration target for [`RoutesBuild::apply`](crate::builder::RoutesBuild::apply).
pub trait RouterLike {
    /// Register a handler with its middleware chain under `(method, path)`.
    /// Registrations arrive strictly in build order.
    fn add_route(
        &mut self,
        method: RouteMethod,
        path: &str,
        middleware: Vec<Arc<dyn Middleware>>,
        handler: Handler,
    );
}

/// One registered route in the reference router.
pub struct RouteEntry {
    pub method: RouteMethod,
    pub pattern: String,
    regex: Regex,
    param_names: Vec<String>,
    middleware: Vec<Arc<dyn Middleware>>,
    handler: Handler,
}

impl RouteEntry {
    pub fn middleware_len(&self) -> usize {
        self.middleware.len()
    }
}

/// Reference router: ordered route list with regex matching.
#[derive(Default)]
pub struct Router {
    routes: Vec<RouteEntry>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    /// Match an incoming request against the registered routes, first match
    /// in registration order wins.
    fn matching(&self, method: &Method, path: &str) -> Option<(&RouteEntry, ParamVec)> {
        for entry in &self.routes {
            if !entry.method.matches(method) {
                continue;
            }
            if let Some(caps) = entry.regex.captures(path) {
                let mut params = ParamVec::new();
                for (i, name) in entry.param_names.iter().enumerate() {
                    if let Some(m) = caps.get(i + 1) {
                        params.push((name.clone(), m.as_str().to_string()));
                    }
                }
                return Some((entry, params));
            }
        }
        None
    }

    /// Run a request through the matched route's middleware chain and
    /// handler.
    ///
    /// `before` hooks run in chain order and the first `Some` short-circuits
    /// the rest of the chain and the handler; `after` hooks then run in
    /// chain order with the handler latency. A handler error that reaches
    /// the router (no custom error handler was configured at build time) is
    /// converted with the default error mapping. Unmatched requests yield
    /// 404.
    pub fn handle(&self, mut req: HandlerRequest) -> HandlerResponse {
        let (entry, params) = match self.matching(&req.method, &req.path) {
            Some(found) => found,
            None => {
                warn!(method = %req.method, path = %req.path, "No route matched");
                return HandlerResponse::error(404, "Not Found");
            }
        };
        debug!(
            method = %req.method,
            path = %req.path,
            pattern = %entry.pattern,
            "Route matched"
        );
        req.path_params.extend(params);

        let start = Instant::now();
        let mut early: Option<HandlerResponse> = None;
        for mw in &entry.middleware {
            if let Some(res) = mw.before(&req) {
                early = Some(res);
                break;
            }
        }
        let mut res = match early {
            Some(res) => res,
            None => match (entry.handler)(&req) {
                Ok(res) => res,
                Err(err) => err.into_response(),
            },
        };
        let latency = start.elapsed();
        for mw in &entry.middleware {
            mw.after(&req, &mut res, latency);
        }
        res
    }

    /// Convert a route pattern with `:name` segments into an anchored regex
    /// and the ordered list of parameter names.
    fn path_to_regex(path: &str) -> (Regex, Vec<String>) {
        if path == "/" {
            return (
                Regex::new(r"^/$").expect("failed to compile path regex"),
                Vec::new(),
            );
        }

        let mut pattern = String::with_capacity(path.len() + 8);
        pattern.push('^');
        let mut param_names = Vec::new();

        for segment in path.split('/') {
            if let Some(name) = segment.strip_prefix(':') {
                param_names.push(name.to_string());
                pattern.push_str("/([^/]+)");
            } else if !segment.is_empty() {
                pattern.push('/');
                pattern.push_str(&regex::escape(segment));
            }
        }

        pattern.push('$');
        let regex = Regex::new(&pattern).expect("failed to compile path regex");
        (regex, param_names)
    }
}

impl RouterLike for Router {
    fn add_route(
        &mut self,
        method: RouteMethod,
        path: &str,
        middleware: Vec<Arc<dyn Middleware>>,
        handler: Handler,
    ) {
        let (regex, param_names) = Self::path_to_regex(path);
        info!(method = %method, path = %path, middleware = middleware.len(), "Route registered");
        self.routes.push(RouteEntry {
            method,
            pattern: path.to_string(),
            regex,
            param_names,
            middleware,
            handler,
        });
    }
}
