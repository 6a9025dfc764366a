use std::time::Duration;

use crate::handler::{HandlerRequest, HandlerResponse};

/// Request/response middleware.
///
/// `before` runs ahead of the handler; returning `Some` short-circuits the
/// chain and the response is sent as-is (this is how the built-in validators
/// reject a request). `after` runs once a response exists, in chain order,
/// with the handler latency.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        None
    }
    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {}
}

/// Adapter turning a plain closure into a `before`-only middleware.
pub struct FnMiddleware<F>(pub F);

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&HandlerRequest) -> Option<HandlerResponse> + Send + Sync,
{
    fn before(&self, req: &HandlerRequest) -> Option<HandlerResponse> {
        (self.0)(req)
    }
}
