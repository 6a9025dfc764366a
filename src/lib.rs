//! # fsroutes
//!
//! **fsroutes** is a convention-over-configuration route table builder: it
//! walks a directory tree, maps file paths to URL routes, and wires
//! per-file HTTP-method handlers into a host router, while aggregating
//! OpenAPI schema fragments and optional request validators.
//!
//! ## Overview
//!
//! Endpoint definition files are YAML documents keyed by lowercase HTTP
//! method names; handlers and middleware are Rust callables registered by
//! name in a [`HandlerRegistry`]. The build is a one-shot, startup-time
//! transformation: it produces a list of deferred registration commands
//! replayed against any [`RouterLike`] implementation, plus a merged
//! OpenAPI-like schema document.
//!
//! ## Conventions
//!
//! - `a/index.yaml` and `a.yaml` both resolve to `/a`; registering both on
//!   the same verb is a duplicate-route error (first wins).
//! - `:name` path segments become named parameters, rendered as `{name}` in
//!   the schema document.
//! - A path segment starting with `_` hides the file from registration.
//! - `_middleware.yaml` files declare shared middleware for all routes
//!   below their directory; the chain composes top-most, ancestors
//!   root-most first, module-level, then method-level.
//!
//! ## Architecture
//!
//! - [`walker`] - recursive directory enumeration
//! - [`routing`] - file path to route string resolution
//! - [`endpoint`] - endpoint file loading and shape normalization
//! - [`middleware`] - the middleware trait and the shared-middleware table
//! - [`schema`] - deep merge, document aggregation, fragment helpers
//! - [`validator`] - build-time compiled parameter/body validators
//! - [`builder`] - orchestration and the deferred registration list
//! - [`router`] - the host seam plus a reference regex router
//! - [`lint`] - registry-free structural checking (used by the CLI)
//!
//! ## Quick start
//!
//! ```no_run
//! use fsroutes::{build_routes, BuildOptions, HandlerRegistry, HandlerResponse, Router};
//! use serde_json::json;
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register_handler_fn("list_pets", |_req| {
//!     Ok(HandlerResponse::json(200, json!([])))
//! });
//!
//! let build = build_routes("server/routes", None, &registry, BuildOptions::default())?;
//! for issue in &build.issues {
//!     eprintln!("{issue}");
//! }
//! let schema = build.schema.clone();
//!
//! let mut router = Router::new();
//! build.apply(&mut router);
//! # anyhow::Ok(())
//! ```
//!
//! A missing routes directory is not an error: the build degrades to a
//! no-op `apply` and a `None` schema.

pub mod builder;
pub mod endpoint;
pub mod handler;
pub mod lint;
pub mod middleware;
pub mod registry;
pub mod router;
pub mod routing;
pub mod schema;
pub mod validator;
pub mod walker;

pub use builder::{build_routes, BuildOptions, RoutesBuild};
pub use handler::{
    ErrHandler, Handler, HandlerError, HandlerRequest, HandlerResponse, ParamVec,
};
pub use middleware::{FnMiddleware, Middleware};
pub use registry::{HandlerFactory, HandlerRegistry};
pub use router::{Router, RouterLike};
pub use routing::RouteMethod;
pub use validator::BuildIssue;
