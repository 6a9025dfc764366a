//! The route table builder: one pass from a routes directory to a list of
//! deferred registration commands plus the merged schema document.
//!
//! Build flow: walk → resolve route paths → sort → per file: ancestor
//! middleware chain + endpoint load → per method: name resolution,
//! duplicate guard, schema aggregation, validator compilation → command
//! accumulation. [`RoutesBuild::apply`] replays the commands against a
//! [`RouterLike`] in collected order.
//!
//! Configuration errors are scoped to one method or file: they are logged,
//! recorded on the result, and the build continues with the rest of the
//! tree. A missing routes directory is not an error; it degrades to a no-op
//! result with a `None` schema.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::endpoint::{load_endpoint_doc, parse_endpoint, HandlerSource};
use crate::handler::{error_response, ErrHandler, Handler};
use crate::middleware::{resolve_middleware, Middleware, MiddlewareTable};
use crate::registry::{HandlerFactory, HandlerRegistry};
use crate::router::RouterLike;
use crate::routing::{route_from_rel_path, RouteMethod};
use crate::schema::SchemaAggregator;
use crate::validator::{compile_body_validator, compile_params_validator, BuildIssue};
use crate::walker::walk_files;

/// Build configuration.
#[derive(Clone, Default)]
pub struct BuildOptions {
    /// Raise per-route progress lines to INFO (they are DEBUG otherwise).
    pub verbose: bool,
    /// Prepended verbatim to every computed route, e.g. `/api/v1`.
    pub prefix: String,
    /// Install parameter validators for every operation that declares
    /// `parameters` in its schema fragment.
    pub validate_params: bool,
    /// Install request-body validators for every operation that declares a
    /// JSON `requestBody` schema.
    pub validate_request_body: bool,
    /// Custom error-to-response mapping applied to validator failures and
    /// handler errors. Without one, errors propagate to the host's generic
    /// channel.
    pub err_handler: Option<ErrHandler>,
}

enum HandlerSpec {
    Ready(Handler),
    /// Resolved at apply time with `(route, method)`.
    Deferred(HandlerFactory),
}

/// A value-typed registration command: everything `apply` needs to register
/// one `(method, route)` pair.
pub struct Registration {
    pub method: RouteMethod,
    pub route: String,
    pub middleware: Vec<Arc<dyn Middleware>>,
    source: HandlerSpec,
}

impl Registration {
    pub fn middleware_len(&self) -> usize {
        self.middleware.len()
    }
}

/// Result of a build: the accumulated registration commands, the merged
/// schema document, and any configuration issues encountered.
pub struct RoutesBuild {
    commands: Vec<Registration>,
    /// Merged OpenAPI-like document; `None` when the routes directory did
    /// not exist.
    pub schema: Option<Value>,
    /// Configuration errors collected during the build.
    pub issues: Vec<BuildIssue>,
    err_handler: Option<ErrHandler>,
}

impl RoutesBuild {
    /// The accumulated registration commands, in apply order.
    pub fn registrations(&self) -> &[Registration] {
        &self.commands
    }

    /// Replay the registration commands against a router, strictly in
    /// collected order. Factory handler sources are resolved here, once.
    ///
    /// Consumes the build; the command list is applied exactly once.
    pub fn apply<R: RouterLike + ?Sized>(self, router: &mut R) {
        for reg in self.commands {
            let handler = match reg.source {
                HandlerSpec::Ready(handler) => handler,
                HandlerSpec::Deferred(factory) => factory(&reg.route, reg.method),
            };
            let wrapped = wrap_handler(handler, self.err_handler.clone());
            router.add_route(reg.method, &reg.route, reg.middleware, wrapped);
        }
    }
}

/// Catch handler errors at the registration wrapper: route them through the
/// configured error handler, or propagate for the host's generic channel.
fn wrap_handler(inner: Handler, err_handler: Option<ErrHandler>) -> Handler {
    Arc::new(move |req| match inner(req) {
        Ok(res) => Ok(res),
        Err(err) => match err_handler.as_ref() {
            Some(handler) => Ok(error_response(err, req, Some(handler))),
            None => Err(err),
        },
    })
}

fn report(issues: &mut Vec<BuildIssue>, issue: BuildIssue) {
    error!(%issue, "Route configuration error");
    issues.push(issue);
}

struct RouteFile {
    /// Final route, prefix included.
    route: String,
    /// Route without prefix; ancestor middleware dirs derive from this.
    rel_route: String,
    /// Relative file path, for diagnostics.
    rel: String,
    abs: PathBuf,
}

/// Walk `routes_dir` and build the route table and schema document.
///
/// `base_schema` is deep-merged under the computed `paths` and `components`
/// (callers put `openapi`, `info`, `servers` there). Handler, factory, and
/// middleware names in endpoint files resolve against `registry`.
///
/// Returns an error only for I/O failure while walking; configuration
/// problems inside the tree are collected as issues instead.
pub fn build_routes(
    routes_dir: impl AsRef<Path>,
    base_schema: Option<Value>,
    registry: &HandlerRegistry,
    options: BuildOptions,
) -> anyhow::Result<RoutesBuild> {
    let routes_dir = routes_dir.as_ref();
    let err_handler = options.err_handler.clone();

    if !routes_dir.is_dir() {
        warn!(dir = %routes_dir.display(), "Routes directory not found, nothing to register");
        return Ok(RoutesBuild {
            commands: Vec::new(),
            schema: None,
            issues: Vec::new(),
            err_handler,
        });
    }

    info!(
        dir = %routes_dir.display(),
        prefix = %options.prefix,
        "Building routes"
    );

    let walked = walk_files(routes_dir)?;

    let mut files: Vec<RouteFile> = walked
        .iter()
        .filter_map(|f| {
            route_from_rel_path(&f.rel, "").map(|rel_route| RouteFile {
                route: format!("{}{}", options.prefix, rel_route),
                rel_route,
                rel: f.rel.clone(),
                abs: f.abs.clone(),
            })
        })
        .collect();
    // reproducible processing and diagnostics
    files.sort_by(|a, b| a.route.cmp(&b.route));

    let (table, mut issues) = MiddlewareTable::scan(&walked, registry);
    for issue in &issues {
        error!(%issue, "Middleware configuration error");
    }

    let mut seen: HashSet<(RouteMethod, String)> = HashSet::new();
    let mut aggregator = SchemaAggregator::new();
    let mut commands: Vec<Registration> = Vec::new();

    for file in &files {
        let ancestor_chain = match table.chain_for(&file.rel_route) {
            Ok(chain) => chain,
            Err(cause) => {
                report(
                    &mut issues,
                    BuildIssue::new(
                        &file.rel,
                        "SkippedFile",
                        format!("middleware chain unavailable: {cause}"),
                    ),
                );
                continue;
            }
        };

        let doc = match load_endpoint_doc(&file.abs, &file.rel) {
            Ok(doc) => doc,
            Err(issue) => {
                report(&mut issues, issue);
                continue;
            }
        };
        let (endpoint, parse_issues) = match parse_endpoint(&doc, &file.route, &file.rel) {
            Ok(parsed) => parsed,
            Err(issue) => {
                report(&mut issues, issue);
                continue;
            }
        };
        for issue in parse_issues {
            report(&mut issues, issue);
        }

        let module_mw = match resolve_middleware(&endpoint.middleware, registry, &file.rel) {
            Ok(mw) => mw,
            Err(issue) => {
                report(&mut issues, issue);
                continue;
            }
        };

        for spec in &endpoint.methods {
            let location = format!("{} {}", spec.method, file.route);

            let local_mw = match resolve_middleware(&spec.middleware, registry, &location) {
                Ok(mw) => mw,
                Err(issue) => {
                    report(&mut issues, issue);
                    continue;
                }
            };

            let source = match &spec.source {
                HandlerSource::Handler(name) => match registry.handler(name) {
                    Some(handler) => HandlerSpec::Ready(handler),
                    None => {
                        report(
                            &mut issues,
                            BuildIssue::new(
                                &location,
                                "UnknownHandler",
                                format!("handler '{name}' is not registered"),
                            ),
                        );
                        continue;
                    }
                },
                HandlerSource::Factory(name) => match registry.factory(name) {
                    Some(factory) => HandlerSpec::Deferred(factory),
                    None => {
                        report(
                            &mut issues,
                            BuildIssue::new(
                                &location,
                                "UnknownHandler",
                                format!("handler factory '{name}' is not registered"),
                            ),
                        );
                        continue;
                    }
                },
            };

            // ambiguity guard: /a/b.yaml vs /a/b/index.yaml
            if !seen.insert((spec.method, file.route.clone())) {
                report(
                    &mut issues,
                    BuildIssue::new(&location, "DuplicateRoute", "route already added"),
                );
                continue;
            }

            let mut chain: Vec<Arc<dyn Middleware>> = ancestor_chain.clone();
            chain.extend(module_mw.iter().cloned());
            chain.extend(local_mw);

            if let Some(components) = &spec.schema_components {
                aggregator.add_components(components.clone());
            }
            if let Some(fragment) = &spec.schema_paths {
                let operation = aggregator.add_operation(&file.route, spec.method, fragment.clone());

                if options.validate_params || spec.validate_params {
                    match compile_params_validator(
                        operation.get("parameters"),
                        err_handler.clone(),
                        &location,
                    ) {
                        Ok(Some(validator)) => chain.push(Arc::new(validator)),
                        Ok(None) => {}
                        Err(issue) => {
                            report(&mut issues, issue);
                            continue;
                        }
                    }
                }
                if options.validate_request_body || spec.validate_request_body {
                    match compile_body_validator(
                        operation.get("requestBody"),
                        aggregator.component_schemas(),
                        err_handler.clone(),
                        &location,
                    ) {
                        Ok(Some(validator)) => chain.push(Arc::new(validator)),
                        Ok(None) => {}
                        Err(issue) => {
                            report(&mut issues, issue);
                            continue;
                        }
                    }
                }
            }

            if options.verbose {
                info!(method = %spec.method, route = %file.route, middleware = chain.len(), "Route added");
            } else {
                debug!(method = %spec.method, route = %file.route, middleware = chain.len(), "Route added");
            }
            commands.push(Registration {
                method: spec.method,
                route: file.route.clone(),
                middleware: chain,
                source,
            });
        }
    }

    info!(
        dir = %routes_dir.display(),
        routes = commands.len(),
        issues = issues.len(),
        "Route build finished"
    );

    Ok(RoutesBuild {
        commands,
        schema: Some(aggregator.build(base_schema.as_ref())),
        issues,
        err_handler,
    })
}
