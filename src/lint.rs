//! Registry-free structural checking of a routes directory.
//!
//! The linter runs the same loader and resolver code paths as the builder
//! but resolves nothing against a registry: it reports the route table that
//! *would* be built, the merged schema document, and every structural
//! problem (duplicate routes, invalid endpoint or middleware documents).
//! Used by the `fsroutes` CLI; handler and middleware names are surfaced
//! for inspection but cannot be verified without a registry.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::endpoint::{load_endpoint_doc, parse_endpoint};
use crate::middleware::middleware_names;
use crate::routing::{
    ancestor_dirs, route_from_rel_path, strip_route_extension, RouteMethod, MIDDLEWARE_STEM,
};
use crate::schema::SchemaAggregator;
use crate::validator::BuildIssue;
use crate::walker::walk_files;

/// One route as the builder would register it.
#[derive(Debug, Clone)]
pub struct RouteSummary {
    pub method: RouteMethod,
    pub route: String,
    /// Referenced handler or factory name.
    pub handler: String,
    /// Middleware names in chain order: top-most, ancestors, module, method.
    pub middleware: Vec<String>,
}

/// Result of a lint pass.
pub struct LintReport {
    pub routes: Vec<RouteSummary>,
    pub issues: Vec<BuildIssue>,
    /// Merged schema document; `None` when the directory does not exist.
    pub schema: Option<Value>,
}

/// Structurally check a routes directory without a handler registry.
pub fn lint_routes_dir(
    routes_dir: impl AsRef<Path>,
    prefix: &str,
    base_schema: Option<Value>,
) -> anyhow::Result<LintReport> {
    let routes_dir = routes_dir.as_ref();
    if !routes_dir.is_dir() {
        return Ok(LintReport {
            routes: Vec::new(),
            issues: Vec::new(),
            schema: None,
        });
    }

    let walked = walk_files(routes_dir)?;
    let mut issues = Vec::new();

    // name-level middleware tiers, one pre-pass
    let mut tiers: HashMap<String, Vec<String>> = HashMap::new();
    let mut broken: HashSet<String> = HashSet::new();
    for file in &walked {
        let stem = match strip_route_extension(&file.rel) {
            Some(stem) => stem,
            None => continue,
        };
        let (dir, name) = match stem.rsplit_once('/') {
            Some((dir, name)) => (dir.to_string(), name),
            None => (String::new(), stem),
        };
        if name != MIDDLEWARE_STEM {
            continue;
        }
        let parsed = fs::read_to_string(&file.abs)
            .map_err(|e| BuildIssue::new(&file.rel, "UnreadableMiddlewareFile", e.to_string()))
            .and_then(|content| {
                serde_yaml::from_str::<Value>(&content)
                    .map_err(|e| BuildIssue::new(&file.rel, "InvalidMiddlewareFile", e.to_string()))
            })
            .and_then(|doc| {
                middleware_names(&doc, false)
                    .map_err(|msg| BuildIssue::new(&file.rel, "InvalidMiddlewareFile", msg))
            });
        match parsed {
            Ok(names) => {
                tiers.insert(dir, names);
            }
            Err(issue) => {
                issues.push(issue);
                broken.insert(dir);
            }
        }
    }

    let mut files: Vec<(String, String, &crate::walker::WalkedFile)> = walked
        .iter()
        .filter_map(|f| {
            route_from_rel_path(&f.rel, "")
                .map(|rel_route| (format!("{prefix}{rel_route}"), rel_route, f))
        })
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut seen: HashSet<(RouteMethod, String)> = HashSet::new();
    let mut aggregator = SchemaAggregator::new();
    let mut routes = Vec::new();

    for (route, rel_route, file) in &files {
        let mut chain: Vec<String> = tiers.get("").cloned().unwrap_or_default();
        let mut chain_broken = broken.contains("");
        for dir in ancestor_dirs(rel_route) {
            if broken.contains(&dir) {
                chain_broken = true;
            }
            if let Some(tier) = tiers.get(&dir) {
                chain.extend(tier.iter().cloned());
            }
        }
        if chain_broken {
            issues.push(BuildIssue::new(
                &file.rel,
                "SkippedFile",
                "middleware chain crosses an invalid _middleware file",
            ));
            continue;
        }

        let endpoint = load_endpoint_doc(&file.abs, &file.rel)
            .and_then(|doc| parse_endpoint(&doc, route, &file.rel));
        let (endpoint, parse_issues) = match endpoint {
            Ok(parsed) => parsed,
            Err(issue) => {
                issues.push(issue);
                continue;
            }
        };
        issues.extend(parse_issues);

        for spec in &endpoint.methods {
            if !seen.insert((spec.method, route.clone())) {
                issues.push(BuildIssue::new(
                    format!("{} {}", spec.method, route),
                    "DuplicateRoute",
                    "route already added",
                ));
                continue;
            }
            if let Some(components) = &spec.schema_components {
                aggregator.add_components(components.clone());
            }
            if let Some(fragment) = &spec.schema_paths {
                aggregator.add_operation(route, spec.method, fragment.clone());
            }

            let mut middleware = chain.clone();
            middleware.extend(endpoint.middleware.iter().cloned());
            middleware.extend(spec.middleware.iter().cloned());
            routes.push(RouteSummary {
                method: spec.method,
                route: route.clone(),
                handler: spec.source.name().to_string(),
                middleware,
            });
        }
    }

    debug!(routes = routes.len(), issues = issues.len(), "Lint pass finished");
    Ok(LintReport {
        routes,
        issues,
        schema: Some(aggregator.build(base_schema.as_ref())),
    })
}
