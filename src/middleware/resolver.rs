//! Shared-middleware resolution.
//!
//! Every directory under the routes root may carry a `_middleware.yaml`
//! file: a YAML sequence of middleware names applying to all routes below
//! that directory. The table is populated in a single pre-pass over the
//! walked file list rather than re-reading the filesystem per route.
//!
//! Chain composition per route, outer to inner:
//!
//! 1. top-most tier (`_middleware` in the routes root itself, loaded once),
//! 2. ancestor tiers, root-most directory first,
//! 3. module-level middleware (the endpoint file's `middleware` key),
//! 4. method-level middleware (`<method>.middleware`).
//!
//! Tiers 3 and 4 are appended by the builder; this module owns 1 and 2.
//! Ancestors are derived from the route, so `<dir>/index.yaml` and
//! `<dir>.yaml` compose identical chains.

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::registry::HandlerRegistry;
use crate::routing::{ancestor_dirs, strip_route_extension, MIDDLEWARE_STEM};
use crate::validator::BuildIssue;
use crate::walker::WalkedFile;
use super::Middleware;

/// Parse a middleware declaration value into a list of names.
///
/// `allow_single` admits a bare string (endpoint files normalize a single
/// name to a one-element list); `_middleware` files require a sequence.
pub(crate) fn middleware_names(value: &Value, allow_single: bool) -> Result<Vec<String>, String> {
    match value {
        Value::String(name) if allow_single => Ok(vec![name.clone()]),
        Value::Array(entries) => {
            let mut names = Vec::with_capacity(entries.len());
            for entry in entries {
                match entry {
                    Value::String(name) => names.push(name.clone()),
                    other => {
                        return Err(format!(
                            "middleware entries must be names, found {other}"
                        ))
                    }
                }
            }
            Ok(names)
        }
        other => Err(format!(
            "middleware must be a sequence of names, found {other}"
        )),
    }
}

/// Resolve a list of middleware names against the registry.
pub(crate) fn resolve_middleware(
    names: &[String],
    registry: &HandlerRegistry,
    location: &str,
) -> Result<Vec<Arc<dyn Middleware>>, BuildIssue> {
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        match registry.middleware(name) {
            Some(mw) => out.push(mw),
            None => {
                return Err(BuildIssue::new(
                    location,
                    "UnknownMiddleware",
                    format!("middleware '{name}' is not registered"),
                ))
            }
        }
    }
    Ok(out)
}

/// Lookup table of per-directory middleware tiers, built once per build.
///
/// The key `""` is the routes root itself: the top-most tier, prepended to
/// every chain.
pub struct MiddlewareTable {
    /// Relative directory → tier.
    tiers: HashMap<String, Vec<Arc<dyn Middleware>>>,
    /// Directories whose `_middleware` file was invalid. Routes whose chain
    /// crosses one of these fail registration.
    broken: HashMap<String, BuildIssue>,
}

impl MiddlewareTable {
    /// Scan the walked file list for `_middleware` files and resolve them.
    ///
    /// Invalid files are recorded per directory and reported; they do not
    /// abort the scan.
    pub fn scan(files: &[WalkedFile], registry: &HandlerRegistry) -> (Self, Vec<BuildIssue>) {
        let mut table = MiddlewareTable {
            tiers: HashMap::new(),
            broken: HashMap::new(),
        };
        let mut issues = Vec::new();

        for file in files {
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
            if table.tiers.contains_key(&dir) || table.broken.contains_key(&dir) {
                warn!(file = %file.rel, "Duplicate _middleware file for directory, ignoring");
                issues.push(BuildIssue::new(
                    &file.rel,
                    "DuplicateMiddlewareFile",
                    "directory already has a _middleware file",
                ));
                continue;
            }

            match Self::load_tier(file, registry) {
                Ok(tier) => {
                    debug!(dir = %dir, count = tier.len(), "Middleware tier loaded");
                    table.tiers.insert(dir, tier);
                }
                Err(issue) => {
                    issues.push(issue.clone());
                    table.broken.insert(dir, issue);
                }
            }
        }

        (table, issues)
    }

    fn load_tier(
        file: &WalkedFile,
        registry: &HandlerRegistry,
    ) -> Result<Vec<Arc<dyn Middleware>>, BuildIssue> {
        let content = fs::read_to_string(&file.abs).map_err(|e| {
            BuildIssue::new(&file.rel, "UnreadableMiddlewareFile", e.to_string())
        })?;
        let doc: Value = serde_yaml::from_str(&content).map_err(|e| {
            BuildIssue::new(&file.rel, "InvalidMiddlewareFile", e.to_string())
        })?;
        let names = middleware_names(&doc, false).map_err(|msg| {
            BuildIssue::new(&file.rel, "InvalidMiddlewareFile", msg)
        })?;
        resolve_middleware(&names, registry, &file.rel)
    }

    /// Compose the top-most and ancestor tiers for a route (without prefix).
    ///
    /// Fails when the chain crosses a directory with an invalid
    /// `_middleware` file; the caller skips that route file and reports.
    pub fn chain_for(&self, route: &str) -> Result<Vec<Arc<dyn Middleware>>, BuildIssue> {
        if let Some(issue) = self.broken.get("") {
            return Err(issue.clone());
        }
        let mut chain = self.tiers.get("").cloned().unwrap_or_default();
        for dir in ancestor_dirs(route) {
            if let Some(issue) = self.broken.get(&dir) {
                return Err(issue.clone());
            }
            if let Some(tier) = self.tiers.get(&dir) {
                chain.extend(tier.iter().cloned());
            }
        }
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_middleware_names_shapes() {
        assert_eq!(
            middleware_names(&json!(["a", "b"]), false).unwrap(),
            vec!["a", "b"]
        );
        assert_eq!(middleware_names(&json!([]), false).unwrap(), Vec::<String>::new());
        assert_eq!(
            middleware_names(&json!("solo"), true).unwrap(),
            vec!["solo"]
        );
        assert!(middleware_names(&json!("solo"), false).is_err());
        assert!(middleware_names(&json!({"not": "a list"}), false).is_err());
        assert!(middleware_names(&json!(["ok", 42]), false).is_err());
    }
}
