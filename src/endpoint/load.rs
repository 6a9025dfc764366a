//! Endpoint file loading and shape normalization.
//!
//! An endpoint file is a YAML mapping whose keys are lowercase HTTP method
//! names plus an optional module-level `middleware` key. Supported method
//! value shapes, in priority order:
//!
//! 1. a bare string — the name of a registered handler; no middleware, no
//!    schema;
//! 2. a mapping with `createHandler: <factory name>` — highest-priority
//!    handler source, enables per-route dependency injection;
//! 3. a mapping with `handler: <handler name>`.
//!
//! Mapping shapes may additionally carry `middleware` (name or sequence of
//! names), `schemaPaths` and `schemaComponents` (mapping, or an indented
//! YAML string passed through [`yamlize`](crate::schema::yamlize)), and the
//! per-method booleans `validateParams` / `validateRequestBody`.
//!
//! Shape problems are configuration errors scoped to one method; a document
//! that is not a mapping, or an invalid module-level `middleware` key, is
//! fatal for the whole file. Neither aborts the build.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::middleware::middleware_names;
use crate::routing::METHOD_KEYS;
use crate::schema::yamlize;
use crate::validator::BuildIssue;

use super::types::{EndpointFile, HandlerSource, MethodSpec};

/// Read and parse an endpoint file into a JSON value tree.
///
/// The document must be a mapping; anything else is fatal for the file.
pub fn load_endpoint_doc(abs: &Path, rel: &str) -> Result<Value, BuildIssue> {
    let content = fs::read_to_string(abs)
        .map_err(|e| BuildIssue::new(rel, "UnreadableEndpointFile", e.to_string()))?;
    let doc: Value = serde_yaml::from_str(&content)
        .map_err(|e| BuildIssue::new(rel, "InvalidEndpointFile", e.to_string()))?;
    if !doc.is_object() {
        return Err(BuildIssue::new(
            rel,
            "InvalidEndpointFile",
            "endpoint file must be a mapping of method names",
        ));
    }
    Ok(doc)
}

/// Normalize a parsed endpoint document.
///
/// Returns the parsed file together with the per-method issues encountered;
/// an `Err` means the whole file is skipped. Unknown top-level keys are
/// ignored. Methods are emitted in canonical order regardless of file
/// order, so processing is deterministic.
pub fn parse_endpoint(doc: &Value, route: &str, rel: &str) -> Result<(EndpointFile, Vec<BuildIssue>), BuildIssue> {
    let map = doc
        .as_object()
        .ok_or_else(|| BuildIssue::new(rel, "InvalidEndpointFile", "not a mapping"))?;

    let module_middleware = match map.get("middleware") {
        Some(value) => middleware_names(value, true)
            .map_err(|msg| BuildIssue::new(rel, "InvalidMiddleware", msg))?,
        None => Vec::new(),
    };

    let mut endpoint = EndpointFile {
        middleware: module_middleware,
        methods: Vec::new(),
    };
    let mut issues = Vec::new();

    for (key, method) in METHOD_KEYS {
        let value = match map.get(key) {
            Some(v) => v,
            None => continue,
        };
        let location = format!("{method} {route}");
        match parse_method_value(value, method, &location) {
            Ok(spec) => endpoint.methods.push(spec),
            Err(issue) => issues.push(issue),
        }
    }

    Ok((endpoint, issues))
}

fn parse_method_value(
    value: &Value,
    method: crate::routing::RouteMethod,
    location: &str,
) -> Result<MethodSpec, BuildIssue> {
    match value {
        Value::String(name) => Ok(MethodSpec {
            method,
            source: HandlerSource::Handler(name.clone()),
            middleware: Vec::new(),
            schema_paths: None,
            schema_components: None,
            validate_params: false,
            validate_request_body: false,
        }),
        Value::Object(map) => {
            let source = match (map.get("createHandler"), map.get("handler")) {
                (Some(Value::String(name)), _) => HandlerSource::Factory(name.clone()),
                (None, Some(Value::String(name))) => HandlerSource::Handler(name.clone()),
                _ => {
                    return Err(BuildIssue::new(
                        location,
                        "InvalidRouteDefinition",
                        "method entry needs a 'createHandler' or 'handler' name",
                    ))
                }
            };
            let middleware = match map.get("middleware") {
                Some(value) => middleware_names(value, true)
                    .map_err(|msg| BuildIssue::new(location, "InvalidMiddleware", msg))?,
                None => Vec::new(),
            };
            Ok(MethodSpec {
                method,
                source,
                middleware,
                schema_paths: schema_fragment(map.get("schemaPaths"), "schemaPaths", location)?,
                schema_components: schema_fragment(
                    map.get("schemaComponents"),
                    "schemaComponents",
                    location,
                )?,
                validate_params: bool_flag(map.get("validateParams"), "validateParams", location)?,
                validate_request_body: bool_flag(
                    map.get("validateRequestBody"),
                    "validateRequestBody",
                    location,
                )?,
            })
        }
        other => Err(BuildIssue::new(
            location,
            "InvalidRouteDefinition",
            format!("unsupported method value shape: {other}"),
        )),
    }
}

/// A schema fragment is a mapping used directly, or an indented YAML string
/// normalized and parsed.
fn schema_fragment(
    value: Option<&Value>,
    key: &str,
    location: &str,
) -> Result<Option<Value>, BuildIssue> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v @ Value::Object(_)) => Ok(Some(v.clone())),
        Some(Value::String(s)) => yamlize(s, 4)
            .map(Some)
            .map_err(|e| BuildIssue::new(location, "InvalidSchemaFragment", format!("{key}: {e}"))),
        Some(other) => Err(BuildIssue::new(
            location,
            "InvalidSchemaFragment",
            format!("{key} must be a mapping or a YAML string, found {other}"),
        )),
    }
}

fn bool_flag(value: Option<&Value>, key: &str, location: &str) -> Result<bool, BuildIssue> {
    match value {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(BuildIssue::new(
            location,
            "InvalidRouteDefinition",
            format!("{key} must be a boolean, found {other}"),
        )),
    }
}
