//! Build-time configuration issues and the optional request validators.
//!
//! Validators are compiled once per route/method during the build (never per
//! request) from the operation's schema fragment: the `parameters` array and
//! the `requestBody` JSON schema. Both are [`Middleware`] implementations
//! appended after the method-level tier; on failure they produce an HTTP 400
//! response carrying the underlying schema errors, routed through the
//! configured error handler when one is present.

use jsonschema::JSONSchema;
use serde_json::Value;
use tracing::debug;

use crate::handler::{error_response, ErrHandler, HandlerError, HandlerRequest, HandlerResponse};
use crate::middleware::Middleware;

/// A configuration problem discovered while building the route table.
///
/// Issues are non-fatal: the offending method or file is skipped and the
/// build continues with the rest of the tree.
#[derive(Debug, Clone)]
pub struct BuildIssue {
    /// Where the problem was found, usually `METHOD /route` or a file path.
    pub location: String,
    /// Short machine-readable category, e.g. `DuplicateRoute`.
    pub kind: String,
    /// Human-readable description.
    pub message: String,
}

impl BuildIssue {
    pub fn new(
        location: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        BuildIssue {
            location: location.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for BuildIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.location, self.message)
    }
}

/// Where a declared parameter value is looked up at request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamIn {
    Path,
    Query,
}

struct CompiledParam {
    name: String,
    location: ParamIn,
    required: bool,
    schema: JSONSchema,
}

/// Parameter validator middleware compiled from an operation's `parameters`
/// schema array.
pub struct ParamsValidator {
    params: Vec<CompiledParam>,
    err_handler: Option<ErrHandler>,
}

/// Compile a parameter validator from the `parameters` array of a merged
/// operation fragment.
///
/// Returns `Ok(None)` when the operation declares no validatable parameters
/// (nothing is installed). Parameters in `header`/`cookie` locations are not
/// validated and are skipped. A parameter whose schema fails to compile is a
/// configuration error for the method.
pub fn compile_params_validator(
    parameters: Option<&Value>,
    err_handler: Option<ErrHandler>,
    location: &str,
) -> Result<Option<ParamsValidator>, BuildIssue> {
    let list = match parameters.and_then(|p| p.as_array()) {
        Some(list) => list,
        None => return Ok(None),
    };

    let mut params = Vec::new();
    for p in list {
        let name = match p.get("name").and_then(|n| n.as_str()) {
            Some(n) => n,
            None => continue,
        };
        let schema = match p.get("schema") {
            Some(s) => s,
            None => continue,
        };
        let param_in = match p.get("in").and_then(|i| i.as_str()).unwrap_or("path") {
            "path" => ParamIn::Path,
            "query" => ParamIn::Query,
            other => {
                debug!(param = name, location = other, "Skipping unsupported parameter location");
                continue;
            }
        };
        let required = p
            .get("required")
            .and_then(|r| r.as_bool())
            .unwrap_or(param_in == ParamIn::Path);

        let compiled = JSONSchema::compile(schema).map_err(|e| {
            BuildIssue::new(
                location,
                "InvalidParameterSchema",
                format!("cannot compile schema for parameter '{name}': {e}"),
            )
        })?;
        params.push(CompiledParam {
            name: name.to_string(),
            location: param_in,
            required,
            schema: compiled,
        });
    }

    if params.is_empty() {
        return Ok(None);
    }
    Ok(Some(ParamsValidator {
        params,
        err_handler,
    }))
}

impl Middleware for ParamsValidator {
    fn before(&self, req: &HandlerRequest) -> Option<HandlerResponse> {
        for p in &self.params {
            let value = match p.location {
                ParamIn::Path => req.path_param(&p.name),
                ParamIn::Query => req.query_param(&p.name),
            };
            let raw = match value {
                Some(raw) => raw,
                None => {
                    if p.required {
                        let err = HandlerError::validation(
                            format!("Param '{}' is required", p.name),
                            Vec::new(),
                        );
                        return Some(error_response(err, req, self.err_handler.as_ref()));
                    }
                    continue;
                }
            };
            let instance = Value::String(raw.to_string());
            let result = p.schema.validate(&instance);
            if let Err(errors) = result {
                let details: Vec<Value> =
                    errors.map(|e| Value::String(e.to_string())).collect();
                let err = HandlerError::validation(
                    format!("Param '{}' is not valid", p.name),
                    details,
                );
                return Some(error_response(err, req, self.err_handler.as_ref()));
            }
        }
        None
    }
}

/// Request-body validator middleware compiled from an operation's
/// `requestBody` fragment.
pub struct BodyValidator {
    schema: JSONSchema,
    err_handler: Option<ErrHandler>,
}

/// Compile a body validator from the `requestBody` fragment of a merged
/// operation, resolving one level of `$ref` indirection against the
/// aggregated component schemas (`#/components/schemas/<Name>`).
///
/// Returns `Ok(None)` when the operation declares no JSON body schema or the
/// reference cannot be resolved (validation degrades to a pass-through).
pub fn compile_body_validator(
    request_body: Option<&Value>,
    component_schemas: &Value,
    err_handler: Option<ErrHandler>,
    location: &str,
) -> Result<Option<BodyValidator>, BuildIssue> {
    let schema = request_body
        .and_then(|rb| rb.get("content"))
        .and_then(|c| c.get("application/json"))
        .and_then(|m| m.get("schema"));
    let schema = match schema {
        Some(s) => s,
        None => return Ok(None),
    };

    let resolved = match schema.get("$ref").and_then(|r| r.as_str()) {
        Some(ref_path) => {
            let name = ref_path.rsplit('/').next().unwrap_or(ref_path);
            match component_schemas.get(name) {
                Some(s) => s,
                None => {
                    debug!(ref_path = ref_path, "Unresolvable $ref, body validation skipped");
                    return Ok(None);
                }
            }
        }
        None => schema,
    };

    let compiled = JSONSchema::compile(resolved).map_err(|e| {
        BuildIssue::new(
            location,
            "InvalidBodySchema",
            format!("cannot compile request body schema: {e}"),
        )
    })?;
    Ok(Some(BodyValidator {
        schema: compiled,
        err_handler,
    }))
}

impl Middleware for BodyValidator {
    fn before(&self, req: &HandlerRequest) -> Option<HandlerResponse> {
        let body = req.body.clone().unwrap_or(Value::Null);
        if let Err(errors) = self.schema.validate(&body) {
            let details: Vec<Value> = errors.map(|e| Value::String(e.to_string())).collect();
            let err = HandlerError::validation("Request body is not valid", details);
            return Some(error_response(err, req, self.err_handler.as_ref()));
        }
        None
    }
}
