//! Opinionated fragment builders for `schemaPaths` values, plus `yamlize`.
//!
//! All "type json" based: the builders assume `application/json` content
//! and fill the common defaults so endpoint code stays terse.

use anyhow::anyhow;
use serde_json::{json, Value};
use tracing::error;

use super::merge::deep_merge;

/// `{ "$ref": "#/components/schemas/<name>" }`
pub fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

/// Build a `parameters` fragment.
///
/// Each entry is either a bare name string or a partial parameter object;
/// defaults are `in: path`, `required: true`, `schema: { type: string }`,
/// each overridable per entry. Entries without a name are dropped. The
/// fragment is merged over `other`.
pub fn parameters(params: &[Value], other: Value) -> Value {
    let mut list = Vec::new();
    for p in params {
        let (name, spec) = match p {
            Value::String(name) => (name.clone(), None),
            Value::Object(map) => match map.get("name").and_then(|n| n.as_str()) {
                Some(name) => (name.to_string(), Some(map)),
                None => continue,
            },
            _ => continue,
        };
        let mut schema = json!({ "type": "string" });
        if let Some(custom) = spec.and_then(|m| m.get("schema")) {
            deep_merge(&mut schema, custom.clone());
        }
        list.push(json!({
            "in": spec.and_then(|m| m.get("in")).cloned().unwrap_or(json!("path")),
            "name": name,
            "required": spec.and_then(|m| m.get("required")).cloned().unwrap_or(json!(true)),
            "schema": schema,
        }));
    }
    let mut out = other;
    deep_merge(&mut out, json!({ "parameters": list }));
    out
}

/// Build a `requestBody` fragment for a required JSON body.
pub fn request_body(schema: Value, other: Value) -> Value {
    let mut out = other;
    deep_merge(
        &mut out,
        json!({
            "requestBody": {
                "required": true,
                "content": { "application/json": { "schema": schema } }
            }
        }),
    );
    out
}

/// Build a `responses` fragment with a JSON 200 and an optional default.
pub fn responses(
    json_out_200: Value,
    description_200: &str,
    default_resp: Option<Value>,
    other: Value,
) -> Value {
    let mut out = other;
    deep_merge(
        &mut out,
        json!({
            "responses": {
                "200": {
                    "description": description_200,
                    "content": { "application/json": { "schema": json_out_200 } }
                },
                "default": default_resp,
            }
        }),
    );
    out
}

/// Normalize an indented YAML string and parse it.
///
/// Rust string literals embedded in code carry the surrounding indentation;
/// this replaces tabs with `tab_width` spaces, drops blank lines, strips the
/// common leading indent, and parses the result. The offending source is
/// logged when parsing fails.
pub fn yamlize(s: &str, tab_width: usize) -> anyhow::Result<Value> {
    let expanded = s.replace('\t', &" ".repeat(tab_width));
    let lines: Vec<&str> = expanded.lines().filter(|l| !l.trim().is_empty()).collect();
    let min_indent = lines
        .iter()
        .map(|l| l.len() - l.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);
    let normalized = lines
        .iter()
        .map(|l| &l[min_indent..])
        .collect::<Vec<_>>()
        .join("\n");

    serde_yaml::from_str(&normalized).map_err(|e| {
        error!(source = s, "yamlize failed");
        anyhow!("invalid YAML fragment: {e}")
    })
}
