//! Incremental accumulation of the OpenAPI-like schema document.

use serde_json::{json, Map, Value};

use crate::routing::{to_openapi_path, RouteMethod};

use super::merge::deep_merge;

/// Accumulates per-route operation fragments and shared component schemas
/// into one document.
///
/// `components.schemas` is seeded with a convenience `Any: { type: object }`
/// entry. Operation fragments are merged over a `{ summary, responses }`
/// template (fragment wins) and land under the brace-parameter form of the
/// route (`/a/:b` → `/a/{b}`).
pub struct SchemaAggregator {
    paths: Value,
    components: Value,
}

impl SchemaAggregator {
    pub fn new() -> Self {
        Self {
            paths: json!({}),
            components: json!({ "Any": { "type": "object" } }),
        }
    }

    /// Deep-merge a component-schemas fragment into `components.schemas`.
    pub fn add_components(&mut self, fragment: Value) {
        deep_merge(&mut self.components, fragment);
    }

    /// Merge an operation fragment for `(route, method)` into `paths` and
    /// return the merged operation (template plus fragment), which the
    /// validators are compiled from.
    pub fn add_operation(&mut self, route: &str, method: RouteMethod, fragment: Value) -> Value {
        let mut operation = json!({ "summary": method.to_string(), "responses": {} });
        deep_merge(&mut operation, fragment);

        let mut by_method = Map::new();
        by_method.insert(method.as_str().to_string(), operation.clone());
        let mut by_path = Map::new();
        by_path.insert(to_openapi_path(route), Value::Object(by_method));
        deep_merge(&mut self.paths, Value::Object(by_path));

        operation
    }

    /// The component schemas aggregated so far; `$ref` resolution for body
    /// validators reads from here.
    pub fn component_schemas(&self) -> &Value {
        &self.components
    }

    /// Assemble the final document: the caller-supplied base first, with the
    /// computed `paths` and `components` layered on top.
    pub fn build(&self, base: Option<&Value>) -> Value {
        let mut doc = json!({});
        if let Some(base) = base {
            deep_merge(&mut doc, base.clone());
        }
        deep_merge(
            &mut doc,
            json!({
                "paths": self.paths.clone(),
                "components": { "schemas": self.components.clone() }
            }),
        );
        doc
    }
}

impl Default for SchemaAggregator {
    fn default() -> Self {
        Self::new()
    }
}
