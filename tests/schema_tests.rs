use fsroutes::{build_routes, BuildOptions, HandlerRegistry, HandlerResponse};
use serde_json::json;

mod common;
use common::write_file;

fn registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register_handler_fn("ok", |_req| Ok(HandlerResponse::json(200, json!("ok"))));
    registry
}

#[test]
fn test_document_seeded_with_any_component() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "x.yaml", "get: ok\n");

    let build = build_routes(dir.path(), None, &registry(), BuildOptions::default()).unwrap();
    let schema = build.schema.unwrap();
    assert_eq!(
        schema["components"]["schemas"]["Any"],
        json!({ "type": "object" })
    );
}

#[test]
fn test_base_schema_merged_first() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "x.yaml",
        "get:\n  handler: ok\n  schemaPaths:\n    description: from route\n",
    );

    let base = json!({
        "openapi": "3.0.3",
        "info": { "title": "Demo", "version": "1.0.0" },
        "servers": [{ "url": "https://example.test" }]
    });
    let build = build_routes(dir.path(), Some(base), &registry(), BuildOptions::default()).unwrap();
    let schema = build.schema.unwrap();

    assert_eq!(schema["openapi"], "3.0.3");
    assert_eq!(schema["info"]["title"], "Demo");
    assert_eq!(schema["servers"][0]["url"], "https://example.test");
    assert_eq!(schema["paths"]["/x"]["get"]["description"], "from route");
}

#[test]
fn test_component_fragments_from_different_routes_merge() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "pets.yaml",
        concat!(
            "get:\n",
            "  handler: ok\n",
            "  schemaComponents:\n",
            "    Pet: { type: object }\n",
        ),
    );
    write_file(
        dir.path(),
        "users.yaml",
        concat!(
            "get:\n",
            "  handler: ok\n",
            "  schemaComponents:\n",
            "    User: { type: object }\n",
        ),
    );

    let build = build_routes(dir.path(), None, &registry(), BuildOptions::default()).unwrap();
    let schemas = &build.schema.unwrap()["components"]["schemas"];
    assert!(schemas.get("Pet").is_some());
    assert!(schemas.get("User").is_some());
    assert!(schemas.get("Any").is_some());
}

#[test]
fn test_same_component_key_last_writer_wins_at_leaves() {
    let dir = tempfile::tempdir().unwrap();
    // routes process in lexicographic order: a.yaml then b.yaml
    write_file(
        dir.path(),
        "a.yaml",
        concat!(
            "get:\n",
            "  handler: ok\n",
            "  schemaComponents:\n",
            "    Shared:\n",
            "      type: object\n",
            "      description: first\n",
            "      properties:\n",
            "        keep: { type: string }\n",
        ),
    );
    write_file(
        dir.path(),
        "b.yaml",
        concat!(
            "get:\n",
            "  handler: ok\n",
            "  schemaComponents:\n",
            "    Shared:\n",
            "      description: second\n",
        ),
    );

    let build = build_routes(dir.path(), None, &registry(), BuildOptions::default()).unwrap();
    let shared = &build.schema.unwrap()["components"]["schemas"]["Shared"];
    assert_eq!(shared["description"], "second");
    // unrelated keys survive the merge
    assert_eq!(shared["type"], "object");
    assert_eq!(shared["properties"]["keep"]["type"], "string");
}

#[test]
fn test_operation_summary_defaults_to_method() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "x.yaml",
        concat!(
            "put:\n",
            "  handler: ok\n",
            "  schemaPaths: {}\n",
            "patch:\n",
            "  handler: ok\n",
            "  schemaPaths:\n",
            "    summary: Custom summary\n",
        ),
    );

    let build = build_routes(dir.path(), None, &registry(), BuildOptions::default()).unwrap();
    let schema = build.schema.unwrap();
    assert_eq!(schema["paths"]["/x"]["put"]["summary"], "PUT");
    assert_eq!(schema["paths"]["/x"]["put"]["responses"], json!({}));
    assert_eq!(schema["paths"]["/x"]["patch"]["summary"], "Custom summary");
}

#[test]
fn test_schema_paths_as_yaml_string_fragment() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "x.yaml",
        concat!(
            "get:\n",
            "  handler: ok\n",
            "  schemaPaths: |\n",
            "    description: written as a string\n",
            "    responses:\n",
            "      '200': { description: OK }\n",
        ),
    );

    let build = build_routes(dir.path(), None, &registry(), BuildOptions::default()).unwrap();
    let op = &build.schema.unwrap()["paths"]["/x"]["get"];
    assert_eq!(op["description"], "written as a string");
    assert_eq!(op["responses"]["200"]["description"], "OK");
}

#[test]
fn test_param_segments_use_brace_form_only_in_schema() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "a/:b/index.yaml",
        "get:\n  handler: ok\n  schemaPaths: {}\n",
    );

    let build = build_routes(dir.path(), None, &registry(), BuildOptions::default()).unwrap();
    assert_eq!(build.registrations()[0].route, "/a/:b");
    let schema = build.schema.unwrap();
    assert!(schema["paths"].get("/a/{b}").is_some());
    assert!(schema["paths"].get("/a/:b").is_none());
}
