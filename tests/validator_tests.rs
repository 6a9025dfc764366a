use std::sync::Arc;

use fsroutes::{
    build_routes, BuildOptions, HandlerRegistry, HandlerRequest, HandlerResponse, Router,
};
use http::Method;
use serde_json::json;

mod common;
use common::write_file;

fn registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register_handler_fn("ok", |_req| Ok(HandlerResponse::json(200, json!("ok"))));
    registry
}

const PARAM_ROUTE: &str = concat!(
    "get:\n",
    "  handler: ok\n",
    "  schemaPaths:\n",
    "    parameters:\n",
    "      - name: id\n",
    "        in: path\n",
    "        required: true\n",
    "        schema:\n",
    "          type: string\n",
    "          pattern: '^[0-9]+$'\n",
);

#[test]
fn test_param_validator_rejects_and_accepts() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "pets/:id.yaml", PARAM_ROUTE);

    let build = build_routes(
        dir.path(),
        None,
        &registry(),
        BuildOptions {
            validate_params: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert!(build.issues.is_empty());

    let mut router = Router::new();
    build.apply(&mut router);

    let res = router.handle(HandlerRequest::new(Method::GET, "/pets/not-a-number"));
    assert_eq!(res.status, 400);
    assert!(!res.body["errors"].as_array().unwrap().is_empty());
    assert_eq!(res.body["error"], "Param 'id' is not valid");

    let res = router.handle(HandlerRequest::new(Method::GET, "/pets/123"));
    assert_eq!(res.status, 200);
}

#[test]
fn test_param_validator_not_installed_without_flag() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "pets/:id.yaml", PARAM_ROUTE);

    let build = build_routes(dir.path(), None, &registry(), BuildOptions::default()).unwrap();
    let mut router = Router::new();
    build.apply(&mut router);

    // no validator in the chain: anything matches
    let res = router.handle(HandlerRequest::new(Method::GET, "/pets/not-a-number"));
    assert_eq!(res.status, 200);
}

#[test]
fn test_param_validator_per_method_opt_in() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "pets/:id.yaml",
        concat!(
            "get:\n",
            "  handler: ok\n",
            "  validateParams: true\n",
            "  schemaPaths:\n",
            "    parameters:\n",
            "      - name: id\n",
            "        in: path\n",
            "        schema: { type: string, pattern: '^[0-9]+$' }\n",
        ),
    );

    // global flag off, the method opts in by itself
    let build = build_routes(dir.path(), None, &registry(), BuildOptions::default()).unwrap();
    assert!(build.issues.is_empty());

    let mut router = Router::new();
    build.apply(&mut router);
    let res = router.handle(HandlerRequest::new(Method::GET, "/pets/xyz"));
    assert_eq!(res.status, 400);
}

#[test]
fn test_query_param_validation_optional_absent() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "pets.yaml",
        concat!(
            "get:\n",
            "  handler: ok\n",
            "  schemaPaths:\n",
            "    parameters:\n",
            "      - name: limit\n",
            "        in: query\n",
            "        required: false\n",
            "        schema: { type: string, pattern: '^[0-9]+$' }\n",
        ),
    );

    let build = build_routes(
        dir.path(),
        None,
        &registry(),
        BuildOptions {
            validate_params: true,
            ..Default::default()
        },
    )
    .unwrap();
    let mut router = Router::new();
    build.apply(&mut router);

    // absent optional query parameter validates silently
    let res = router.handle(HandlerRequest::new(Method::GET, "/pets"));
    assert_eq!(res.status, 200);

    // present but invalid is rejected
    let mut req = HandlerRequest::new(Method::GET, "/pets");
    req.query_params
        .push(("limit".to_string(), "lots".to_string()));
    let res = router.handle(req);
    assert_eq!(res.status, 400);

    let mut req = HandlerRequest::new(Method::GET, "/pets");
    req.query_params
        .push(("limit".to_string(), "10".to_string()));
    let res = router.handle(req);
    assert_eq!(res.status, 200);
}

#[test]
fn test_body_validator_with_component_ref() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "pets.yaml",
        concat!(
            "post:\n",
            "  handler: ok\n",
            "  schemaPaths:\n",
            "    requestBody:\n",
            "      required: true\n",
            "      content:\n",
            "        application/json:\n",
            "          schema:\n",
            "            $ref: '#/components/schemas/Pet'\n",
            "  schemaComponents:\n",
            "    Pet:\n",
            "      type: object\n",
            "      required: [name]\n",
            "      properties:\n",
            "        name: { type: string }\n",
        ),
    );

    let build = build_routes(
        dir.path(),
        None,
        &registry(),
        BuildOptions {
            validate_request_body: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert!(build.issues.is_empty());

    let mut router = Router::new();
    build.apply(&mut router);

    let mut req = HandlerRequest::new(Method::POST, "/pets");
    req.body = Some(json!({ "name": "Fluffy" }));
    assert_eq!(router.handle(req).status, 200);

    let mut req = HandlerRequest::new(Method::POST, "/pets");
    req.body = Some(json!({ "species": "cat" }));
    let res = router.handle(req);
    assert_eq!(res.status, 400);
    assert_eq!(res.body["error"], "Request body is not valid");
    assert!(!res.body["errors"].as_array().unwrap().is_empty());
}

#[test]
fn test_validation_error_through_custom_err_handler() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "pets/:id.yaml", PARAM_ROUTE);

    let build = build_routes(
        dir.path(),
        None,
        &registry(),
        BuildOptions {
            validate_params: true,
            err_handler: Some(Arc::new(|res, err, _req| {
                res.status = 422;
                res.body = json!({ "wrapped": err.message, "count": err.errors.len() });
            })),
            ..Default::default()
        },
    )
    .unwrap();

    let mut router = Router::new();
    build.apply(&mut router);
    let res = router.handle(HandlerRequest::new(Method::GET, "/pets/bad"));
    assert_eq!(res.status, 422);
    assert_eq!(res.body["wrapped"], "Param 'id' is not valid");
    assert!(res.body["count"].as_u64().unwrap() >= 1);
}

#[test]
fn test_schema_emitted_with_validation_enabled() {
    // validators are middleware; the schema document is unaffected
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "pets/:id.yaml", PARAM_ROUTE);

    let build = build_routes(
        dir.path(),
        None,
        &registry(),
        BuildOptions {
            validate_params: true,
            validate_request_body: true,
            ..Default::default()
        },
    )
    .unwrap();

    let schema = build.schema.as_ref().unwrap();
    let params = &schema["paths"]["/pets/{id}"]["get"]["parameters"];
    assert_eq!(params[0]["name"], "id");
}
