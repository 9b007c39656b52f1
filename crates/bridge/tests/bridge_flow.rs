use rexi_bridge::app::{DESCRIPTION_PATH, SCHEMA_DIR};
use rexi_bridge::ops::DESCRIPTION_NOT_FOUND;
use rexi_bridge::surface::{self, CALL_TOOL, LIST_ENDPOINTS_TOOL};
use rexi_bridge::{AppState, BridgeError, CallArgs, StartupOptions};
use rexi_http_dispatch::{DispatchError, HttpVerb};
use rexi_openapi_catalog::config::DEFAULT_BASE_URL;
use rexi_test_support::TestServer;
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;

fn description_for(base_url: &str) -> String {
    format!(
        r#"openapi: 3.0.3
info:
  title: Rexi
  version: "1"
servers:
  - url: {base_url}
paths:
  /widgets:
    get:
      summary: List widgets
      tags: [widgets]
    post:
      operationId: createWidget
      tags: [widgets, admin]
      requestBody:
        content:
          application/json: {{}}
  /widgets/{{id}}:
    get:
      tags: [widgets]
      parameters:
        - name: id
          in: path
          required: true
"#
    )
}

fn install_root(description: Option<&str>) -> TempDir {
    let root = TempDir::new().unwrap();
    if let Some(text) = description {
        let path = root.path().join(DESCRIPTION_PATH);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }
    let schemas = root.path().join(SCHEMA_DIR);
    std::fs::create_dir_all(&schemas).unwrap();
    std::fs::write(schemas.join("widget.json"), r#"{"title":"Widget"}"#).unwrap();
    std::fs::write(schemas.join("Account.json"), r#"{"title":"Account"}"#).unwrap();
    root
}

fn start(root: &Path, credential: Option<&str>) -> AppState {
    AppState::start(&StartupOptions {
        credential: credential.map(str::to_string),
        ..StartupOptions::new(root)
    })
    .unwrap()
}

#[tokio::test]
async fn discovers_and_calls_endpoints_from_the_description() {
    let server = TestServer::echo().await.unwrap();
    let root = install_root(Some(&description_for(server.base_url())));
    let state = start(root.path(), Some("k-123"));

    assert_eq!(state.config().base_url, server.base_url());

    let all = state.list_endpoints(None);
    assert_eq!(all.len(), 3);
    let admin = state.list_endpoints(Some("admin"));
    assert_eq!(admin.len(), 1);
    assert_eq!(admin[0].method, HttpVerb::Post);
    assert_eq!(admin[0].summary, "createWidget");
    assert!(admin[0].has_request_body);

    let args = CallArgs {
        path_params: Some(json!({"id": 42}).as_object().unwrap().clone()),
        query: Some(json!({"expand": "parts"}).as_object().unwrap().clone()),
        ..CallArgs::new("get", "/widgets/{id}")
    };
    let result = state.call_endpoint(args).await.unwrap();

    assert_eq!(result.status, 200);
    assert_eq!(
        result.url,
        format!("{}/widgets/42?expand=parts", server.base_url())
    );
    let echoed = result.data.into_value();
    assert_eq!(echoed["method"], "GET");
    assert_eq!(echoed["path"], "/widgets/42");
    assert_eq!(echoed["query"], "expand=parts");
    assert_eq!(echoed["headers"]["x-api-key"], "k-123");
    assert_eq!(echoed["headers"]["accept"], "application/json");

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn uncatalogued_paths_are_still_dispatched() {
    let server = TestServer::echo().await.unwrap();
    let root = install_root(Some(&description_for(server.base_url())));
    let state = start(root.path(), None);

    let args = CallArgs {
        body: Some(json!({"name": "w"})),
        ..CallArgs::new("PATCH", "/not/in/catalog")
    };
    let result = state.call_endpoint(args).await.unwrap();
    let echoed = result.data.into_value();
    assert_eq!(echoed["method"], "PATCH");
    assert_eq!(echoed["path"], "/not/in/catalog");
    assert_eq!(echoed["body"], r#"{"name":"w"}"#);
    assert!(echoed["headers"].get("x-api-key").is_none());

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn call_tool_reports_per_call_failures_as_error_results() {
    let server = TestServer::echo().await.unwrap();
    let root = install_root(Some(&description_for(server.base_url())));
    let state = start(root.path(), None);

    let failed = surface::call_tool(
        &state,
        CALL_TOOL,
        json!({"method": "GET", "path": "/widgets/{id}"}),
    )
    .await
    .unwrap();
    assert_eq!(failed.is_error, Some(true));

    // The failure leaves the next call unaffected.
    let ok = surface::call_tool(
        &state,
        CALL_TOOL,
        json!({"method": "GET", "path": "/widgets/{id}", "path_params": {"id": "a b"}}),
    )
    .await
    .unwrap();
    assert_eq!(ok.is_error, Some(false));
    let structured = ok.structured_content.unwrap();
    assert_eq!(structured["status"], 200);
    assert_eq!(structured["data"]["path"], "/widgets/a%20b");

    let listed = surface::call_tool(&state, LIST_ENDPOINTS_TOOL, json!({"tag": "admin"}))
        .await
        .unwrap();
    assert_eq!(listed.is_error, Some(false));

    assert!(matches!(
        surface::call_tool(&state, "nope", Value::Null).await,
        Err(BridgeError::UnknownTool(_))
    ));

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn direct_call_errors_keep_their_kind() {
    let root = install_root(None);
    let state = start(root.path(), None);

    let err = state
        .call_endpoint(CallArgs::new("GET", "/widgets/{id}"))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::MissingParameter { ref name } if name == "id"));

    let err = state
        .call_endpoint(CallArgs::new("FETCH", "/widgets"))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::UnsupportedMethod(_)));
}

#[test]
fn resources_expose_description_routes_and_schemas() {
    let text = description_for("https://staging.rexi.sh");
    let root = install_root(Some(&text));
    let state = start(root.path(), None);

    assert_eq!(
        surface::read_resource(&state, surface::DESCRIPTION_URI).unwrap(),
        text
    );

    let routes: Value =
        serde_json::from_str(&surface::read_resource(&state, surface::ROUTES_URI).unwrap())
            .unwrap();
    assert_eq!(routes.as_array().unwrap().len(), 3);
    assert_eq!(routes[2]["path"], "/widgets/{id}");
    assert_eq!(routes[2]["summary"], "GET /widgets/{id}");
    assert_eq!(routes[2]["parameters"][0]["name"], "id");

    let index: Value =
        serde_json::from_str(&surface::read_resource(&state, surface::SCHEMA_INDEX_URI).unwrap())
            .unwrap();
    assert_eq!(index, json!(["Account.json", "widget.json"]));

    assert_eq!(
        surface::read_resource(&state, "rexi-schemas://widget.json").unwrap(),
        r#"{"title":"Widget"}"#
    );
    assert_eq!(
        surface::read_resource(&state, "rexi-schemas://../schema/widget.json").unwrap(),
        r#"{"title":"Widget"}"#
    );

    let missing: Value = serde_json::from_str(&state.schema_document("x.json").unwrap()).unwrap();
    assert_eq!(missing, json!({"error": "schema 'x.json' not found"}));

    assert!(matches!(
        surface::read_resource(&state, "rexi://nope"),
        Err(BridgeError::UnknownResource(_))
    ));
}

#[test]
fn missing_description_degrades_gracefully() {
    let root = install_root(None);
    let state = start(root.path(), None);

    assert_eq!(state.description_document(), DESCRIPTION_NOT_FOUND);
    assert!(state.list_endpoints(None).is_empty());
    assert_eq!(state.routes_index().unwrap(), "[]");
    assert_eq!(state.config().base_url, DEFAULT_BASE_URL);
    // Schema documents do not depend on the description.
    assert_eq!(state.schemas().names().len(), 2);
}

#[test]
fn base_url_override_wins_over_description() {
    let root = install_root(Some(&description_for("https://staging.rexi.sh")));
    let state = AppState::start(&StartupOptions {
        base_url: Some("http://127.0.0.1:9".to_string()),
        ..StartupOptions::new(root.path())
    })
    .unwrap();
    assert_eq!(state.config().base_url, "http://127.0.0.1:9");
}
