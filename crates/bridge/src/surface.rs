//! MCP tool and resource descriptors for the bridge operations.
//!
//! Nothing here speaks the protocol: a host server lists these descriptors and forwards
//! `tools/call` and `resources/read` to [`call_tool`] and [`read_resource`].

use crate::app::AppState;
use crate::error::{BridgeError, Result};
use crate::ops::{CallArgs, DEFAULT_TIMEOUT_SECONDS};
use rmcp::model::{
    Annotated, CallToolResult, Content, JsonObject, RawResource, RawResourceTemplate, Resource,
    ResourceTemplate, Tool, ToolAnnotations,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

pub const SERVER_NAME: &str = "Rexi API MCP Server";

pub const INSTRUCTIONS: &str = "MCP server wrapping Rexi API. Use 'list_endpoints' to discover \
routes and 'call_rexi' to call them. OpenAPI spec and JSON schemas are available as resources.";

pub const LIST_ENDPOINTS_TOOL: &str = "list_endpoints";
pub const CALL_TOOL: &str = "call_rexi";

pub const DESCRIPTION_URI: &str = "rexi://openapi";
pub const ROUTES_URI: &str = "rexi://routes";
pub const SCHEMA_INDEX_URI: &str = "rexi://schemas";
pub const SCHEMA_URI_PREFIX: &str = "rexi-schemas://";
pub const SCHEMA_URI_TEMPLATE: &str = "rexi-schemas://{name}";

#[derive(Debug, Deserialize)]
struct ListEndpointsArgs {
    #[serde(default)]
    tag: Option<String>,
}

#[must_use]
pub fn list_tools() -> Vec<Tool> {
    let mut list = Tool::new(
        LIST_ENDPOINTS_TOOL,
        "List the endpoints of the Rexi API, optionally only those with a given tag.",
        Arc::new(schema_object(&json!({
            "type": "object",
            "properties": {
                "tag": {
                    "type": ["string", "null"],
                    "description": "Only return endpoints carrying this tag (exact match)."
                }
            }
        }))),
    );
    list.annotations = Some(ToolAnnotations {
        title: Some("List endpoints".to_string()),
        read_only_hint: Some(true),
        destructive_hint: Some(false),
        idempotent_hint: Some(true),
        open_world_hint: Some(false),
    });

    let mut call = Tool::new(
        CALL_TOOL,
        "Call any Rexi API endpoint. `{name}` placeholders in `path` are filled from \
         `path_params`; the API key header is added automatically.",
        Arc::new(schema_object(&json!({
            "type": "object",
            "properties": {
                "method": {
                    "type": "string",
                    "description": "HTTP method: GET, POST, PUT, PATCH, DELETE, HEAD or OPTIONS."
                },
                "path": {
                    "type": "string",
                    "description": "Path template from list_endpoints, e.g. /widgets/{id}."
                },
                "path_params": { "type": ["object", "null"] },
                "query": { "type": ["object", "null"] },
                "body": { "description": "JSON request body." },
                "extra_headers": { "type": ["object", "null"] },
                "timeout_seconds": { "type": "number", "default": DEFAULT_TIMEOUT_SECONDS }
            },
            "required": ["method", "path"]
        }))),
    );
    // The verb is only known per call, so only the open-world hint is certain.
    call.annotations = Some(ToolAnnotations {
        title: Some("Call Rexi API".to_string()),
        read_only_hint: Some(false),
        destructive_hint: None,
        idempotent_hint: None,
        open_world_hint: Some(true),
    });

    vec![list, call]
}

#[must_use]
pub fn list_resources() -> Vec<Resource> {
    vec![
        resource(
            DESCRIPTION_URI,
            "openapi",
            "The Rexi API OpenAPI description.",
            "application/yaml",
        ),
        resource(
            ROUTES_URI,
            "routes",
            "Index of every endpoint in the Rexi API.",
            "application/json",
        ),
        resource(
            SCHEMA_INDEX_URI,
            "schemas",
            "File names of the available JSON schema documents.",
            "application/json",
        ),
    ]
}

#[must_use]
pub fn list_resource_templates() -> Vec<ResourceTemplate> {
    let raw = RawResourceTemplate {
        uri_template: SCHEMA_URI_TEMPLATE.to_string(),
        name: "schema".to_string(),
        title: None,
        description: Some("A JSON schema document by file name.".to_string()),
        mime_type: Some("application/json".to_string()),
        icons: None,
    };
    vec![Annotated::new(raw, None)]
}

/// Run a tool.
///
/// Failures of the call itself (missing path parameter, timeout, ...) come back as a result with
/// `is_error` set, so the agent sees them; only an unknown tool or malformed arguments are errors.
///
/// # Errors
///
/// Returns [`BridgeError::UnknownTool`] or [`BridgeError::InvalidArguments`].
pub async fn call_tool(state: &AppState, name: &str, arguments: Value) -> Result<CallToolResult> {
    match name {
        LIST_ENDPOINTS_TOOL => {
            let args: ListEndpointsArgs = parse_arguments(name, arguments)?;
            let endpoints = state.list_endpoints(args.tag.as_deref());
            let text = serde_json::to_string(&endpoints)
                .map_err(|e| BridgeError::Catalog(e.into()))?;
            Ok(CallToolResult::success(vec![Content::text(text)]))
        }
        CALL_TOOL => {
            let args: CallArgs = parse_arguments(name, arguments)?;
            match state.call_endpoint(args).await {
                Ok(result) => {
                    let structured = serde_json::to_value(&result)
                        .map_err(|e| BridgeError::Catalog(e.into()))?;
                    let text = structured.to_string();
                    Ok(CallToolResult {
                        content: vec![Content::text(text)],
                        structured_content: Some(structured),
                        is_error: Some(false),
                        meta: None,
                    })
                }
                Err(e) => {
                    tracing::warn!("{} failed: {}", CALL_TOOL, e);
                    Ok(CallToolResult {
                        content: vec![Content::text(e.to_string())],
                        structured_content: None,
                        is_error: Some(true),
                        meta: None,
                    })
                }
            }
        }
        other => Err(BridgeError::UnknownTool(other.to_string())),
    }
}

/// Read a resource as text.
///
/// # Errors
///
/// Returns [`BridgeError::UnknownResource`] for URIs outside the bridge's resources, or a catalog
/// error if a document exists but cannot be read.
pub fn read_resource(state: &AppState, uri: &str) -> Result<String> {
    match uri {
        DESCRIPTION_URI => Ok(state.description_document().to_string()),
        ROUTES_URI => Ok(state.routes_index()?),
        SCHEMA_INDEX_URI => Ok(state.schema_index()?),
        _ => match uri.strip_prefix(SCHEMA_URI_PREFIX) {
            Some(name) => Ok(state.schema_document(name)?),
            None => Err(BridgeError::UnknownResource(uri.to_string())),
        },
    }
}

fn resource(uri: &str, name: &str, description: &str, mime_type: &str) -> Resource {
    let mut raw = RawResource::new(uri, name);
    raw.description = Some(description.to_string());
    raw.mime_type = Some(mime_type.to_string());
    Annotated::new(raw, None)
}

fn schema_object(schema: &Value) -> JsonObject {
    schema.as_object().cloned().unwrap_or_default()
}

fn parse_arguments<T: serde::de::DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    // Clients may send no arguments at all.
    let arguments = if arguments.is_null() {
        Value::Object(JsonObject::new())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| BridgeError::InvalidArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}
