//! The operations exposed to a calling agent.

use crate::app::AppState;
use rexi_http_dispatch::dispatcher::timeout_from_secs;
use rexi_http_dispatch::{CallRequest, CallResult, DispatchError, HttpVerb};
use rexi_openapi_catalog::{CatalogError, EndpointDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Returned by [`AppState::description_document`] when no description was loaded.
pub const DESCRIPTION_NOT_FOUND: &str = "OpenAPI spec not found.";

pub const DEFAULT_TIMEOUT_SECONDS: f64 = 30.0;

fn default_timeout_seconds() -> f64 {
    DEFAULT_TIMEOUT_SECONDS
}

/// Arguments of a generic endpoint call, as a calling agent supplies them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallArgs {
    /// HTTP verb, any case.
    pub method: String,
    /// Path template such as `/widgets/{id}`, or a literal path.
    pub path: String,
    #[serde(default)]
    pub path_params: Option<Map<String, Value>>,
    #[serde(default)]
    pub query: Option<Map<String, Value>>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub extra_headers: Option<Map<String, Value>>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: f64,
}

impl CallArgs {
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            path_params: None,
            query: None,
            body: None,
            extra_headers: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    /// Validate the verb and timeout and build the dispatcher request.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnsupportedMethod`] or [`DispatchError::InvalidTimeout`].
    pub fn into_request(self) -> Result<CallRequest, DispatchError> {
        let method: HttpVerb = self.method.parse()?;
        let mut request = CallRequest::new(method, self.path)
            .path_params(self.path_params.unwrap_or_default())
            .query(self.query.unwrap_or_default())
            .extra_headers(self.extra_headers.unwrap_or_default())
            .timeout(timeout_from_secs(self.timeout_seconds)?);
        if let Some(body) = self.body {
            request = request.body(body);
        }
        Ok(request)
    }
}

impl AppState {
    /// Catalogued endpoints, optionally only those carrying `tag`.
    #[must_use]
    pub fn list_endpoints(&self, tag: Option<&str>) -> Vec<EndpointDescriptor> {
        self.catalog()
            .filter_by_tag(tag)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Call any endpoint of the remote API.
    ///
    /// The path does not have to be catalogued; the lookup only feeds the logs.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's per-call error. Nothing is cached or shared between calls, so a
    /// failure here never affects other calls.
    pub async fn call_endpoint(&self, args: CallArgs) -> Result<CallResult, DispatchError> {
        let request = args.into_request()?;

        match self.catalog().find(request.method, &request.path) {
            Some(endpoint) => tracing::debug!(
                "{} {}: {}",
                request.method,
                request.path,
                endpoint.summary
            ),
            None => tracing::debug!(
                "{} {} is not in the endpoint catalog",
                request.method,
                request.path
            ),
        }

        self.dispatcher().dispatch(&request, self.config()).await
    }

    /// Raw API description text, or [`DESCRIPTION_NOT_FOUND`].
    #[must_use]
    pub fn description_document(&self) -> &str {
        self.description_text().unwrap_or(DESCRIPTION_NOT_FOUND)
    }

    /// The endpoint catalog as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn routes_index(&self) -> Result<String, CatalogError> {
        self.catalog().to_pretty_json()
    }

    /// Text of a schema document, or a JSON error object if there is no such document.
    ///
    /// # Errors
    ///
    /// Returns an error only if the document exists but cannot be read.
    pub fn schema_document(&self, name: &str) -> Result<String, CatalogError> {
        Ok(self.schemas().read(name)?.into_text())
    }

    /// Pretty-printed JSON array of schema document file names, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn schema_index(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(self.schemas().names())?)
    }
}
