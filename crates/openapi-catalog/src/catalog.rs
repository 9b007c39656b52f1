//! Flattening the description into a catalog of endpoints.

use crate::description::Description;
use crate::error::Result;
use rexi_http_dispatch::HttpVerb;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One (verb, path) operation from the description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub method: HttpVerb,
    pub path: String,
    pub summary: String,
    /// Parameter entries exactly as the description lists them.
    pub parameters: Vec<Value>,
    pub has_request_body: bool,
    pub tags: Vec<String>,
}

impl EndpointDescriptor {
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Ordered list of endpoint descriptors, built once at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EndpointCatalog {
    endpoints: Vec<EndpointDescriptor>,
}

impl EndpointCatalog {
    #[must_use]
    pub fn endpoints(&self) -> &[EndpointDescriptor] {
        &self.endpoints
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Endpoints carrying `tag`, in catalog order.
    ///
    /// `None` or an empty tag selects the whole catalog. Matching is exact and case-sensitive.
    #[must_use]
    pub fn filter_by_tag(&self, tag: Option<&str>) -> Vec<&EndpointDescriptor> {
        match tag.filter(|t| !t.is_empty()) {
            None => self.endpoints.iter().collect(),
            Some(tag) => self.endpoints.iter().filter(|e| e.has_tag(tag)).collect(),
        }
    }

    /// Look up the descriptor for a literal (verb, path-template) pair.
    #[must_use]
    pub fn find(&self, method: HttpVerb, path: &str) -> Option<&EndpointDescriptor> {
        self.endpoints
            .iter()
            .find(|e| e.method == method && e.path == path)
    }

    /// The whole catalog as pretty-printed JSON (2-space indent).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.endpoints)?)
    }
}

/// A path or operation the builder could not use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: String,
    pub method: Option<HttpVerb>,
    pub reason: String,
}

/// Catalog plus whatever was skipped while building it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogBuild {
    pub catalog: EndpointCatalog,
    pub skipped: Vec<SkippedEntry>,
}

/// Build the endpoint catalog from a description.
///
/// Paths are visited in document order, and verbs within a path in [`HttpVerb::ALL`] order.
/// Keys under a path item that are not verbs (`parameters`, `summary`, `servers`, extensions)
/// are ignored. Entries that are not mappings are skipped and reported instead of failing the
/// whole build.
#[must_use]
pub fn build_catalog(description: &Description) -> CatalogBuild {
    let mut build = CatalogBuild::default();

    let paths = match description.paths() {
        None => return build,
        Some(Value::Object(paths)) => paths,
        Some(_) => {
            skip(&mut build, String::new(), None, "'paths' is not a mapping");
            return build;
        }
    };

    for (path, item) in paths {
        let Value::Object(item) = item else {
            skip(&mut build, path.clone(), None, "path item is not a mapping");
            continue;
        };

        for method in HttpVerb::ALL {
            let Some(operation) = item.get(method.description_key()) else {
                continue;
            };

            let empty = Map::new();
            let operation = match operation {
                Value::Object(op) => op,
                // A bare `get:` with no body is an operation with no details.
                Value::Null => &empty,
                _ => {
                    skip(
                        &mut build,
                        path.clone(),
                        Some(method),
                        "operation is not a mapping",
                    );
                    continue;
                }
            };

            build
                .catalog
                .endpoints
                .push(describe_operation(method, path, operation));
        }
    }

    tracing::info!("Discovered {} endpoints", build.catalog.len());
    build
}

fn describe_operation(
    method: HttpVerb,
    path: &str,
    operation: &Map<String, Value>,
) -> EndpointDescriptor {
    let summary = non_empty_str(operation.get("summary"))
        .or_else(|| non_empty_str(operation.get("operationId")))
        .map_or_else(|| format!("{method} {path}"), str::to_string);

    let parameters = match operation.get("parameters") {
        Some(Value::Array(params)) => params.clone(),
        _ => Vec::new(),
    };

    let tags = match operation.get("tags") {
        Some(Value::Array(tags)) => tags
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    EndpointDescriptor {
        method,
        path: path.to_string(),
        summary,
        parameters,
        has_request_body: operation.get("requestBody").is_some_and(|b| !b.is_null()),
        tags,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn skip(build: &mut CatalogBuild, path: String, method: Option<HttpVerb>, reason: &str) {
    match method {
        Some(m) => tracing::warn!("Skipping {} {}: {}", m, path, reason),
        None => tracing::warn!("Skipping path '{}': {}", path, reason),
    }
    build.skipped.push(SkippedEntry {
        path,
        method,
        reason: reason.to_string(),
    });
}
