//! The generic "call any endpoint" operation.
//!
//! [`Dispatcher::dispatch`] resolves the path template, joins it onto the configured base URL,
//! composes headers (defaults → credential → caller overrides), performs the exchange under the
//! caller's timeout, and normalizes the response. Non-2xx statuses are ordinary results; only
//! malformed calls and transport failures are errors.

use crate::config::{CREDENTIAL_HEADER, RuntimeConfig};
use crate::error::{DispatchError, Result};
use crate::path_template::{resolve_path, value_to_string};
use crate::redact::{redact_url, sanitize_reqwest_error};
use crate::verb::HttpVerb;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

pub const ACCEPT_JSON: &str = "application/json";

/// Timeout applied when the caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One invocation. Built per call and dropped afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    pub method: HttpVerb,
    /// Path template, possibly containing `{name}` placeholders.
    pub path: String,
    pub path_params: Map<String, Value>,
    /// Query values: `null` is omitted, arrays repeat the key.
    pub query: Map<String, Value>,
    /// JSON-encoded when present.
    pub body: Option<Value>,
    /// Overlaid last; a `null` value removes the header.
    pub extra_headers: Map<String, Value>,
    pub timeout: Duration,
}

impl CallRequest {
    #[must_use]
    pub fn new(method: HttpVerb, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            path_params: Map::new(),
            query: Map::new(),
            body: None,
            extra_headers: Map::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn path_params(mut self, params: Map<String, Value>) -> Self {
        self.path_params = params;
        self
    }

    #[must_use]
    pub fn query(mut self, query: Map<String, Value>) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn extra_headers(mut self, headers: Map<String, Value>) -> Self {
        self.extra_headers = headers;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Convert caller-supplied seconds into a timeout.
///
/// # Errors
///
/// Returns [`DispatchError::InvalidTimeout`] unless `secs` is positive and finite.
pub fn timeout_from_secs(secs: f64) -> Result<Duration> {
    if !(secs.is_finite() && secs > 0.0) {
        return Err(DispatchError::InvalidTimeout(secs));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| DispatchError::InvalidTimeout(secs))
}

/// Normalized outcome of a completed exchange, whatever its status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallResult {
    pub status: u16,
    /// Response headers in server order; repeated names are joined with `", "`.
    pub headers: Map<String, Value>,
    /// The request URL actually sent, query included.
    pub url: String,
    pub data: ResponseData,
}

/// Response body, decoded as JSON when possible.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseData {
    Json(Value),
    /// Body was not valid JSON; serialized as `{"text": ...}`.
    Raw { text: String },
}

impl ResponseData {
    #[must_use]
    pub fn decode(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(v) => ResponseData::Json(v),
            Err(_) => ResponseData::Raw {
                text: String::from_utf8_lossy(bytes).into_owned(),
            },
        }
    }

    #[must_use]
    pub fn is_raw(&self) -> bool {
        matches!(self, ResponseData::Raw { .. })
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            ResponseData::Json(v) => v,
            ResponseData::Raw { text } => serde_json::json!({ "text": text }),
        }
    }
}

/// Sends [`CallRequest`]s. Cheap to clone; holds no per-call state.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: Client,
}

impl Dispatcher {
    /// Build a dispatcher.
    ///
    /// Redirects are not followed (a 3xx is returned as-is) and idle connections are not kept
    /// between calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| DispatchError::Transport(sanitize_reqwest_error(&e)))?;
        Ok(Self { client })
    }

    /// Perform one call.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::MissingParameter`] if a path placeholder has no value, or
    ///   [`DispatchError::InvalidPathValue`] if one is `.` or `..` (no I/O happens in either case)
    /// - [`DispatchError::InvalidUrl`] / [`DispatchError::InvalidHeader`] for malformed input
    /// - [`DispatchError::Timeout`] if the exchange exceeds `request.timeout`
    /// - [`DispatchError::Transport`] for connection, DNS or body-read failures
    pub async fn dispatch(
        &self,
        request: &CallRequest,
        config: &RuntimeConfig,
    ) -> Result<CallResult> {
        let path = if request.path.contains('{') {
            resolve_path(&request.path, &request.path_params)?
        } else {
            request.path.clone()
        };
        let url = build_url(&config.base_url, &path, &request.query)?;
        let headers = compose_headers(config, &request.extra_headers)?;

        tracing::info!("Calling {} {}", request.method, request.path);

        let mut builder = self
            .client
            .request(request.method.to_method(), url.clone())
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let headers = collect_response_headers(response.headers());
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, headers, bytes))
        };

        let (status, headers, bytes) = match tokio::time::timeout(request.timeout, exchange).await
        {
            Ok(Ok(parts)) => parts,
            Ok(Err(e)) => return Err(DispatchError::Transport(sanitize_reqwest_error(&e))),
            Err(_) => {
                return Err(DispatchError::Timeout {
                    url: redact_url(&url),
                    timeout: request.timeout,
                });
            }
        };

        let data = ResponseData::decode(&bytes);
        if data.is_raw() {
            tracing::debug!(status, "response body is not JSON, returning raw text");
        }
        tracing::debug!(status, url = %redact_url(&url), "call completed");

        Ok(CallResult {
            status,
            headers,
            url: url.to_string(),
            data,
        })
    }
}

/// Join a base URL and a path with exactly one `/` between them.
///
/// At most one trailing slash is removed from `base_url` and at most one leading slash from
/// `path`, so the result is the same whether or not callers include them.
#[must_use]
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    let path = path.strip_prefix('/').unwrap_or(path);
    format!("{base}/{path}")
}

/// Join `path` onto `base_url` and append the query mapping.
///
/// # Errors
///
/// Returns [`DispatchError::InvalidUrl`] if the joined string is not a valid absolute URL.
pub fn build_url(base_url: &str, path: &str, query: &Map<String, Value>) -> Result<Url> {
    let joined = join_url(base_url, path);
    let mut url = Url::parse(&joined).map_err(|e| DispatchError::InvalidUrl {
        url: joined.clone(),
        message: e.to_string(),
    })?;

    let pairs = query_pairs(query);
    if !pairs.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    Ok(url)
}

fn query_pairs(query: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(query.len());
    for (key, value) in query {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items.iter().filter(|i| !i.is_null()) {
                    pairs.push((key.clone(), value_to_string(item)));
                }
            }
            other => pairs.push((key.clone(), value_to_string(other))),
        }
    }
    pairs
}

/// Default `accept`, then the credential (if any), then caller headers.
///
/// Header names compare case-insensitively, so a caller's `Accept` or `X-Api-Key` replaces the
/// default. A `null` caller value removes the header entirely.
///
/// # Errors
///
/// Returns [`DispatchError::InvalidHeader`] for names or values that are not valid HTTP.
pub fn compose_headers(
    config: &RuntimeConfig,
    extra_headers: &Map<String, Value>,
) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));

    if let Some(credential) = &config.credential {
        let mut value =
            HeaderValue::from_str(credential.expose()).map_err(|e| DispatchError::InvalidHeader {
                name: CREDENTIAL_HEADER.to_string(),
                message: e.to_string(),
            })?;
        value.set_sensitive(true);
        headers.insert(HeaderName::from_static(CREDENTIAL_HEADER), value);
    }

    for (name, value) in extra_headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| DispatchError::InvalidHeader {
                name: name.clone(),
                message: e.to_string(),
            })?;
        if value.is_null() {
            headers.remove(&header_name);
            continue;
        }
        let header_value = HeaderValue::from_str(&value_to_string(value)).map_err(|e| {
            DispatchError::InvalidHeader {
                name: name.clone(),
                message: e.to_string(),
            }
        })?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

fn collect_response_headers(headers: &HeaderMap) -> Map<String, Value> {
    let mut out = Map::new();
    for (name, value) in headers {
        let text = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match out.get_mut(name.as_str()) {
            Some(Value::String(existing)) => {
                existing.push_str(", ");
                existing.push_str(&text);
            }
            _ => {
                out.insert(name.as_str().to_string(), Value::String(text));
            }
        }
    }
    out
}
