//! Resolving the runtime config (base URL + credential) at startup.

use crate::description::Description;
use crate::error::{CatalogError, Result};
use rexi_http_dispatch::{Credential, RuntimeConfig};
use url::Url;

/// Base URL used when neither an override nor the description supplies one.
pub const DEFAULT_BASE_URL: &str = "https://api.rexi.sh";

/// Environment variable holding the API credential.
pub const CREDENTIAL_ENV: &str = "REXI_API_KEY";

/// Environment variable that overrides the base URL.
pub const BASE_URL_ENV: &str = "REXI_BASE_URL";

/// Where the effective base URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseUrlSource {
    Override,
    Description,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBaseUrl {
    pub url: String,
    pub source: BaseUrlSource,
}

/// Pick the base URL: explicit override, then the description's first server, then
/// [`DEFAULT_BASE_URL`].
///
/// A first server URL that is not an absolute `http(s)` URL (e.g. the relative `/v1`) is
/// ignored with a warning. Blank overrides count as absent.
///
/// # Errors
///
/// Returns an error if a non-blank override is not an absolute `http(s)` URL.
pub fn resolve_base_url(
    override_url: Option<&str>,
    description: &Description,
) -> Result<ResolvedBaseUrl> {
    if let Some(url) = override_url.map(str::trim).filter(|u| !u.is_empty()) {
        check_absolute_http(url)?;
        return Ok(ResolvedBaseUrl {
            url: url.to_string(),
            source: BaseUrlSource::Override,
        });
    }

    if let Some(url) = description.first_server_url() {
        match check_absolute_http(url) {
            Ok(()) => {
                return Ok(ResolvedBaseUrl {
                    url: url.to_string(),
                    source: BaseUrlSource::Description,
                });
            }
            Err(e) => {
                tracing::warn!("Ignoring server URL from API description: {}", e);
            }
        }
    }

    Ok(ResolvedBaseUrl {
        url: DEFAULT_BASE_URL.to_string(),
        source: BaseUrlSource::Default,
    })
}

/// Resolve the full runtime config from its inputs. Pure: the caller supplies the credential.
///
/// # Errors
///
/// Returns an error if the base URL override is invalid.
pub fn resolve_runtime_config(
    override_url: Option<&str>,
    description: &Description,
    credential: Option<String>,
) -> Result<RuntimeConfig> {
    let base = resolve_base_url(override_url, description)?;
    let credential = credential.and_then(Credential::new);

    tracing::info!(
        "Using base URL {} ({:?}), credential {}",
        base.url,
        base.source,
        if credential.is_some() { "set" } else { "not set" }
    );

    Ok(RuntimeConfig::new(base.url, credential))
}

/// Read the credential from [`CREDENTIAL_ENV`]. Unset, empty and non-UTF-8 values are absent.
#[must_use]
pub fn credential_from_env() -> Option<String> {
    std::env::var(CREDENTIAL_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

fn check_absolute_http(url: &str) -> Result<()> {
    let parsed = Url::parse(url).map_err(|e| CatalogError::InvalidBaseUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Ok(()),
        scheme => Err(CatalogError::InvalidBaseUrl {
            url: url.to_string(),
            message: format!("expected an absolute http(s) URL, got scheme '{scheme}'"),
        }),
    }
}
