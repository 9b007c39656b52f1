//! Read-only runtime settings shared by every dispatch.

use std::fmt;

/// Header the credential is sent under.
pub const CREDENTIAL_HEADER: &str = "x-api-key";

/// A static secret attached to outbound requests.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a secret. Empty or whitespace-only values are treated as "no credential".
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Effective base URL and credential, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Absolute `http(s)` URL every request path is joined onto.
    pub base_url: String,
    pub credential: Option<Credential>,
}

impl RuntimeConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, credential: Option<Credential>) -> Self {
        Self {
            base_url: base_url.into(),
            credential,
        }
    }
}
