//! Error types for `rexi-openapi-catalog`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read API description '{path}': {source}")]
    DescriptionRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The description is not valid YAML/JSON. Fatal at startup.
    #[error("failed to parse API description '{path}': {source}")]
    DescriptionParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The description parsed, but its root is not a mapping. Fatal at startup.
    #[error("API description '{path}' must be a mapping at the top level, found {found}")]
    DescriptionShape { path: String, found: &'static str },

    #[error("invalid base URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("failed to read schema document '{path}': {source}")]
    SchemaRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
