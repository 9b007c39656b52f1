//! Process-wide state, assembled once at startup and read-only afterwards.

use anyhow::Context as _;
use rexi_http_dispatch::{Dispatcher, RuntimeConfig};
use rexi_openapi_catalog::config::resolve_runtime_config;
use rexi_openapi_catalog::{
    CatalogBuild, EndpointCatalog, SchemaCatalog, build_catalog, load_description,
};
use std::path::PathBuf;

/// Location of the API description, relative to the install root.
pub const DESCRIPTION_PATH: &str = "docs/openapi.generated.yaml";

/// Directory of standalone schema documents, relative to the install root.
pub const SCHEMA_DIR: &str = "schema";

#[derive(Debug, Clone)]
pub struct StartupOptions {
    /// Install root anchoring [`DESCRIPTION_PATH`] and [`SCHEMA_DIR`].
    pub root: PathBuf,
    /// Explicit base URL; wins over the description's servers.
    pub base_url: Option<String>,
    pub credential: Option<String>,
}

impl StartupOptions {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base_url: None,
            credential: None,
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    description_text: Option<String>,
    catalog: EndpointCatalog,
    config: RuntimeConfig,
    schemas: SchemaCatalog,
    dispatcher: Dispatcher,
}

impl AppState {
    /// Load the description, build the catalog, resolve config and index schema documents.
    ///
    /// A missing description or schema directory is tolerated (empty catalog / empty index).
    ///
    /// # Errors
    ///
    /// Returns an error if the description is malformed or unreadable, if the base URL override
    /// is invalid, or if the HTTP client cannot be built.
    pub fn start(options: &StartupOptions) -> anyhow::Result<Self> {
        let description_path = options.root.join(DESCRIPTION_PATH);
        let load = load_description(&description_path)
            .with_context(|| format!("load API description {}", description_path.display()))?;
        if load.is_missing() {
            tracing::warn!(
                "No API description at {}; starting with an empty catalog",
                load.path().display()
            );
        }
        let (description, description_text) = load.into_parts();
        if let Some(title) = description.title() {
            tracing::info!("Loaded API description '{}'", title);
        }

        let CatalogBuild { catalog, skipped } = build_catalog(&description);
        if !skipped.is_empty() {
            tracing::warn!(
                "Skipped {} malformed entries in the API description",
                skipped.len()
            );
        }

        let config = resolve_runtime_config(
            options.base_url.as_deref(),
            &description,
            options.credential.clone(),
        )
        .context("resolve runtime config")?;

        let schemas = SchemaCatalog::load(options.root.join(SCHEMA_DIR))
            .context("index schema documents")?;
        let dispatcher = Dispatcher::new().context("build HTTP client")?;

        Ok(Self {
            description_text,
            catalog,
            config,
            schemas,
            dispatcher,
        })
    }

    /// Raw description text as loaded at startup; `None` if the file was missing.
    #[must_use]
    pub fn description_text(&self) -> Option<&str> {
        self.description_text.as_deref()
    }

    #[must_use]
    pub fn catalog(&self) -> &EndpointCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    #[must_use]
    pub fn schemas(&self) -> &SchemaCatalog {
        &self.schemas
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}
