//! API description → endpoint catalog.
//!
//! This crate loads the machine-readable API description, flattens it into a queryable endpoint
//! catalog, resolves the runtime config (base URL + credential) and serves the side catalog of
//! schema documents. Sending requests is `rexi-http-dispatch`'s job.

pub mod catalog;
pub mod config;
pub mod description;
pub mod error;
pub mod schemas;

pub use catalog::{CatalogBuild, EndpointCatalog, EndpointDescriptor, SkippedEntry, build_catalog};
pub use description::{Description, DescriptionLoad, load_description};
pub use error::{CatalogError, Result};
pub use schemas::{SchemaCatalog, SchemaLookup};
