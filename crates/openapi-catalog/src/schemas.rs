//! Side catalog of standalone JSON schema documents.
//!
//! The index is taken once at startup; reads go to disk each time.

use crate::error::{CatalogError, Result};
use serde_json::json;
use std::path::PathBuf;

/// Result of looking up a schema document by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaLookup {
    Found(String),
    /// Carries the sanitized name that was looked up.
    NotFound(String),
}

impl SchemaLookup {
    /// Document text, or a small JSON error document naming the schema.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Found(text) => text,
            Self::NotFound(name) => {
                json!({ "error": format!("schema '{name}' not found") }).to_string()
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaCatalog {
    dir: PathBuf,
    names: Vec<String>,
}

impl SchemaCatalog {
    /// Index the `*.json` files directly inside `dir`, sorted by name.
    ///
    /// A missing directory yields an empty catalog. Hidden files are not indexed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be listed.
    pub fn load(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let read_err = |e| CatalogError::SchemaRead {
            path: dir.display().to_string(),
            source: e,
        };

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Schema directory {} not found", dir.display());
                return Ok(Self {
                    dir,
                    names: Vec::new(),
                });
            }
            Err(e) => return Err(read_err(e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(read_err)?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !name.starts_with('.') && name.ends_with(".json") {
                names.push(name);
            }
        }
        names.sort();

        tracing::debug!("Indexed {} schema documents", names.len());
        Ok(Self { dir, names })
    }

    /// Indexed file names, sorted.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Read a schema document by name.
    ///
    /// Only the final path component of `name` is used, so `../../etc/passwd` looks up
    /// `passwd` inside the schema directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn read(&self, name: &str) -> Result<SchemaLookup> {
        let safe = base_name(name);
        if matches!(safe, "" | "." | "..") {
            return Ok(SchemaLookup::NotFound(safe.to_string()));
        }

        let path = self.dir.join(safe);
        if !path.is_file() {
            return Ok(SchemaLookup::NotFound(safe.to_string()));
        }

        std::fs::read_to_string(&path)
            .map(SchemaLookup::Found)
            .map_err(|e| CatalogError::SchemaRead {
                path: path.display().to_string(),
                source: e,
            })
    }
}

/// Final path component, treating both `/` and `\` as separators.
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}
