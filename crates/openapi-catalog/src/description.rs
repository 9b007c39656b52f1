//! Loading the API description document.
//!
//! The description is kept as a loosely-typed JSON tree instead of a strict `OpenAPI` model:
//! the catalog builder has to survive individual malformed entries, which a strict model would
//! reject wholesale. JSON is a valid subset of YAML, so `serde_yaml` alone handles both formats.

use crate::error::{CatalogError, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// A parsed API description: the root mapping of the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Description {
    root: Map<String, Value>,
}

impl Description {
    /// An empty description (no paths, no servers).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse description text (YAML or JSON).
    ///
    /// An empty (or all-comment) document parses to an empty description.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML, or if its root is not a mapping.
    pub fn parse(text: &str, location: &str) -> Result<Self> {
        let parsed: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| CatalogError::DescriptionParse {
                path: location.to_string(),
                source: e,
            })?;

        match yaml_to_json(parsed) {
            Value::Null => Ok(Self::empty()),
            Value::Object(root) => Ok(Self { root }),
            other => Err(CatalogError::DescriptionShape {
                path: location.to_string(),
                found: kind_of(&other),
            }),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// The `paths` section, if present.
    ///
    /// Returns `None` when the section is missing; a present but non-mapping section is returned
    /// as-is so the catalog builder can report it.
    #[must_use]
    pub fn paths(&self) -> Option<&Value> {
        self.root.get("paths").filter(|v| !v.is_null())
    }

    /// The `url` of the first entry in `servers`, if it is a non-empty string.
    #[must_use]
    pub fn first_server_url(&self) -> Option<&str> {
        self.root
            .get("servers")?
            .as_array()?
            .first()?
            .get("url")?
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.root.get("info")?.get("title")?.as_str()
    }
}

/// Outcome of loading the description from disk.
///
/// A missing file is not an error: the bridge keeps working with an empty catalog and reports
/// the document as unavailable.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptionLoad {
    Loaded {
        path: PathBuf,
        raw: String,
        description: Description,
    },
    Missing(PathBuf),
}

impl DescriptionLoad {
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Loaded { path, .. } | Self::Missing(path) => path,
        }
    }

    /// Split into the parsed description (empty when missing) and the raw document text.
    #[must_use]
    pub fn into_parts(self) -> (Description, Option<String>) {
        match self {
            Self::Loaded {
                raw, description, ..
            } => (description, Some(raw)),
            Self::Missing(_) => (Description::empty(), None),
        }
    }
}

/// Load the API description at `path`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, or if it is malformed. A file that
/// does not exist yields [`DescriptionLoad::Missing`].
pub fn load_description(path: &Path) -> Result<DescriptionLoad> {
    let location = path.display().to_string();

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("API description not found at {}", location);
            return Ok(DescriptionLoad::Missing(path.to_path_buf()));
        }
        Err(e) => {
            return Err(CatalogError::DescriptionRead {
                path: location,
                source: e,
            });
        }
    };

    tracing::info!("Loading API description from {}", location);
    let description = Description::parse(&raw, &location)?;

    Ok(DescriptionLoad::Loaded {
        path: path.to_path_buf(),
        raw,
        description,
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

// YAML allows non-string mapping keys (`200:` under `responses` is common); JSON does not, so
// keys are converted to their scalar text.
fn yaml_to_json(value: serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (yaml_key(k), yaml_to_json(v)))
                .collect(),
        ),
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => s,
        Yaml::Number(n) => n.to_string(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Null => "null".to_string(),
        other => match yaml_to_json(other) {
            Value::String(s) => s,
            v => v.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn parses_yaml_with_numeric_keys() {
        let text = r#"
openapi: 3.0.0
info:
  title: Rexi
  version: "1"
servers:
  - url: https://staging.rexi.sh
paths:
  /ping:
    get:
      responses:
        200:
          description: ok
"#;
        let description = Description::parse(text, "inline").unwrap();
        assert_eq!(description.title(), Some("Rexi"));
        assert_eq!(
            description.first_server_url(),
            Some("https://staging.rexi.sh")
        );
        let responses = &description.paths().unwrap()["/ping"]["get"]["responses"];
        assert_eq!(responses["200"]["description"], json!("ok"));
    }

    #[test]
    fn parses_json_text() {
        let description =
            Description::parse(r#"{"paths": {"/a": {"get": {}}}}"#, "inline.json").unwrap();
        assert!(description.paths().unwrap().get("/a").is_some());
        assert!(description.first_server_url().is_none());
    }

    #[test]
    fn preserves_path_order() {
        let text = "paths:\n  /zeta: {}\n  /alpha: {}\n  /mid: {}\n";
        let description = Description::parse(text, "inline").unwrap();
        let keys: Vec<&String> = description
            .paths()
            .and_then(Value::as_object)
            .unwrap()
            .keys()
            .collect();
        assert_eq!(keys, ["/zeta", "/alpha", "/mid"]);
    }

    #[test]
    fn empty_document_is_empty_description() {
        let description = Description::parse("# nothing here\n", "inline").unwrap();
        assert!(description.is_empty());
        assert!(description.paths().is_none());
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = Description::parse("paths: [unclosed", "broken.yaml").unwrap_err();
        assert!(matches!(err, CatalogError::DescriptionParse { .. }));
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn non_mapping_root_is_rejected() {
        let err = Description::parse("- a\n- b\n", "list.yaml").unwrap_err();
        assert!(matches!(
            err,
            CatalogError::DescriptionShape {
                found: "a sequence",
                ..
            }
        ));
    }

    #[test]
    fn blank_server_url_is_ignored() {
        let description = Description::parse("servers:\n  - url: '  '\n", "inline").unwrap();
        assert!(description.first_server_url().is_none());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs").join("openapi.generated.yaml");

        let load = load_description(&path).unwrap();
        assert!(load.is_missing());
        assert_eq!(load.path(), path.as_path());

        let (description, raw) = load.into_parts();
        assert!(description.is_empty());
        assert!(raw.is_none());
    }

    #[test]
    fn loaded_file_keeps_raw_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("openapi.yaml");
        let text = "openapi: 3.1.0\npaths: {}\n";
        std::fs::write(&path, text).unwrap();

        let (description, raw) = load_description(&path).unwrap().into_parts();
        assert_eq!(raw.as_deref(), Some(text));
        assert_eq!(description.root()["openapi"], json!("3.1.0"));
    }

    #[test]
    fn malformed_file_propagates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("openapi.yaml");
        std::fs::write(&path, "paths: {unclosed").unwrap();

        assert!(matches!(
            load_description(&path),
            Err(CatalogError::DescriptionParse { .. })
        ));
    }
}
