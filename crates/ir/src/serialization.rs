//! Loading and saving resource definition files
//!
//! Resource definitions are plain serde documents in JSON or TOML. Every
//! file carries a `schema_version`; files written by a newer release are
//! rejected instead of being half understood.

use crate::registry::ResourceSet;
use crate::resource::ResourceDescriptor;
use crate::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tablewright_core::{EngineError, EngineResult};
use tracing::debug;

// ============================================================================
// ResourceFormat
// ============================================================================

/// On-disk format of a resource definition file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceFormat {
    Json,
    Toml,
}

impl ResourceFormat {
    /// Pick the format from a file extension; anything but `.toml` is JSON
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ResourceFormat::Toml,
            _ => ResourceFormat::Json,
        }
    }
}

// ============================================================================
// ResourceFile
// ============================================================================

/// Wrapper for resource files that includes version information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceFile {
    /// Schema version of the file
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Resources in migration order
    #[serde(default)]
    pub resources: Vec<ResourceDescriptor>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl ResourceFile {
    /// Create a file at the current schema version
    pub fn new(resources: Vec<ResourceDescriptor>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            resources,
        }
    }

    /// Reject files from a newer schema version
    pub fn check_version(&self) -> EngineResult<()> {
        if self.schema_version > SCHEMA_VERSION || self.schema_version == 0 {
            return Err(EngineError::SchemaVersionMismatch {
                expected: SCHEMA_VERSION,
                found: self.schema_version,
            });
        }
        Ok(())
    }

    /// Register every resource and freeze the result
    pub fn into_resource_set(self) -> EngineResult<ResourceSet> {
        self.check_version()?;
        ResourceSet::from_resources(self.resources)
    }
}

// ============================================================================
// Load / Save
// ============================================================================

/// Parse resource definitions from a string
pub fn parse_resources(content: &str, format: ResourceFormat) -> EngineResult<ResourceFile> {
    let file: ResourceFile = match format {
        ResourceFormat::Json => serde_json::from_str(content)?,
        ResourceFormat::Toml => toml::from_str(content)?,
    };
    file.check_version()?;
    Ok(file)
}

/// Load resource definitions from a JSON or TOML file
///
/// # Example
///
/// ```rust,ignore
/// use tablewright_ir::load_resources;
///
/// let resources = load_resources("resources.toml")?.into_resource_set()?;
/// ```
pub fn load_resources(path: impl AsRef<Path>) -> EngineResult<ResourceFile> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| EngineError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let file = parse_resources(&content, ResourceFormat::from_path(path)).map_err(|e| match e {
        EngineError::JsonSerialization(_) | EngineError::TomlParse(_) => EngineError::FileRead {
            path: path.to_path_buf(),
            message: format!("Invalid resource file: {}", e),
        },
        other => other,
    })?;

    debug!(path = %path.display(), resources = file.resources.len(), "loaded resource file");
    Ok(file)
}

/// Serialize resources to pretty JSON
pub fn to_json(resources: &[ResourceDescriptor]) -> EngineResult<String> {
    let file = ResourceFile::new(resources.to_vec());
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Save resources to a JSON file
pub fn save_resources(resources: &[ResourceDescriptor], path: impl AsRef<Path>) -> EngineResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, to_json(resources)?)?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDescriptor;
    use crate::relationship::RelationshipDescriptor;
    use tablewright_core::SemanticType;
    use tempfile::TempDir;

    const TOML_FILE: &str = r#"
schema_version = 1

[[resources]]
slug = "tags"

[[resources.fields]]
key = "name"
type = "short_text"
required = true
unique = true

[[resources]]
slug = "posts"

[[resources.fields]]
key = "title"
type = "text"
searchable = true

[[resources.fields]]
key = "tags"
relation = "belongs_to_many"
related = "tags"
pivot_table = "post_tags"
foreign_key = "post_id"
related_key = "tag_id"
"#;

    #[test]
    fn test_parse_toml() {
        let file = parse_resources(TOML_FILE, ResourceFormat::Toml).unwrap();
        assert_eq!(file.resources.len(), 2);

        let set = file.into_resource_set().unwrap();
        let posts = set.get("posts").unwrap();
        assert_eq!(posts.scalar_fields().next().unwrap().semantic_type, SemanticType::ShortText);
        assert_eq!(posts.relationships().count(), 1);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ResourceFormat::from_path("a/resources.toml"), ResourceFormat::Toml);
        assert_eq!(ResourceFormat::from_path("a/resources.json"), ResourceFormat::Json);
        assert_eq!(ResourceFormat::from_path("resources"), ResourceFormat::Json);
    }

    #[test]
    fn test_newer_schema_version_rejected() {
        let err = parse_resources(r#"{"schema_version": 99, "resources": []}"#, ResourceFormat::Json)
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::SchemaVersionMismatch { expected: 1, found: 99 }
        ));
    }

    #[test]
    fn test_missing_version_defaults_to_current() {
        let file = parse_resources(r#"{"resources": [{"slug": "users"}]}"#, ResourceFormat::Json)
            .unwrap();
        assert_eq!(file.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("resources.json");

        let resources = vec![
            ResourceDescriptor::new("users").field(FieldDescriptor::text("email").unique()),
            ResourceDescriptor::new("posts")
                .relationship(RelationshipDescriptor::belongs_to("author", "users")),
        ];
        save_resources(&resources, &path).unwrap();

        let loaded = load_resources(&path).unwrap();
        assert_eq!(loaded.resources, resources);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let err = load_resources("/nonexistent/resources.json").unwrap_err();
        if let EngineError::FileRead { path, .. } = err {
            assert!(path.to_string_lossy().contains("nonexistent"));
        } else {
            panic!("Expected FileRead error");
        }
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_resources(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid resource file"));
    }
}
