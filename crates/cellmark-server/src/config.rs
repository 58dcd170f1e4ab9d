//! Server settings read from the environment.

use crate::error::{ServerError, ServerResult};
use cellmark_core::classes::ClassRegistry;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_BIND: &str = "0.0.0.0:3030";

/// Where to listen and where annotation files live.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// `None` means the platform data directory.
    pub data_dir: Option<PathBuf>,
    /// JSON class registry, the built-in classes when `None`.
    pub classes_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3030)),
            data_dir: None,
            classes_file: None,
        }
    }
}

impl ServerConfig {
    /// Read `CELLMARK_BIND`, `CELLMARK_DATA_DIR` and `CELLMARK_CLASSES`.
    pub fn from_env() -> ServerResult<Self> {
        let var = |name: &str| std::env::var(name).ok();
        Self::from_vars(var("CELLMARK_BIND"), var("CELLMARK_DATA_DIR"), var("CELLMARK_CLASSES"))
    }

    fn from_vars(bind: Option<String>, data_dir: Option<String>, classes_file: Option<String>) -> ServerResult<Self> {
        let bind = bind.filter(|s| !s.trim().is_empty());
        let bind = bind
            .as_deref()
            .unwrap_or(DEFAULT_BIND)
            .trim()
            .parse()?;
        let path = |value: Option<String>| value.filter(|s| !s.trim().is_empty()).map(PathBuf::from);
        Ok(Self {
            bind,
            data_dir: path(data_dir),
            classes_file: path(classes_file),
        })
    }

    /// Load the class registry named by `classes_file`.
    pub fn class_registry(&self) -> ServerResult<ClassRegistry> {
        let Some(path) = &self.classes_file else {
            return Ok(ClassRegistry::default());
        };
        let json = std::fs::read_to_string(path).map_err(|source| ServerError::ReadClasses {
            path: path.clone(),
            source,
        })?;
        ClassRegistry::from_json(&json).map_err(|source| ServerError::InvalidClasses {
            path: path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_vars(None, None, None).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_vars(
            Some("127.0.0.1:8080".to_string()),
            Some("/tmp/marks".to_string()),
            Some("/tmp/classes.json".to_string()),
        )
        .unwrap();
        assert_eq!(config.bind, SocketAddr::from(([127, 0, 0, 1], 8080)));
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/marks")));
        assert_eq!(config.classes_file, Some(PathBuf::from("/tmp/classes.json")));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = ServerConfig::from_vars(Some("  ".to_string()), Some(String::new()), None).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_class_registry_file() {
        assert_eq!(ServerConfig::default().class_registry().unwrap(), ClassRegistry::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.json");
        std::fs::write(
            &path,
            r##"{"classes": [{"id": "cell", "name": "Cell", "border": "#000000", "color": "#FFFFFF"}], "boundary_only": "cell"}"##,
        )
        .unwrap();
        let config = ServerConfig {
            classes_file: Some(path),
            ..ServerConfig::default()
        };
        assert_eq!(config.class_registry().unwrap().len(), 1);

        let missing = ServerConfig {
            classes_file: Some(dir.path().join("missing.json")),
            ..ServerConfig::default()
        };
        assert!(matches!(missing.class_registry(), Err(ServerError::ReadClasses { .. })));

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, r#"{"classes": []}"#).unwrap();
        let empty = ServerConfig {
            classes_file: Some(empty),
            ..ServerConfig::default()
        };
        assert!(matches!(empty.class_registry(), Err(ServerError::InvalidClasses { .. })));
    }

    #[test]
    fn test_invalid_bind() {
        let err = ServerConfig::from_vars(Some("nowhere".to_string()), None, None).unwrap_err();
        assert!(matches!(err, ServerError::InvalidBind(_)));
        assert!(err.to_string().starts_with("Invalid CELLMARK_BIND"));
    }
}
