use std::path::Path;

use meadow_kernel::GeneratorConfig;
use serde::Deserialize;

use crate::schedule::SavePolicy;
use crate::snapshot::STATE_KEY;
use crate::store::StoreError;

/// Session settings, usually read from an optional JSON file.
///
/// Every field has a default, so `{}` is a valid config:
/// ```json
/// {
///   "storage_key": "gameState",
///   "save_policy": { "kind": "duty_cycle", "window_ms": 5000 },
///   "generator": { "count": 30, "bounds": { "min": -90.0, "max": 90.0 } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub storage_key: String,
    pub save_policy: SavePolicy,
    pub generator: GeneratorConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: STATE_KEY.to_string(),
            save_policy: SavePolicy::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Read a config file. Invalid generation parameters fail here, at startup.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| {
            StoreError::Config {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Read `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, StoreError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config: SessionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.storage_key, "gameState");
        assert_eq!(config.generator.count(), 30);
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("meadow.json");
        std::fs::write(
            &path,
            r#"{"storage_key": "slot2", "generator": {"count": 4}}"#,
        )
        .unwrap();
        let config = SessionConfig::load(&path).unwrap();
        assert_eq!(config.storage_key, "slot2");
        assert_eq!(config.generator.count(), 4);
        assert_eq!(config.save_policy, SavePolicy::default());
    }

    #[test]
    fn negative_count_is_a_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("meadow.json");
        std::fs::write(&path, r#"{"generator": {"count": -1}}"#).unwrap();
        match SessionConfig::load(&path) {
            Err(StoreError::Config { source, .. }) => {
                assert!(source.to_string().contains("must not be negative"));
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(serde_json::from_str::<SessionConfig>(r#"{"seed": 4}"#).is_err());
    }

    #[test]
    fn missing_path_means_defaults() {
        assert_eq!(
            SessionConfig::load_or_default(None).unwrap(),
            SessionConfig::default()
        );
    }
}
