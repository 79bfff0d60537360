//! Binding configuration loading.

use std::path::Path;

use anyhow::{Context, Result};
use sos_protocol::{BindingConfig, CodecRegistry};

/// Environment variable naming the binding configuration file.
pub const CONFIG_ENV: &str = "SOS_BINDINGS_CONFIG";

/// Load the binding configuration from a YAML file.
///
/// Returns `None` when no path is given or the file does not exist, in which
/// case every built-in binding is enabled.
pub fn load_binding_config(path: Option<&Path>) -> Result<Option<BindingConfig>> {
    let Some(path) = path else {
        return Ok(None);
    };

    if !path.exists() {
        tracing::warn!(
            "Binding config {} does not exist, using all built-in bindings",
            path.display()
        );
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read: {:?}", path))?;
    let config: BindingConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse binding config: {:?}", path))?;

    tracing::info!(
        "Loaded binding config for {} service(s) from {:?}",
        config.services.len(),
        path
    );
    Ok(Some(config))
}

/// Build the registry once for the lifetime of the process.
pub fn build_registry(path: Option<&Path>) -> Result<CodecRegistry> {
    match load_binding_config(path)? {
        Some(config) => CodecRegistry::from_config(&config)
            .with_context(|| format!("Invalid binding config: {:?}", path)),
        None => Ok(CodecRegistry::with_defaults()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixtures::documents;
    use test_utils::{find_test_file, temp_file_with};

    #[test]
    fn test_no_path_means_defaults() {
        assert!(load_binding_config(None).unwrap().is_none());
        let registry = build_registry(None).unwrap();
        assert_eq!(registry.len(), CodecRegistry::with_defaults().len());
    }

    #[test]
    fn test_missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        assert!(load_binding_config(Some(&path)).unwrap().is_none());
    }

    #[test]
    fn test_fixture_config() {
        let path = find_test_file(documents::BINDINGS_CONFIG).unwrap();
        let config = load_binding_config(Some(&path)).unwrap().unwrap();
        assert_eq!(config.services.len(), 2);
        assert!(config.services[1].operations.is_empty());

        let registry = build_registry(Some(&path)).unwrap();
        // Four SOS 2.0 operations plus every WCS 2.0.1 operation.
        assert_eq!(registry.len(), 5);
        assert!(registry.resolve("SOS", "DescribeSensor", "2.0.0").is_err());
        assert!(registry.resolve("WCS", "DescribeCoverage", "2.0.1").is_ok());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let file = temp_file_with("services: [not: {closed", ".yaml");
        let err = load_binding_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse binding config"));
    }

    #[test]
    fn test_unknown_binding_is_an_error() {
        let file = temp_file_with(
            "services:\n  - service: SOS\n    versions: [\"3.0.0\"]\n",
            ".yaml",
        );
        let err = build_registry(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Invalid binding config"));
    }
}
