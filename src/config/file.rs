//! Configuration file management
//!
//! Handles finding, loading, and saving suite configuration files.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::{ExecutionMode, ProbeSpec, SuiteConfig};

/// Configuration file locations (in order of precedence)
pub const CONFIG_LOCATIONS: &[&str] = &[
    "./suite-orchestrator.yaml",
    "./suite-orchestrator.yml",
    "./.suite-orchestrator.yaml",
    "~/.config/suite-orchestrator/config.yaml",
];

/// Find configuration file in standard locations
pub fn find_config_file() -> Option<PathBuf> {
    CONFIG_LOCATIONS
        .iter()
        .map(|location| expand_path(location))
        .find(|path| path.exists())
}

impl SuiteConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration
    pub fn example() -> Self {
        let mut config = SuiteConfig::default()
            .with_mode(ExecutionMode::Hybrid)
            .with_base_url("https://app.example.com");
        config.target.health_path = "/api/health".to_string();

        let probes = [
            (
                "authentication",
                vec![
                    ProbeSpec::get("signin page", "/signin").expect_status(200),
                    ProbeSpec::get("session without cookie", "/api/auth/session")
                        .expect_status(401),
                ],
            ),
            (
                "accessControl",
                vec![ProbeSpec::get("admin api is protected", "/api/admin").expect_status(403)],
            ),
            (
                "chatbot",
                vec![
                    ProbeSpec::get("chat page", "/chatbot").expect_status(200),
                    ProbeSpec::get("anonymous chat is rejected", "/api/chat")
                        .method("POST")
                        .header("content-type", "application/json")
                        .body(r#"{"message":"hello"}"#)
                        .expect_status(401),
                ],
            ),
            (
                "uiUx",
                vec![ProbeSpec::get("home page", "/")
                    .expect_status(200)
                    .require_header("content-type")],
            ),
            (
                "performance",
                vec![ProbeSpec::get("health latency", "/api/health").max_latency(1000)],
            ),
            (
                "security",
                vec![ProbeSpec::get("security headers", "/")
                    .require_header("strict-transport-security")
                    .require_header("x-content-type-options")],
            ),
            (
                "integration",
                vec![ProbeSpec::get("model listing", "/api/bedrock/region-info")],
            ),
        ];

        for (name, list) in probes {
            config.target.probes.insert(name.to_string(), list);
        }

        config
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModuleKind;
    use tempfile::tempdir;

    #[test]
    fn test_example_is_valid() {
        let config = SuiteConfig::example();
        assert!(config.validate().is_ok());
        assert_eq!(config.target.probes.len(), 7);
        assert_eq!(config.probes_for(ModuleKind::Security).len(), 1);
    }

    #[test]
    fn test_config_save_load_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = SuiteConfig::example();
        config.save(&path).unwrap();

        let loaded = SuiteConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_save_load_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = SuiteConfig::default().with_timeout_ms(5_000);
        config.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"timeoutPerModuleMs\": 5000"));

        let loaded = SuiteConfig::load(&path).unwrap();
        assert_eq!(loaded.execution.timeout_per_module_ms, 5_000);
    }

    #[test]
    fn test_load_rejects_unknown_module() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "enabledModules:\n  billing: true\n").unwrap();

        let err = SuiteConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Unknown module: billing"));
    }

    #[test]
    fn test_expand_path() {
        let path = expand_path("./test.yaml");
        assert_eq!(path, PathBuf::from("./test.yaml"));
    }
}
