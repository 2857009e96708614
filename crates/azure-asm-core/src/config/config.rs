//! Configuration management for Service Management tools
//!
//! Handles configuration loading from files and environment variables.
//! Configuration is stored in TOML format with support for multiple named
//! profiles, one per subscription.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::{ConfigError, Result};

/// Environment variable overriding the profile's subscription id
pub const ENV_SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
/// Environment variable overriding the profile's management certificate path
pub const ENV_MANAGEMENT_CERTIFICATE: &str = "AZURE_MANAGEMENT_CERTIFICATE";
/// Environment variable overriding the profile's management endpoint
pub const ENV_MANAGEMENT_URL: &str = "AZURE_MANAGEMENT_URL";

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when no explicit profile is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Individual profile configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Profile {
    /// Subscription id all requests are scoped to
    pub subscription_id: String,
    /// Path to the PEM management certificate used as TLS client identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_certificate: Option<String>,
    /// Management endpoint, defaulting to the public cloud
    #[serde(default = "default_management_url")]
    pub management_url: String,
}

fn default_management_url() -> String {
    azure_asm::DEFAULT_MANAGEMENT_URL.to_string()
}

impl Profile {
    /// Copy of this profile with environment variable overrides applied.
    ///
    /// `AZURE_SUBSCRIPTION_ID`, `AZURE_MANAGEMENT_CERTIFICATE` and
    /// `AZURE_MANAGEMENT_URL` take precedence over the stored values, so a
    /// CI job can redirect a profile without editing the config file.
    #[must_use]
    pub fn with_env_overrides(&self) -> Self {
        let mut profile = self.clone();
        if let Ok(value) = std::env::var(ENV_SUBSCRIPTION_ID) {
            profile.subscription_id = value;
        }
        if let Ok(value) = std::env::var(ENV_MANAGEMENT_CERTIFICATE) {
            profile.management_certificate = Some(value);
        }
        if let Ok(value) = std::env::var(ENV_MANAGEMENT_URL) {
            profile.management_url = value;
        }
        profile
    }

    /// Build a management API client from this profile.
    ///
    /// Environment variable overrides are applied first; the certificate
    /// path supports `~` expansion.
    pub fn client(&self) -> azure_asm::Result<azure_asm::AsmClient> {
        let profile = self.with_env_overrides();
        let mut builder = azure_asm::AsmClient::builder()
            .subscription_id(&profile.subscription_id)
            .base_url(&profile.management_url);
        if let Some(ref path) = profile.management_certificate {
            builder =
                builder.management_certificate(shellexpand::tilde(path).into_owned());
        }
        builder.build()
    }
}

impl Config {
    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        // Expand environment variables in the config content
        let expanded_content = Self::expand_env_vars(&content);

        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Save configuration to the standard location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        // Create parent directories if they don't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| ConfigError::SaveError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// Set or update a profile
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Remove a profile by name
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        self.profiles.remove(name)
    }

    /// List all profiles sorted by name
    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);
        profiles
    }

    /// Resolve which profile to use.
    ///
    /// Resolution order: the explicitly named profile, then the configured
    /// default, then the only profile when exactly one exists.
    pub fn resolve_profile(&self, explicit_profile: Option<&str>) -> Result<&Profile> {
        if let Some(name) = explicit_profile {
            return self
                .profiles
                .get(name)
                .ok_or_else(|| ConfigError::ProfileNotFound {
                    name: name.to_string(),
                });
        }

        if let Some(ref default) = self.default_profile {
            return self
                .profiles
                .get(default)
                .ok_or_else(|| ConfigError::ProfileNotFound {
                    name: default.clone(),
                });
        }

        if self.profiles.len() == 1 {
            return Ok(self.profiles.values().next().unwrap());
        }

        if self.profiles.is_empty() {
            Err(ConfigError::NoProfiles {
                suggestion: "Add a [profiles.<name>] section to the config file.".to_string(),
            })
        } else {
            let mut names: Vec<_> = self.profiles.keys().map(String::as_str).collect();
            names.sort_unstable();
            Err(ConfigError::NoProfiles {
                suggestion: format!(
                    "Multiple profiles exist ({}); name one explicitly or set default_profile.",
                    names.join(", ")
                ),
            })
        }
    }

    /// Get the path to the configuration file
    ///
    /// On Linux: ~/.config/azure-asm/config.toml
    /// On macOS: ~/Library/Application Support/com.azure.azure-asm/config.toml
    /// On Windows: %APPDATA%\azure\azure-asm\config.toml
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("com", "azure", "azure-asm").ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand environment variables in configuration content
    ///
    /// Supports ${VAR} and ${VAR:-default} syntax for environment variable
    /// expansion. This allows configs to reference environment variables
    /// while maintaining static fallback values.
    ///
    /// Example:
    /// ```toml
    /// subscription_id = "${AZURE_SUBSCRIPTION_ID}"
    /// management_url = "${AZURE_MANAGEMENT_URL:-https://management.core.windows.net}"
    /// ```
    fn expand_env_vars(content: &str) -> String {
        // shellexpand::env_with_context_no_errors returns unexpanded vars
        // as-is, so env vars for unused profiles may stay unset
        let expanded =
            shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok());
        expanded.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> Profile {
        Profile {
            subscription_id: "a1b2c3d4".to_string(),
            management_certificate: Some("~/.azure/management.pem".to_string()),
            management_url: default_management_url(),
        }
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.set_profile("production".to_string(), sample_profile());
        config.default_profile = Some("production".to_string());

        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(config.default_profile, deserialized.default_profile);
        assert_eq!(config.profiles.len(), deserialized.profiles.len());
        assert_eq!(
            deserialized.profiles.get("production").unwrap().subscription_id,
            "a1b2c3d4"
        );
    }

    #[test]
    fn test_management_url_defaults_to_public_cloud() {
        let toml_content = r#"
[profiles.minimal]
subscription_id = "sub-1"
"#;
        let config: Config = toml::from_str(toml_content).unwrap();
        let profile = config.profiles.get("minimal").unwrap();
        assert_eq!(profile.management_url, azure_asm::DEFAULT_MANAGEMENT_URL);
        assert!(profile.management_certificate.is_none());
    }

    #[test]
    fn test_resolve_explicit_profile() {
        let mut config = Config::default();
        config.set_profile("prod".to_string(), sample_profile());

        let profile = config.resolve_profile(Some("prod")).unwrap();
        assert_eq!(profile.subscription_id, "a1b2c3d4");

        let err = config.resolve_profile(Some("missing")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_resolve_default_profile() {
        let mut config = Config::default();
        config.set_profile("prod".to_string(), sample_profile());
        config.set_profile(
            "staging".to_string(),
            Profile {
                subscription_id: "staging-sub".to_string(),
                management_certificate: None,
                management_url: default_management_url(),
            },
        );
        config.default_profile = Some("staging".to_string());

        let profile = config.resolve_profile(None).unwrap();
        assert_eq!(profile.subscription_id, "staging-sub");
    }

    #[test]
    fn test_resolve_single_profile_without_default() {
        let mut config = Config::default();
        config.set_profile("only".to_string(), sample_profile());

        let profile = config.resolve_profile(None).unwrap();
        assert_eq!(profile.subscription_id, "a1b2c3d4");
    }

    #[test]
    fn test_resolve_ambiguous_without_default() {
        let mut config = Config::default();
        config.set_profile("a".to_string(), sample_profile());
        config.set_profile("b".to_string(), sample_profile());

        let err = config.resolve_profile(None).unwrap_err();
        assert!(err.to_string().contains("default_profile"));
    }

    #[test]
    fn test_resolve_no_profiles() {
        let config = Config::default();
        let err = config.resolve_profile(None).unwrap_err();
        assert!(err.to_string().contains("No profiles"));
    }

    #[test]
    fn test_remove_profile_clears_default() {
        let mut config = Config::default();
        config.set_profile("prod".to_string(), sample_profile());
        config.default_profile = Some("prod".to_string());

        assert!(config.remove_profile("prod").is_some());
        assert!(config.default_profile.is_none());
    }

    #[test]
    #[serial_test::serial]
    fn test_env_var_expansion() {
        unsafe {
            std::env::set_var("TEST_SUBSCRIPTION", "expanded-sub");
        }

        let content = r#"
[profiles.test]
subscription_id = "${TEST_SUBSCRIPTION}"
"#;

        let expanded = Config::expand_env_vars(content);
        assert!(expanded.contains("expanded-sub"));

        unsafe {
            std::env::remove_var("TEST_SUBSCRIPTION");
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_env_var_expansion_with_defaults() {
        unsafe {
            std::env::remove_var("NONEXISTENT_VAR");
        }

        let content = r#"
[profiles.test]
subscription_id = "${NONEXISTENT_VAR:-fallback-sub}"
management_url = "${NONEXISTENT_URL:-https://management.core.windows.net}"
"#;

        let expanded = Config::expand_env_vars(content);
        assert!(expanded.contains("fallback-sub"));
        assert!(expanded.contains("https://management.core.windows.net"));
    }

    #[test]
    #[serial_test::serial]
    fn test_profile_env_overrides() {
        unsafe {
            std::env::set_var(ENV_SUBSCRIPTION_ID, "override-sub");
            std::env::set_var(ENV_MANAGEMENT_URL, "https://management.example.test");
            std::env::remove_var(ENV_MANAGEMENT_CERTIFICATE);
        }

        let profile = sample_profile().with_env_overrides();
        assert_eq!(profile.subscription_id, "override-sub");
        assert_eq!(profile.management_url, "https://management.example.test");
        // untouched when the env var is unset
        assert_eq!(
            profile.management_certificate.as_deref(),
            Some("~/.azure/management.pem")
        );

        unsafe {
            std::env::remove_var(ENV_SUBSCRIPTION_ID);
            std::env::remove_var(ENV_MANAGEMENT_URL);
        }
    }
}
