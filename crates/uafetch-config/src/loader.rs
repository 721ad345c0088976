// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading.
//!
//! ```text
//! file ──► read ──► ${VAR:default} ──► parse (yaml|toml|json)
//!                                           │
//!          validate ◄── relative paths ◄── UAFETCH_* overrides
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use uafetch_opcua::{BrowseSettings, SecurityPolicy};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::HostConfig;

/// Default prefix of override variables.
pub const DEFAULT_ENV_PREFIX: &str = "UAFETCH";

// =============================================================================
// ConfigLoader
// =============================================================================

/// Loads [`HostConfig`] from files or strings.
///
/// # Examples
///
/// ```no_run
/// use uafetch_config::ConfigLoader;
///
/// let config = ConfigLoader::new().load("uafetch.yaml").unwrap();
/// println!("{}", config.client.endpoint_url);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    base_path: Option<PathBuf>,
    env_prefix: String,
    resolve_env_vars: bool,
    resolve_paths: bool,
}

impl ConfigLoader {
    /// Creates a loader with placeholder resolution, `UAFETCH_*` overrides
    /// and path resolution enabled.
    pub fn new() -> Self {
        Self {
            base_path: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            resolve_env_vars: true,
            resolve_paths: true,
        }
    }

    /// Creates a builder.
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder::new()
    }

    /// Sets the directory relative paths are resolved against.
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets the override variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables placeholders and overrides.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Enables or disables relative path resolution.
    pub fn with_path_resolution(mut self, enabled: bool) -> Self {
        self.resolve_paths = enabled;
        self
    }

    /// Loads configuration from a file; the format follows the extension.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<HostConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let base_path = self
            .base_path
            .clone()
            .or_else(|| path.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;
        debug!(format = format.extension(), "Detected configuration format");

        let mut config = self.parse_content(&content, format, path)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        if self.resolve_paths {
            self.resolve_relative_paths(&mut config, &base_path);
        }

        config.validate()?;

        info!(
            endpoint = %config.client.endpoint_url,
            browse = config.browse.is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Loads configuration from a string.
    ///
    /// Relative paths are resolved only when a base path was set.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<HostConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)?
        } else {
            content.to_string()
        };

        let mut config = self.parse_str(&content, format)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        if self.resolve_paths {
            if let Some(ref base_path) = self.base_path {
                self.resolve_relative_paths(&mut config, base_path);
            }
        }

        config.validate()?;

        Ok(config)
    }

    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    fn parse_content(
        &self,
        content: &str,
        format: ConfigFormat,
        path: &Path,
    ) -> ConfigResult<HostConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)?
        } else {
            content.to_string()
        };

        self.parse_str(&content, format).map_err(|e| match e {
            ConfigError::Serialization { message } => ConfigError::parse(path, message),
            other => other,
        })
    }

    fn parse_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<HostConfig> {
        match format {
            ConfigFormat::Yaml => serde_yaml_parse(content),
            ConfigFormat::Toml => {
                toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
            }
            ConfigFormat::Json => {
                serde_json::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
            }
        }
    }

    /// Replaces `${VAR_NAME}` and `${VAR_NAME:default}` placeholders.
    ///
    /// An unset variable without a default keeps its placeholder text.
    fn resolve_env_placeholders(&self, content: &str) -> ConfigResult<String> {
        let mut result = String::with_capacity(content.len());
        let mut chars = content.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' || chars.peek() != Some(&'{') {
                result.push(c);
                continue;
            }
            chars.next();

            let mut var_content = String::new();
            let mut found_close = false;
            for c in chars.by_ref() {
                if c == '}' {
                    found_close = true;
                    break;
                }
                var_content.push(c);
            }

            if !found_close {
                result.push_str("${");
                result.push_str(&var_content);
                continue;
            }

            let (var_name, default_value) = match var_content.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (var_content.as_str(), None),
            };

            match (env::var(var_name), default_value) {
                (Ok(value), _) => result.push_str(&value),
                (Err(_), Some(default)) => result.push_str(default),
                (Err(_), None) => {
                    warn!("Environment variable '{}' not found", var_name);
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        }

        Ok(result)
    }

    fn var_name(&self, suffix: &str) -> String {
        format!("{}_{}", self.env_prefix, suffix)
    }

    fn apply_env_overrides(&self, config: &mut HostConfig) -> ConfigResult<()> {
        if let Ok(value) = env::var(self.var_name("ENDPOINT_URL")) {
            debug!("Overriding endpoint_url from environment");
            config.client.endpoint_url = value;
        }

        let name = self.var_name("SECURITY_POLICY");
        if let Ok(value) = env::var(&name) {
            let policy = SecurityPolicy::parse_lenient(&value).ok_or_else(|| {
                ConfigError::invalid_env_var(
                    &name,
                    "expected None, Basic128Rsa15, Basic256 or Basic256Rsa256",
                )
            })?;
            config.client.security_policy = Some(policy);
        }

        if let Ok(value) = env::var(self.var_name("APPLICATION_NAME")) {
            config.client.application_name = value;
        }

        let name = self.var_name("MAX_RECURSIVE_DEPTH");
        if let Ok(value) = env::var(&name) {
            let depth: usize = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(&name, "expected a non-negative integer"))?;
            match config.browse {
                Some(ref mut browse) => browse.max_recursive_depth = depth,
                None => config.browse = Some(BrowseSettings::new(depth)),
            }
        }

        if let Ok(value) = env::var(self.var_name("OUTPUT_TARGET")) {
            config.output_target = if value.is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            };
        }

        Ok(())
    }

    fn resolve_relative_paths(&self, config: &mut HostConfig, base_path: &Path) {
        if config.client.pki_dir.is_relative() {
            config.client.pki_dir = base_path.join(&config.client.pki_dir);
        }

        if let Some(ref mut target) = config.output_target {
            if target.is_relative() {
                *target = base_path.join(&target);
            }
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigLoaderBuilder
// =============================================================================

/// Builder for ConfigLoader.
#[derive(Debug, Default)]
pub struct ConfigLoaderBuilder {
    base_path: Option<PathBuf>,
    env_prefix: Option<String>,
    resolve_env_vars: Option<bool>,
    resolve_paths: Option<bool>,
}

impl ConfigLoaderBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base path.
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets the environment prefix.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn resolve_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = Some(enabled);
        self
    }

    /// Enables or disables path resolution.
    pub fn resolve_paths(mut self, enabled: bool) -> Self {
        self.resolve_paths = Some(enabled);
        self
    }

    /// Builds the ConfigLoader.
    pub fn build(self) -> ConfigLoader {
        let mut loader = ConfigLoader::new();

        if let Some(base_path) = self.base_path {
            loader.base_path = Some(base_path);
        }
        if let Some(prefix) = self.env_prefix {
            loader.env_prefix = prefix;
        }
        if let Some(resolve_env_vars) = self.resolve_env_vars {
            loader.resolve_env_vars = resolve_env_vars;
        }
        if let Some(resolve_paths) = self.resolve_paths {
            loader.resolve_paths = resolve_paths;
        }

        loader
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// YAML goes through the `config` crate's YAML source.
fn serde_yaml_parse<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .map_err(|e| ConfigError::serialization(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::serialization(e.to_string()))
}

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<HostConfig> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with the specified format.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<HostConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use uafetch_opcua::{DepthLimitPolicy, UrlMatch};

    const YAML: &str = r#"
client:
  endpoint_url: opc.tcp://plc.local:4840
  security_policy: Basic256
  application_name: line-3
  pki_dir: ./pki
  timeouts:
    read: 2s
browse:
  starting_node: i=85
  max_recursive_depth: 3
  print_indentation: true
  depth_limit_policy: abort_traversal
output_target: out/tree.txt
"#;

    fn isolated(prefix: &str) -> ConfigLoader {
        ConfigLoader::builder().env_prefix(prefix).build()
    }

    #[test]
    fn test_load_yaml() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let config = isolated("UAFETCH_LOADER_YAML").load(file.path()).unwrap();
        let base = file.path().parent().unwrap();

        assert_eq!(config.client.endpoint_url, "opc.tcp://plc.local:4840");
        assert_eq!(config.client.security_policy, Some(SecurityPolicy::Basic256));
        assert_eq!(config.client.application_name, "line-3");
        assert_eq!(config.client.pki_dir, base.join("./pki"));
        assert_eq!(config.client.timeouts.read, std::time::Duration::from_secs(2));
        assert_eq!(config.client.url_match, UrlMatch::Exact);

        let browse = config.browse.unwrap();
        assert_eq!(browse.starting_node.as_deref(), Some("i=85"));
        assert_eq!(browse.max_recursive_depth, 3);
        assert!(browse.print_indentation);
        assert_eq!(browse.depth_limit_policy, DepthLimitPolicy::AbortTraversal);

        assert_eq!(config.output_target, Some(base.join("out/tree.txt")));
    }

    #[test]
    fn test_load_toml() {
        let toml = r#"
output_target = "/tmp/uafetch.out"

[client]
endpoint_url = "opc.tcp://localhost:4840"
security_policy = "None"

[browse]
max_recursive_depth = 1
"#;
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(toml.as_bytes()).unwrap();

        let config = isolated("UAFETCH_LOADER_TOML").load(file.path()).unwrap();
        assert_eq!(config.client.security_policy, Some(SecurityPolicy::None));
        assert_eq!(config.browse.unwrap().max_recursive_depth, 1);
        assert_eq!(config.output_target, Some(PathBuf::from("/tmp/uafetch.out")));
    }

    #[test]
    fn test_unknown_policy_is_unset() {
        let json = r#"{ "client": { "endpoint_url": "opc.tcp://h:4840", "security_policy": "Aes256" } }"#;
        let config = isolated("UAFETCH_LOADER_UNSET")
            .load_from_str(json, ConfigFormat::Json)
            .unwrap();
        assert_eq!(config.client.security_policy, None);
    }

    #[test]
    fn test_missing_endpoint_url() {
        let result = isolated("UAFETCH_LOADER_MISSING")
            .load_from_str(r#"{ "client": {} }"#, ConfigFormat::Json);
        assert!(matches!(result, Err(ConfigError::Serialization { .. })));
    }

    #[test]
    fn test_wrong_scheme_rejected() {
        let result = isolated("UAFETCH_LOADER_SCHEME").load_from_str(
            r#"{ "client": { "endpoint_url": "https://h:443" } }"#,
            ConfigFormat::Json,
        );
        assert!(matches!(result, Err(ConfigError::Engine(_))));
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("uafetch.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("uafetch.TOML")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("uafetch.json")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigFormat::from_path(Path::new("uafetch.ini")).is_err());
        assert!(ConfigFormat::from_path(Path::new("uafetch")).is_err());
    }

    #[test]
    fn test_env_placeholder_with_default() {
        let loader = ConfigLoader::new();
        let result = loader
            .resolve_env_placeholders("url: ${UAFETCH_NONEXISTENT_VAR:opc.tcp://fallback:4840}")
            .unwrap();
        assert_eq!(result, "url: opc.tcp://fallback:4840");
    }

    #[test]
    fn test_env_placeholder_unset_is_kept() {
        let loader = ConfigLoader::new();
        let result = loader
            .resolve_env_placeholders("a: ${UAFETCH_NONEXISTENT_VAR} b: ${open")
            .unwrap();
        assert_eq!(result, "a: ${UAFETCH_NONEXISTENT_VAR} b: ${open");
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("UAFETCH_LOADER_ENV_ENDPOINT_URL", "opc.tcp://override:4841");
        env::set_var("UAFETCH_LOADER_ENV_SECURITY_POLICY", "basic256rsa256");
        env::set_var("UAFETCH_LOADER_ENV_MAX_RECURSIVE_DEPTH", "5");
        env::set_var("UAFETCH_LOADER_ENV_OUTPUT_TARGET", "/var/tmp/out.txt");

        let config = isolated("UAFETCH_LOADER_ENV")
            .load_from_str(
                r#"{ "client": { "endpoint_url": "opc.tcp://h:4840" } }"#,
                ConfigFormat::Json,
            )
            .unwrap();

        assert_eq!(config.client.endpoint_url, "opc.tcp://override:4841");
        assert_eq!(config.client.security_policy, Some(SecurityPolicy::Basic256Rsa256));
        assert_eq!(config.browse.unwrap().max_recursive_depth, 5);
        assert_eq!(config.output_target, Some(PathBuf::from("/var/tmp/out.txt")));
    }

    #[test]
    fn test_invalid_env_override() {
        env::set_var("UAFETCH_LOADER_BAD_MAX_RECURSIVE_DEPTH", "deep");
        let result = isolated("UAFETCH_LOADER_BAD").load_from_str(
            r#"{ "client": { "endpoint_url": "opc.tcp://h:4840" } }"#,
            ConfigFormat::Json,
        );
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn test_loader_builder() {
        let loader = ConfigLoader::builder()
            .env_prefix("MYAPP")
            .resolve_env_vars(false)
            .resolve_paths(false)
            .build();

        assert_eq!(loader.env_prefix, "MYAPP");
        assert!(!loader.resolve_env_vars);
        assert!(!loader.resolve_paths);
    }

    #[test]
    fn test_file_not_found() {
        let result = ConfigLoader::new().load("/nonexistent/path/uafetch.yaml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_parse_error_names_file() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(b"{ not json").unwrap();

        let result = isolated("UAFETCH_LOADER_PARSE").load(file.path());
        match result {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
