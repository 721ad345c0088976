// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Host configuration schema.
//!
//! ```text
//! HostConfig
//! ├── client: ClientSettings      (required)
//! ├── browse: BrowseSettings      (optional, needed by `browse`)
//! └── output_target: PathBuf      (optional, stdout when absent)
//! ```
//!
//! Engine-level sections reuse the types of `uafetch-opcua` so a file
//! deserializes straight into what the engine consumes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uafetch_opcua::{BrowseSettings, ClientSettings};

use crate::error::{ConfigError, ConfigResult};

/// Root of the host configuration file.
///
/// # Examples
///
/// ```
/// use uafetch_config::{ConfigFormat, load_config_str};
///
/// let config = load_config_str(
///     r#"{ "client": { "endpoint_url": "opc.tcp://localhost:4840" } }"#,
///     ConfigFormat::Json,
/// )
/// .unwrap();
///
/// assert_eq!(config.client.endpoint_url, "opc.tcp://localhost:4840");
/// assert!(config.browse.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Connection settings.
    pub client: ClientSettings,

    /// Tree listing settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browse: Option<BrowseSettings>,

    /// File receiving successful output. Created or overwritten.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_target: Option<PathBuf>,
}

impl HostConfig {
    /// Creates a configuration for an endpoint with defaults elsewhere.
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            client: ClientSettings::new(endpoint_url),
            browse: None,
            output_target: None,
        }
    }

    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.client.validate()?;

        if let Some(ref browse) = self.browse {
            browse.start_node()?;
        }

        if let Some(ref target) = self.output_target {
            if target.as_os_str().is_empty() {
                return Err(ConfigError::validation("output_target", "must not be empty"));
            }
            if target.is_dir() {
                return Err(ConfigError::validation(
                    "output_target",
                    format!("{} is a directory", target.display()),
                ));
            }
        }

        Ok(())
    }

    /// Browse settings, or an error naming the missing section.
    pub fn browse_settings(&self) -> ConfigResult<&BrowseSettings> {
        self.browse.as_ref().ok_or_else(|| {
            ConfigError::validation("browse", "section is required for tree listings")
        })
    }
}
