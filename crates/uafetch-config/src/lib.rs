// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # uafetch-config
//!
//! Host configuration for the uafetch OPC UA client.
//!
//! ## Features
//!
//! - **Multi-Format Support**: YAML, TOML and JSON files, chosen by extension
//! - **Placeholders**: `${VAR}` and `${VAR:default}` in raw file content
//! - **Environment Overrides**: `UAFETCH_*` variables win over file values
//! - **Path Resolution**: relative `pki_dir` and `output_target` are resolved
//!   against the configuration file's directory
//!
//! ## Quick Start
//!
//! ```no_run
//! use uafetch_config::load_config;
//!
//! let config = load_config("uafetch.yaml").unwrap();
//! println!("Endpoint: {}", config.client.endpoint_url);
//! ```
//!
//! ## File Layout
//!
//! ```yaml
//! client:
//!   endpoint_url: "${PLC_URL:opc.tcp://localhost:4840}"
//!   security_policy: Basic256Rsa256
//!   application_name: uafetch
//!   pki_dir: ./pki
//!   timeouts:
//!     discovery: 10s
//!     read: 5s
//! browse:
//!   starting_node: i=85
//!   max_recursive_depth: 2
//!   print_indentation: true
//! output_target: ./out/result.txt
//! ```
//!
//! ## Environment Variables
//!
//! ```text
//! UAFETCH_ENDPOINT_URL=opc.tcp://plc:4840
//! UAFETCH_SECURITY_POLICY=Basic256
//! UAFETCH_APPLICATION_NAME=line-3
//! UAFETCH_MAX_RECURSIVE_DEPTH=4
//! UAFETCH_OUTPUT_TARGET=/var/lib/uafetch/out.txt
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod loader;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    load_config, load_config_str, ConfigFormat, ConfigLoader, ConfigLoaderBuilder,
    DEFAULT_ENV_PREFIX,
};
pub use schema::HostConfig;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
