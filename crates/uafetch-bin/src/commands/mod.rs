// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `read`: Read one node value
//! - `browse`: List the node tree below a start node
//! - `endpoints`: Show advertised endpoints
//! - `validate`: Validate configuration file
//! - `version`: Show version information
//!
//! Each server command has a `run_*` half that takes an already built
//! engine, so hosts and tests can supply their own transport.

mod browse;
mod endpoints;
mod read;
mod validate;
mod version;

pub use browse::{browse, effective_browse_settings, run_browse};
pub use endpoints::{endpoints, render_endpoints};
pub use read::{read, run_read};
pub use validate::validate;
pub use version::version;

use uafetch_config::{ConfigLoader, HostConfig};

use crate::cli::{Cli, Commands};
use crate::error::{BinError, BinResult};

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.command.clone() {
        Commands::Read(args) => read::read(&cli, args).await,
        Commands::Browse(args) => browse::browse(&cli, args).await,
        Commands::Endpoints(args) => endpoints::endpoints(&cli, args).await,
        Commands::Validate(args) => validate::validate(&cli, args),
        Commands::Version => version::version(&cli),
    }
}

/// Loads the configuration named on the command line.
pub(crate) fn load_host_config(cli: &Cli) -> BinResult<HostConfig> {
    if !cli.config.exists() {
        return Err(BinError::Configuration(format!(
            "Configuration file not found: {}",
            cli.config.display()
        )));
    }

    ConfigLoader::new()
        .load(&cli.config)
        .map_err(|e| BinError::from(e).with_context(format!("loading {}", cli.config.display())))
}
