// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! uafetch - OPC UA value reader and address space lister
//!
//! Main binary entry point.

use uafetch_bin::error::report_error_and_exit;
use uafetch_bin::{commands, init_logging, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    init_logging(cli.effective_log_level(), cli.log_format);

    tracing::debug!(config = %cli.config.display(), "uafetch v{}", uafetch_bin::VERSION);

    if let Err(error) = commands::execute(cli).await {
        report_error_and_exit(error);
    }
}
