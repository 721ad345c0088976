// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::cli::Cli;
use crate::error::BinResult;

/// Executes the `version` command to display version information.
pub fn version(_cli: &Cli) -> BinResult<()> {
    println!("uafetch - OPC UA value reader and address space lister");
    println!();
    println!("Version Information:");
    println!("  uafetch-bin:    {}", env!("CARGO_PKG_VERSION"));
    println!("  uafetch-opcua:  {}", uafetch_opcua::VERSION);
    println!("  uafetch-config: {}", uafetch_config::VERSION);
    println!();
    println!("Build Information:");
    println!("  Target:       {}", std::env::consts::ARCH);
    println!("  OS:           {}", std::env::consts::OS);
    println!();
    println!("Features:");
    println!(
        "  Server backend: {}",
        if cfg!(feature = "real-transport") { "opcua" } else { "disabled" }
    );
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
