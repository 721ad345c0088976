// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use uafetch_config::HostConfig;

use crate::cli::{Cli, ValidateArgs};
use crate::error::BinResult;

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config = super::load_host_config(cli)?;
    let warnings = collect_warnings(&config);

    println!("✓ Configuration is valid: {}", cli.config.display());
    println!();
    println!("Summary:");
    println!("  Endpoint:        {}", config.client.endpoint_url);
    println!(
        "  Security policy: {}",
        config
            .client
            .security_policy
            .map(|p| p.name())
            .unwrap_or("(unset, None)")
    );
    println!("  Application:     {}", config.client.application_name);
    println!("  PKI directory:   {}", config.client.pki_dir.display());
    match config.browse {
        Some(ref browse) => println!(
            "  Browse:          start {}, depth {}",
            browse.starting_node.as_deref().unwrap_or("i=84"),
            browse.max_recursive_depth
        ),
        None => println!("  Browse:          (not configured)"),
    }
    println!(
        "  Output:          {}",
        config
            .output_target
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".to_string())
    );

    if !warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &warnings {
            println!("  ⚠ {}", warning);
        }
    }

    if args.show_config {
        println!();
        println!("Parsed configuration:");
        println!(
            "{}",
            serde_json::to_string_pretty(&config)
                .unwrap_or_else(|_| "(serialization error)".to_string())
        );
    }

    Ok(())
}

/// Non-fatal observations about a valid configuration.
pub(crate) fn collect_warnings(config: &HostConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    match config.client.security_policy {
        None => warnings.push("No security policy specified, None will be used".to_string()),
        Some(policy) if policy.is_deprecated() => {
            warnings.push(format!("Security policy {} is deprecated", policy.name()))
        }
        Some(_) => {}
    }

    if config.client.trust_server_certs {
        warnings.push("trust_server_certs is enabled; server certificates are not verified".to_string());
    }

    if config.client.security_policy.is_some_and(|p| p.requires_certificates())
        && !config.client.auto_generate_certificates
        && !config.client.pki_dir.exists()
    {
        warnings.push(format!(
            "PKI directory does not exist and auto generation is off: {}",
            config.client.pki_dir.display()
        ));
    }

    if let Some(ref browse) = config.browse {
        if browse.max_recursive_depth == 0 {
            warnings.push("max_recursive_depth is 0; tree listings will be empty".to_string());
        }
    }

    warnings
}
