// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `endpoints` command.

use uafetch_opcua::Endpoint;

use crate::cli::{Cli, EndpointsArgs, OutputFormat};
use crate::connect::build_engine;
use crate::error::{BinError, BinResult};

/// Executes the `endpoints` command.
pub async fn endpoints(cli: &Cli, args: EndpointsArgs) -> BinResult<()> {
    let config = super::load_host_config(cli)?;
    let engine = build_engine(&config)?;

    let endpoints = engine.list_endpoints().await?;
    println!("{}", render_endpoints(&endpoints, args.format)?);
    Ok(())
}

/// Renders discovered endpoints as a table or JSON.
pub fn render_endpoints(endpoints: &[Endpoint], format: OutputFormat) -> BinResult<String> {
    match format {
        OutputFormat::Text => Ok(render_table(endpoints)),
        OutputFormat::Json => serde_json::to_string_pretty(endpoints)
            .map_err(|e| BinError::io(format!("cannot encode endpoints: {}", e))),
    }
}

fn render_table(endpoints: &[Endpoint]) -> String {
    if endpoints.is_empty() {
        return "No endpoints advertised".to_string();
    }

    let rows: Vec<[String; 4]> = endpoints
        .iter()
        .map(|e| {
            let policy = e
                .security_policy()
                .map(|p| p.name().to_string())
                .unwrap_or_else(|| e.security_policy_uri.clone());
            [
                e.url.clone(),
                policy,
                e.security_mode.to_string(),
                e.security_level.to_string(),
            ]
        })
        .collect();

    let headers = ["URL", "POLICY", "MODE", "LEVEL"];
    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let render_row = |cells: [&str; 4]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render_row(headers)];
    for row in &rows {
        lines.push(render_row([
            row[0].as_str(),
            row[1].as_str(),
            row[2].as_str(),
            row[3].as_str(),
        ]));
    }
    lines.join("\n")
}
