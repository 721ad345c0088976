// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `read`: Read one node value
//! - `browse`: List the node tree below a start node
//! - `endpoints`: Show the endpoints a server advertises
//! - `validate`: Validate the configuration file
//! - `version`: Show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// uafetch - OPC UA value reader and address space lister
#[derive(Parser, Debug)]
#[command(
    name = "uafetch",
    author = "Sylvex <contact@sylvex.io>",
    version = uafetch_opcua::VERSION,
    about = "Read values and list node trees from OPC UA servers",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "uafetch.yaml",
        env = "UAFETCH_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "UAFETCH_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "UAFETCH_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Enable quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the uafetch CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Read the value of one node
    ///
    /// Prints `tag,value,server_timestamp`.
    Read(ReadArgs),

    /// List the node tree below a start node
    ///
    /// One node per line in depth-first order.
    Browse(BrowseArgs),

    /// Show the endpoints the configured server advertises
    Endpoints(EndpointsArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration without contacting the server.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `read` command.
#[derive(Args, Debug, Clone)]
pub struct ReadArgs {
    /// Node ID to read (e.g. ns=2;s=Temperature)
    #[arg(required_unless_present = "stdin")]
    pub tag: Option<String>,

    /// Read the node ID from stdin
    #[arg(long, conflicts_with = "tag")]
    pub stdin: bool,
}

/// Arguments for the `browse` command.
#[derive(Args, Debug, Clone, Default)]
pub struct BrowseArgs {
    /// Start node (defaults to the configured one, then i=84)
    #[arg(short, long)]
    pub start: Option<String>,

    /// Maximum depth below the start node
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Indent lines with "- " per depth level
    #[arg(short, long)]
    pub indent: bool,

    /// Output file (overrides output_target)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `endpoints` command.
#[derive(Args, Debug, Clone, Default)]
pub struct EndpointsArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective log level based on flags.
    pub fn effective_log_level(&self) -> &str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            &self.log_level
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
