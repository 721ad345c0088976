// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # uafetch-bin
//!
//! Command line host for the uafetch OPC UA client engine.
//!
//! - CLI argument parsing with clap
//! - Logging initialization
//! - One engine invocation per command, outcome routed to a file or stdout
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         main.rs                             │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │
//!                    ┌──────▼──────┐
//!                    │    cli.rs   │
//!                    └──────┬──────┘
//!                           │
//!               ┌───────────┼───────────┐
//!               ▼           ▼           ▼
//!        ┌──────────┐ ┌──────────┐ ┌──────────┐
//!        │ commands │ │ connect  │ │ logging  │
//!        └────┬─────┘ └────┬─────┘ └──────────┘
//!             │            │
//!        ┌────▼─────┐ ┌────▼──────────┐
//!        │  output  │ │ uafetch-opcua │
//!        └──────────┘ └───────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Read one value
//! uafetch -c plant.yaml read "ns=2;s=Temperature"
//!
//! # Node ID from stdin
//! echo "ns=2;s=Temperature" | uafetch read --stdin
//!
//! # List the tree below the Objects folder, two levels deep
//! uafetch browse --start i=85 --depth 2 --indent
//!
//! # Show what the server advertises
//! uafetch endpoints --format json
//!
//! # Validate configuration
//! uafetch validate --show-config
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod connect;
pub mod error;
pub mod logging;
pub mod output;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use connect::{build_engine, engine_with_transport, DynEngine};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use output::OutputSink;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
