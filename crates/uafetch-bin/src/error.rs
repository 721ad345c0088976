// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the uafetch binary.

use thiserror::Error;
use uafetch_opcua::OpcUaError;

/// Result type alias for uafetch-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors that can occur in the uafetch binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Config loading error.
    #[error("Config error: {0}")]
    Config(#[from] uafetch_config::ConfigError),

    /// The engine could not be built or a query failed outright.
    #[error("Engine error: {0}")]
    Engine(#[from] OpcUaError),

    /// An invocation ended in the failure outcome.
    #[error("Operation failed for '{input}'")]
    Operation {
        /// The payload that was being processed.
        input: String,
        /// Why.
        #[source]
        source: OpcUaError,
    },

    /// The binary was built without a server backend.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        /// The context description.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a failure-outcome error.
    pub fn operation(input: impl Into<String>, source: OpcUaError) -> Self {
        Self::Operation {
            input: input.into(),
            source,
        }
    }

    /// Creates an unsupported error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Creates an I/O error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Adds context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Config(_) => 1,
            Self::Unsupported(_) => 2,
            Self::Operation { .. } => 3,
            Self::Io(_) => 4,
            Self::Engine(_) => 5,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }
}

impl From<std::io::Error> for BinError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Reports an error with its cause chain on stderr.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }

    if let Some(hints) = recovery_hints(error) {
        for hint in hints {
            eprintln!("  Hint: {}", hint);
        }
    }
}

/// Reports an error and exits with the appropriate code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

fn recovery_hints(error: &BinError) -> Option<Vec<&'static str>> {
    match error {
        BinError::Engine(e) | BinError::Operation { source: e, .. } => Some(e.recovery_hints()),
        BinError::WithContext { source, .. } => recovery_hints(source),
        _ => None,
    }
}

// =============================================================================
// Tests
// =============================================================================
