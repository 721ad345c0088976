// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `read` command.

use tokio::io::AsyncReadExt;
use tracing::info;
use uafetch_opcua::{Outcome, UaEngine, UaTransport};

use crate::cli::{Cli, ReadArgs};
use crate::connect::build_engine;
use crate::error::{BinError, BinResult};
use crate::output::OutputSink;

/// Executes the `read` command.
pub async fn read(cli: &Cli, args: ReadArgs) -> BinResult<()> {
    let config = super::load_host_config(cli)?;
    let payload = payload(&args).await?;

    let engine = build_engine(&config)?;
    let sink = OutputSink::from_target(config.output_target.as_deref());
    run_read(&engine, &payload, &sink).await
}

/// Reads `payload` with `engine` and routes the outcome.
///
/// A failure outcome becomes [`BinError::Operation`] carrying the payload.
pub async fn run_read<T: UaTransport + ?Sized>(
    engine: &UaEngine<T>,
    payload: &str,
    sink: &OutputSink,
) -> BinResult<()> {
    match engine.fetch(payload).await {
        Outcome::Success { output } => {
            sink.write(&output).await?;
            info!(sink = %sink, "Read routed to success");
            Ok(())
        }
        Outcome::Failure { error, input } => Err(BinError::operation(input, error)),
    }
}

async fn payload(args: &ReadArgs) -> BinResult<String> {
    let text = match (&args.tag, args.stdin) {
        (Some(tag), _) => tag.clone(),
        (None, true) => {
            let mut buffer = String::new();
            tokio::io::stdin().read_to_string(&mut buffer).await?;
            buffer
        }
        (None, false) => String::new(),
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(BinError::config("no node ID given"));
    }
    Ok(text.to_string())
}
