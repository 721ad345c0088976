// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `browse` command.

use tracing::{info, warn};
use uafetch_config::HostConfig;
use uafetch_opcua::{BrowseSettings, Outcome, UaEngine, UaTransport};

use crate::cli::{BrowseArgs, Cli};
use crate::connect::build_engine;
use crate::error::{BinError, BinResult};
use crate::output::OutputSink;

/// Executes the `browse` command.
pub async fn browse(cli: &Cli, args: BrowseArgs) -> BinResult<()> {
    let config = super::load_host_config(cli)?;
    let settings = effective_browse_settings(&config, &args)?;

    let target = args.output.as_deref().or(config.output_target.as_deref());
    let sink = OutputSink::from_target(target);

    let engine = build_engine(&config)?;
    run_browse(&engine, &settings, &sink).await
}

/// Merges command line flags over the configured `browse` section.
///
/// `--depth` is required when the file has no `browse` section.
pub fn effective_browse_settings(config: &HostConfig, args: &BrowseArgs) -> BinResult<BrowseSettings> {
    let mut settings = match (&config.browse, args.depth) {
        (Some(configured), _) => configured.clone(),
        (None, Some(depth)) => BrowseSettings::new(depth),
        (None, None) => {
            return Err(BinError::config(
                "max_recursive_depth is required: add a browse section or pass --depth",
            ))
        }
    };

    if let Some(depth) = args.depth {
        settings.max_recursive_depth = depth;
    }
    if let Some(ref start) = args.start {
        settings.starting_node = Some(start.clone());
    }
    if args.indent {
        settings.print_indentation = true;
    }

    settings.start_node()?;
    Ok(settings)
}

/// Browses with `engine` and routes the outcome.
pub async fn run_browse<T: UaTransport + ?Sized>(
    engine: &UaEngine<T>,
    settings: &BrowseSettings,
    sink: &OutputSink,
) -> BinResult<()> {
    match engine.browse_tree(settings).await {
        Outcome::Success { output } => {
            if output.is_empty() {
                warn!("Start node has no children within the depth bound");
            }
            sink.write(&output).await?;
            info!(sink = %sink, lines = line_count(&output), "Tree routed to success");
            Ok(())
        }
        Outcome::Failure { error, input } => Err(BinError::operation(input, error)),
    }
}

fn line_count(output: &str) -> usize {
    if output.is_empty() {
        0
    } else {
        output.lines().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> HostConfig {
        HostConfig::new("opc.tcp://localhost:4840")
    }

    #[test]
    fn test_depth_required_without_section() {
        let result = effective_browse_settings(&config(), &BrowseArgs::default());
        assert!(matches!(result, Err(BinError::Configuration(_))));
    }

    #[test]
    fn test_flags_override_section() {
        let mut config = config();
        config.browse = Some(BrowseSettings::new(4).with_starting_node("i=85"));

        let args = BrowseArgs {
            start: Some("ns=2;s=Line1".into()),
            depth: Some(1),
            indent: true,
            output: None,
        };
        let settings = effective_browse_settings(&config, &args).unwrap();

        assert_eq!(settings.starting_node.as_deref(), Some("ns=2;s=Line1"));
        assert_eq!(settings.max_recursive_depth, 1);
        assert!(settings.print_indentation);
    }

    #[test]
    fn test_invalid_start_flag() {
        let args = BrowseArgs {
            start: Some("q=1".into()),
            depth: Some(1),
            ..BrowseArgs::default()
        };
        assert!(matches!(
            effective_browse_settings(&config(), &args),
            Err(BinError::Engine(_))
        ));
    }

    #[test]
    fn test_line_count() {
        assert_eq!(line_count(""), 0);
        assert_eq!(line_count("i=85\ni=86"), 2);
    }
}
