// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Host-facing orchestration.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         UaEngine<T>                             │
//! │            fetch / browse_tree / list_endpoints                 │
//! └─────────────────────────────────────────────────────────────────┘
//!        │              │               │                │
//!        ▼              ▼               ▼                ▼
//!  SecurityContext  EndpointResolver  SessionManager  ReadExecutor /
//!                                                     NodeTreeBrowser
//!        └──────────────┴───────┬───────┴────────────────┘
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     UaTransport (trait)                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every invocation runs: parse input, resolve certificates, discover,
//! select, open, operate, close, format. The engine holds no per-invocation
//! state; each call gets its own [`InvocationContext`] and session.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;
use uuid::Uuid;

use crate::browse::NodeTreeBrowser;
use crate::certificate::{SecurityContext, SecurityMaterial};
use crate::client::{ClientIdentity, Endpoint, SessionManager, SessionStats, UaTransport};
use crate::config::{BrowseSettings, ClientSettings};
use crate::endpoint::{self, EndpointResolver, SelectionCriteria};
use crate::error::{OpcUaError, OpcUaResult};
use crate::format;
use crate::read::ReadExecutor;
use crate::types::NodeId;

// =============================================================================
// Outcome
// =============================================================================

/// Result of one invocation, routed by the host.
#[derive(Debug)]
pub enum Outcome {
    /// The operation completed.
    Success {
        /// Rendered output.
        output: String,
    },
    /// The operation could not complete; the inbound payload is kept.
    Failure {
        /// Why.
        error: OpcUaError,
        /// The payload that was being processed.
        input: String,
    },
}

impl Outcome {
    /// Returns `true` for [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Rendered output, if successful.
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Success { output } => Some(output),
            Self::Failure { .. } => None,
        }
    }

    /// Error, if failed.
    pub fn error(&self) -> Option<&OpcUaError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }

    /// Converts to a `Result`, dropping the preserved input.
    pub fn into_result(self) -> OpcUaResult<String> {
        match self {
            Self::Success { output } => Ok(output),
            Self::Failure { error, .. } => Err(error),
        }
    }

    fn from_result(result: OpcUaResult<String>, input: &str, context: &InvocationContext) -> Self {
        match result {
            Ok(output) => {
                tracing::info!(
                    invocation_id = %context.id,
                    elapsed = ?context.elapsed(),
                    "Invocation succeeded"
                );
                Self::Success { output }
            }
            Err(error) => {
                error.log(context.operation);
                Self::Failure {
                    error,
                    input: input.to_string(),
                }
            }
        }
    }
}

// =============================================================================
// InvocationContext
// =============================================================================

/// Per-invocation identity and timing.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    /// Unique invocation ID.
    pub id: Uuid,
    /// Operation name.
    pub operation: &'static str,
    started: Instant,
}

impl InvocationContext {
    /// Creates a context for an operation.
    pub fn new(operation: &'static str) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation,
            started: Instant::now(),
        }
    }

    /// Time since the invocation started.
    pub fn elapsed(&self) -> std::time::Duration {
        self.started.elapsed()
    }

    /// Tracing span for the invocation.
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!("invocation", invocation_id = %self.id, operation = self.operation)
    }
}

// =============================================================================
// UaEngine
// =============================================================================

/// OPC UA client engine for one configured server.
///
/// Immutable after construction; share it through an `Arc`.
pub struct UaEngine<T: UaTransport + ?Sized> {
    settings: ClientSettings,
    transport: Arc<T>,
    security: Arc<SecurityContext>,
    resolver: EndpointResolver<T>,
    sessions: SessionManager<T>,
    reader: ReadExecutor<T>,
    browser: NodeTreeBrowser<T>,
}

impl<T: UaTransport + ?Sized> UaEngine<T> {
    /// Creates an engine. The settings are validated first.
    pub fn new(
        settings: ClientSettings,
        transport: Arc<T>,
        security: Arc<SecurityContext>,
    ) -> OpcUaResult<Self> {
        settings.validate()?;

        let identity = ClientIdentity::for_application(&settings.application_name);
        let timeouts = settings.timeouts;

        Ok(Self {
            resolver: EndpointResolver::new(transport.clone(), identity.clone(), timeouts.discovery),
            sessions: SessionManager::new(transport.clone(), identity, timeouts),
            reader: ReadExecutor::new(transport.clone(), timeouts.read),
            browser: NodeTreeBrowser::new(transport.clone(), timeouts.browse),
            settings,
            transport,
            security,
        })
    }

    /// Creates an engine with filesystem-backed security material.
    pub fn with_filesystem_security(settings: ClientSettings, transport: Arc<T>) -> OpcUaResult<Self> {
        let security = Arc::new(SecurityContext::from_settings(&settings));
        Self::new(settings, transport, security)
    }

    /// Client settings.
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Security cache shared by all invocations.
    pub fn security(&self) -> &SecurityContext {
        &self.security
    }

    /// Session statistics.
    pub fn session_stats(&self) -> &SessionStats {
        self.sessions.stats()
    }

    /// Reads the value of the node named by `tag` and renders
    /// `tag,value,timestamp`.
    pub async fn fetch(&self, tag: &str) -> Outcome {
        let context = InvocationContext::new("fetch");
        let span = context.span();
        async {
            tracing::debug!(tag = %tag, "Fetch requested");
            let result = self.try_fetch(tag).await;
            Outcome::from_result(result, tag, &context)
        }
        .instrument(span)
        .await
    }

    /// Browses the tree described by `browse` and renders it.
    pub async fn browse_tree(&self, browse: &BrowseSettings) -> Outcome {
        let context = InvocationContext::new("browse");
        let span = context.span();
        let input = browse
            .starting_node
            .clone()
            .unwrap_or_else(|| NodeId::root_folder().to_string());
        async {
            tracing::debug!(start = %input, max_depth = browse.max_recursive_depth, "Browse requested");
            let result = self.try_browse(browse).await;
            Outcome::from_result(result, &input, &context)
        }
        .instrument(span)
        .await
    }

    /// Lists the endpoints the server advertises.
    pub async fn list_endpoints(&self) -> OpcUaResult<Vec<Endpoint>> {
        let context = InvocationContext::new("endpoints");
        self.resolver
            .discover(&self.settings.endpoint_url)
            .instrument(context.span())
            .await
    }

    async fn try_fetch(&self, tag: &str) -> OpcUaResult<String> {
        let node: NodeId = tag.trim().parse()?;
        let (endpoint, material) = self.prepare().await?;

        let value = self
            .sessions
            .with_session(&endpoint, &material, |session| async move {
                self.reader.read_one(&session, &node).await
            })
            .await?;

        Ok(format::format_data_value(tag, &value))
    }

    async fn try_browse(&self, browse: &BrowseSettings) -> OpcUaResult<String> {
        let start = browse.start_node()?;
        let (endpoint, material) = self.prepare().await?;

        let report = self
            .sessions
            .with_session(&endpoint, &material, |session| async move {
                self.browser
                    .browse(
                        &session,
                        &start,
                        browse.max_recursive_depth,
                        browse.depth_limit_policy,
                        browse.branch_failure_policy,
                    )
                    .await
            })
            .await?;

        for failure in &report.failures {
            tracing::warn!(node_id = %failure.node, depth = failure.depth, error = %failure.error, "Subtree omitted");
        }

        Ok(format::format_tree(&report.lines, browse.print_indentation))
    }

    async fn prepare(&self) -> OpcUaResult<(Endpoint, SecurityMaterial)> {
        let criteria = SelectionCriteria::from_settings(&self.settings);
        let policy = criteria.effective_policy();

        let material = self
            .security
            .resolve(&self.settings.application_name, policy)
            .await?;

        let endpoints = self.resolver.discover(&self.settings.endpoint_url).await?;
        let criteria = SelectionCriteria {
            policy: Some(policy),
            ..criteria
        };
        let endpoint = endpoint::select(&endpoints, &criteria)?;

        tracing::info!(endpoint = %endpoint, "Endpoint selected");
        Ok((endpoint, material))
    }
}

impl<T: UaTransport + ?Sized> fmt::Debug for UaEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UaEngine")
            .field("endpoint", &self.settings.endpoint_url)
            .field("transport", &self.transport.display_name())
            .field("security", &self.security)
            .finish()
    }
}
