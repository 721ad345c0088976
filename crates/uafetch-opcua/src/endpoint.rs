// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Endpoint discovery and selection.
//!
//! Selection narrows the discovered list in three stages, each keeping the
//! discovery order:
//!
//! ```text
//! discovered ──► policy ──► protocol ──► url ──► first
//!                  │           │          │
//!                  └───────────┴──────────┴──► NoEndpointFound (if empty)
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::client::{ClientIdentity, Endpoint, UaTransport};
use crate::config::{ClientSettings, UrlMatch};
use crate::error::{DiscoveryError, OpcUaError, OpcUaResult};
use crate::types::{SecurityPolicy, TransportProtocol};

// =============================================================================
// SelectionCriteria
// =============================================================================

/// What a selected endpoint must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCriteria {
    /// Requested policy. `None` falls back to [`SecurityPolicy::None`].
    pub policy: Option<SecurityPolicy>,
    /// Required transport protocol.
    pub protocol: TransportProtocol,
    /// Originally configured URL.
    pub url: String,
    /// How the URL stage compares.
    pub url_match: UrlMatch,
}

impl SelectionCriteria {
    /// Criteria for an exact three-stage match.
    pub fn new(policy: Option<SecurityPolicy>, protocol: TransportProtocol, url: impl Into<String>) -> Self {
        Self {
            policy,
            protocol,
            url: url.into(),
            url_match: UrlMatch::Exact,
        }
    }

    /// Criteria taken from client settings.
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self {
            policy: settings.security_policy,
            protocol: settings.transport_protocol,
            url: settings.endpoint_url.clone(),
            url_match: settings.url_match,
        }
    }

    /// Sets the URL comparison mode.
    pub fn with_url_match(mut self, url_match: UrlMatch) -> Self {
        self.url_match = url_match;
        self
    }

    /// Effective policy, warning when none was given.
    pub fn effective_policy(&self) -> SecurityPolicy {
        match self.policy {
            Some(policy) => policy,
            None => {
                tracing::warn!(
                    url = %self.url,
                    "No security policy specified, defaulting to None"
                );
                SecurityPolicy::None
            }
        }
    }
}

// =============================================================================
// Selection
// =============================================================================

/// Compares two URLs, ignoring one trailing `/` on either side.
pub fn urls_match(a: &str, b: &str) -> bool {
    a.strip_suffix('/').unwrap_or(a) == b.strip_suffix('/').unwrap_or(b)
}

/// Picks the first endpoint matching policy, protocol and URL.
pub fn select(endpoints: &[Endpoint], criteria: &SelectionCriteria) -> OpcUaResult<Endpoint> {
    let policy = criteria.effective_policy();

    let by_policy: Vec<&Endpoint> = endpoints
        .iter()
        .filter(|e| e.security_policy() == Some(policy))
        .collect();
    tracing::debug!(policy = %policy.name(), remaining = by_policy.len(), "Filtered endpoints by policy");

    let by_protocol: Vec<&Endpoint> = by_policy
        .into_iter()
        .filter(|e| e.transport_protocol() == Some(criteria.protocol))
        .collect();
    tracing::debug!(protocol = %criteria.protocol, remaining = by_protocol.len(), "Filtered endpoints by protocol");

    let by_url: Vec<&Endpoint> = match criteria.url_match {
        UrlMatch::Exact => by_protocol
            .into_iter()
            .filter(|e| urls_match(&e.url, &criteria.url))
            .collect(),
        UrlMatch::Ignore => by_protocol,
    };
    tracing::debug!(url = %criteria.url, remaining = by_url.len(), "Filtered endpoints by url");

    by_url.first().map(|e| (*e).clone()).ok_or_else(|| {
        OpcUaError::no_endpoint_found(&criteria.url, policy.name(), endpoints.len())
    })
}

/// Policy and protocol stages only.
pub fn select_without_url(endpoints: &[Endpoint], criteria: &SelectionCriteria) -> OpcUaResult<Endpoint> {
    let criteria = criteria.clone().with_url_match(UrlMatch::Ignore);
    select(endpoints, &criteria)
}

// =============================================================================
// EndpointResolver
// =============================================================================

/// Discovers endpoints over a transport.
pub struct EndpointResolver<T: UaTransport + ?Sized> {
    transport: Arc<T>,
    identity: ClientIdentity,
    timeout: Duration,
}

impl<T: UaTransport + ?Sized> EndpointResolver<T> {
    /// Creates a resolver.
    pub fn new(transport: Arc<T>, identity: ClientIdentity, timeout: Duration) -> Self {
        Self {
            transport,
            identity,
            timeout,
        }
    }

    /// Fetches the endpoints advertised at `url`.
    ///
    /// The URL scheme is checked before anything goes on the wire.
    pub async fn discover(&self, url: &str) -> OpcUaResult<Vec<Endpoint>> {
        if url.trim().is_empty() {
            return Err(DiscoveryError::invalid_url(url, "empty URL").into());
        }
        if TransportProtocol::from_url(url).is_none() {
            return Err(DiscoveryError::invalid_url(
                url,
                "unknown scheme, expected opc.tcp://, opc.wss:// or https://",
            )
            .into());
        }

        tracing::debug!(url = %url, transport = %self.transport.display_name(), "Discovering endpoints");

        let endpoints =
            match tokio::time::timeout(self.timeout, self.transport.discover_endpoints(url, &self.identity))
                .await
            {
                Ok(Ok(endpoints)) => endpoints,
                Ok(Err(fault)) => return Err(DiscoveryError::failed(url, fault).into()),
                Err(_) => return Err(DiscoveryError::timed_out(url, self.timeout).into()),
            };

        tracing::info!(url = %url, count = endpoints.len(), "Discovered endpoints");
        Ok(endpoints)
    }

    /// Discovers and selects in one step.
    pub async fn resolve(&self, criteria: &SelectionCriteria) -> OpcUaResult<Endpoint> {
        let endpoints = self.discover(&criteria.url).await?;
        select(&endpoints, criteria)
    }
}

// =============================================================================
// Tests
// =============================================================================
