// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA session management.
//!
//! A [`Session`] lives for exactly one logical operation: it is opened,
//! used for one exchange and closed by the same call path. Sessions are
//! never pooled or shared between invocations.
//!
//! ```text
//!   open ──► create_channel ──► activate_session ──► Activated
//!                 │                    │
//!                 ▼                    ▼
//!           SessionError     close_channel (best effort)
//!                                      │
//!                                      ▼
//!                                SessionError
//! ```

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::transport::{ChannelId, ClientIdentity, Endpoint, UaTransport};
use crate::certificate::SecurityMaterial;
use crate::config::TimeoutSettings;
use crate::error::{CloseError, OpcUaResult, SessionError};

// =============================================================================
// SessionState
// =============================================================================

/// State of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Channel created, session not yet activated.
    Created,
    /// Ready for reads and browses.
    Activated,
    /// Closed; the channel handle is gone.
    Closed,
}

impl SessionState {
    /// Returns `true` if the session can carry requests.
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Activated)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Activated => write!(f, "Activated"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// An activated channel bound to one endpoint.
#[derive(Debug, Clone)]
pub struct Session {
    channel: ChannelId,
    endpoint: Endpoint,
    state: SessionState,
    created_at: Instant,
}

impl Session {
    fn new(channel: ChannelId, endpoint: Endpoint) -> Self {
        Self {
            channel,
            endpoint,
            state: SessionState::Created,
            created_at: Instant::now(),
        }
    }

    /// Channel handle.
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Endpoint the session is bound to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` if the session is activated.
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Time since the channel was created.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Fails with [`SessionError::NotActive`] unless activated.
    pub fn ensure_active(&self) -> Result<(), SessionError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(SessionError::not_active(&self.endpoint.url))
        }
    }
}

// =============================================================================
// SessionManager
// =============================================================================

/// Opens and closes sessions over a transport.
pub struct SessionManager<T: UaTransport + ?Sized> {
    transport: Arc<T>,
    identity: ClientIdentity,
    timeouts: TimeoutSettings,
    stats: SessionStats,
}

impl<T: UaTransport + ?Sized> SessionManager<T> {
    /// Creates a session manager.
    pub fn new(transport: Arc<T>, identity: ClientIdentity, timeouts: TimeoutSettings) -> Self {
        Self {
            transport,
            identity,
            timeouts,
            stats: SessionStats::new(),
        }
    }

    /// Client identity presented to servers.
    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    /// Session statistics.
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Creates a channel and activates a session on it.
    ///
    /// Only activated sessions are returned. If activation fails the
    /// half-open channel is closed (best effort) before the error propagates.
    pub async fn open(
        &self,
        endpoint: &Endpoint,
        material: &SecurityMaterial,
    ) -> OpcUaResult<Session> {
        let limit = self.timeouts.session;

        let channel = match tokio::time::timeout(
            limit,
            self.transport.create_channel(endpoint, material, &self.identity),
        )
        .await
        {
            Ok(Ok(channel)) => channel,
            Ok(Err(fault)) => {
                self.stats.record_channel_failure();
                return Err(SessionError::channel_failed(&endpoint.url, fault).into());
            }
            Err(_) => {
                self.stats.record_channel_failure();
                return Err(SessionError::timed_out(&endpoint.url, limit).into());
            }
        };

        let mut session = Session::new(channel, endpoint.clone());
        tracing::debug!(endpoint = %endpoint, channel = %channel, "Channel created");

        let activation =
            tokio::time::timeout(limit, self.transport.activate_session(channel)).await;
        let error = match activation {
            Ok(Ok(())) => {
                session.state = SessionState::Activated;
                self.stats.record_open();
                tracing::info!(endpoint = %endpoint, channel = %channel, "Session activated");
                return Ok(session);
            }
            Ok(Err(fault)) => SessionError::activation_failed(&endpoint.url, fault),
            Err(_) => SessionError::timed_out(&endpoint.url, limit),
        };

        self.stats.record_activation_failure();
        if let Err(e) = self.close(&mut session).await {
            tracing::debug!(error = %e, "Closing half-open channel failed");
        }
        Err(error.into())
    }

    /// Closes a session. Closing a closed session is a no-op.
    ///
    /// The session is marked closed even when the server side fails; the
    /// caller's operation outcome does not depend on this result.
    pub async fn close(&self, session: &mut Session) -> Result<(), CloseError> {
        if session.state == SessionState::Closed {
            return Ok(());
        }
        session.state = SessionState::Closed;

        let limit = self.timeouts.close;
        let result =
            match tokio::time::timeout(limit, self.transport.close_channel(session.channel)).await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(fault)) => Err(CloseError::faulted(&session.endpoint.url, fault)),
                Err(_) => Err(CloseError::timed_out(&session.endpoint.url, limit)),
            };

        match &result {
            Ok(()) => {
                self.stats.record_close();
                tracing::debug!(channel = %session.channel, age = ?session.age(), "Session closed");
            }
            Err(e) => {
                self.stats.record_close_failure();
                tracing::warn!(channel = %session.channel, error = %e, "Session close failed");
            }
        }
        result
    }

    /// Opens a session, runs `operation` on it and closes it exactly once.
    ///
    /// A close failure is logged and does not change the operation's result.
    pub async fn with_session<F, Fut, R>(
        &self,
        endpoint: &Endpoint,
        material: &SecurityMaterial,
        operation: F,
    ) -> OpcUaResult<R>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = OpcUaResult<R>>,
    {
        let mut session = self.open(endpoint, material).await?;
        let result = operation(session.clone()).await;
        // Logged inside close.
        let _ = self.close(&mut session).await;
        result
    }
}

impl<T: UaTransport + ?Sized> fmt::Debug for SessionManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("transport", &self.transport.display_name())
            .field("application", &self.identity.application_name)
            .field("stats", &self.stats)
            .finish()
    }
}

// =============================================================================
// SessionStats
// =============================================================================

/// Statistics for session operations.
#[derive(Debug, Default)]
pub struct SessionStats {
    opened: AtomicU64,
    channel_failures: AtomicU64,
    activation_failures: AtomicU64,
    closed: AtomicU64,
    close_failures: AtomicU64,
}

impl SessionStats {
    /// Creates zeroed statistics.
    pub fn new() -> Self {
        Self::default()
    }

    fn record_open(&self) {
        self.opened.fetch_add(1, Ordering::Relaxed);
    }

    fn record_channel_failure(&self) {
        self.channel_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn record_activation_failure(&self) {
        self.activation_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn record_close(&self) {
        self.closed.fetch_add(1, Ordering::Relaxed);
    }

    fn record_close_failure(&self) {
        self.close_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Sessions successfully activated.
    pub fn opened(&self) -> u64 {
        self.opened.load(Ordering::Relaxed)
    }

    /// Channel creations that failed.
    pub fn channel_failures(&self) -> u64 {
        self.channel_failures.load(Ordering::Relaxed)
    }

    /// Activations that failed.
    pub fn activation_failures(&self) -> u64 {
        self.activation_failures.load(Ordering::Relaxed)
    }

    /// Successful closes.
    pub fn closed(&self) -> u64 {
        self.closed.load(Ordering::Relaxed)
    }

    /// Failed closes.
    pub fn close_failures(&self) -> u64 {
        self.close_failures.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::{
        BrowseDescription, DataValue, ReadRequest, ReferenceDescription,
    };
    use crate::error::{OpcUaError, ServiceFault};
    use crate::types::{SecurityMode, SecurityPolicy};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct FakeTransport {
        fail_channel: bool,
        fail_activation: bool,
        fail_close: bool,
        hang_activation: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl UaTransport for FakeTransport {
        async fn discover_endpoints(
            &self,
            _url: &str,
            _identity: &ClientIdentity,
        ) -> Result<Vec<Endpoint>, ServiceFault> {
            Ok(vec![])
        }

        async fn create_channel(
            &self,
            _endpoint: &Endpoint,
            _material: &SecurityMaterial,
            _identity: &ClientIdentity,
        ) -> Result<ChannelId, ServiceFault> {
            self.calls.lock().push("create".into());
            if self.fail_channel {
                return Err(ServiceFault::communication("refused"));
            }
            Ok(ChannelId(7))
        }

        async fn activate_session(&self, _channel: ChannelId) -> Result<(), ServiceFault> {
            self.calls.lock().push("activate".into());
            if self.hang_activation {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.fail_activation {
                return Err(ServiceFault::communication("identity rejected"));
            }
            Ok(())
        }

        async fn read(
            &self,
            _channel: ChannelId,
            _request: &ReadRequest,
        ) -> Result<Vec<DataValue>, ServiceFault> {
            Ok(vec![])
        }

        async fn browse(
            &self,
            _channel: ChannelId,
            _description: &BrowseDescription,
        ) -> Result<Vec<ReferenceDescription>, ServiceFault> {
            Ok(vec![])
        }

        async fn close_channel(&self, _channel: ChannelId) -> Result<(), ServiceFault> {
            self.calls.lock().push("close".into());
            if self.fail_close {
                return Err(ServiceFault::communication("gone"));
            }
            Ok(())
        }

        fn display_name(&self) -> String {
            "fake".into()
        }
    }

    fn manager(transport: FakeTransport) -> (Arc<FakeTransport>, SessionManager<FakeTransport>) {
        let transport = Arc::new(transport);
        let manager = SessionManager::new(
            transport.clone(),
            ClientIdentity::for_application("test"),
            TimeoutSettings::default(),
        );
        (transport, manager)
    }

    fn endpoint() -> Endpoint {
        Endpoint::new("opc.tcp://host:4840", SecurityPolicy::None, SecurityMode::None)
    }

    fn material() -> SecurityMaterial {
        SecurityMaterial::NoCertificateNeeded { https: None }
    }

    #[tokio::test]
    async fn test_open_and_close() {
        let (transport, manager) = manager(FakeTransport::default());

        let mut session = manager.open(&endpoint(), &material()).await.unwrap();
        assert_eq!(session.state(), SessionState::Activated);
        assert_eq!(session.channel(), ChannelId(7));
        assert!(session.ensure_active().is_ok());

        manager.close(&mut session).await.unwrap();
        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.ensure_active().is_err());
        assert_eq!(transport.calls(), vec!["create", "activate", "close"]);
        assert_eq!(manager.stats().opened(), 1);
        assert_eq!(manager.stats().closed(), 1);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (transport, manager) = manager(FakeTransport::default());

        let mut session = manager.open(&endpoint(), &material()).await.unwrap();
        manager.close(&mut session).await.unwrap();
        manager.close(&mut session).await.unwrap();

        assert_eq!(transport.calls().iter().filter(|c| *c == "close").count(), 1);
    }

    #[tokio::test]
    async fn test_channel_failure() {
        let (transport, manager) = manager(FakeTransport {
            fail_channel: true,
            ..Default::default()
        });

        let err = manager.open(&endpoint(), &material()).await.unwrap_err();
        assert!(matches!(err, OpcUaError::Session(SessionError::ChannelFailed { .. })));
        assert_eq!(transport.calls(), vec!["create"]);
        assert_eq!(manager.stats().channel_failures(), 1);
    }

    #[tokio::test]
    async fn test_activation_failure_closes_channel() {
        let (transport, manager) = manager(FakeTransport {
            fail_activation: true,
            ..Default::default()
        });

        let err = manager.open(&endpoint(), &material()).await.unwrap_err();
        assert!(matches!(err, OpcUaError::Session(SessionError::ActivationFailed { .. })));
        assert_eq!(transport.calls(), vec!["create", "activate", "close"]);
        assert_eq!(manager.stats().activation_failures(), 1);
    }

    #[tokio::test]
    async fn test_activation_failure_survives_close_failure() {
        let (_, manager) = manager(FakeTransport {
            fail_activation: true,
            fail_close: true,
            ..Default::default()
        });

        let err = manager.open(&endpoint(), &material()).await.unwrap_err();
        assert!(matches!(err, OpcUaError::Session(SessionError::ActivationFailed { .. })));
        assert_eq!(manager.stats().close_failures(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_activation_timeout() {
        let (transport, manager) = manager(FakeTransport {
            hang_activation: true,
            ..Default::default()
        });

        let err = manager.open(&endpoint(), &material()).await.unwrap_err();
        assert!(matches!(err, OpcUaError::Session(SessionError::TimedOut { .. })));
        assert_eq!(transport.calls().last().map(String::as_str), Some("close"));
    }

    #[tokio::test]
    async fn test_close_failure_is_reported() {
        let (_, manager) = manager(FakeTransport {
            fail_close: true,
            ..Default::default()
        });

        let mut session = manager.open(&endpoint(), &material()).await.unwrap();
        let err = manager.close(&mut session).await.unwrap_err();
        assert!(matches!(err, CloseError::Faulted { .. }));
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_with_session_closes_on_error() {
        let (transport, manager) = manager(FakeTransport::default());

        let result: OpcUaResult<()> = manager
            .with_session(&endpoint(), &material(), |session| async move {
                assert!(session.is_active());
                Err(crate::error::ReadError::result_count_mismatch(1, 0).into())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(transport.calls(), vec!["create", "activate", "close"]);
    }

    #[tokio::test]
    async fn test_with_session_ignores_close_failure() {
        let (_, manager) = manager(FakeTransport {
            fail_close: true,
            ..Default::default()
        });

        let value = manager
            .with_session(&endpoint(), &material(), |_| async { Ok(42) })
            .await
            .unwrap();
        assert_eq!(value, 42);
    }
}
