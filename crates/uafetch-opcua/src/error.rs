// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA engine error types with diagnostics.
//!
//! Every failure the engine can report maps onto exactly one variant of
//! [`OpcUaError`]. Nothing is swallowed: faults that a server or the
//! transport raises are carried as a [`ServiceFault`] source so that the
//! host can print the complete cause chain.
//!
//! # Error Categories
//!
//! ```text
//! OpcUaError
//! ├── Certificate   - Key material could not be loaded or generated
//! ├── Discovery     - Endpoint metadata could not be fetched
//! ├── Endpoint      - Filters eliminated every discovered endpoint
//! ├── Session       - Channel creation or activation failed
//! ├── Read          - Read request faulted
//! ├── Browse        - Browse request faulted
//! ├── Close         - Session close failed (non-fatal)
//! └── Configuration - Invalid settings or input
//! ```
//!
//! Expired call timers are reported as the kind of the boundary they guard,
//! with a [`TimeoutError`] as source.
//!
//! # Examples
//!
//! ```
//! use uafetch_opcua::error::{DiscoveryError, ErrorSeverity, OpcUaError, ServiceFault};
//! use uafetch_opcua::types::StatusCode;
//!
//! let error = OpcUaError::discovery(DiscoveryError::failed(
//!     "opc.tcp://localhost:4840",
//!     ServiceFault::new(StatusCode::BAD_COMMUNICATION_ERROR, "connection refused"),
//! ));
//!
//! assert_eq!(error.category(), "discovery");
//! assert_eq!(error.severity(), ErrorSeverity::Error);
//! for hint in error.recovery_hints() {
//!     println!("Hint: {}", hint);
//! }
//! ```

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::Level;

use crate::types::StatusCode;

// =============================================================================
// OpcUaError - Main Error Type
// =============================================================================

/// The main error type for engine operations.
#[derive(Debug, Error)]
pub enum OpcUaError {
    /// Certificate material errors.
    #[error("{0}")]
    Certificate(#[from] CertificateError),

    /// Endpoint discovery errors.
    #[error("{0}")]
    Discovery(#[from] DiscoveryError),

    /// Endpoint selection errors.
    #[error("{0}")]
    Endpoint(#[from] EndpointError),

    /// Session lifecycle errors.
    #[error("{0}")]
    Session(#[from] SessionError),

    /// Read errors.
    #[error("{0}")]
    Read(#[from] ReadError),

    /// Browse errors.
    #[error("{0}")]
    Browse(#[from] BrowseError),

    /// Session close errors.
    #[error("{0}")]
    Close(#[from] CloseError),

    /// Configuration errors.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),
}

impl OpcUaError {
    // =========================================================================
    // Factory Methods
    // =========================================================================

    /// Creates a certificate error.
    #[inline]
    pub fn certificate(error: CertificateError) -> Self {
        Self::Certificate(error)
    }

    /// Creates a discovery error.
    #[inline]
    pub fn discovery(error: DiscoveryError) -> Self {
        Self::Discovery(error)
    }

    /// Creates an endpoint selection error.
    #[inline]
    pub fn endpoint(error: EndpointError) -> Self {
        Self::Endpoint(error)
    }

    /// Creates a session error.
    #[inline]
    pub fn session(error: SessionError) -> Self {
        Self::Session(error)
    }

    /// Creates a read error.
    #[inline]
    pub fn read(error: ReadError) -> Self {
        Self::Read(error)
    }

    /// Creates a browse error.
    #[inline]
    pub fn browse(error: BrowseError) -> Self {
        Self::Browse(error)
    }

    /// Creates a close error.
    #[inline]
    pub fn close(error: CloseError) -> Self {
        Self::Close(error)
    }

    /// Creates a configuration error.
    #[inline]
    pub fn configuration(error: ConfigurationError) -> Self {
        Self::Configuration(error)
    }

    // =========================================================================
    // Convenience Constructors
    // =========================================================================

    /// Creates an invalid node ID error.
    pub fn invalid_node_id(node_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration(ConfigurationError::invalid_node_id(node_id, reason))
    }

    /// Creates an invalid endpoint error.
    pub fn invalid_endpoint(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration(ConfigurationError::invalid_endpoint(url, reason))
    }

    /// Creates a no-endpoint-found error.
    pub fn no_endpoint_found(
        url: impl Into<String>,
        policy: impl Into<String>,
        discovered: usize,
    ) -> Self {
        Self::Endpoint(EndpointError::no_endpoint_found(url, policy, discovered))
    }

    // =========================================================================
    // Error Properties
    // =========================================================================

    /// Returns `true` if a later re-trigger of the same operation may succeed.
    ///
    /// The engine itself never retries; this is advice for the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Certificate(e) => e.is_retryable(),
            Self::Discovery(e) => e.is_retryable(),
            Self::Session(e) => e.is_retryable(),
            Self::Read(e) => e.is_retryable(),
            Self::Browse(e) => e.is_retryable(),
            Self::Close(_) => false,
            Self::Endpoint(_) | Self::Configuration(_) => false,
        }
    }

    /// Returns the suggested delay before the caller re-triggers.
    ///
    /// Returns `None` if the error is not retryable.
    pub fn suggested_retry_delay(&self) -> Option<Duration> {
        if !self.is_retryable() {
            return None;
        }

        match self {
            Self::Discovery(_) => Some(Duration::from_secs(5)),
            Self::Session(_) => Some(Duration::from_secs(2)),
            Self::Read(_) | Self::Browse(_) => Some(Duration::from_secs(1)),
            Self::Certificate(_) => Some(Duration::from_millis(500)),
            _ => None,
        }
    }

    /// Returns the severity level of this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Certificate(e) => e.severity(),
            Self::Discovery(e) => e.severity(),
            Self::Endpoint(_) => ErrorSeverity::Error,
            Self::Session(e) => e.severity(),
            Self::Read(e) => e.severity(),
            Self::Browse(e) => e.severity(),
            Self::Close(_) => ErrorSeverity::Warning,
            Self::Configuration(_) => ErrorSeverity::Critical,
        }
    }

    /// Returns the error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Certificate(_) => "certificate",
            Self::Discovery(_) => "discovery",
            Self::Endpoint(_) => "endpoint",
            Self::Session(_) => "session",
            Self::Read(_) => "read",
            Self::Browse(_) => "browse",
            Self::Close(_) => "close",
            Self::Configuration(_) => "configuration",
        }
    }

    /// Returns a unique error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Certificate(e) => e.error_code(),
            Self::Discovery(e) => e.error_code(),
            Self::Endpoint(e) => e.error_code(),
            Self::Session(e) => e.error_code(),
            Self::Read(e) => e.error_code(),
            Self::Browse(e) => e.error_code(),
            Self::Close(e) => e.error_code(),
            Self::Configuration(e) => e.error_code(),
        }
    }

    /// Returns recovery hints for this error.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::Certificate(e) => e.recovery_hints(),
            Self::Discovery(e) => e.recovery_hints(),
            Self::Endpoint(e) => e.recovery_hints(),
            Self::Session(e) => e.recovery_hints(),
            Self::Read(e) => e.recovery_hints(),
            Self::Browse(e) => e.recovery_hints(),
            Self::Close(_) => vec!["The server reclaims abandoned sessions after its session timeout"],
            Self::Configuration(e) => e.recovery_hints(),
        }
    }

    /// Returns a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Certificate(_) => "인증서를 준비하지 못했습니다".to_string(),
            Self::Discovery(e) => match e.timeout() {
                Some(t) => t.user_message(),
                None => "엔드포인트 탐색에 실패했습니다".to_string(),
            },
            Self::Endpoint(EndpointError::NoEndpointFound { policy, .. }) => {
                format!("조건에 맞는 엔드포인트가 없습니다 (보안 정책: {})", policy)
            }
            Self::Session(e) => match e.timeout() {
                Some(t) => t.user_message(),
                None => "세션을 열지 못했습니다".to_string(),
            },
            Self::Read(e) => match e.timeout() {
                Some(t) => t.user_message(),
                None => "값 읽기에 실패했습니다".to_string(),
            },
            Self::Browse(e) => match e.timeout() {
                Some(t) => t.user_message(),
                None => "노드 탐색에 실패했습니다".to_string(),
            },
            Self::Close(_) => "세션 종료에 실패했습니다".to_string(),
            Self::Configuration(e) => e.user_message(),
        }
    }

    /// Returns the tracing level for this error.
    pub fn tracing_level(&self) -> Level {
        self.severity().to_tracing_level()
    }

    /// Logs this error with appropriate level and context.
    pub fn log(&self, context: &str) {
        let level = self.tracing_level();
        let code = self.error_code();

        match level {
            Level::ERROR => tracing::error!(
                error_code = %code,
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
            Level::WARN => tracing::warn!(
                error_code = %code,
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
            _ => tracing::debug!(
                error_code = %code,
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
        }
    }
}

// =============================================================================
// ServiceFault
// =============================================================================

/// A fault raised by the server or the transport underneath a service call.
///
/// Transports report every failure as a `ServiceFault`; the engine wraps it
/// into the error kind of the component that issued the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} ({status})")]
pub struct ServiceFault {
    /// OPC UA status code of the fault.
    pub status: StatusCode,
    /// Human readable reason.
    pub reason: String,
}

impl ServiceFault {
    /// Creates a new service fault.
    pub fn new(status: StatusCode, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
        }
    }

    /// Creates a communication fault (`BadCommunicationError`).
    pub fn communication(reason: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_COMMUNICATION_ERROR, reason)
    }

    /// Returns `true` for faults that are usually transient.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.status,
            StatusCode::BAD_TIMEOUT
                | StatusCode::BAD_COMMUNICATION_ERROR
                | StatusCode::BAD_CONNECTION_CLOSED
                | StatusCode::BAD_SERVER_NOT_CONNECTED
                | StatusCode::BAD_TOO_MANY_SESSIONS
        )
    }
}

// =============================================================================
// CertificateError
// =============================================================================

/// Key material errors.
#[derive(Debug, Error)]
pub enum CertificateError {
    /// Material is missing and generation is disabled.
    #[error("Certificate not found: {path}")]
    NotFound {
        /// Expected location.
        path: PathBuf,
    },

    /// Generation failed.
    #[error("Failed to generate certificate for '{application}': {message}")]
    Generation {
        /// Application name.
        application: String,
        /// Error message.
        message: String,
    },

    /// Stored material could not be decoded.
    #[error("Invalid certificate material at {path}: {message}")]
    InvalidMaterial {
        /// File location.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// File system error.
    #[error("Certificate I/O error at {path}: {source}")]
    Io {
        /// File location.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl CertificateError {
    /// Creates a not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates a generation error.
    pub fn generation(application: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation {
            application: application.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid material error.
    pub fn invalid_material(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidMaterial {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns the severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Io { .. } => ErrorSeverity::Error,
            _ => ErrorSeverity::Critical,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::new(1, 1),
            Self::Generation { .. } => ErrorCode::new(1, 2),
            Self::InvalidMaterial { .. } => ErrorCode::new(1, 3),
            Self::Io { .. } => ErrorCode::new(1, 4),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::NotFound { .. } => vec![
                "Enable auto_generate_certificates",
                "Place the certificate under <pki_dir>/own and the key under <pki_dir>/private",
            ],
            Self::Generation { .. } => vec!["Check that the application name is a valid URI segment"],
            Self::InvalidMaterial { .. } => vec![
                "Delete the damaged files to let them be regenerated",
                "Certificates must be DER, private keys PKCS#8 PEM",
            ],
            Self::Io { .. } => vec![
                "Check permissions on the PKI directory",
                "Check available disk space",
            ],
        }
    }
}

// =============================================================================
// DiscoveryError
// =============================================================================

/// Endpoint discovery errors.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The URL cannot be used for discovery.
    #[error("Invalid discovery URL '{url}': {reason}")]
    InvalidUrl {
        /// Discovery URL.
        url: String,
        /// Reason.
        reason: String,
    },

    /// The server could not be reached or answered with a fault.
    #[error("Endpoint discovery failed for {url}")]
    Failed {
        /// Discovery URL.
        url: String,
        /// Underlying fault.
        #[source]
        source: ServiceFault,
    },

    /// Discovery did not finish in time.
    #[error("Endpoint discovery for {url} did not complete")]
    TimedOut {
        /// Discovery URL.
        url: String,
        /// Timer that expired.
        #[source]
        source: TimeoutError,
    },
}

impl DiscoveryError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a discovery failure.
    pub fn failed(url: impl Into<String>, source: ServiceFault) -> Self {
        Self::Failed {
            url: url.into(),
            source,
        }
    }

    /// Creates a discovery timeout.
    pub fn timed_out(url: impl Into<String>, duration: Duration) -> Self {
        Self::TimedOut {
            url: url.into(),
            source: TimeoutError::discovery(duration),
        }
    }

    /// Returns the expired timer, if any.
    pub fn timeout(&self) -> Option<&TimeoutError> {
        match self {
            Self::TimedOut { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns `true` if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::InvalidUrl { .. } => false,
            Self::Failed { source, .. } => source.is_transient(),
            Self::TimedOut { .. } => true,
        }
    }

    /// Returns the severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidUrl { .. } => ErrorSeverity::Critical,
            Self::Failed { .. } => ErrorSeverity::Error,
            Self::TimedOut { .. } => ErrorSeverity::Warning,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidUrl { .. } => ErrorCode::new(2, 1),
            Self::Failed { .. } => ErrorCode::new(2, 2),
            Self::TimedOut { .. } => ErrorCode::new(2, 3),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::InvalidUrl { .. } => vec!["Use an opc.tcp://host:port URL"],
            Self::Failed { .. } => vec![
                "Verify the server is running",
                "Check firewall rules for the endpoint port",
            ],
            Self::TimedOut { source, .. } => source.recovery_hints(),
        }
    }
}

// =============================================================================
// EndpointError
// =============================================================================

/// Endpoint selection errors.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// Filters eliminated every discovered endpoint.
    #[error(
        "No endpoint found for {url} with security policy {policy} over opc.tcp \
         ({discovered} discovered)"
    )]
    NoEndpointFound {
        /// Requested URL.
        url: String,
        /// Requested policy name.
        policy: String,
        /// Number of endpoints the server advertised.
        discovered: usize,
    },
}

impl EndpointError {
    /// Creates a no-endpoint-found error.
    pub fn no_endpoint_found(
        url: impl Into<String>,
        policy: impl Into<String>,
        discovered: usize,
    ) -> Self {
        Self::NoEndpointFound {
            url: url.into(),
            policy: policy.into(),
            discovered,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::new(3, 1)
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        vec![
            "Run the endpoints command to list what the server advertises",
            "Use the exact endpoint URL the server advertises",
            "Pick a security policy the server offers",
        ]
    }
}

// =============================================================================
// SessionError
// =============================================================================

/// Session lifecycle errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Secure channel creation failed.
    #[error("Failed to create channel to {endpoint}")]
    ChannelFailed {
        /// Endpoint URL.
        endpoint: String,
        /// Underlying fault.
        #[source]
        source: ServiceFault,
    },

    /// Session activation failed.
    #[error("Failed to activate session on {endpoint}")]
    ActivationFailed {
        /// Endpoint URL.
        endpoint: String,
        /// Underlying fault.
        #[source]
        source: ServiceFault,
    },

    /// Session operation used a session that is not active.
    #[error("Session on {endpoint} is not active")]
    NotActive {
        /// Endpoint URL.
        endpoint: String,
    },

    /// Channel creation or activation did not finish in time.
    #[error("Session setup on {endpoint} did not complete")]
    TimedOut {
        /// Endpoint URL.
        endpoint: String,
        /// Timer that expired.
        #[source]
        source: TimeoutError,
    },
}

impl SessionError {
    /// Creates a channel failure.
    pub fn channel_failed(endpoint: impl Into<String>, source: ServiceFault) -> Self {
        Self::ChannelFailed {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Creates an activation failure.
    pub fn activation_failed(endpoint: impl Into<String>, source: ServiceFault) -> Self {
        Self::ActivationFailed {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Creates a not-active error.
    pub fn not_active(endpoint: impl Into<String>) -> Self {
        Self::NotActive {
            endpoint: endpoint.into(),
        }
    }

    /// Creates a session setup timeout.
    pub fn timed_out(endpoint: impl Into<String>, duration: Duration) -> Self {
        Self::TimedOut {
            endpoint: endpoint.into(),
            source: TimeoutError::session(duration),
        }
    }

    /// Returns the expired timer, if any.
    pub fn timeout(&self) -> Option<&TimeoutError> {
        match self {
            Self::TimedOut { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns `true` if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ChannelFailed { source, .. } => source.is_transient(),
            Self::ActivationFailed { .. } | Self::NotActive { .. } => false,
            Self::TimedOut { .. } => true,
        }
    }

    /// Returns the severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::TimedOut { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ChannelFailed { .. } => ErrorCode::new(4, 1),
            Self::ActivationFailed { .. } => ErrorCode::new(4, 2),
            Self::NotActive { .. } => ErrorCode::new(4, 3),
            Self::TimedOut { .. } => ErrorCode::new(4, 4),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::ChannelFailed { .. } => vec![
                "Check server connection",
                "Ensure the client certificate is trusted by the server",
            ],
            Self::ActivationFailed { .. } => vec![
                "Check security policy compatibility",
                "Check server logs for the rejected activation",
            ],
            Self::NotActive { .. } => vec!["Open a new session before issuing requests"],
            Self::TimedOut { source, .. } => source.recovery_hints(),
        }
    }
}

// =============================================================================
// ReadError
// =============================================================================

/// Read service errors.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The read request faulted.
    #[error("Read of [{nodes}] failed")]
    Faulted {
        /// Requested node IDs, comma separated.
        nodes: String,
        /// Underlying fault.
        #[source]
        source: ServiceFault,
    },

    /// The server returned a result array of the wrong length.
    #[error("Read returned {actual} results for {expected} requested values")]
    ResultCountMismatch {
        /// Number of requested values.
        expected: usize,
        /// Number of returned results.
        actual: usize,
    },

    /// The read did not finish in time.
    #[error("Read of [{nodes}] did not complete")]
    TimedOut {
        /// Requested node IDs, comma separated.
        nodes: String,
        /// Timer that expired.
        #[source]
        source: TimeoutError,
    },
}

impl ReadError {
    /// Creates a faulted read error.
    pub fn faulted(nodes: impl Into<String>, source: ServiceFault) -> Self {
        Self::Faulted {
            nodes: nodes.into(),
            source,
        }
    }

    /// Creates a result count mismatch error.
    pub fn result_count_mismatch(expected: usize, actual: usize) -> Self {
        Self::ResultCountMismatch { expected, actual }
    }

    /// Creates a read timeout.
    pub fn timed_out(nodes: impl Into<String>, duration: Duration) -> Self {
        Self::TimedOut {
            nodes: nodes.into(),
            source: TimeoutError::read(duration),
        }
    }

    /// Returns the expired timer, if any.
    pub fn timeout(&self) -> Option<&TimeoutError> {
        match self {
            Self::TimedOut { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns `true` if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Faulted { source, .. } => source.is_transient(),
            Self::ResultCountMismatch { .. } => false,
            Self::TimedOut { .. } => true,
        }
    }

    /// Returns the severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::TimedOut { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Faulted { .. } => ErrorCode::new(5, 1),
            Self::ResultCountMismatch { .. } => ErrorCode::new(5, 2),
            Self::TimedOut { .. } => ErrorCode::new(5, 3),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::Faulted { .. } => vec![
                "Verify the node ID exists in the server address space",
                "Check that the node's Value attribute is readable",
            ],
            Self::ResultCountMismatch { .. } => vec!["The server response is malformed, check server logs"],
            Self::TimedOut { source, .. } => source.recovery_hints(),
        }
    }
}

// =============================================================================
// BrowseError
// =============================================================================

/// Browse service errors.
#[derive(Debug, Error)]
pub enum BrowseError {
    /// The browse request for a node faulted.
    #[error("Browse of {node_id} failed")]
    Faulted {
        /// Browsed node.
        node_id: String,
        /// Underlying fault.
        #[source]
        source: ServiceFault,
    },

    /// The browse request did not finish in time.
    #[error("Browse of {node_id} did not complete")]
    TimedOut {
        /// Browsed node.
        node_id: String,
        /// Timer that expired.
        #[source]
        source: TimeoutError,
    },

    /// Traversal stopped at the depth bound under the abort policy.
    #[error("Traversal aborted: depth {depth} exceeds maximum {max}")]
    DepthExceeded {
        /// Depth that was reached.
        depth: usize,
        /// Configured maximum.
        max: usize,
    },
}

impl BrowseError {
    /// Creates a faulted browse error.
    pub fn faulted(node_id: impl Into<String>, source: ServiceFault) -> Self {
        Self::Faulted {
            node_id: node_id.into(),
            source,
        }
    }

    /// Creates a browse timeout.
    pub fn timed_out(node_id: impl Into<String>, duration: Duration) -> Self {
        Self::TimedOut {
            node_id: node_id.into(),
            source: TimeoutError::browse(duration),
        }
    }

    /// Creates a depth exceeded error.
    pub fn depth_exceeded(depth: usize, max: usize) -> Self {
        Self::DepthExceeded { depth, max }
    }

    /// Returns the expired timer, if any.
    pub fn timeout(&self) -> Option<&TimeoutError> {
        match self {
            Self::TimedOut { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns `true` if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Faulted { source, .. } => source.is_transient(),
            Self::TimedOut { .. } => true,
            Self::DepthExceeded { .. } => false,
        }
    }

    /// Returns the severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Faulted { .. } => ErrorSeverity::Error,
            Self::TimedOut { .. } => ErrorSeverity::Warning,
            Self::DepthExceeded { .. } => ErrorSeverity::Info,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Faulted { .. } => ErrorCode::new(6, 1),
            Self::TimedOut { .. } => ErrorCode::new(6, 2),
            Self::DepthExceeded { .. } => ErrorCode::new(6, 3),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::Faulted { .. } => vec![
                "Verify the starting node exists",
                "Check browse permissions for the session",
            ],
            Self::TimedOut { source, .. } => source.recovery_hints(),
            Self::DepthExceeded { .. } => vec![
                "Increase max_recursive_depth",
                "Use the skip-subtree depth policy to keep sibling output",
            ],
        }
    }
}

// =============================================================================
// CloseError
// =============================================================================

/// Session close errors. Never fatal to the operation that used the session.
#[derive(Debug, Error)]
pub enum CloseError {
    /// The server or transport faulted while closing.
    #[error("Failed to close session on {endpoint}")]
    Faulted {
        /// Endpoint URL.
        endpoint: String,
        /// Underlying fault.
        #[source]
        source: ServiceFault,
    },

    /// Close did not finish in time.
    #[error("Closing session on {endpoint} did not complete")]
    TimedOut {
        /// Endpoint URL.
        endpoint: String,
        /// Timer that expired.
        #[source]
        source: TimeoutError,
    },
}

impl CloseError {
    /// Creates a faulted close error.
    pub fn faulted(endpoint: impl Into<String>, source: ServiceFault) -> Self {
        Self::Faulted {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Creates a close timeout.
    pub fn timed_out(endpoint: impl Into<String>, duration: Duration) -> Self {
        Self::TimedOut {
            endpoint: endpoint.into(),
            source: TimeoutError::close(duration),
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Faulted { .. } => ErrorCode::new(7, 1),
            Self::TimedOut { .. } => ErrorCode::new(7, 2),
        }
    }
}

// =============================================================================
// ConfigurationError
// =============================================================================

/// Configuration and input errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Node ID text could not be parsed.
    #[error("Invalid node ID '{node_id}': {reason}")]
    InvalidNodeId {
        /// Input text.
        node_id: String,
        /// Reason.
        reason: String,
    },

    /// Endpoint URL is malformed or uses an unsupported scheme.
    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint {
        /// Endpoint URL.
        url: String,
        /// Reason.
        reason: String,
    },

    /// A required field is missing.
    #[error("Missing required field: {field}")]
    MissingField {
        /// Field name.
        field: String,
    },

    /// A field has an unacceptable value.
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },
}

impl ConfigurationError {
    /// Creates an invalid node ID error.
    pub fn invalid_node_id(node_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidNodeId {
            node_id: node_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid endpoint error.
    pub fn invalid_endpoint(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidNodeId { .. } => ErrorCode::new(8, 1),
            Self::InvalidEndpoint { .. } => ErrorCode::new(8, 2),
            Self::MissingField { .. } => ErrorCode::new(8, 3),
            Self::InvalidValue { .. } => ErrorCode::new(8, 4),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::InvalidNodeId { .. } => vec![
                "Use the form ns=<index>;<i|s|g|b>=<value>",
                "Numeric IDs in namespace 0 may omit ns=, e.g. i=84",
            ],
            Self::InvalidEndpoint { .. } => vec!["Use an opc.tcp://host:port URL"],
            Self::MissingField { .. } => vec!["Add the field to the configuration file"],
            Self::InvalidValue { .. } => vec!["Check the configuration reference for allowed values"],
        }
    }

    /// Returns a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidNodeId { node_id, .. } => format!("잘못된 노드 ID: {}", node_id),
            Self::InvalidEndpoint { url, .. } => format!("잘못된 엔드포인트 주소: {}", url),
            Self::MissingField { field } => format!("필수 설정 누락: {}", field),
            Self::InvalidValue { field, .. } => format!("잘못된 설정 값: {}", field),
        }
    }
}

// =============================================================================
// TimeoutError
// =============================================================================

/// Expired call-boundary timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimeoutError {
    /// Endpoint discovery timeout.
    #[error("Discovery timed out after {duration:?}")]
    Discovery {
        /// Timeout duration.
        duration: Duration,
    },

    /// Channel creation or activation timeout.
    #[error("Session setup timed out after {duration:?}")]
    Session {
        /// Timeout duration.
        duration: Duration,
    },

    /// Read timeout.
    #[error("Read timed out after {duration:?}")]
    Read {
        /// Timeout duration.
        duration: Duration,
    },

    /// Browse timeout.
    #[error("Browse timed out after {duration:?}")]
    Browse {
        /// Timeout duration.
        duration: Duration,
    },

    /// Close timeout.
    #[error("Close timed out after {duration:?}")]
    Close {
        /// Timeout duration.
        duration: Duration,
    },
}

impl TimeoutError {
    /// Creates a discovery timeout.
    pub fn discovery(duration: Duration) -> Self {
        Self::Discovery { duration }
    }

    /// Creates a session timeout.
    pub fn session(duration: Duration) -> Self {
        Self::Session { duration }
    }

    /// Creates a read timeout.
    pub fn read(duration: Duration) -> Self {
        Self::Read { duration }
    }

    /// Creates a browse timeout.
    pub fn browse(duration: Duration) -> Self {
        Self::Browse { duration }
    }

    /// Creates a close timeout.
    pub fn close(duration: Duration) -> Self {
        Self::Close { duration }
    }

    /// Returns the timeout duration.
    pub fn duration(&self) -> Duration {
        match self {
            Self::Discovery { duration }
            | Self::Session { duration }
            | Self::Read { duration }
            | Self::Browse { duration }
            | Self::Close { duration } => *duration,
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        vec![
            "Check network connectivity",
            "Increase the timeout value",
            "Verify the server is responding",
        ]
    }

    /// Returns a user-friendly error message.
    pub fn user_message(&self) -> String {
        let secs = self.duration().as_secs_f64();
        match self {
            Self::Discovery { .. } => format!("엔드포인트 탐색 시간 초과 ({:.1}초)", secs),
            Self::Session { .. } => format!("세션 생성 시간 초과 ({:.1}초)", secs),
            Self::Read { .. } => format!("읽기 시간 초과 ({:.1}초)", secs),
            Self::Browse { .. } => format!("탐색 시간 초과 ({:.1}초)", secs),
            Self::Close { .. } => format!("세션 종료 시간 초과 ({:.1}초)", secs),
        }
    }
}

// =============================================================================
// ErrorSeverity
// =============================================================================

/// Error severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Informational - no action required.
    Info,
    /// Warning - action may be required.
    Warning,
    /// Error - action required, but recoverable.
    Error,
    /// Critical - immediate action required.
    Critical,
}

impl ErrorSeverity {
    /// Converts to tracing level.
    pub fn to_tracing_level(self) -> Level {
        match self {
            Self::Info => Level::INFO,
            Self::Warning => Level::WARN,
            Self::Error | Self::Critical => Level::ERROR,
        }
    }

    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// ErrorCode
// =============================================================================

/// Structured error code for categorization.
///
/// Format: `UA-XXYY` where XX is category and YY is specific error.
///
/// Categories:
/// - 1: Certificate
/// - 2: Discovery
/// - 3: Endpoint
/// - 4: Session
/// - 5: Read
/// - 6: Browse
/// - 7: Close
/// - 8: Configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    /// Category (1-8).
    pub category: u8,
    /// Specific error within category.
    pub code: u8,
}

impl ErrorCode {
    /// Creates a new error code.
    pub const fn new(category: u8, code: u8) -> Self {
        Self { category, code }
    }

    /// Returns the full error code as a u16.
    pub fn as_u16(&self) -> u16 {
        ((self.category as u16) << 8) | (self.code as u16)
    }

    /// Creates from a u16.
    pub fn from_u16(value: u16) -> Self {
        Self {
            category: (value >> 8) as u8,
            code: (value & 0xFF) as u8,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UA-{:02X}{:02X}", self.category, self.code)
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// A Result type with OpcUaError.
pub type OpcUaResult<T> = Result<T, OpcUaError>;

// =============================================================================
// Error Context Extension
// =============================================================================

/// Extension trait for attaching diagnostic context to engine errors.
pub trait OpcUaErrorContext<T> {
    /// Logs the error together with the endpoint it concerns.
    fn with_endpoint(self, endpoint: &str) -> Result<T, OpcUaError>;

    /// Logs the error together with the node it concerns.
    fn with_node(self, node_id: &str) -> Result<T, OpcUaError>;
}

impl<T> OpcUaErrorContext<T> for Result<T, OpcUaError> {
    fn with_endpoint(self, endpoint: &str) -> Result<T, OpcUaError> {
        self.map_err(|e| {
            tracing::debug!(endpoint = endpoint, error = %e, "OPC UA error with endpoint context");
            e
        })
    }

    fn with_node(self, node_id: &str) -> Result<T, OpcUaError> {
        self.map_err(|e| {
            tracing::debug!(node_id = node_id, error = %e, "OPC UA error with node context");
            e
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
