// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA client engine.
//!
//! Discovers server endpoints, negotiates a security policy, opens and closes
//! sessions, reads values and browses the address space to a bounded depth.
//!
//! # Components
//!
//! ```text
//! SecurityContext ─► EndpointResolver ─► SessionManager ─┬─► ReadExecutor
//!                                                        └─► NodeTreeBrowser
//!                                                                 │
//!                                            ResultFormatter ◄────┘
//! ```
//!
//! [`UaEngine`] runs these in order for one invocation and reports an
//! [`Outcome`].
//!
//! # Error Handling
//!
//! ```text
//! OpcUaError
//! ├── Certificate   - key material could not be loaded or generated
//! ├── Discovery     - endpoint metadata request failed
//! ├── Endpoint      - no discovered endpoint matched
//! ├── Session       - channel creation or activation failed
//! ├── Read          - read request faulted
//! ├── Browse        - browse request faulted
//! ├── Close         - session close failed (non-fatal)
//! └── Configuration - invalid settings or node IDs
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use uafetch_opcua::{ClientSettings, Outcome, RealUaTransport, SecurityPolicy, UaEngine};
//!
//! let settings = ClientSettings::builder()
//!     .endpoint_url("opc.tcp://localhost:4840")
//!     .security_policy(SecurityPolicy::None)
//!     .build()?;
//!
//! let transport = Arc::new(RealUaTransport::new(&settings));
//! let engine = UaEngine::with_filesystem_security(settings, transport)?;
//!
//! match engine.fetch("ns=2;s=Temperature").await {
//!     Outcome::Success { output } => println!("{output}"),
//!     Outcome::Failure { error, .. } => eprintln!("{error}"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod browse;
pub mod certificate;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod engine;
pub mod error;
pub mod format;
pub mod read;
pub mod types;

pub use error::{
    BrowseError, CertificateError, CloseError, ConfigurationError, DiscoveryError, EndpointError,
    ErrorCode, ErrorSeverity, OpcUaError, OpcUaErrorContext, OpcUaResult, ReadError,
    ServiceFault, SessionError, TimeoutError,
};

pub use types::{
    AttributeId, BrowseDirection, ExpandedNodeId, NodeClass, NodeId, NodeIdentifier,
    SecurityMode, SecurityPolicy, StatusCode, TimestampsToReturn, TransportProtocol,
};

pub use config::{
    BranchFailurePolicy, BrowseSettings, ClientSettings, ClientSettingsBuilder, DepthLimitPolicy,
    TimeoutSettings, UrlMatch,
};

pub use client::{
    BrowseDescription, ChannelId, ClientIdentity, DataValue, Endpoint, ReadRequest, ReadValueId,
    ReferenceDescription, Session, SessionManager, SessionState, SessionStats, UaTransport,
    Variant,
};

#[cfg(feature = "real-transport")]
pub use client::RealUaTransport;

pub use certificate::{
    CertificateBundle, CertificateProvider, FileSystemCertificateProvider, KeyPairMaterial,
    MemoryCertificateProvider, SecurityContext, SecurityMaterial,
};

pub use browse::{BranchFailure, BrowseReport, NodeTreeBrowser, TreeLine, VisitOutcome};
pub use endpoint::{EndpointResolver, SelectionCriteria};
pub use engine::{InvocationContext, Outcome, UaEngine};
pub use read::ReadExecutor;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
