// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA client plumbing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      SessionManager<T>                          │
//! │          (open = create channel + activate, close once)         │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     UaTransport (trait)                         │
//! │     discover / create_channel / activate / read / browse        │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!              ┌───────────────┴───────────────┐
//!              ▼                               ▼
//!      RealUaTransport                  scripted transports
//!   (feature real-transport)               (tests)
//! ```

mod session;
mod transport;

#[cfg(feature = "real-transport")]
mod real_transport;

pub use session::{Session, SessionManager, SessionState, SessionStats};
pub use transport::{
    BrowseDescription, ChannelId, ClientIdentity, DataValue, Endpoint, ReadRequest, ReadValueId,
    ReferenceDescription, UaTransport, Variant, DEFAULT_MAX_AGE,
};

#[cfg(feature = "real-transport")]
pub use real_transport::RealUaTransport;
