// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Engine construction for the configured server.

use std::sync::Arc;

use uafetch_config::HostConfig;
use uafetch_opcua::{UaEngine, UaTransport};

use crate::error::BinResult;

/// Engine over a type-erased transport.
pub type DynEngine = UaEngine<dyn UaTransport>;

/// Builds an engine from a transport and the loaded configuration.
pub fn engine_with_transport(
    config: &HostConfig,
    transport: Arc<dyn UaTransport>,
) -> BinResult<Arc<DynEngine>> {
    let engine = UaEngine::with_filesystem_security(config.client.clone(), transport)?;
    Ok(Arc::new(engine))
}

/// Builds an engine backed by the `opcua` crate.
#[cfg(feature = "real-transport")]
pub fn build_engine(config: &HostConfig) -> BinResult<Arc<DynEngine>> {
    let transport: Arc<dyn UaTransport> =
        Arc::new(uafetch_opcua::RealUaTransport::new(&config.client));
    engine_with_transport(config, transport)
}

/// Without a backend no server can be reached.
#[cfg(not(feature = "real-transport"))]
pub fn build_engine(_config: &HostConfig) -> BinResult<Arc<DynEngine>> {
    Err(crate::error::BinError::unsupported(
        "uafetch was built without the real-transport feature; rebuild with --features real-transport",
    ))
}
