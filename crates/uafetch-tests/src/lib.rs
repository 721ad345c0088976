// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # uafetch Integration Tests
//!
//! Test utilities and end-to-end tests for the uafetch workspace. No test
//! talks to a real server: [`common::mocks::ScriptedTransport`] plays the
//! server side of every exchange and records what the engine asked for.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `mocks`: Scripted transport with fault injection and call recording
//!   - `fixtures`: Endpoint sets, trees and settings used across suites
//!   - `builders`: Fluent construction of transports and engines
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p uafetch-tests
//!
//! # Run one suite
//! cargo test -p uafetch-tests --test integration_endpoint
//! cargo test -p uafetch-tests --test integration_browse
//! cargo test -p uafetch-tests --test integration_read
//! cargo test -p uafetch-tests --test integration_host
//! ```
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use uafetch_tests::common::{fixtures::Fixtures, builders::TransportBuilder};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let transport = TransportBuilder::new()
//!         .endpoints(Fixtures::all_policy_endpoints(Fixtures::URL))
//!         .tree(Fixtures::two_level_tree())
//!         .build();
//!     let engine = uafetch_tests::common::builders::engine(&transport, Fixtures::settings(None));
//!     // ...
//! }
//! ```

#![warn(missing_docs)]

pub mod common;
