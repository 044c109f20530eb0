// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Suvidha integration tests.
//!
//! Provides doubles for the sync engine's collaborators and a temp-dir store
//! harness, so tests run against a real SQLite file without a backend.
//!
//! # Components
//!
//! - [`MockTransport`] - Replay transport with scripted replies and a call log
//! - [`StaticTokens`] - Token source whose token the test can swap at any time
//! - [`TestStore`] - Fresh offline store in a temporary directory

pub mod harness;
pub mod mock_transport;
pub mod tokens;

pub use harness::TestStore;
pub use mock_transport::{MockTransport, ScriptedReply};
pub use tokens::StaticTokens;
