// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline-to-online synchronization for the Suvidha kiosk.
//!
//! A [`ConnectivityDetector`] turns platform reachability reports into
//! reconnect events. On each reconnect the [`SyncRunner`] asks the
//! [`SyncOrchestrator`] to replay the pending queue through a
//! [`ReplayTransport`](suvidha_core::ReplayTransport), normally the
//! [`HttpReplayTransport`].

pub mod connectivity;
pub mod orchestrator;
pub mod probe;
pub mod runner;
pub mod token;
pub mod transport;

pub use connectivity::{ConnectivityDetector, ReconnectEvent, ReconnectSubscription};
pub use orchestrator::{SyncOrchestrator, SyncSettings};
pub use probe::ReachabilityProbe;
pub use runner::SyncRunner;
pub use token::{token_source_from_config, FileTokenSource, StaticToken};
pub use transport::HttpReplayTransport;
