// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Suvidha offline sync engine.
//!
//! Defines the error taxonomy, the persisted data model, and the traits that
//! separate the sync orchestrator from its transport and auth collaborators.

pub mod error;
pub mod traits;
pub mod types;

pub use error::SuvidhaError;
pub use traits::{ReplayTransport, TokenSource};
pub use types::{
    CachedBill, HealthStatus, Lease, PendingTransaction, Reachability, StatusCounts,
    SyncOutcome, TransactionId, TransactionStatus, UserDataEntry,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_errors_are_classified() {
        let transport = SuvidhaError::SyncTransport {
            message: "connection refused".into(),
            source: None,
        };
        let application = SuvidhaError::SyncApplication {
            status: 401,
            body: "token expired".into(),
        };
        let storage = SuvidhaError::storage(std::io::Error::other("disk full"));

        assert!(transport.is_replay_error());
        assert!(application.is_replay_error());
        assert!(!storage.is_replay_error());
        assert!(!SuvidhaError::AlreadySubscribed.is_replay_error());
    }

    #[test]
    fn application_error_renders_status_and_body() {
        let err = SuvidhaError::SyncApplication {
            status: 400,
            body: r#"{"detail":"Amount exceeds outstanding"}"#.into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("400"), "got: {rendered}");
        assert!(rendered.contains("Amount exceeds outstanding"), "got: {rendered}");
    }

    #[test]
    fn recorded_text_is_the_body_or_message() {
        let rejected = SuvidhaError::SyncApplication {
            status: 422,
            body: r#"{"detail":"Bill already paid"}"#.into(),
        };
        assert_eq!(rejected.recorded_text(), r#"{"detail":"Bill already paid"}"#);

        let unreachable = SuvidhaError::SyncTransport {
            message: "POST http://10.0.0.2/pay failed: timed out".into(),
            source: None,
        };
        assert_eq!(unreachable.recorded_text(), "POST http://10.0.0.2/pay failed: timed out");
    }

    #[test]
    fn seam_traits_are_object_safe() {
        fn _assert_transport(_: &dyn ReplayTransport) {}
        fn _assert_tokens(_: &dyn TokenSource) {}
    }

    #[test]
    fn sync_outcome_counts_attempts() {
        let outcome = SyncOutcome {
            synced: 2,
            failed: 1,
            skipped: 4,
        };
        assert_eq!(outcome.attempted(), 3);
        assert_eq!(SyncOutcome::default().attempted(), 0);
    }
}
