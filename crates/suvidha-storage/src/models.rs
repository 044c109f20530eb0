// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record types persisted by this crate.
//!
//! The canonical definitions live in `suvidha-core` so the sync crate and the
//! binary can use them without depending on storage internals.

pub use suvidha_core::types::{
    CachedBill, Lease, PendingTransaction, StatusCounts, TransactionId, TransactionStatus,
    UserDataEntry,
};
