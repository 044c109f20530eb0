// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query functions for each collection in the offline store.
//!
//! Every function takes a `&Database` and runs a single closure on the
//! background connection.

pub mod bills;
pub mod transactions;
pub mod user_data;
