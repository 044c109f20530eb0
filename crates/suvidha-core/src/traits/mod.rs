// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam traits between the sync engine and its collaborators.
//!
//! Implementations live in `suvidha-sync` (HTTP, token files) and
//! `suvidha-test-utils` (mocks).

pub mod token;
pub mod transport;

pub use token::TokenSource;
pub use transport::ReplayTransport;
