// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the code ledger and user directory.

pub mod codes;
pub mod users;
