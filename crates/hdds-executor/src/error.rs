// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use thiserror::Error;

/// Errors emitted while configuring the executor strategy.
///
/// Scheduling itself never fails; see [`crate::strategy`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid value {value:?} for {var}")]
    InvalidConfig { var: &'static str, value: String },
    #[error("unknown memory strategy {0:?} (expected \"dynamic\" or \"static\")")]
    UnknownStrategy(String),
    #[error("unknown selection policy {0:?} (expected \"collection\" or \"round-robin\")")]
    UnknownSelection(String),
}

pub type Result<T> = std::result::Result<T, Error>;
