// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Opaque native handle identities.
//!
//! The wait primitive only understands untyped handles. On the typed side we
//! carry them as [`NativeHandle`] values: a provider-assigned token that is
//! compared by value and never dereferenced.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identity of a wait-able endpoint handle.
///
/// Two handles are the same endpoint handle if and only if they compare
/// equal. The inner value carries no meaning beyond identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(u64);

impl NativeHandle {
    /// Wrap a provider-assigned identity (e.g. the address of an rmw handle).
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Allocate a process-unique identity.
    ///
    /// Used when the endpoint is not backed by an external provider.
    #[must_use]
    pub fn allocate() -> Self {
        // 0 is never handed out so a zeroed provider slot cannot alias a live handle.
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw identity value, for handing back to the provider.
    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeHandle({:#x})", self.0)
    }
}

/// Endpoint kind a handle buffer is dedicated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Subscription,
    Service,
    Client,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Subscription => "subscription",
            Self::Service => "service",
            Self::Client => "client",
        };
        f.write_str(name)
    }
}
