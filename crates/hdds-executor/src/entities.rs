// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Node / callback group / endpoint hierarchy consumed by the executor.
//!
//! These objects are created and destroyed by user code. The executor only
//! ever holds non-owning references to nodes and groups and reads identity
//! and containment; it never mutates them.
//!
//! ```text
//! Node ──weak──> CallbackGroup ──weak──> Subscription
//!                              ──arc───> Service
//!                              ──arc───> Client
//! ```

/// Callback groups and their exclusion classification.
pub mod callback_group;
/// Subscriptions, services and clients.
pub mod endpoint;
/// Nodes owning callback groups.
pub mod node;

pub use callback_group::{CallbackGroup, CallbackGroupType};
pub use endpoint::{Client, Service, Subscription};
pub use node::{Node, WeakNodeVector};
