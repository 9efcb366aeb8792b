// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # HDDS executor memory strategy
//!
//! Sits between an executor's spin loop and the wait primitive. Each
//! iteration it gathers the wait-able handles of every subscription, service
//! and client reachable from the executor's nodes, and after the wait maps
//! ready handles back to typed endpoints packaged as [`AnyExecutable`]s.
//!
//! ```text
//! +---------------------------------------------------------------+
//! |  spin loop (caller)                                           |
//! |    clear -> collect_entities -> fill_*_handles                |
//! |           -> wait primitive -> get_next_* -> dispatcher       |
//! +---------------------------------------------------------------+
//! |  MemoryStrategy         EntityIndex | HandleBuffer            |
//! |  resolver               node -> group -> endpoint traversal   |
//! +---------------------------------------------------------------+
//! |  Node / CallbackGroup / endpoints (user owned, held weakly)   |
//! +---------------------------------------------------------------+
//! ```
//!
//! ```rust
//! use hdds_executor::{AllocatorMemoryStrategy, MemoryStrategy, Node, Subscription};
//! use std::sync::Arc;
//!
//! let node = Node::new("talker", "/");
//! let sub = Arc::new(Subscription::new("chatter"));
//! node.default_callback_group().add_subscription(&sub);
//! let nodes = vec![Arc::downgrade(&node)];
//!
//! let mut strategy = AllocatorMemoryStrategy::dynamic();
//! strategy.clear_active_entities();
//! strategy.clear_handles();
//! strategy.collect_entities(&nodes);
//! assert_eq!(strategy.fill_subscriber_handles(), 1);
//!
//! // ... the wait primitive clears unready slots here ...
//!
//! let mut exec = strategy.instantiate_next_executable();
//! strategy.get_next_subscription(&mut exec, &nodes);
//! assert!(exec.subscription().is_some());
//! ```

/// Node, callback group and endpoint types.
pub mod entities;
/// Strategy configuration from environment variables.
pub mod env_config;
pub mod error;
/// Work descriptors produced by selection.
pub mod executable;
/// Opaque native handle identities.
pub mod handle;
/// Handle and ownership lookups over the node graph.
pub mod resolver;
/// Memory strategy trait and the allocator-backed implementation.
pub mod strategy;

pub use entities::{
    CallbackGroup, CallbackGroupType, Client, Node, Service, Subscription, WeakNodeVector,
};
pub use env_config::{EnvConfig, StrategyKind};
pub use error::{Error, Result};
pub use executable::{AnyExecutable, Executable};
pub use handle::{HandleKind, NativeHandle};
pub use strategy::{
    AllocatorMemoryStrategy, BufferPolicy, EntityIndex, HandleBuffer, HandleBuffersMut,
    MemoryStrategy, SelectionPolicy,
};
