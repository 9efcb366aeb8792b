// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::handle::NativeHandle;

/// Subscription endpoint.
///
/// Exposes a primary handle and, when intra-process delivery is enabled, a
/// second handle for the intra-process queue. Either may be reported ready.
#[derive(Debug)]
pub struct Subscription {
    topic: String,
    handle: NativeHandle,
    intra_process_handle: Option<NativeHandle>,
}

impl Subscription {
    /// Create a subscription with a freshly allocated handle.
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self::with_handles(topic, NativeHandle::allocate(), None)
    }

    /// Create a subscription with both a primary and an intra-process handle.
    #[must_use]
    pub fn with_intra_process(topic: impl Into<String>) -> Self {
        Self::with_handles(
            topic,
            NativeHandle::allocate(),
            Some(NativeHandle::allocate()),
        )
    }

    /// Create a subscription around provider-assigned handles.
    #[must_use]
    pub fn with_handles(
        topic: impl Into<String>,
        handle: NativeHandle,
        intra_process_handle: Option<NativeHandle>,
    ) -> Self {
        Self {
            topic: topic.into(),
            handle,
            intra_process_handle,
        }
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Primary (inter-process) handle.
    #[must_use]
    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    /// Intra-process handle, if intra-process delivery is enabled.
    #[must_use]
    pub fn intra_process_handle(&self) -> Option<NativeHandle> {
        self.intra_process_handle
    }

    /// True if `handle` is one of this subscription's handles.
    #[must_use]
    pub fn owns_handle(&self, handle: NativeHandle) -> bool {
        self.handle == handle || self.intra_process_handle == Some(handle)
    }

    /// Every wait-able handle of this subscription, primary first.
    pub fn handles(&self) -> impl Iterator<Item = NativeHandle> {
        std::iter::once(self.handle).chain(self.intra_process_handle)
    }

    /// Number of wait-able handles this subscription contributes (1 or 2).
    #[must_use]
    pub fn handle_count(&self) -> usize {
        1 + usize::from(self.intra_process_handle.is_some())
    }
}

/// Service server endpoint.
#[derive(Debug)]
pub struct Service {
    name: String,
    handle: NativeHandle,
}

impl Service {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_handle(name, NativeHandle::allocate())
    }

    #[must_use]
    pub fn with_handle(name: impl Into<String>, handle: NativeHandle) -> Self {
        Self {
            name: name.into(),
            handle,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn handle(&self) -> NativeHandle {
        self.handle
    }
}

/// Service client endpoint.
#[derive(Debug)]
pub struct Client {
    name: String,
    handle: NativeHandle,
}

impl Client {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_handle(name, NativeHandle::allocate())
    }

    #[must_use]
    pub fn with_handle(name: impl Into<String>, handle: NativeHandle) -> Self {
        Self {
            name: name.into(),
            handle,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn handle(&self) -> NativeHandle {
        self.handle
    }
}
