// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Executor memory strategy.
//!
//! The executor delegates three jobs to a [`MemoryStrategy`] on every spin
//! iteration:
//!
//! 1. collect the endpoints reachable from its (weak) node list,
//! 2. fill per-kind handle buffers for the wait primitive,
//! 3. after the wait, turn ready handles into [`AnyExecutable`]s.
//!
//! ```text
//! clear_* -> collect_entities -> fill_*_handles -> (wait) -> get_next_* ... -> clear_*
//! ```
//!
//! Calls must follow that order within an iteration. The strategy does not
//! check it; an out-of-order call yields whatever the stale state implies.
//! None of these operations block and none of them fail: absence is always
//! reported as "nothing selected".

/// Per-kind handle buffers and growth policy.
pub mod buffer;
/// Endpoint snapshot built by the collection pass.
pub mod entity_index;

pub use buffer::{BufferPolicy, HandleBuffer, HandleBuffersMut};
pub use entity_index::EntityIndex;

use crate::entities::{CallbackGroup, Node};
use crate::executable::{AnyExecutable, Executable};
use crate::handle::{HandleKind, NativeHandle};
use crate::resolver;
use buffer::Claim;
use std::sync::{Arc, Weak};

/// Order in which ready endpoints of one kind are handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Traversal order: nodes as listed, then groups and endpoints in
    /// registration order. No fairness across iterations.
    #[default]
    CollectionOrder,
    /// Collection order rotated by one more position every iteration, so
    /// an always-ready endpoint cannot keep later ones waiting.
    RoundRobin,
}

/// Pluggable buffer management and work selection for an executor.
pub trait MemoryStrategy: Send {
    /// Rebuild the active entity snapshot from `nodes`.
    ///
    /// Returns true if the collected set changed since the previous pass.
    fn collect_entities(&mut self, nodes: &[Weak<Node>]) -> bool;

    /// Drop the active entity snapshot. Buffers are untouched.
    fn clear_active_entities(&mut self);

    /// Reset every handle buffer to zero length, keeping capacity.
    fn clear_handles(&mut self);

    /// Write one handle per live subscription handle; returns the count.
    fn fill_subscriber_handles(&mut self) -> usize;

    /// Write one handle per live service; returns the count.
    fn fill_service_handles(&mut self) -> usize;

    /// Write one handle per live client; returns the count.
    fn fill_client_handles(&mut self) -> usize;

    /// Read access to one buffer.
    fn handle_buffer(&self, kind: HandleKind) -> &HandleBuffer;

    /// Buffers as handed to the wait primitive. Valid until the next fill
    /// or `clear_handles`.
    fn handle_buffers_mut(&mut self) -> HandleBuffersMut<'_>;

    /// A fresh, empty descriptor. Never shares storage with earlier ones.
    fn instantiate_next_executable(&self) -> AnyExecutable {
        AnyExecutable::new()
    }

    /// Populate `any_exec` with the next ready, unclaimed subscription.
    /// Left untouched if there is none.
    fn get_next_subscription(&mut self, any_exec: &mut AnyExecutable, nodes: &[Weak<Node>]);

    /// Populate `any_exec` with the next ready, unclaimed service.
    fn get_next_service(&mut self, any_exec: &mut AnyExecutable, nodes: &[Weak<Node>]);

    /// Populate `any_exec` with the next ready, unclaimed client.
    fn get_next_client(&mut self, any_exec: &mut AnyExecutable, nodes: &[Weak<Node>]);
}

/// Default strategy: buffers allocated from the heap per [`BufferPolicy`].
#[derive(Debug)]
pub struct AllocatorMemoryStrategy {
    selection: SelectionPolicy,
    entities: EntityIndex,
    subscriber_handles: HandleBuffer,
    service_handles: HandleBuffer,
    client_handles: HandleBuffer,
    passes: usize,
    rotation: usize,
}

impl Default for AllocatorMemoryStrategy {
    fn default() -> Self {
        Self::new(BufferPolicy::default(), SelectionPolicy::default())
    }
}

impl AllocatorMemoryStrategy {
    #[must_use]
    pub fn new(policy: BufferPolicy, selection: SelectionPolicy) -> Self {
        let (subscriber_handles, service_handles, client_handles) = match policy {
            BufferPolicy::GrowOnly { initial_capacity } => (
                HandleBuffer::growable(HandleKind::Subscription, initial_capacity),
                HandleBuffer::growable(HandleKind::Service, initial_capacity),
                HandleBuffer::growable(HandleKind::Client, initial_capacity),
            ),
            BufferPolicy::Preallocated {
                subscriptions,
                services,
                clients,
            } => (
                HandleBuffer::fixed(HandleKind::Subscription, subscriptions),
                HandleBuffer::fixed(HandleKind::Service, services),
                HandleBuffer::fixed(HandleKind::Client, clients),
            ),
        };

        Self {
            selection,
            entities: EntityIndex::new(),
            subscriber_handles,
            service_handles,
            client_handles,
            passes: 0,
            rotation: 0,
        }
    }

    /// Grow-only buffers starting empty, collection-order selection.
    #[must_use]
    pub fn dynamic() -> Self {
        Self::default()
    }

    /// Fixed-capacity buffers, collection-order selection.
    #[must_use]
    pub fn preallocated(subscriptions: usize, services: usize, clients: usize) -> Self {
        Self::new(
            BufferPolicy::Preallocated {
                subscriptions,
                services,
                clients,
            },
            SelectionPolicy::CollectionOrder,
        )
    }

    #[must_use]
    pub fn selection_policy(&self) -> SelectionPolicy {
        self.selection
    }

    /// The active entity snapshot.
    #[must_use]
    pub fn entities(&self) -> &EntityIndex {
        &self.entities
    }

    fn finish_fill(&mut self, kind: HandleKind) -> usize {
        let rotation = self.rotation;
        let selection = self.selection;
        let buffer = self.buffer_mut(kind);
        if buffer.dropped() > 0 {
            log::warn!(
                "[executor] {} handle buffer full: {} of {} handles not waited on",
                kind,
                buffer.dropped(),
                buffer.len() + buffer.dropped()
            );
        }
        if selection == SelectionPolicy::RoundRobin {
            buffer.rotate(rotation);
        }
        buffer.len()
    }

    fn buffer_mut(&mut self, kind: HandleKind) -> &mut HandleBuffer {
        match kind {
            HandleKind::Subscription => &mut self.subscriber_handles,
            HandleKind::Service => &mut self.service_handles,
            HandleKind::Client => &mut self.client_handles,
        }
    }
}

/// Resolve a ready endpoint's group and node, honouring group exclusion.
fn claim_owners(
    executable: Executable,
    group: Option<Arc<CallbackGroup>>,
    nodes: &[Weak<Node>],
) -> Claim<(Executable, Arc<CallbackGroup>, Arc<Node>)> {
    let Some(group) = group else {
        return Claim::Stale;
    };
    if group.is_busy() {
        return Claim::Busy;
    }
    match resolver::resolve_node_by_group(&group, nodes) {
        Some(node) => Claim::Ready((executable, group, node)),
        None => Claim::Stale,
    }
}

fn populate(
    any_exec: &mut AnyExecutable,
    claimed: Option<(Executable, Arc<CallbackGroup>, Arc<Node>)>,
) {
    if let Some((executable, group, node)) = claimed {
        any_exec.populate(executable, group, node);
    }
}

impl MemoryStrategy for AllocatorMemoryStrategy {
    fn collect_entities(&mut self, nodes: &[Weak<Node>]) -> bool {
        self.rotation = self.passes;
        self.passes = self.passes.wrapping_add(1);
        self.entities.collect(nodes)
    }

    fn clear_active_entities(&mut self) {
        self.entities.clear();
    }

    fn clear_handles(&mut self) {
        self.subscriber_handles.clear();
        self.service_handles.clear();
        self.client_handles.clear();
    }

    fn fill_subscriber_handles(&mut self) -> usize {
        self.subscriber_handles
            .prepare(self.entities.subscription_handle_hint());
        for subscription in self.entities.live_subscriptions() {
            for handle in subscription.handles() {
                self.subscriber_handles.push(handle);
            }
        }
        self.finish_fill(HandleKind::Subscription)
    }

    fn fill_service_handles(&mut self) -> usize {
        self.service_handles.prepare(self.entities.service_count());
        for service in self.entities.live_services() {
            self.service_handles.push(service.handle());
        }
        self.finish_fill(HandleKind::Service)
    }

    fn fill_client_handles(&mut self) -> usize {
        self.client_handles.prepare(self.entities.client_count());
        for client in self.entities.live_clients() {
            self.client_handles.push(client.handle());
        }
        self.finish_fill(HandleKind::Client)
    }

    fn handle_buffer(&self, kind: HandleKind) -> &HandleBuffer {
        match kind {
            HandleKind::Subscription => &self.subscriber_handles,
            HandleKind::Service => &self.service_handles,
            HandleKind::Client => &self.client_handles,
        }
    }

    fn handle_buffers_mut(&mut self) -> HandleBuffersMut<'_> {
        HandleBuffersMut {
            subscriptions: self.subscriber_handles.as_mut_slice(),
            services: self.service_handles.as_mut_slice(),
            clients: self.client_handles.as_mut_slice(),
        }
    }

    fn get_next_subscription(&mut self, any_exec: &mut AnyExecutable, nodes: &[Weak<Node>]) {
        let claimed = self.subscriber_handles.claim_next(|handle: NativeHandle| {
            let Some(subscription) = resolver::resolve_subscription_by_handle(handle, nodes)
            else {
                return Claim::Stale;
            };
            let group = resolver::resolve_group_by_subscription(&subscription, nodes);
            let executable = if subscription.intra_process_handle() == Some(handle) {
                Executable::IntraProcessSubscription(subscription)
            } else {
                Executable::Subscription(subscription)
            };
            claim_owners(executable, group, nodes)
        });
        populate(any_exec, claimed);
    }

    fn get_next_service(&mut self, any_exec: &mut AnyExecutable, nodes: &[Weak<Node>]) {
        let claimed = self.service_handles.claim_next(|handle| {
            let Some(service) = resolver::resolve_service_by_handle(handle, nodes) else {
                return Claim::Stale;
            };
            let group = resolver::resolve_group_by_service(&service, nodes);
            claim_owners(Executable::Service(service), group, nodes)
        });
        populate(any_exec, claimed);
    }

    fn get_next_client(&mut self, any_exec: &mut AnyExecutable, nodes: &[Weak<Node>]) {
        let claimed = self.client_handles.claim_next(|handle| {
            let Some(client) = resolver::resolve_client_by_handle(handle, nodes) else {
                return Claim::Stale;
            };
            let group = resolver::resolve_group_by_client(&client, nodes);
            claim_owners(Executable::Client(client), group, nodes)
        });
        populate(any_exec, claimed);
    }
}
