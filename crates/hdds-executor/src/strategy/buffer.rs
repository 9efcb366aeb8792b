// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-kind native handle buffers.
//!
//! A buffer is rebuilt every iteration but keeps its allocation: clearing
//! only resets the logical length. Growable buffers double their capacity
//! when the population outgrows them, so a process that ramps up to `n`
//! endpoints reallocates O(log n) times in total.
//!
//! After filling, the buffer is handed to the wait primitive, which reports
//! readiness by clearing every slot that is not ready.

use crate::handle::{HandleKind, NativeHandle};
use std::collections::HashSet;

/// Smallest capacity a growable buffer grows to.
const MIN_GROWTH_CAPACITY: usize = 4;

/// How handle buffers obtain their memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferPolicy {
    /// Start at `initial_capacity` slots per kind and double on demand.
    /// Capacity is never released.
    GrowOnly { initial_capacity: usize },
    /// Fixed capacities reserved up front; never reallocates. Handles past
    /// the capacity are not written and are counted as dropped.
    ///
    /// Collection order is stable, so the same endpoints overflow on every
    /// iteration: they are never waited on and their work is never
    /// selected until the population shrinks or the capacity is raised.
    Preallocated {
        subscriptions: usize,
        services: usize,
        clients: usize,
    },
}

impl Default for BufferPolicy {
    fn default() -> Self {
        Self::GrowOnly {
            initial_capacity: 0,
        }
    }
}

/// Outcome of offering a ready handle to the selection logic.
pub(crate) enum Claim<T> {
    /// Take this one; the slot is consumed.
    Ready(T),
    /// Owner is temporarily unavailable; leave the slot for later.
    Busy,
    /// No live owner; the slot is discarded.
    Stale,
}

/// Resizable array of handle slots for one endpoint kind.
#[derive(Debug)]
pub struct HandleBuffer {
    kind: HandleKind,
    slots: Vec<Option<NativeHandle>>,
    fixed_capacity: Option<usize>,
    reallocations: usize,
    dropped: usize,
}

impl HandleBuffer {
    pub(crate) fn growable(kind: HandleKind, initial_capacity: usize) -> Self {
        Self {
            kind,
            slots: Vec::with_capacity(initial_capacity),
            fixed_capacity: None,
            reallocations: 0,
            dropped: 0,
        }
    }

    pub(crate) fn fixed(kind: HandleKind, capacity: usize) -> Self {
        Self {
            kind,
            slots: Vec::with_capacity(capacity),
            fixed_capacity: Some(capacity),
            reallocations: 0,
            dropped: 0,
        }
    }

    #[must_use]
    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    /// Number of slots written by the last fill (ready or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots available without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.fixed_capacity.unwrap_or_else(|| self.slots.capacity())
    }

    /// Number of times this buffer grew since creation.
    #[must_use]
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }

    /// Handles that did not fit a fixed buffer during the last fill.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Slots still holding a handle (ready and unclaimed after the wait).
    #[must_use]
    pub fn ready_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Option<NativeHandle>] {
        &self.slots
    }

    pub fn as_mut_slice(&mut self) -> &mut [Option<NativeHandle>] {
        &mut self.slots
    }

    /// Reset the logical length; capacity is kept.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.dropped = 0;
    }

    /// Clear and make room for `needed` handles.
    pub(crate) fn prepare(&mut self, needed: usize) {
        self.clear();
        if self.fixed_capacity.is_some() {
            return;
        }

        let current = self.slots.capacity();
        if needed <= current {
            return;
        }

        let mut target = current.max(MIN_GROWTH_CAPACITY);
        while target < needed {
            target = target.saturating_mul(2);
        }
        self.slots.reserve_exact(target);
        self.reallocations += 1;
        log::debug!(
            "[executor] grew {} handle buffer {} -> {} slots (needed {})",
            self.kind,
            current,
            self.slots.capacity(),
            needed
        );
    }

    /// Append a handle; returns false if a fixed buffer is full.
    pub(crate) fn push(&mut self, handle: NativeHandle) -> bool {
        if let Some(capacity) = self.fixed_capacity {
            if self.slots.len() >= capacity {
                self.dropped += 1;
                return false;
            }
        }
        self.slots.push(Some(handle));
        true
    }

    /// Rotate the filled slots left by `offset` positions.
    pub(crate) fn rotate(&mut self, offset: usize) {
        let len = self.slots.len();
        if len > 1 {
            self.slots.rotate_left(offset % len);
        }
    }

    /// Walk remaining ready slots in order and claim the first one `offer`
    /// accepts. Stale slots are cleared, busy slots are kept.
    pub(crate) fn claim_next<T>(
        &mut self,
        mut offer: impl FnMut(NativeHandle) -> Claim<T>,
    ) -> Option<T> {
        for slot in &mut self.slots {
            let Some(handle) = *slot else {
                continue;
            };
            match offer(handle) {
                Claim::Ready(value) => {
                    *slot = None;
                    return Some(value);
                }
                Claim::Busy => {}
                Claim::Stale => {
                    log::trace!("[executor] dropping stale {} handle {:?}", self.kind, handle);
                    *slot = None;
                }
            }
        }
        None
    }
}

/// Mutable view of all three buffers, handed to the wait primitive.
///
/// The primitive marks readiness by setting unready slots to `None`.
#[derive(Debug)]
pub struct HandleBuffersMut<'a> {
    pub subscriptions: &'a mut [Option<NativeHandle>],
    pub services: &'a mut [Option<NativeHandle>],
    pub clients: &'a mut [Option<NativeHandle>],
}

impl HandleBuffersMut<'_> {
    /// Total number of slots across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len() + self.services.len() + self.clients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep only the slots whose handle appears in `ready`.
    ///
    /// For wait primitives that report a list of ready identities instead
    /// of editing the buffers in place.
    pub fn retain_ready(&mut self, ready: &[NativeHandle]) {
        let ready: HashSet<NativeHandle> = ready.iter().copied().collect();
        for slot in self
            .subscriptions
            .iter_mut()
            .chain(self.services.iter_mut())
            .chain(self.clients.iter_mut())
        {
            if slot.is_some_and(|handle| !ready.contains(&handle)) {
                *slot = None;
            }
        }
    }

    /// Clear every slot (nothing ready, e.g. on timeout).
    pub fn clear_all(&mut self) {
        self.retain_ready(&[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handles(count: usize) -> Vec<NativeHandle> {
        (0..count).map(|_| NativeHandle::allocate()).collect()
    }

    #[test]
    fn growable_buffer_doubles_and_keeps_capacity() {
        let mut buffer = HandleBuffer::growable(HandleKind::Subscription, 0);

        buffer.prepare(3);
        assert!(buffer.capacity() >= MIN_GROWTH_CAPACITY);
        assert_eq!(buffer.reallocations(), 1);

        buffer.prepare(9);
        assert!(buffer.capacity() >= 16);
        assert_eq!(buffer.reallocations(), 2);

        let capacity = buffer.capacity();
        buffer.prepare(2);
        assert_eq!(buffer.capacity(), capacity);
        assert_eq!(buffer.reallocations(), 2);
        assert!(buffer.is_empty());
    }

    #[test]
    fn growth_is_logarithmic() {
        let mut buffer = HandleBuffer::growable(HandleKind::Client, 0);
        for needed in 1..=1024 {
            buffer.prepare(needed);
        }
        // 4, 8, ..., 1024
        assert!(buffer.reallocations() <= 9, "{}", buffer.reallocations());
    }

    #[test]
    fn fixed_buffer_drops_overflow() {
        let mut buffer = HandleBuffer::fixed(HandleKind::Service, 2);
        buffer.prepare(3);
        let written: Vec<bool> = handles(3).into_iter().map(|h| buffer.push(h)).collect();

        assert_eq!(written, vec![true, true, false]);
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.dropped(), 1);
        assert_eq!(buffer.capacity(), 2);
        assert_eq!(buffer.reallocations(), 0);

        buffer.clear();
        assert_eq!(buffer.dropped(), 0);
    }

    #[test]
    fn claim_next_skips_busy_and_discards_stale() {
        let ids = handles(3);
        let mut buffer = HandleBuffer::growable(HandleKind::Subscription, 4);
        buffer.prepare(3);
        for &id in &ids {
            buffer.push(id);
        }

        let claimed = buffer.claim_next(|handle| {
            if handle == ids[0] {
                Claim::Busy
            } else if handle == ids[1] {
                Claim::Stale
            } else {
                Claim::Ready(handle)
            }
        });

        assert_eq!(claimed, Some(ids[2]));
        assert_eq!(buffer.as_slice(), &[Some(ids[0]), None, None]);
        assert_eq!(buffer.ready_count(), 1);
    }

    #[test]
    fn rotate_moves_start_of_buffer() {
        let ids = handles(3);
        let mut buffer = HandleBuffer::growable(HandleKind::Subscription, 4);
        buffer.prepare(3);
        for &id in &ids {
            buffer.push(id);
        }

        buffer.rotate(4);
        assert_eq!(buffer.as_slice(), &[Some(ids[1]), Some(ids[2]), Some(ids[0])]);
    }

    #[test]
    fn retain_ready_clears_unready_slots() {
        let ids = handles(4);
        let mut subscriptions = vec![Some(ids[0]), Some(ids[1])];
        let mut services = vec![Some(ids[2])];
        let mut clients = vec![Some(ids[3])];

        let mut view = HandleBuffersMut {
            subscriptions: &mut subscriptions,
            services: &mut services,
            clients: &mut clients,
        };
        assert_eq!(view.len(), 4);
        view.retain_ready(&[ids[1], ids[3]]);

        assert_eq!(subscriptions, vec![None, Some(ids[1])]);
        assert_eq!(services, vec![None]);
        assert_eq!(clients, vec![Some(ids[3])]);
    }
}
