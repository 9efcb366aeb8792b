// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Snapshot of the endpoints reachable from the node list.

use crate::entities::{Client, Node, Service, Subscription};
use crate::handle::NativeHandle;
use std::sync::{Arc, Weak};

/// One collected handle and the endpoint it belongs to.
///
/// Providers may reuse a handle value once its endpoint is gone, so the
/// value alone does not identify an endpoint. Holding the `Weak` keeps the
/// old allocation reserved, which makes the pointer comparison sound.
type Entry<T> = (Weak<T>, NativeHandle);

fn same_entries<T>(a: &[Entry<T>], b: &[Entry<T>]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|((wa, ha), (wb, hb))| ha == hb && Weak::ptr_eq(wa, wb))
}

/// Endpoints and handles seen by a collection pass, in traversal order.
#[derive(Debug, Default)]
struct Signature {
    subscriptions: Vec<Entry<Subscription>>,
    services: Vec<Entry<Service>>,
    clients: Vec<Entry<Client>>,
}

impl Signature {
    fn clear(&mut self) {
        self.subscriptions.clear();
        self.services.clear();
        self.clients.clear();
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        same_entries(&self.subscriptions, &other.subscriptions)
            && same_entries(&self.services, &other.services)
            && same_entries(&self.clients, &other.clients)
    }
}

/// Endpoints reachable during the current iteration.
///
/// References are weak: the index never extends an endpoint's lifetime. An
/// endpoint that dies after collection is simply skipped when filling.
#[derive(Debug, Default)]
pub struct EntityIndex {
    subscriptions: Vec<Weak<Subscription>>,
    services: Vec<Weak<Service>>,
    clients: Vec<Weak<Client>>,
    current: Signature,
    previous: Signature,
}

impl EntityIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk `nodes` and record every live endpoint.
    ///
    /// Returns true if the endpoints or their handles differ from the
    /// previous pass (including order). Expired nodes and groups are skipped silently.
    pub fn collect(&mut self, nodes: &[Weak<Node>]) -> bool {
        self.clear();
        std::mem::swap(&mut self.current, &mut self.previous);
        self.current.clear();

        for node in nodes.iter().filter_map(Weak::upgrade) {
            for group in node.live_callback_groups() {
                for subscription in group.subscription_ptrs() {
                    let Some(live) = subscription.upgrade() else {
                        continue;
                    };
                    for handle in live.handles() {
                        self.current
                            .subscriptions
                            .push((Weak::clone(&subscription), handle));
                    }
                    self.subscriptions.push(subscription);
                }
                for service in group.service_ptrs() {
                    let weak = Arc::downgrade(&service);
                    self.current.services.push((Weak::clone(&weak), service.handle()));
                    self.services.push(weak);
                }
                for client in group.client_ptrs() {
                    let weak = Arc::downgrade(&client);
                    self.current.clients.push((Weak::clone(&weak), client.handle()));
                    self.clients.push(weak);
                }
            }
        }

        let changed = self.current != self.previous;
        log::debug!(
            "[executor] collected {} subscriptions, {} services, {} clients (changed={})",
            self.subscriptions.len(),
            self.services.len(),
            self.clients.len(),
            changed
        );
        changed
    }

    /// Forget the endpoints of this pass. The change-detection baseline is
    /// kept so the next `collect` can still compare.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
        self.services.clear();
        self.clients.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty() && self.services.is_empty() && self.clients.is_empty()
    }

    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Upper bound on subscription handles (primary + intra-process).
    pub(crate) fn subscription_handle_hint(&self) -> usize {
        self.live_subscriptions()
            .map(|subscription| subscription.handle_count())
            .sum()
    }

    pub(crate) fn live_subscriptions(&self) -> impl Iterator<Item = Arc<Subscription>> + '_ {
        self.subscriptions.iter().filter_map(Weak::upgrade)
    }

    pub(crate) fn live_services(&self) -> impl Iterator<Item = Arc<Service>> + '_ {
        self.services.iter().filter_map(Weak::upgrade)
    }

    pub(crate) fn live_clients(&self) -> impl Iterator<Item = Arc<Client>> + '_ {
        self.clients.iter().filter_map(Weak::upgrade)
    }
}
