// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::endpoint::{Client, Service, Subscription};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Mutual-exclusion classification of a callback group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallbackGroupType {
    /// At most one callback of the group may run at a time.
    #[default]
    MutuallyExclusive,
    /// Callbacks of the group may run concurrently.
    Reentrant,
}

/// Mutual-exclusion domain grouping endpoints for dispatch.
///
/// Subscriptions are referenced weakly and expire with their last user
/// handle; services and clients are owned by the group.
#[derive(Debug)]
pub struct CallbackGroup {
    group_type: CallbackGroupType,
    can_be_taken_from: AtomicBool,
    subscriptions: RwLock<Vec<Weak<Subscription>>>,
    services: RwLock<Vec<Arc<Service>>>,
    clients: RwLock<Vec<Arc<Client>>>,
}

impl CallbackGroup {
    #[must_use]
    pub fn new(group_type: CallbackGroupType) -> Self {
        Self {
            group_type,
            can_be_taken_from: AtomicBool::new(true),
            subscriptions: RwLock::new(Vec::new()),
            services: RwLock::new(Vec::new()),
            clients: RwLock::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn group_type(&self) -> CallbackGroupType {
        self.group_type
    }

    /// Whether work may currently be taken from this group.
    ///
    /// Always true for reentrant groups from the executor's point of view;
    /// for mutually exclusive groups the dispatcher clears it while one of
    /// the group's callbacks is running.
    #[must_use]
    pub fn can_be_taken_from(&self) -> bool {
        self.can_be_taken_from.load(Ordering::Acquire)
    }

    /// Set by the dispatcher around callback execution.
    pub fn set_can_be_taken_from(&self, value: bool) {
        self.can_be_taken_from.store(value, Ordering::Release);
    }

    /// True if selection must skip this group right now.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.group_type == CallbackGroupType::MutuallyExclusive && !self.can_be_taken_from()
    }

    pub fn add_subscription(&self, subscription: &Arc<Subscription>) {
        self.subscriptions.write().push(Arc::downgrade(subscription));
    }

    /// Remove a subscription; expired entries are pruned on the way.
    pub fn remove_subscription(&self, subscription: &Arc<Subscription>) -> bool {
        let target = Arc::as_ptr(subscription);
        let mut found = false;
        self.subscriptions.write().retain(|weak| {
            if std::ptr::eq(weak.as_ptr(), target) {
                found = true;
                return false;
            }
            weak.strong_count() > 0
        });
        found
    }

    pub fn add_service(&self, service: Arc<Service>) {
        self.services.write().push(service);
    }

    pub fn remove_service(&self, service: &Arc<Service>) -> bool {
        let mut services = self.services.write();
        let before = services.len();
        services.retain(|owned| !Arc::ptr_eq(owned, service));
        services.len() != before
    }

    pub fn add_client(&self, client: Arc<Client>) {
        self.clients.write().push(client);
    }

    pub fn remove_client(&self, client: &Arc<Client>) -> bool {
        let mut clients = self.clients.write();
        let before = clients.len();
        clients.retain(|owned| !Arc::ptr_eq(owned, client));
        clients.len() != before
    }

    /// Snapshot of the subscription references, live or not.
    #[must_use]
    pub fn subscription_ptrs(&self) -> Vec<Weak<Subscription>> {
        self.subscriptions.read().clone()
    }

    #[must_use]
    pub fn service_ptrs(&self) -> Vec<Arc<Service>> {
        self.services.read().clone()
    }

    #[must_use]
    pub fn client_ptrs(&self) -> Vec<Arc<Client>> {
        self.clients.read().clone()
    }

    /// First live subscription matching `pred`, in registration order.
    pub fn find_subscription(
        &self,
        mut pred: impl FnMut(&Subscription) -> bool,
    ) -> Option<Arc<Subscription>> {
        self.subscriptions
            .read()
            .iter()
            .filter_map(Weak::upgrade)
            .find(|subscription| pred(subscription.as_ref()))
    }

    pub fn find_service(&self, mut pred: impl FnMut(&Service) -> bool) -> Option<Arc<Service>> {
        self.services
            .read()
            .iter()
            .find(|service| pred(service.as_ref()))
            .cloned()
    }

    pub fn find_client(&self, mut pred: impl FnMut(&Client) -> bool) -> Option<Arc<Client>> {
        self.clients
            .read()
            .iter()
            .find(|client| pred(client.as_ref()))
            .cloned()
    }

    #[must_use]
    pub fn has_subscription(&self, subscription: &Arc<Subscription>) -> bool {
        self.find_subscription(|live| std::ptr::eq(live, Arc::as_ptr(subscription)))
            .is_some()
    }

    #[must_use]
    pub fn has_service(&self, service: &Arc<Service>) -> bool {
        self.services
            .read()
            .iter()
            .any(|owned| Arc::ptr_eq(owned, service))
    }

    #[must_use]
    pub fn has_client(&self, client: &Arc<Client>) -> bool {
        self.clients
            .read()
            .iter()
            .any(|owned| Arc::ptr_eq(owned, client))
    }
}
