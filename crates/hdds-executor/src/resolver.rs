// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Map ready handles and endpoints back to their owners.
//!
//! Every lookup walks node -> callback group -> endpoint over the supplied
//! weak node list, upgrading references as it goes. Expired nodes, groups or
//! subscriptions are skipped. Matching is by identity only: handle value
//! equality for [`NativeHandle`], pointer equality for endpoints and groups.
//!
//! `None` is a normal outcome. The wait primitive can report a handle whose
//! endpoint was destroyed in the meantime.

use crate::entities::{CallbackGroup, Client, Node, Service, Subscription};
use crate::handle::NativeHandle;
use std::sync::{Arc, Weak};

/// Live (node, group) pairs in traversal order.
fn live_groups(
    nodes: &[Weak<Node>],
) -> impl Iterator<Item = (Arc<Node>, Arc<CallbackGroup>)> + '_ {
    nodes.iter().filter_map(Weak::upgrade).flat_map(|node| {
        node.live_callback_groups()
            .into_iter()
            .map(move |group| (Arc::clone(&node), group))
    })
}

/// Subscription whose primary or intra-process handle is `handle`.
#[must_use]
pub fn resolve_subscription_by_handle(
    handle: NativeHandle,
    nodes: &[Weak<Node>],
) -> Option<Arc<Subscription>> {
    live_groups(nodes)
        .find_map(|(_, group)| group.find_subscription(|sub| sub.owns_handle(handle)))
}

#[must_use]
pub fn resolve_service_by_handle(
    handle: NativeHandle,
    nodes: &[Weak<Node>],
) -> Option<Arc<Service>> {
    live_groups(nodes).find_map(|(_, group)| group.find_service(|svc| svc.handle() == handle))
}

#[must_use]
pub fn resolve_client_by_handle(
    handle: NativeHandle,
    nodes: &[Weak<Node>],
) -> Option<Arc<Client>> {
    live_groups(nodes).find_map(|(_, group)| group.find_client(|cli| cli.handle() == handle))
}

/// Node that registered `group`.
#[must_use]
pub fn resolve_node_by_group(
    group: &Arc<CallbackGroup>,
    nodes: &[Weak<Node>],
) -> Option<Arc<Node>> {
    nodes
        .iter()
        .filter_map(Weak::upgrade)
        .find(|node| node.has_callback_group(group))
}

#[must_use]
pub fn resolve_group_by_subscription(
    subscription: &Arc<Subscription>,
    nodes: &[Weak<Node>],
) -> Option<Arc<CallbackGroup>> {
    live_groups(nodes)
        .map(|(_, group)| group)
        .find(|group| group.has_subscription(subscription))
}

#[must_use]
pub fn resolve_group_by_service(
    service: &Arc<Service>,
    nodes: &[Weak<Node>],
) -> Option<Arc<CallbackGroup>> {
    live_groups(nodes)
        .map(|(_, group)| group)
        .find(|group| group.has_service(service))
}

#[must_use]
pub fn resolve_group_by_client(
    client: &Arc<Client>,
    nodes: &[Weak<Node>],
) -> Option<Arc<CallbackGroup>> {
    live_groups(nodes)
        .map(|(_, group)| group)
        .find(|group| group.has_client(client))
}
