// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Work descriptor handed from selection to the dispatcher.

use crate::entities::{CallbackGroup, Client, Node, Service, Subscription};
use crate::handle::{HandleKind, NativeHandle};
use std::sync::Arc;

/// The single unit of ready work carried by an [`AnyExecutable`].
#[derive(Debug, Clone)]
pub enum Executable {
    /// Message ready on the subscription's primary handle.
    Subscription(Arc<Subscription>),
    /// Message ready on the subscription's intra-process handle.
    IntraProcessSubscription(Arc<Subscription>),
    /// Request ready on a service server.
    Service(Arc<Service>),
    /// Response ready on a service client.
    Client(Arc<Client>),
}

impl Executable {
    #[must_use]
    pub fn kind(&self) -> HandleKind {
        match self {
            Self::Subscription(_) | Self::IntraProcessSubscription(_) => HandleKind::Subscription,
            Self::Service(_) => HandleKind::Service,
            Self::Client(_) => HandleKind::Client,
        }
    }

    /// The handle that was reported ready.
    #[must_use]
    pub fn ready_handle(&self) -> NativeHandle {
        match self {
            Self::Subscription(sub) => sub.handle(),
            Self::IntraProcessSubscription(sub) => {
                sub.intra_process_handle().unwrap_or_else(|| sub.handle())
            }
            Self::Service(svc) => svc.handle(),
            Self::Client(cli) => cli.handle(),
        }
    }
}

/// Selected work packaged with its owning callback group and node.
///
/// Holds strong references so a dispatcher may run it after the scheduling
/// iteration ends, even if the user destroys the node meanwhile. Either all
/// three parts are set or none are.
#[derive(Debug, Clone, Default)]
pub struct AnyExecutable {
    work: Option<(Executable, Arc<CallbackGroup>, Arc<Node>)>,
}

impl AnyExecutable {
    /// An empty descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn populate(
        &mut self,
        executable: Executable,
        group: Arc<CallbackGroup>,
        node: Arc<Node>,
    ) {
        self.work = Some((executable, group, node));
    }

    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.work.is_some()
    }

    #[must_use]
    pub fn executable(&self) -> Option<&Executable> {
        self.work.as_ref().map(|(executable, _, _)| executable)
    }

    #[must_use]
    pub fn callback_group(&self) -> Option<&Arc<CallbackGroup>> {
        self.work.as_ref().map(|(_, group, _)| group)
    }

    #[must_use]
    pub fn node(&self) -> Option<&Arc<Node>> {
        self.work.as_ref().map(|(_, _, node)| node)
    }

    #[must_use]
    pub fn subscription(&self) -> Option<&Arc<Subscription>> {
        match self.executable()? {
            Executable::Subscription(sub) => Some(sub),
            _ => None,
        }
    }

    #[must_use]
    pub fn subscription_intra_process(&self) -> Option<&Arc<Subscription>> {
        match self.executable()? {
            Executable::IntraProcessSubscription(sub) => Some(sub),
            _ => None,
        }
    }

    #[must_use]
    pub fn service(&self) -> Option<&Arc<Service>> {
        match self.executable()? {
            Executable::Service(svc) => Some(svc),
            _ => None,
        }
    }

    #[must_use]
    pub fn client(&self) -> Option<&Arc<Client>> {
        match self.executable()? {
            Executable::Client(cli) => Some(cli),
            _ => None,
        }
    }

    /// Consume the descriptor, yielding its parts if populated.
    #[must_use]
    pub fn into_parts(self) -> Option<(Executable, Arc<CallbackGroup>, Arc<Node>)> {
        self.work
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CallbackGroupType;

    #[test]
    fn new_descriptor_is_empty() {
        let exec = AnyExecutable::new();
        assert!(!exec.is_populated());
        assert!(exec.subscription().is_none());
        assert!(exec.callback_group().is_none());
        assert!(exec.node().is_none());
    }

    #[test]
    fn populated_descriptor_keeps_owners_alive() {
        let node = Node::new("owner", "/");
        let group = node.create_callback_group(CallbackGroupType::MutuallyExclusive);
        let sub = Arc::new(Subscription::with_intra_process("imu"));

        let mut exec = AnyExecutable::new();
        exec.populate(
            Executable::IntraProcessSubscription(Arc::clone(&sub)),
            Arc::clone(&group),
            Arc::clone(&node),
        );

        let weak_node = Arc::downgrade(&node);
        let weak_group = Arc::downgrade(&group);
        drop(node);
        drop(group);
        assert!(weak_node.upgrade().is_some());
        assert!(weak_group.upgrade().is_some());

        assert!(exec.subscription().is_none());
        let ipc = exec.subscription_intra_process().expect("ipc subscription");
        assert!(Arc::ptr_eq(ipc, &sub));
        let executable = exec.executable().expect("executable");
        assert_eq!(executable.kind(), HandleKind::Subscription);
        assert_eq!(Some(executable.ready_handle()), sub.intra_process_handle());

        drop(exec);
        assert!(weak_node.upgrade().is_none());
    }
}
