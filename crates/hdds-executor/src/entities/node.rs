// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::callback_group::{CallbackGroup, CallbackGroupType};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

/// Non-owning node list handed to the executor each iteration.
pub type WeakNodeVector = Vec<Weak<Node>>;

/// Named participant in the communication graph.
///
/// The node keeps only weak references to the groups created through it,
/// except for its default group which lives as long as the node.
#[derive(Debug)]
pub struct Node {
    name: String,
    namespace: String,
    default_group: Arc<CallbackGroup>,
    callback_groups: RwLock<Vec<Weak<CallbackGroup>>>,
}

impl Node {
    /// Create a node with a mutually exclusive default callback group.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Arc<Self> {
        let default_group = Arc::new(CallbackGroup::new(CallbackGroupType::MutuallyExclusive));
        let callback_groups = RwLock::new(vec![Arc::downgrade(&default_group)]);
        Arc::new(Self {
            name: name.into(),
            namespace: namespace.into(),
            default_group,
            callback_groups,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Fully qualified name (`/ns/name`).
    #[must_use]
    pub fn fully_qualified_name(&self) -> String {
        let namespace = self.namespace.trim_end_matches('/');
        format!("{}/{}", namespace, self.name)
    }

    #[must_use]
    pub fn default_callback_group(&self) -> Arc<CallbackGroup> {
        Arc::clone(&self.default_group)
    }

    /// Create a callback group owned by the caller.
    ///
    /// The node only keeps a weak reference: dropping the returned `Arc`
    /// destroys the group and everything it owns.
    #[must_use]
    pub fn create_callback_group(&self, group_type: CallbackGroupType) -> Arc<CallbackGroup> {
        let group = Arc::new(CallbackGroup::new(group_type));
        self.callback_groups.write().push(Arc::downgrade(&group));
        group
    }

    /// Snapshot of the group references, live or not, in creation order.
    #[must_use]
    pub fn callback_groups(&self) -> Vec<Weak<CallbackGroup>> {
        self.callback_groups.read().clone()
    }

    /// Live groups in creation order.
    #[must_use]
    pub fn live_callback_groups(&self) -> Vec<Arc<CallbackGroup>> {
        self.callback_groups
            .read()
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    /// True if `group` was created by (or is the default group of) this node.
    #[must_use]
    pub fn has_callback_group(&self, group: &Arc<CallbackGroup>) -> bool {
        let target = Arc::as_ptr(group);
        self.callback_groups
            .read()
            .iter()
            .any(|weak| weak.strong_count() > 0 && std::ptr::eq(weak.as_ptr(), target))
    }

    /// Drop references to groups that no longer exist.
    pub fn prune_callback_groups(&self) -> usize {
        let mut groups = self.callback_groups.write();
        let before = groups.len();
        groups.retain(|weak| weak.strong_count() > 0);
        before - groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_group_is_registered() {
        let node = Node::new("talker", "/");
        let default_group = node.default_callback_group();
        assert!(node.has_callback_group(&default_group));
        assert_eq!(node.live_callback_groups().len(), 1);
        assert_eq!(node.fully_qualified_name(), "/talker");
    }

    #[test]
    fn dropped_group_expires() {
        let node = Node::new("listener", "/robot");
        let group = node.create_callback_group(CallbackGroupType::Reentrant);
        assert_eq!(node.live_callback_groups().len(), 2);
        assert!(node.has_callback_group(&group));

        drop(group);
        assert_eq!(node.live_callback_groups().len(), 1);
        assert_eq!(node.callback_groups().len(), 2);
        assert_eq!(node.prune_callback_groups(), 1);
        assert_eq!(node.callback_groups().len(), 1);
        assert_eq!(node.fully_qualified_name(), "/robot/listener");
    }
}
