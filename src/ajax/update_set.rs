//! Regions queued for refresh.
//!
//! The set is always an antichain over the ancestor relation: no entry is an
//! ancestor of another. Refreshing an ancestor re-renders its descendants, so
//! a separately queued descendant would either render twice or race a stale
//! client-side element against markup that no longer exists.

use super::ComponentEntry;
use crate::core::{ComponentTree, NodeId};
use crate::error::{Result, UpdateError};

#[derive(Debug, Default, Clone)]
pub struct UpdateSet {
    entries: Vec<ComponentEntry>,
}

impl UpdateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `entry` for refresh.
    ///
    /// Returns `Ok(false)` when the node, or one of its ancestors, is already
    /// queued. Queued descendants of the new node are removed. Nodes that can
    /// not be replaced on their own are configuration errors.
    pub fn add<T>(&mut self, tree: &T, entry: ComponentEntry) -> Result<bool>
    where
        T: ComponentTree + ?Sized,
    {
        let node = entry.node();
        check_node(tree, node)?;

        for existing in &self.entries {
            if existing.node() == node {
                crate::debug!("ajax"; "`{}` already queued", tree.describe(node));
                return Ok(false);
            }
            if tree.is_ancestor(existing.node(), node) {
                crate::debug!(
                    "ajax";
                    "`{}` covered by queued ancestor `{}`",
                    tree.describe(node),
                    tree.describe(existing.node())
                );
                return Ok(false);
            }
        }

        let before = self.entries.len();
        self.entries
            .retain(|existing| !tree.is_ancestor(node, existing.node()));
        let removed = before - self.entries.len();
        if removed > 0 {
            crate::debug!(
                "ajax";
                "`{}` subsumes {} queued descendant(s)",
                tree.describe(node),
                removed
            );
        }

        self.entries.push(entry);
        Ok(true)
    }

    /// Remove entries whose node is no longer attached to the tree.
    ///
    /// Returns the dropped entries.
    pub(crate) fn drop_detached<T>(&mut self, tree: &T) -> Vec<ComponentEntry>
    where
        T: ComponentTree + ?Sized,
    {
        let (kept, dropped): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| tree.is_attached(entry.node()));
        self.entries = kept;
        dropped
    }

    pub fn entries(&self) -> &[ComponentEntry] {
        &self.entries
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.entries.iter().any(|e| e.node() == node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reject nodes that cannot be replaced as one client-side fragment.
pub fn check_node<T>(tree: &T, node: NodeId) -> Result<()>
where
    T: ComponentTree + ?Sized,
{
    let caps = tree.caps(node);
    let component = || tree.describe(node);

    if caps.is_root {
        Err(UpdateError::RootNode {
            component: component(),
        })
    } else if !caps.has_stable_id {
        Err(UpdateError::NoStableId {
            component: component(),
        })
    } else if caps.body_only {
        Err(UpdateError::BodyOnly {
            component: component(),
        })
    } else if !caps.is_anchorable {
        Err(UpdateError::NotAnchorable {
            component: component(),
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NodeCaps;
    use crate::tree::{MemoryTree, NodeSpec};

    /// root
    /// └── a
    ///     ├── a1
    ///     │   └── a1x
    ///     └── a2
    /// b
    fn tree() -> (MemoryTree, [NodeId; 5]) {
        let mut tree = MemoryTree::new("Page");
        let root = tree.root();
        let a = tree.add(root, NodeSpec::region("a"));
        let a1 = tree.add(a, NodeSpec::region("a1"));
        let a1x = tree.add(a1, NodeSpec::region("a1x"));
        let a2 = tree.add(a, NodeSpec::region("a2"));
        let b = tree.add(root, NodeSpec::region("b"));
        (tree, [a, a1, a1x, a2, b])
    }

    fn nodes(set: &UpdateSet) -> Vec<NodeId> {
        set.entries().iter().map(ComponentEntry::node).collect()
    }

    #[test]
    fn test_add_same_node_twice() {
        let (tree, [a, ..]) = tree();
        let mut set = UpdateSet::new();

        assert!(set.add(&tree, a.into()).unwrap());
        assert!(!set.add(&tree, a.into()).unwrap());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_descendant_of_queued_rejected() {
        let (tree, [a, a1, a1x, ..]) = tree();
        let mut set = UpdateSet::new();

        set.add(&tree, a.into()).unwrap();
        assert!(!set.add(&tree, a1.into()).unwrap());
        assert!(!set.add(&tree, a1x.into()).unwrap());
        assert_eq!(nodes(&set), [a]);
    }

    #[test]
    fn test_ancestor_replaces_descendants() {
        let (tree, [a, a1, _, a2, b]) = tree();
        let mut set = UpdateSet::new();

        set.add(&tree, a1.into()).unwrap();
        set.add(&tree, b.into()).unwrap();
        set.add(&tree, a2.into()).unwrap();
        assert!(set.add(&tree, a.into()).unwrap());

        assert_eq!(nodes(&set), [b, a]);
    }

    /// A legacy variant of this algorithm removed only the first descendant
    /// it met and stopped scanning. Every descendant must go.
    #[test]
    fn test_ancestor_add_sweeps_every_descendant() {
        let (tree, [a, a1, a1x, a2, _]) = tree();
        let mut set = UpdateSet::new();

        set.add(&tree, a1x.into()).unwrap();
        set.add(&tree, a2.into()).unwrap();
        assert_eq!(set.len(), 2);

        set.add(&tree, a.into()).unwrap();
        assert_eq!(nodes(&set), [a]);
        assert!(!set.contains(a1));
    }

    #[test]
    fn test_antichain_invariant() {
        let (tree, ids) = tree();
        // every permutation-ish order of adds keeps the antichain
        let orders: [[usize; 5]; 4] = [
            [0, 1, 2, 3, 4],
            [4, 3, 2, 1, 0],
            [2, 4, 0, 3, 1],
            [1, 3, 2, 4, 0],
        ];

        for order in orders {
            let mut set = UpdateSet::new();
            for i in order {
                set.add(&tree, ids[i].into()).unwrap();
            }
            for x in set.entries() {
                for y in set.entries() {
                    assert!(!tree.is_ancestor(x.node(), y.node()));
                }
            }
        }
    }

    #[test]
    fn test_precondition_errors() {
        let mut tree = MemoryTree::new("Page");
        let root = tree.root();
        let plain = tree.add(root, NodeSpec::new("plain").caps(NodeCaps::plain()));
        let rows = tree.add(root, NodeSpec::new("rows").caps(NodeCaps::repeater()));
        let body = tree.add(
            root,
            NodeSpec::new("body").caps(NodeCaps {
                body_only: true,
                ..NodeCaps::region()
            }),
        );

        let mut set = UpdateSet::new();
        assert!(matches!(
            set.add(&tree, root.into()),
            Err(UpdateError::RootNode { .. })
        ));
        assert!(matches!(
            set.add(&tree, plain.into()),
            Err(UpdateError::NoStableId { .. })
        ));
        assert!(matches!(
            set.add(&tree, body.into()),
            Err(UpdateError::BodyOnly { .. })
        ));
        assert!(matches!(
            set.add(&tree, rows.into()),
            Err(UpdateError::NotAnchorable { .. })
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn test_drop_detached() {
        let (mut tree, [a, _, _, _, b]) = tree();
        let mut set = UpdateSet::new();
        set.add(&tree, a.into()).unwrap();
        set.add(&tree, b.into()).unwrap();

        tree.remove(a);
        let dropped = set.drop_detached(&tree);

        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].node(), a);
        assert_eq!(nodes(&set), [b]);
    }
}
