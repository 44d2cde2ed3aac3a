//! The component tree capability.

use super::{NodeCaps, NodeId, ResponseStream};
use crate::header::HeaderResponse;

/// A stateful, already-rendered UI tree that can re-render single regions.
///
/// Implementors own markup templating and model resolution; the coordinator
/// only queries structure and asks for text.
pub trait ComponentTree {
    /// The page root.
    fn root(&self) -> NodeId;

    /// Parent of `node`, or `None` for the root and for nodes that were
    /// removed from the tree.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children of `node` in render order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn caps(&self, node: NodeId) -> NodeCaps;

    /// Stable client-side identifier of `node`.
    fn markup_id(&self, node: NodeId) -> String;

    /// Logical type of `node`, matched by `AjaxTarget::add_children`.
    fn kind(&self, node: NodeId) -> String;

    fn is_visible(&self, node: NodeId) -> bool {
        let _ = node;
        true
    }

    /// Render `node` (including its wrapping element) to `out`.
    fn render(&mut self, node: NodeId, out: &mut ResponseStream) -> anyhow::Result<()>;

    /// Emit the head contributions declared by `node` itself (not its children).
    fn render_head(&self, node: NodeId, response: &mut HeaderResponse<'_>) -> anyhow::Result<()>;

    /// Called once per queued node before any rendering happens.
    fn prepare_for_render(&mut self, node: NodeId) -> anyhow::Result<()> {
        let _ = node;
        Ok(())
    }

    /// Cleanup hook, invoked when `prepare_for_render` failed.
    fn after_render(&mut self, node: NodeId) {
        let _ = node;
    }

    /// Release per-request state after a response that touched this tree.
    fn detach(&mut self) {}

    /// Human readable name for diagnostics.
    fn describe(&self, node: NodeId) -> String {
        let id = self.markup_id(node);
        if id.is_empty() { node.to_string() } else { id }
    }

    /// Whether `ancestor` is a strict ancestor of `node`.
    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// Whether `node` is still reachable from the root.
    fn is_attached(&self, node: NodeId) -> bool {
        let root = self.root();
        node == root || self.is_ancestor(root, node)
    }
}
