//! Node handles and capability tags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle to a node of a component tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Capability tags checked before a node may be queued for refresh.
///
/// A closed set of flags instead of inspecting the concrete node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeCaps {
    /// The node is the tree root (the page itself).
    pub is_root: bool,
    /// The node renders exactly one wrapping element the client can replace.
    /// Repeaters and other virtual containers are not anchorable.
    pub is_anchorable: bool,
    /// The node writes its stable markup id into its wrapping element.
    pub has_stable_id: bool,
    /// The node renders only its body, without its own tag.
    pub body_only: bool,
}

impl NodeCaps {
    /// A page root.
    pub const fn root() -> Self {
        Self {
            is_root: true,
            is_anchorable: true,
            has_stable_id: false,
            body_only: false,
        }
    }

    /// An ordinary element without a client-visible id.
    pub const fn plain() -> Self {
        Self {
            is_root: false,
            is_anchorable: true,
            has_stable_id: false,
            body_only: false,
        }
    }

    /// An element that can be replaced on the client.
    pub const fn region() -> Self {
        Self {
            has_stable_id: true,
            ..Self::plain()
        }
    }

    /// A repeating container. Its items carry ids, but there is no single
    /// element to anchor a replacement on.
    pub const fn repeater() -> Self {
        Self {
            is_anchorable: false,
            ..Self::region()
        }
    }

    /// Whether a refresh of this node can be sent as one replaceable fragment.
    pub const fn is_replaceable(&self) -> bool {
        !self.is_root && self.is_anchorable && self.has_stable_id && !self.body_only
    }
}

impl Default for NodeCaps {
    fn default() -> Self {
        Self::plain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaceable_caps() {
        assert!(NodeCaps::region().is_replaceable());
        assert!(!NodeCaps::root().is_replaceable());
        assert!(!NodeCaps::plain().is_replaceable());
        assert!(!NodeCaps::repeater().is_replaceable());

        let body_only = NodeCaps {
            body_only: true,
            ..NodeCaps::region()
        };
        assert!(!body_only.is_replaceable());
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId(7).to_string(), "#7");
    }
}
