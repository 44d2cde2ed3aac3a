//! Queued refresh entries and script entries.

use serde::{Deserialize, Serialize};

use crate::core::NodeId;

// =============================================================================
// Component Entry
// =============================================================================

/// One tree region to refresh, plus optional client-side swap overrides.
///
/// The override scripts receive `componentId` (and `markup` or
/// `insertedElements` where applicable) on the client and must call
/// `notify` when done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentEntry {
    node: NodeId,
    before_replace: Option<String>,
    after_replace: Option<String>,
    replace: Option<String>,
}

impl ComponentEntry {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            before_replace: None,
            after_replace: None,
            replace: None,
        }
    }

    /// Script run right before the element is replaced.
    pub fn with_before_replace(mut self, javascript: impl Into<String>) -> Self {
        self.before_replace = Some(javascript.into());
        self
    }

    /// Script run right after the element is replaced.
    pub fn with_after_replace(mut self, javascript: impl Into<String>) -> Self {
        self.after_replace = Some(javascript.into());
        self
    }

    /// Script performing the replacement itself instead of the default swap.
    pub fn with_replace(mut self, javascript: impl Into<String>) -> Self {
        self.replace = Some(javascript.into());
        self
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn before_replace(&self) -> Option<&str> {
        self.before_replace.as_deref()
    }

    pub fn after_replace(&self) -> Option<&str> {
        self.after_replace.as_deref()
    }

    pub fn replace(&self) -> Option<&str> {
        self.replace.as_deref()
    }
}

impl From<NodeId> for ComponentEntry {
    fn from(node: NodeId) -> Self {
        Self::new(node)
    }
}

// =============================================================================
// Javascript Entry
// =============================================================================

/// A script fragment with its execution mode.
///
/// An async entry must call `notify` on the client before processing
/// continues; a sync entry is executed and processing moves on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavascriptEntry {
    #[serde(rename = "async")]
    is_async: bool,
    javascript: String,
}

impl JavascriptEntry {
    pub fn sync(javascript: impl Into<String>) -> Self {
        Self {
            is_async: false,
            javascript: javascript.into(),
        }
    }

    pub fn with_async(javascript: impl Into<String>) -> Self {
        Self {
            is_async: true,
            javascript: javascript.into(),
        }
    }

    pub fn javascript(&self) -> &str {
        &self.javascript
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_entry_overrides() {
        let entry = ComponentEntry::new(NodeId(3))
            .with_before_replace("fadeOut(componentId, notify);")
            .with_after_replace("fadeIn(componentId, notify);");

        assert_eq!(entry.node(), NodeId(3));
        assert_eq!(entry.before_replace(), Some("fadeOut(componentId, notify);"));
        assert_eq!(entry.after_replace(), Some("fadeIn(componentId, notify);"));
        assert_eq!(entry.replace(), None);
    }

    #[test]
    fn test_javascript_entry_wire_shape() {
        let json = serde_json::to_string(&JavascriptEntry::with_async("go(notify)")).unwrap();
        assert_eq!(json, r#"{"async":true,"javascript":"go(notify)"}"#);
    }
}
