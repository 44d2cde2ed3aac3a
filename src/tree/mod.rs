//! In-memory component tree.
//!
//! [`MemoryTree`] is an arena of nodes implementing [`ComponentTree`]. It
//! backs the CLI demo pages (loaded from TOML fixtures) and the tests.
//!
//! # Rendering
//!
//! ```text
//! root      <!DOCTYPE html><html><head><title>..</title></head><body>..</body></html>
//! region    <tag id="markup-id">text children</tag>
//! plain     <tag>text children</tag>
//! repeater  children only, no wrapping element
//! hidden    <tag id="markup-id" style="display:none"></tag>  (if it has an id)
//! ```

mod fixture;
mod spec;

pub use fixture::{CapsKind, NodeFixture, PageFixture};
pub use spec::{HeadItem, NodeSpec};

use anyhow::{Result, bail};

use crate::core::{ComponentTree, NodeCaps, NodeId, ResponseStream};
use crate::header::HeaderResponse;
use crate::utils::html::{escape, escape_attr};

#[derive(Debug)]
struct NodeData {
    spec: NodeSpec,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    renders: usize,
    cleanups: usize,
}

/// Arena-backed page tree.
#[derive(Debug)]
pub struct MemoryTree {
    title: String,
    nodes: Vec<NodeData>,
    detaches: usize,
}

impl MemoryTree {
    /// A tree holding only the page root.
    pub fn new(title: impl Into<String>) -> Self {
        let root = NodeData {
            spec: NodeSpec::new("").tag("html").kind("Page").caps(NodeCaps::root()),
            parent: None,
            children: Vec::new(),
            renders: 0,
            cleanups: 0,
        };
        Self {
            title: title.into(),
            nodes: vec![root],
            detaches: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Append a child to `parent` and return its handle.
    pub fn add(&mut self, parent: NodeId, spec: NodeSpec) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            spec,
            parent: Some(parent),
            children: Vec::new(),
            renders: 0,
            cleanups: 0,
        });
        self.node_mut(parent).children.push(id);
        id
    }

    /// Unlink `node` (and with it its subtree) from the tree.
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.node_mut(node).parent.take() {
            self.node_mut(parent).children.retain(|&c| c != node);
        }
    }

    /// Attached node with the given markup id.
    pub fn find(&self, markup_id: &str) -> Option<NodeId> {
        (0..self.nodes.len())
            .map(|i| NodeId(i as u32))
            .find(|&id| self.node(id).spec.markup_id == markup_id && self.is_attached(id))
    }

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        self.node_mut(node).spec.text = text.into();
    }

    pub fn set_visible(&mut self, node: NodeId, visible: bool) {
        self.node_mut(node).spec.visible = visible;
    }

    /// How often `render` was called for `node` directly.
    pub fn render_count(&self, node: NodeId) -> usize {
        self.node(node).renders
    }

    /// How often `after_render` cleaned up `node`.
    pub fn cleanup_count(&self, node: NodeId) -> usize {
        self.node(node).cleanups
    }

    /// How often a response detached from this tree.
    pub fn detach_count(&self) -> usize {
        self.detaches
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0 as usize]
    }

    fn write_node(&self, id: NodeId, out: &mut ResponseStream) -> Result<()> {
        let node = self.node(id);
        let spec = &node.spec;

        if spec.caps.is_root {
            out.write("<!DOCTYPE html>\n<html>\n<head>\n<title>");
            out.write(&escape(&self.title));
            out.write("</title>\n</head>\n<body>\n");
            self.write_children(node, out)?;
            out.write("\n</body>\n</html>\n");
            return Ok(());
        }

        let wraps = spec.caps.is_anchorable && !spec.caps.body_only;
        if !spec.visible {
            if wraps && spec.caps.has_stable_id {
                out.write(&format!(
                    r#"<{} id="{}" style="display:none"></{}>"#,
                    spec.tag,
                    escape_attr(&spec.markup_id),
                    spec.tag
                ));
            }
            return Ok(());
        }

        if wraps {
            out.write("<");
            out.write(&spec.tag);
            if spec.caps.has_stable_id {
                out.write(r#" id=""#);
                out.write(&escape_attr(&spec.markup_id));
                out.write("\"");
            }
            out.write(">");
        }

        out.write(&escape(&spec.text));
        if spec.fail_render {
            bail!("`{}` failed to render", spec.markup_id);
        }
        self.write_children(node, out)?;

        if wraps {
            out.write("</");
            out.write(&spec.tag);
            out.write(">");
        }
        Ok(())
    }

    fn write_children(&self, node: &NodeData, out: &mut ResponseStream) -> Result<()> {
        node.children
            .iter()
            .try_for_each(|&child| self.write_node(child, out))
    }
}

impl ComponentTree for MemoryTree {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).children.clone()
    }

    fn caps(&self, node: NodeId) -> NodeCaps {
        self.node(node).spec.caps
    }

    fn markup_id(&self, node: NodeId) -> String {
        self.node(node).spec.markup_id.clone()
    }

    fn kind(&self, node: NodeId) -> String {
        self.node(node).spec.kind.clone()
    }

    fn is_visible(&self, node: NodeId) -> bool {
        self.node(node).spec.visible
    }

    fn render(&mut self, node: NodeId, out: &mut ResponseStream) -> Result<()> {
        self.node_mut(node).renders += 1;
        self.write_node(node, out)
    }

    fn render_head(&self, node: NodeId, response: &mut HeaderResponse<'_>) -> Result<()> {
        let spec = &self.node(node).spec;
        for item in &spec.head {
            item.contribute(&spec.kind, response)?;
        }
        Ok(())
    }

    fn prepare_for_render(&mut self, node: NodeId) -> Result<()> {
        let spec = &self.node(node).spec;
        if spec.fail_prepare {
            bail!("`{}` refused to prepare", spec.markup_id);
        }
        Ok(())
    }

    fn after_render(&mut self, node: NodeId) {
        self.node_mut(node).cleanups += 1;
    }

    fn detach(&mut self) {
        self.detaches += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_markup() {
        let mut tree = MemoryTree::new("Demo");
        let root = tree.root();
        let panel = tree.add(root, NodeSpec::region("panel").text("a < b"));
        tree.add(panel, NodeSpec::new("inner").tag("span").text("x"));

        let mut out = ResponseStream::new();
        tree.render(panel, &mut out).unwrap();

        assert_eq!(out.current(), r#"<div id="panel">a &lt; b<span>x</span></div>"#);
        assert_eq!(tree.render_count(panel), 1);
    }

    #[test]
    fn test_repeater_and_hidden_markup() {
        let mut tree = MemoryTree::new("Demo");
        let root = tree.root();
        let rows = tree.add(root, NodeSpec::new("rows").caps(NodeCaps::repeater()));
        tree.add(rows, NodeSpec::region("row1").tag("li").text("1"));
        tree.add(rows, NodeSpec::region("row2").tag("li").visible(false));

        let mut out = ResponseStream::new();
        tree.render(rows, &mut out).unwrap();

        assert_eq!(
            out.current(),
            r#"<li id="row1">1</li><li id="row2" style="display:none"></li>"#
        );
    }

    #[test]
    fn test_root_renders_document() {
        let mut tree = MemoryTree::new("Demo & Co");
        let root = tree.root();
        tree.add(root, NodeSpec::region("a"));

        let mut out = ResponseStream::new();
        tree.render(root, &mut out).unwrap();

        let html = out.into_inner();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Demo &amp; Co</title>"));
        assert!(html.contains(r#"<div id="a"></div>"#));
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let mut tree = MemoryTree::new("Demo");
        let root = tree.root();
        let a = tree.add(root, NodeSpec::region("a"));
        let a1 = tree.add(a, NodeSpec::region("a1"));

        assert_eq!(tree.find("a1"), Some(a1));
        tree.remove(a);

        assert!(!tree.is_attached(a));
        assert!(!tree.is_attached(a1));
        assert_eq!(tree.find("a1"), None);
        assert!(tree.children(root).is_empty());
    }

    #[test]
    fn test_failing_render_reports_node() {
        let mut tree = MemoryTree::new("Demo");
        let root = tree.root();
        let bad = tree.add(root, NodeSpec::region("bad").failing());

        let mut out = ResponseStream::new();
        let err = tree.render(bad, &mut out).unwrap_err();
        assert!(err.to_string().contains("bad"));
    }
}
