//! TOML page fixtures.
//!
//! # Example
//!
//! ```toml
//! title = "Inbox"
//!
//! [[node]]
//! id = "messages"
//! caps = "region"
//! kind = "MessageList"
//!
//! [[node]]
//! id = "count"
//! parent = "messages"
//! tag = "span"
//! text = "3 unread"
//! head = [{ type = "css", url = "/css/inbox.css" }]
//! ```
//!
//! Nodes are added in file order; a `parent` must name an earlier node.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use rustc_hash::FxHashMap;
use serde::Deserialize;

use super::{HeadItem, MemoryTree, NodeSpec};
use crate::core::{ComponentTree, NodeCaps, NodeId};

#[derive(Debug, Clone, Deserialize)]
pub struct PageFixture {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default, rename = "node")]
    pub nodes: Vec<NodeFixture>,
}

fn default_title() -> String {
    "Page".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapsKind {
    #[default]
    Region,
    Plain,
    Repeater,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeFixture {
    pub id: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub caps: CapsKind,
    #[serde(default)]
    pub body_only: bool,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub head: Vec<HeadItem>,
}

fn default_visible() -> bool {
    true
}

impl NodeFixture {
    fn to_spec(&self) -> NodeSpec {
        let caps = match self.caps {
            CapsKind::Region => NodeCaps::region(),
            CapsKind::Plain => NodeCaps::plain(),
            CapsKind::Repeater => NodeCaps::repeater(),
        };
        let mut spec = NodeSpec::new(&self.id)
            .caps(NodeCaps {
                body_only: self.body_only,
                ..caps
            })
            .text(&self.text)
            .visible(self.visible);
        if let Some(tag) = &self.tag {
            spec = spec.tag(tag);
        }
        if let Some(kind) = &self.kind {
            spec = spec.kind(kind);
        }
        self.head.iter().cloned().fold(spec, NodeSpec::head)
    }
}

impl PageFixture {
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid page fixture")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture {}", path.display()))?;
        Self::from_str(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Build the tree described by this fixture.
    pub fn build(&self) -> Result<MemoryTree> {
        let mut tree = MemoryTree::new(&self.title);
        let mut ids: FxHashMap<&str, NodeId> = FxHashMap::default();

        for node in &self.nodes {
            if node.id.is_empty() {
                bail!("fixture node without an id");
            }
            if ids.contains_key(node.id.as_str()) {
                bail!("duplicate fixture node `{}`", node.id);
            }
            let parent = match &node.parent {
                None => tree.root(),
                Some(name) => match ids.get(name.as_str()) {
                    Some(&parent) => parent,
                    None => bail!("node `{}` names unknown parent `{}`", node.id, name),
                },
            };
            ids.insert(&node.id, tree.add(parent, node.to_spec()));
        }

        Ok(tree)
    }
}

impl MemoryTree {
    /// Load a page tree from a TOML fixture file.
    pub fn load(path: &Path) -> Result<Self> {
        PageFixture::from_path(path)?.build()
    }
}
