//! One simulated interaction against a page tree.
//!
//! Shared by the `render` command and the `/ajax` endpoint of `serve`.

use anyhow::{Context, Result};

use crate::ajax::{AjaxTarget, Envelope};
use crate::core::ComponentTree;
use crate::tree::MemoryTree;

/// What the client asked for, by markup id.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    pub source: Option<String>,
    pub refresh: Vec<String>,
    pub redirect: Option<String>,
    pub prepend: Vec<String>,
    pub append: Vec<String>,
}

impl Interaction {
    /// Run the interaction and assemble its envelope.
    ///
    /// The caller must hold the page exclusively for the whole call.
    pub fn run(&self, tree: &mut MemoryTree) -> Result<Envelope> {
        let source = match &self.source {
            Some(id) => find(tree, id)?,
            None => tree.root(),
        };

        let mut target = AjaxTarget::new(tree, source)?;
        for id in &self.refresh {
            let node = find(target.tree(), id)?;
            if !target.add_component(node)? {
                crate::debug!("ajax"; "`{}` already covered", id);
            }
        }
        for code in &self.prepend {
            target.prepend_javascript(code.as_str());
        }
        for code in &self.append {
            target.append_javascript(code.as_str());
        }
        if let Some(url) = &self.redirect {
            target.set_redirect(url.as_str());
        }

        let envelope = target.respond();
        target.detach();
        Ok(envelope?)
    }
}

fn find(tree: &MemoryTree, id: &str) -> Result<crate::core::NodeId> {
    tree.find(id)
        .with_context(|| format!("no node with markup id `{id}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeSpec;

    fn tree() -> MemoryTree {
        let mut tree = MemoryTree::new("Demo");
        let root = tree.root();
        let panel = tree.add(root, NodeSpec::region("panel"));
        tree.add(panel, NodeSpec::region("label").text("1"));
        tree
    }

    #[test]
    fn test_run_refresh() {
        let mut tree = tree();
        let interaction = Interaction {
            source: Some("label".to_string()),
            refresh: vec!["label".to_string(), "panel".to_string()],
            append: vec!["done();".to_string()],
            ..Interaction::default()
        };

        let envelope = interaction.run(&mut tree).unwrap();
        let ids: Vec<_> = envelope.components().iter().map(|c| c.component_id.as_str()).collect();
        assert_eq!(ids, ["panel"]);
        assert_eq!(tree.detach_count(), 1);
    }

    #[test]
    fn test_unknown_id() {
        let mut tree = tree();
        let interaction = Interaction {
            refresh: vec!["missing".to_string()],
            ..Interaction::default()
        };

        let err = interaction.run(&mut tree).unwrap_err();
        assert!(err.to_string().contains("`missing`"));
    }

    #[test]
    fn test_repeater_is_rejected() {
        let mut tree = tree();
        tree.add(tree.root(), NodeSpec::new("rows").caps(crate::core::NodeCaps::repeater()));
        let interaction = Interaction {
            refresh: vec!["rows".to_string()],
            ..Interaction::default()
        };

        let err = interaction.run(&mut tree).unwrap_err();
        assert!(err.to_string().contains("repeater"));
    }
}
