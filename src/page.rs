//! Full page rendering.
//!
//! The initial page load goes through the same contribution registry as an
//! ajax response, but ungated: every visible node may contribute, and
//! dom-ready and on-load scripts are written inline. The collected head is
//! injected before `</head>`.

use crate::ajax::render_to_buffer;
use crate::core::{ComponentTree, ResponseStream};
use crate::error::{Result, UpdateError};
use crate::header::{ContributionRegistry, HeaderResponse, contribute_head};
use crate::utils::html::inject_before;

/// Render the whole tree into a complete document.
pub fn render_page<T>(tree: &mut T) -> Result<String>
where
    T: ComponentTree + ?Sized,
{
    let root = tree.root();
    let mut stream = ResponseStream::new();

    let body = render_to_buffer(&mut stream, |out| tree.render(root, out))
        .map_err(|err| UpdateError::render(tree.describe(root), err))?;

    let mut registry = ContributionRegistry::new();
    let head = render_to_buffer(&mut stream, |out| {
        let mut response = HeaderResponse::page(&mut registry, out);
        contribute_head(&*tree, root, &mut response)
    })?;
    registry.close();

    crate::debug!("page"; "{} head contribution(s)", registry.len());
    Ok(inject_before(&body, "</head>", &head))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{HeadItem, MemoryTree, NodeSpec};

    fn css(url: &str) -> HeadItem {
        HeadItem::Css {
            url: url.to_string(),
            media: None,
        }
    }

    #[test]
    fn test_head_injected_once() {
        let mut tree = MemoryTree::new("Demo");
        let root = tree.root();
        tree.add(root, NodeSpec::region("a").head(css("/site.css")));
        tree.add(root, NodeSpec::region("b").head(css("/site.css")));

        let html = render_page(&mut tree).unwrap();

        assert_eq!(html.matches(r#"href="/site.css""#).count(), 1);
        let link = html.find("/site.css").unwrap();
        assert!(link < html.find("</head>").unwrap());
        assert!(html.contains(r#"<div id="a"></div>"#));
    }

    #[test]
    fn test_hidden_subtree_contributes_nothing() {
        let mut tree = MemoryTree::new("Demo");
        let root = tree.root();
        let hidden = tree.add(root, NodeSpec::region("h").visible(false).head(css("/h.css")));
        tree.add(hidden, NodeSpec::region("h1").head(css("/h1.css")));

        let html = render_page(&mut tree).unwrap();

        assert!(!html.contains("/h.css"));
        assert!(!html.contains("/h1.css"));
    }

    #[test]
    fn test_scripts_inline_on_page() {
        let mut tree = MemoryTree::new("Demo");
        let root = tree.root();
        tree.add(
            root,
            NodeSpec::region("a")
                .head(HeadItem::DomReady {
                    code: "init();".to_string(),
                })
                .head(HeadItem::OnLoad {
                    code: "done();".to_string(),
                }),
        );

        let html = render_page(&mut tree).unwrap();

        assert!(html.contains("DOMContentLoaded"));
        assert!(html.contains("init();"));
        assert!(html.contains(r#"window.addEventListener("load""#));
    }
}
