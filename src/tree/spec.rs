//! Node descriptions for [`MemoryTree`](super::MemoryTree).

use serde::Deserialize;

use crate::core::NodeCaps;
use crate::header::HeaderResponse;

/// One head contribution declared by a node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HeadItem {
    Css {
        url: String,
        #[serde(default)]
        media: Option<String>,
    },
    Style {
        css: String,
        #[serde(default)]
        id: Option<String>,
    },
    Script {
        url: String,
        #[serde(default)]
        id: Option<String>,
    },
    Inline {
        code: String,
        #[serde(default)]
        id: Option<String>,
    },
    DomReady {
        code: String,
    },
    OnLoad {
        code: String,
    },
    Event {
        target: String,
        event: String,
        code: String,
    },
    /// Declared fragment; scoped to the node's kind unless `scope` is given.
    Fragment {
        id: String,
        markup: String,
        #[serde(default)]
        scope: Option<String>,
    },
    Raw {
        markup: String,
    },
}

impl HeadItem {
    pub(super) fn contribute(&self, kind: &str, response: &mut HeaderResponse<'_>) -> crate::error::Result<()> {
        match self {
            Self::Css { url, media } => response.render_css_reference(url, media.as_deref()),
            Self::Style { css, id } => response.render_css(css, id.as_deref()),
            Self::Script { url, id } => response.render_javascript_reference(url, id.as_deref()),
            Self::Inline { code, id } => response.render_javascript(code, id.as_deref()),
            Self::DomReady { code } => {
                response.render_on_dom_ready_javascript(code);
                Ok(())
            }
            Self::OnLoad { code } => {
                response.render_on_load_javascript(code);
                Ok(())
            }
            Self::Event {
                target,
                event,
                code,
            } => response.render_on_event_javascript(target, event, code),
            Self::Fragment { id, markup, scope } => {
                response.render_header_fragment(scope.as_deref().unwrap_or(kind), id, markup)
            }
            Self::Raw { markup } => response.render_string(markup),
        }
    }
}

/// Builder for a node added to a [`MemoryTree`](super::MemoryTree).
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub(super) markup_id: String,
    pub(super) tag: String,
    pub(super) kind: String,
    pub(super) caps: NodeCaps,
    pub(super) visible: bool,
    pub(super) text: String,
    pub(super) head: Vec<HeadItem>,
    pub(super) fail_render: bool,
    pub(super) fail_prepare: bool,
}

impl NodeSpec {
    /// A plain `<div>` without a client-visible id.
    pub fn new(markup_id: impl Into<String>) -> Self {
        Self {
            markup_id: markup_id.into(),
            tag: "div".to_string(),
            kind: "Component".to_string(),
            caps: NodeCaps::plain(),
            visible: true,
            text: String::new(),
            head: Vec::new(),
            fail_render: false,
            fail_prepare: false,
        }
    }

    /// A replaceable region.
    pub fn region(markup_id: impl Into<String>) -> Self {
        Self::new(markup_id).caps(NodeCaps::region())
    }

    pub fn caps(mut self, caps: NodeCaps) -> Self {
        self.caps = caps;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Logical type of the node, the default scope of its fragments.
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn head(mut self, item: HeadItem) -> Self {
        self.head.push(item);
        self
    }

    /// Make `render` fail after writing part of the markup.
    pub fn failing(mut self) -> Self {
        self.fail_render = true;
        self
    }

    /// Make `prepare_for_render` fail.
    pub fn failing_prepare(mut self) -> Self {
        self.fail_prepare = true;
        self
    }
}
