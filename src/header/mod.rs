//! Header contributions.
//!
//! [`HeaderResponse`] is what a node's `render_head` talks to. It writes
//! stylesheet links, script tags and declared header fragments to the active
//! stream, skipping anything the [`ContributionRegistry`] says was already
//! emitted in this pass.
//!
//! # Modes
//!
//! | Mode   | Resource methods               | Dom-ready / on-load          |
//! |--------|--------------------------------|------------------------------|
//! | `page` | always allowed                 | inline `<script>` tags       |
//! | `ajax` | only during the header pass    | queued on the script queue   |

mod registry;

pub use registry::{ContributionRegistry, ContributionToken, TokenPart};

use crate::ajax::ScriptQueue;
use crate::core::{ComponentTree, NodeId, ResponseStream};
use crate::error::{Result, UpdateError};
use crate::utils::html::escape_attr;

enum Mode<'a> {
    Page,
    Ajax {
        scripts: &'a mut ScriptQueue,
        rendering: bool,
    },
}

/// Deduplicating writer for head contributions.
pub struct HeaderResponse<'a> {
    registry: &'a mut ContributionRegistry,
    out: &'a mut ResponseStream,
    mode: Mode<'a>,
}

impl<'a> HeaderResponse<'a> {
    /// Header response for a full page render. Nothing is gated.
    pub fn page(registry: &'a mut ContributionRegistry, out: &'a mut ResponseStream) -> Self {
        Self {
            registry,
            out,
            mode: Mode::Page,
        }
    }

    /// Header response for a partial update.
    ///
    /// `rendering` is true only inside the aggregate header pass; outside of
    /// it only dom-ready and on-load scripts may be contributed.
    pub fn ajax(
        registry: &'a mut ContributionRegistry,
        scripts: &'a mut ScriptQueue,
        out: &'a mut ResponseStream,
        rendering: bool,
    ) -> Self {
        Self {
            registry,
            out,
            mode: Mode::Ajax { scripts, rendering },
        }
    }

    // =========================================================================
    // Gated resource contributions
    // =========================================================================

    /// `<link rel="stylesheet">` for `url`, once per `(url, media)`.
    pub fn render_css_reference(&mut self, url: &str, media: Option<&str>) -> Result<()> {
        let token = ContributionToken::css(url, media);
        self.emit("render_css_reference", token, |out| {
            out.write(r#"<link rel="stylesheet" type="text/css" href=""#);
            out.write(&escape_attr(url));
            if let Some(media) = media {
                out.write(r#"" media=""#);
                out.write(&escape_attr(media));
            }
            out.write("\" />\n");
        })
    }

    /// Inline `<style>` block, keyed by `id` when given, otherwise by content.
    pub fn render_css(&mut self, css: &str, id: Option<&str>) -> Result<()> {
        let token = ContributionToken::new(["css-inline", id.unwrap_or(css)]);
        self.emit("render_css", token, |out| {
            out.write(r#"<style type="text/css""#);
            write_id(out, id);
            out.write(">\n");
            out.write(css);
            out.write("\n</style>\n");
        })
    }

    /// `<script src>` for `url`, once per url.
    pub fn render_javascript_reference(&mut self, url: &str, id: Option<&str>) -> Result<()> {
        let token = ContributionToken::javascript(url);
        self.emit("render_javascript_reference", token, |out| {
            out.write(r#"<script type="text/javascript" src=""#);
            out.write(&escape_attr(url));
            out.write("\"");
            write_id(out, id);
            out.write("></script>\n");
        })
    }

    /// Inline script, keyed by `id` when given, otherwise by content.
    pub fn render_javascript(&mut self, code: &str, id: Option<&str>) -> Result<()> {
        let token = ContributionToken::inline_javascript(code, id);
        self.emit("render_javascript", token, |out| write_script(out, code, id))
    }

    /// Raw markup, once per distinct string.
    pub fn render_string(&mut self, markup: &str) -> Result<()> {
        self.emit("render_string", ContributionToken::from(markup), |out| {
            out.write(markup);
        })
    }

    /// Bind `code` to `event` on `target` (an element id, or `window`).
    pub fn render_on_event_javascript(&mut self, target: &str, event: &str, code: &str) -> Result<()> {
        let token = ContributionToken::event(target, event, code);
        let binding = event_binding(target, event, code);
        self.emit("render_on_event_javascript", token, |out| {
            write_script(out, &binding, None);
        })
    }

    /// Emit a declared reusable fragment, once per `(scope, fragment_id)`,
    /// whatever its content.
    pub fn render_header_fragment(&mut self, scope: &str, fragment_id: &str, markup: &str) -> Result<()> {
        self.check_header_rendering("render_header_fragment")?;
        if self.registry.ok_to_render(scope, fragment_id) {
            self.out.write(markup);
        } else {
            crate::debug!("header"; "fragment `{}` of `{}` already contributed", fragment_id, scope);
        }
        Ok(())
    }

    // =========================================================================
    // Always allowed
    // =========================================================================

    /// Run `code` once the document (or the updated regions) are ready.
    pub fn render_on_dom_ready_javascript(&mut self, code: &str) {
        let token = ContributionToken::event("window", "domready", code);
        if self.registry.is_closed() || self.registry.was_rendered(&token) {
            return;
        }
        match &mut self.mode {
            Mode::Ajax { scripts, .. } => scripts.dom_ready(code),
            Mode::Page => {
                let binding = format!(
                    "document.addEventListener(\"DOMContentLoaded\", function() {{ {code} }});"
                );
                write_script(self.out, &binding, None);
            }
        }
        self.registry.mark_rendered(token);
    }

    /// Run `code` after everything else.
    pub fn render_on_load_javascript(&mut self, code: &str) {
        let token = ContributionToken::event("window", "load", code);
        if self.registry.is_closed() || self.registry.was_rendered(&token) {
            return;
        }
        match &mut self.mode {
            Mode::Ajax { scripts, .. } => scripts.append(code, false),
            Mode::Page => write_script(self.out, &event_binding("window", "load", code), None),
        }
        self.registry.mark_rendered(token);
    }

    pub fn mark_rendered(&mut self, token: ContributionToken) {
        self.registry.mark_rendered(token);
    }

    pub fn was_rendered(&self, token: &ContributionToken) -> bool {
        self.registry.was_rendered(token)
    }

    /// Close the response: later contributions are silently discarded.
    pub fn close(&mut self) {
        self.registry.close();
    }

    pub fn is_closed(&self) -> bool {
        self.registry.is_closed()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn check_header_rendering(&self, method: &'static str) -> Result<()> {
        match self.mode {
            Mode::Ajax {
                rendering: false, ..
            } => Err(UpdateError::HeaderOutsideRender { method }),
            _ => Ok(()),
        }
    }

    fn emit<F>(&mut self, method: &'static str, token: ContributionToken, write: F) -> Result<()>
    where
        F: FnOnce(&mut ResponseStream),
    {
        self.check_header_rendering(method)?;
        if self.registry.is_closed() || self.registry.was_rendered(&token) {
            return Ok(());
        }
        write(&mut *self.out);
        self.registry.mark_rendered(token);
        Ok(())
    }
}

/// Head contributions of `node`, then of its visible descendants.
///
/// Invisible subtrees contribute nothing.
pub fn contribute_head<T>(tree: &T, node: NodeId, response: &mut HeaderResponse<'_>) -> Result<()>
where
    T: ComponentTree + ?Sized,
{
    tree.render_head(node, response)
        .map_err(|err| UpdateError::render(tree.describe(node), err))?;

    for child in tree.children(node) {
        if tree.is_visible(child) {
            contribute_head(tree, child, response)?;
        }
    }
    Ok(())
}

fn write_id(out: &mut ResponseStream, id: Option<&str>) {
    if let Some(id) = id {
        out.write(r#" id=""#);
        out.write(&escape_attr(id));
        out.write("\"");
    }
}

fn write_script(out: &mut ResponseStream, code: &str, id: Option<&str>) {
    out.write(r#"<script type="text/javascript""#);
    write_id(out, id);
    out.write(">\n/*<![CDATA[*/\n");
    out.write(code);
    out.write("\n/*]]>*/\n</script>\n");
}

/// `addEventListener` call for `target`, where `window` means the window.
fn event_binding(target: &str, event: &str, code: &str) -> String {
    let event = js_string(event);
    let element = if target == "window" {
        "window".to_string()
    } else {
        format!("document.getElementById({})", js_string(target))
    };
    format!("{element}.addEventListener({event}, function(event) {{ {code} }});")
}

/// Quote `s` as a javascript string literal.
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_header(f: impl FnOnce(&mut HeaderResponse<'_>)) -> String {
        let mut registry = ContributionRegistry::new();
        let mut out = ResponseStream::new();
        f(&mut HeaderResponse::page(&mut registry, &mut out));
        out.into_inner()
    }

    #[test]
    fn test_css_reference_once() {
        let html = page_header(|r| {
            r.render_css_reference("/css/a.css", None).unwrap();
            r.render_css_reference("/css/a.css", None).unwrap();
            r.render_css_reference("/css/a.css", Some("print")).unwrap();
        });

        assert_eq!(html.matches(r#"href="/css/a.css""#).count(), 2);
        assert!(html.contains(r#"media="print""#));
    }

    #[test]
    fn test_escapes_attribute_values() {
        let html = page_header(|r| {
            r.render_javascript_reference("/js/a.js?x=1&y=\"2\"", Some("lib"))
                .unwrap();
        });
        assert_eq!(
            html,
            "<script type=\"text/javascript\" src=\"/js/a.js?x=1&amp;y=&quot;2&quot;\" id=\"lib\"></script>\n"
        );
    }

    #[test]
    fn test_inline_script_keyed_by_id() {
        let html = page_header(|r| {
            r.render_javascript("var a = 1;", Some("init")).unwrap();
            r.render_javascript("var a = 2;", Some("init")).unwrap();
            r.render_javascript("var b = 1;", None).unwrap();
            r.render_javascript("var b = 1;", None).unwrap();
        });

        assert!(html.contains("var a = 1;"));
        assert!(!html.contains("var a = 2;"));
        assert_eq!(html.matches("var b = 1;").count(), 1);
    }

    #[test]
    fn test_fragment_once_per_scope() {
        let html = page_header(|r| {
            r.render_header_fragment("Panel", "head", "<meta name=\"p\">").unwrap();
            r.render_header_fragment("Panel", "head", "<meta name=\"other\">").unwrap();
            r.render_header_fragment("Menu", "head", "<meta name=\"p\">").unwrap();
        });

        assert_eq!(html.matches("<meta name=\"p\">").count(), 2);
        assert!(!html.contains("other"));
    }

    #[test]
    fn test_page_mode_dom_ready_inline() {
        let html = page_header(|r| {
            r.render_on_dom_ready_javascript("start();");
            r.render_on_dom_ready_javascript("start();");
            r.render_on_load_javascript("done();");
        });

        assert_eq!(html.matches("DOMContentLoaded").count(), 1);
        assert!(html.contains(r#"window.addEventListener("load", function(event) { done(); });"#));
    }

    #[test]
    fn test_event_binding_dedup() {
        let html = page_header(|r| {
            r.render_on_event_javascript("btn", "click", "go();").unwrap();
            r.render_on_event_javascript("btn", "click", "go();").unwrap();
        });
        assert_eq!(
            html.matches(r#"document.getElementById("btn").addEventListener("click""#)
                .count(),
            1
        );
    }

    #[test]
    fn test_ajax_outside_header_pass() {
        let mut registry = ContributionRegistry::new();
        let mut scripts = ScriptQueue::new();
        let mut out = ResponseStream::new();
        let mut response = HeaderResponse::ajax(&mut registry, &mut scripts, &mut out, false);

        let err = response.render_css_reference("/a.css", None).unwrap_err();
        assert!(matches!(
            err,
            UpdateError::HeaderOutsideRender {
                method: "render_css_reference"
            }
        ));
        assert!(response.render_string("<x>").is_err());
        assert!(response.render_header_fragment("P", "h", "<x>").is_err());

        // escape hatches go to the script queue, deduplicated
        response.render_on_dom_ready_javascript("ready();");
        response.render_on_dom_ready_javascript("ready();");
        response.render_on_load_javascript("loaded();");
        drop(response);

        let codes: Vec<_> = scripts.append_entries().map(|e| e.javascript()).collect();
        assert_eq!(codes, ["ready();", "loaded();"]);
        assert!(out.current().is_empty());
    }

    #[test]
    fn test_closed_response_discards() {
        let mut registry = ContributionRegistry::new();
        let mut scripts = ScriptQueue::new();
        let mut out = ResponseStream::new();
        let mut response = HeaderResponse::ajax(&mut registry, &mut scripts, &mut out, true);

        response.render_css_reference("/a.css", None).unwrap();
        response.close();
        response.render_css_reference("/b.css", None).unwrap();
        response.render_on_load_javascript("late();");

        assert!(response.is_closed());
        assert!(response.was_rendered(&ContributionToken::css("/a.css", None)));
        assert!(!response.was_rendered(&ContributionToken::css("/b.css", None)));
        drop(response);

        assert!(!out.current().contains("/b.css"));
        assert!(scripts.is_empty());
    }
}
