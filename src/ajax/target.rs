//! Request-scoped update coordinator.
//!
//! An [`AjaxTarget`] is created for one interaction on one page, collects the
//! regions and scripts the interaction wants to send back, and assembles them
//! into an [`Envelope`] exactly once.
//!
//! # Phases
//!
//! ```text
//! Collecting ──respond()──► Rendering ──► Responded ──detach()──► Detached
//! ```
//!
//! Before-respond listeners already run in `Rendering`: they may still queue
//! regions and scripts, but cannot respond a second time.
//!
//! The caller holds the page lock for the whole lifetime of the target; the
//! target itself does no locking.

use std::fmt;
use std::mem;

use super::envelope::{Envelope, RenderedComponent, UpdatePayload};
use super::{ComponentEntry, ScriptQueue, UpdateSet, check_node, render_to_buffer};
use crate::core::{ComponentTree, NodeId, ResponseStream};
use crate::error::{Result, UpdateError};
use crate::header::{ContributionRegistry, HeaderResponse, contribute_head};

// =============================================================================
// Phase
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Collecting,
    Rendering,
    Responded,
    Detached,
}

impl Phase {
    /// Whether regions and scripts may still be queued: while collecting,
    /// and while before-respond listeners run.
    pub fn accepts_queue_writes(self) -> bool {
        matches!(self, Self::Collecting | Self::Rendering)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Collecting => "collecting",
            Self::Rendering => "rendering",
            Self::Responded => "responded",
            Self::Detached => "detached",
        })
    }
}

// =============================================================================
// Listeners
// =============================================================================

/// Hooks around envelope assembly.
pub trait RespondListener<T: ComponentTree + ?Sized> {
    /// Called before anything is rendered, with a snapshot of the queued
    /// entries. The live target may still be changed through `target`.
    fn on_before_respond(
        &mut self,
        entries: &[ComponentEntry],
        target: &mut AjaxTarget<'_, T>,
    ) -> Result<()> {
        let _ = (entries, target);
        Ok(())
    }

    /// Called once the regions are rendered. Only scripts may be added.
    fn on_after_respond(&mut self, entries: &[ComponentEntry], scripts: &mut ScriptAppender<'_>) {
        let _ = (entries, scripts);
    }
}

/// Append-only view of the script queue handed to after-respond listeners.
pub struct ScriptAppender<'a> {
    scripts: &'a mut ScriptQueue,
}

impl ScriptAppender<'_> {
    /// Append a sync script, evaluated after the regions are replaced.
    pub fn add_javascript(&mut self, code: impl Into<String>) {
        self.scripts.append(code, false);
    }
}

// =============================================================================
// Target
// =============================================================================

pub struct AjaxTarget<'p, T: ComponentTree + ?Sized> {
    tree: &'p mut T,
    source: NodeId,
    updates: UpdateSet,
    scripts: ScriptQueue,
    registry: ContributionRegistry,
    stream: ResponseStream,
    listeners: Vec<Box<dyn RespondListener<T> + 'p>>,
    redirect: Option<String>,
    phase: Phase,
    /// Set once any entry was queued, even if it is later dropped as stale.
    collected: bool,
}

impl<'p, T: ComponentTree + ?Sized> AjaxTarget<'p, T> {
    /// Bind a new target to the interaction that started at `source`.
    pub fn new(tree: &'p mut T, source: NodeId) -> Result<Self> {
        if !tree.is_attached(source) {
            return Err(UpdateError::NotAttached {
                component: tree.describe(source),
            });
        }

        Ok(Self {
            tree,
            source,
            updates: UpdateSet::new(),
            scripts: ScriptQueue::new(),
            registry: ContributionRegistry::new(),
            stream: ResponseStream::new(),
            listeners: Vec::new(),
            redirect: None,
            phase: Phase::Collecting,
            collected: false,
        })
    }

    // =========================================================================
    // Collection
    // =========================================================================

    /// Queue `node` for refresh. See [`UpdateSet::add`].
    pub fn add_component(&mut self, node: NodeId) -> Result<bool> {
        self.add_entry(ComponentEntry::new(node))
    }

    /// Queue an entry with client-side swap overrides.
    pub fn add_entry(&mut self, entry: ComponentEntry) -> Result<bool> {
        self.check_queue_writes()?;
        let added = self.updates.add(&*self.tree, entry)?;
        self.collected |= added;
        Ok(added)
    }

    /// Queue every descendant of `parent` whose kind is `kind`.
    ///
    /// The search does not descend into a matched node. Returns how many
    /// nodes were newly queued.
    pub fn add_children(&mut self, parent: NodeId, kind: &str) -> Result<usize> {
        self.check_queue_writes()?;

        let mut added = 0;
        let mut pending = self.tree.children(parent);
        pending.reverse();
        while let Some(node) = pending.pop() {
            if self.tree.kind(node) == kind {
                if self.add_component(node)? {
                    added += 1;
                }
            } else {
                pending.extend(self.tree.children(node).into_iter().rev());
            }
        }
        Ok(added)
    }

    /// Move client focus to `node` once the update is applied, or clear it.
    pub fn focus_component(&mut self, node: Option<NodeId>) -> Result<()> {
        let id = match node {
            Some(node) if !self.tree.caps(node).has_stable_id => {
                return Err(UpdateError::NoStableId {
                    component: self.tree.describe(node),
                });
            }
            Some(node) => format!("'{}'", self.tree.markup_id(node)),
            None => "null".to_string(),
        };
        self.append_javascript(format!("Wicket.Focus.setFocusOnId({id});"));
        Ok(())
    }

    fn check_queue_writes(&self) -> Result<()> {
        if self.phase.accepts_queue_writes() {
            Ok(())
        } else {
            Err(UpdateError::WrongPhase {
                expected: Phase::Collecting,
                actual: self.phase,
            })
        }
    }

    pub fn prepend_javascript(&mut self, code: impl Into<String>) {
        self.queue_script(code.into(), |scripts, code| scripts.prepend(code, false));
    }

    /// Prepend a script that must call `notify` before processing continues.
    pub fn prepend_javascript_async(&mut self, code: impl Into<String>) {
        self.queue_script(code.into(), |scripts, code| scripts.prepend(code, true));
    }

    pub fn append_javascript(&mut self, code: impl Into<String>) {
        self.queue_script(code.into(), |scripts, code| scripts.append(code, false));
    }

    /// Append a script that must call `notify` before processing continues.
    pub fn append_javascript_async(&mut self, code: impl Into<String>) {
        self.queue_script(code.into(), |scripts, code| scripts.append(code, true));
    }

    fn queue_script(&mut self, code: String, push: impl FnOnce(&mut ScriptQueue, String)) {
        if self.phase.accepts_queue_writes() {
            push(&mut self.scripts, code);
        } else {
            crate::debug!("ajax"; "script ignored, response already {}", self.phase);
        }
    }

    /// Header response for call sites outside the header pass.
    ///
    /// Only dom-ready and on-load scripts are accepted; every other
    /// contribution fails with [`UpdateError::HeaderOutsideRender`].
    pub fn header_response(&mut self) -> HeaderResponse<'_> {
        HeaderResponse::ajax(&mut self.registry, &mut self.scripts, &mut self.stream, false)
    }

    /// Answer with a redirect instead of an update.
    pub fn set_redirect(&mut self, url: impl Into<String>) {
        self.redirect = Some(url.into());
    }

    pub fn redirect(&self) -> Option<&str> {
        self.redirect.as_deref()
    }

    pub fn add_listener(&mut self, listener: Box<dyn RespondListener<T> + 'p>) {
        self.listeners.push(listener);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn entries(&self) -> &[ComponentEntry] {
        self.updates.entries()
    }

    /// The node whose interaction created this target.
    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tree(&self) -> &T {
        &*self.tree
    }

    pub fn tree_mut(&mut self) -> &mut T {
        &mut *self.tree
    }

    // =========================================================================
    // Assembly
    // =========================================================================

    /// Render everything that was collected into an envelope.
    ///
    /// Can be called once. A failure while rendering any region aborts the
    /// whole response; the target is still left in the responded phase.
    /// Calling `respond` from a before-respond listener fails with
    /// [`UpdateError::WrongPhase`], and a listener that detaches the target
    /// aborts the outer call the same way.
    pub fn respond(&mut self) -> Result<Envelope> {
        if self.phase != Phase::Collecting {
            return Err(UpdateError::WrongPhase {
                expected: Phase::Collecting,
                actual: self.phase,
            });
        }

        self.phase = Phase::Rendering;
        let fired = self.fire_before_respond();
        if self.phase != Phase::Rendering {
            self.listeners.clear();
            return Err(UpdateError::WrongPhase {
                expected: Phase::Rendering,
                actual: self.phase,
            });
        }
        if let Err(err) = fired {
            self.finish();
            return Err(err);
        }

        if let Some(url) = self.redirect.clone() {
            crate::debug!("ajax"; "redirecting to {}", url);
            self.finish();
            return Ok(Envelope::redirect(url));
        }

        let rendered = self.render_payload();
        self.finish();
        let mut payload = rendered?;

        self.fire_after_respond();

        payload.prepend_javascript = self.scripts.prepend_entries().to_vec();
        payload.append_javascript = self.scripts.append_entries().cloned().collect();
        Ok(Envelope::Update(payload))
    }

    /// Release per-request state, notifying the tree if anything was queued.
    pub fn detach(&mut self) {
        if self.phase == Phase::Detached {
            return;
        }
        if self.collected {
            self.tree.detach();
        }

        self.collected = false;
        self.updates = UpdateSet::new();
        self.scripts = ScriptQueue::new();
        self.registry = ContributionRegistry::new();
        self.registry.close();
        self.listeners.clear();
        self.phase = Phase::Detached;
        crate::debug!("ajax"; "target for `{}` detached", self.tree.describe(self.source));
    }

    fn finish(&mut self) {
        self.registry.close();
        self.phase = Phase::Responded;
    }

    fn render_payload(&mut self) -> Result<UpdatePayload> {
        for entry in self.updates.drop_detached(&*self.tree) {
            crate::debug!(
                "ajax";
                "`{}` dropped, no longer attached to the page",
                self.tree.describe(entry.node())
            );
        }

        let mut payload = UpdatePayload::default();
        let entries = self.updates.entries().to_vec();
        if entries.is_empty() {
            return Ok(payload);
        }

        for entry in &entries {
            check_node(&*self.tree, entry.node())?;
        }
        self.prepare(&entries)?;

        payload.header = self.render_header(&entries)?;
        payload.components = entries
            .iter()
            .map(|entry| self.render_component(entry))
            .collect::<Result<_>>()?;
        Ok(payload)
    }

    fn prepare(&mut self, entries: &[ComponentEntry]) -> Result<()> {
        for entry in entries {
            let node = entry.node();
            if let Err(err) = self.tree.prepare_for_render(node) {
                self.tree.after_render(node);
                return Err(UpdateError::render(self.tree.describe(node), err));
            }
        }
        Ok(())
    }

    /// Aggregate header pass over every queued region.
    fn render_header(&mut self, entries: &[ComponentEntry]) -> Result<String> {
        let tree = &*self.tree;
        let registry = &mut self.registry;
        let scripts = &mut self.scripts;

        render_to_buffer(&mut self.stream, |out| {
            let mut response = HeaderResponse::ajax(registry, scripts, out, true);
            entries
                .iter()
                .try_for_each(|entry| contribute_head(tree, entry.node(), &mut response))
        })
    }

    fn render_component(&mut self, entry: &ComponentEntry) -> Result<RenderedComponent> {
        let node = entry.node();
        let component_id = self.tree.markup_id(node);
        let tree = &mut *self.tree;

        let markup = render_to_buffer(&mut self.stream, |out| tree.render(node, out))
            .map_err(|err| UpdateError::render(component_id.clone(), err))?;

        Ok(RenderedComponent {
            component_id,
            before_replace_javascript: entry.before_replace().map(str::to_string),
            after_replace_javascript: entry.after_replace().map(str::to_string),
            replace_javascript: entry.replace().map(str::to_string),
            markup,
        })
    }

    fn fire_before_respond(&mut self) -> Result<()> {
        if self.listeners.is_empty() {
            return Ok(());
        }

        let snapshot = self.updates.entries().to_vec();
        let mut listeners = mem::take(&mut self.listeners);
        let mut result = Ok(());
        for listener in &mut listeners {
            result = listener.on_before_respond(&snapshot, self);
            if result.is_err() {
                break;
            }
        }

        // keep listeners registered from inside a hook
        listeners.append(&mut self.listeners);
        self.listeners = listeners;
        result
    }

    fn fire_after_respond(&mut self) {
        let entries = self.updates.entries();
        let mut appender = ScriptAppender {
            scripts: &mut self.scripts,
        };
        for listener in &mut self.listeners {
            listener.on_after_respond(entries, &mut appender);
        }
    }
}
