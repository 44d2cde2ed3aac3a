//! Partial-update coordinator.
//!
//! # Architecture
//!
//! ```text
//! AjaxTarget (one per request)
//! ├── UpdateSet             regions to refresh, kept ancestor-free
//! ├── ScriptQueue           prepend / dom-ready / append scripts
//! ├── ContributionRegistry  emitted-once bookkeeping for head contributions
//! └── render_to_buffer      isolated rendering of one region or header pass
//!            │
//!            ▼
//!        Envelope ──► AjaxResponse (guarded body + cache headers)
//! ```

mod entry;
mod envelope;
mod isolate;
mod scripts;
mod target;
mod update_set;


pub use entry::{ComponentEntry, JavascriptEntry};
pub use envelope::{
    AjaxResponse, Envelope, GUARD_CLOSE, GUARD_OPEN, NO_CACHE_HEADERS, RenderedComponent,
    UpdatePayload, unguard,
};
pub use isolate::render_to_buffer;
pub use scripts::ScriptQueue;
pub use target::{AjaxTarget, Phase, RespondListener, ScriptAppender};
pub use update_set::{UpdateSet, check_node};
