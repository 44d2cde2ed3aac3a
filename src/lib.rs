//! Partial page updates for stateful component trees.
//!
//! Within one request, collect the regions of an already rendered page that
//! changed, render each one in isolation, emit every head contribution at
//! most once, order the client scripts, and hand back a single envelope.
//!
//! # Module Structure
//!
//! | Module   | Purpose                                               |
//! |----------|-------------------------------------------------------|
//! | `core`   | Node handles, capability tags, tree trait, stream     |
//! | `ajax`   | Update set, script queue, coordinator, envelope       |
//! | `header` | Head contributions and their dedup registry           |
//! | `page`   | Full page render through the same registry            |
//! | `tree`   | In-memory tree and TOML page fixtures                 |
//! | `config` | `partial.toml`                                        |
//! | `cli`    | `partial` command line                                |

pub mod logger;

pub mod ajax;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod header;
pub mod page;
pub mod tree;
pub mod utils;

pub use ajax::{AjaxTarget, ComponentEntry, Envelope, JavascriptEntry, Phase, RespondListener};
pub use core::{ComponentTree, NodeCaps, NodeId, ResponseStream};
pub use error::{Result, UpdateError};
pub use header::{ContributionRegistry, ContributionToken, HeaderResponse};
