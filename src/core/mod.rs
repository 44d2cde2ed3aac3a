//! Core types - the tree capability consumed by the coordinator.
//!
//! The component tree itself (markup templating, model data) lives outside
//! this crate. Everything here is the narrow interface the coordinator needs:
//! node handles, capability tags, a swappable output stream and the
//! `ComponentTree` trait.

mod node;
mod stream;
mod tree;

pub use node::{NodeCaps, NodeId};
pub use stream::ResponseStream;
pub use tree::ComponentTree;
