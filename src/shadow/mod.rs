//! Shadow Tree - off-screen structure paired with the layout engine.
//!
//! Every shadow node owns one engine node 1:1. View-backed nodes are created
//! lazily for managed views and cached in a side table; the parent link is
//! never stored but read back from the engine's owner link.
//!
//! # Layout pass
//!
//! ```text
//! solve root ─▶ root has new layout? ─▶ record metrics ─▶ children with new layout ─▶ ...
//! ```
//!
//! Nodes whose metrics changed are collected into the pass's affected set.

mod metrics;
mod node;
mod tree;
mod view_node;

pub use metrics::{AffectedSet, LayoutContext, LayoutMetrics};
pub use node::{MeasureRequest, MeasureSource, NodeCapabilities, ShadowNode};
pub use tree::ShadowTree;

/// Handle to a shadow node in a [`ShadowTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShadowId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}
