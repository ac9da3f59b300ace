//! Layout Engine - flexbox node arena on top of Taffy.
//!
//! The engine owns the node tree the shadow layer drives:
//! - LayoutEngine: generational arena of nodes with owner links
//! - NodeStyle: per-node style input with unresolved per-edge values
//! - taffy_bridge: style conversion and the solve itself
//! - EngineConfig: process-wide point scale factor and legacy switches
//!
//! # Ownership
//!
//! A node's children are listed in its record, and every owned child points
//! back at it through `owner`. A cloned node aliases the original's children
//! without owning them:
//!
//! ```text
//! original ──owns──▶ child ◀──aliases── clone
//! ```
//!
//! Mutating the clone's child list (or solving it) first clones the aliased
//! children into owned copies, so the original subtree never observes writes
//! made through the clone.

mod config;
mod node;
mod style;
mod taffy_bridge;
mod tree;

pub use config::EngineConfig;
pub use node::{NodeLayout, NodeRef};
pub use style::NodeStyle;
pub use tree::LayoutEngine;
