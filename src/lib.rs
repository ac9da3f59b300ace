//! # flex-shadow
//!
//! Keeps a retained view hierarchy in sync with a flexbox layout engine and
//! writes computed frames back to only the views whose layout changed.
//!
//! Built on [taffy](https://github.com/DioxusLabs/taffy) for the flexbox
//! solve itself.
//!
//! ## Architecture
//!
//! Two parallel trees are kept consistent:
//!
//! ```text
//! View tree (host-owned)          Shadow tree                 Engine tree
//! ViewId ──managed──▶ ShadowId ──owns 1:1──▶ NodeRef ──mirrored per solve──▶ taffy
//! ```
//!
//! One pass runs entirely on the UI thread:
//! ```text
//! LayoutApplier → TreeSynchronizer → RootLayoutCoordinator → ShadowTree::layout → FrameDispatcher
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Geometry, style enums, float conversions
//! - [`engine`] - Engine node arena, styles, the taffy bridge, process config
//! - [`shadow`] - Shadow nodes, metrics, the recursive layout/measure core
//! - [`view`] - The `ViewHost` trait and the in-memory `ViewArena`
//! - [`layout`] - Synchronizer, root coordinator, layout applier
//! - [`pipeline`] - UI thread affinity and frame dispatch
//! - [`error`] - Error types

pub mod engine;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod shadow;
pub mod types;
pub mod view;

// Re-export commonly used items
pub use types::*;

pub use engine::{EngineConfig, LayoutEngine, NodeLayout, NodeRef, NodeStyle};

pub use error::{ConfigError, FrameError, LayoutError};

pub use layout::{LayoutApplier, RootLayoutCoordinator, SyncStats, TreeSynchronizer};

pub use pipeline::{
    apply_frame_update, FrameDispatcher, FrameReport, FrameSender, FrameUpdate, UiThread,
};

pub use shadow::{
    AffectedSet, LayoutContext, LayoutMetrics, MeasureRequest, MeasureSource, NodeCapabilities,
    ShadowId, ShadowNode, ShadowTree,
};

pub use view::{ViewArena, ViewHost, ViewId, ViewKind};
