//! Layout coordination
//!
//! ```text
//! LayoutApplier::apply_layout
//!     ├─ TreeSynchronizer::synchronize   (engine children ← managed view children)
//!     ├─ RootLayoutCoordinator::layout   (solve + record metrics, collect affected)
//!     └─ FrameDispatcher::dispatch       (frames → affected views)
//! ```

mod applier;
mod root;
mod synchronizer;

pub use applier::LayoutApplier;
pub use root::RootLayoutCoordinator;
pub use synchronizer::{SyncStats, TreeSynchronizer};
