//! Threading pipeline
//!
//! All tree work runs on one UI thread. The only cross-thread traffic is
//! frame application:
//!
//! ```text
//! any thread ─▶ FrameSender ─▶ queue ─▶ FrameDispatcher::drain (UI thread) ─▶ ViewHost
//! UI thread  ─▶ FrameDispatcher::dispatch ─────────────────────────────────▶ ViewHost
//! ```

pub mod frame;
pub mod ui_thread;

// Re-exports
pub use frame::{apply_frame_update, FrameDispatcher, FrameReport, FrameSender, FrameUpdate};
pub use ui_thread::UiThread;
