//! Error types.

use thiserror::Error;

use crate::shadow::ShadowId;
use crate::types::Rect;
use crate::view::ViewId;

/// Errors surfaced by layout passes.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout engine error: {0}")]
    Engine(#[from] taffy::TaffyError),

    #[error("shadow node {0:?} does not exist")]
    UnknownNode(ShadowId),
}

/// Errors from applying a computed frame to a view.
#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    #[error("view {view:?} is gone")]
    ViewGone { view: ViewId },

    #[error("computed frame {frame:?} for view {view:?} has a NaN coordinate")]
    NonFiniteFrame { view: ViewId, frame: Rect },
}

/// Errors from installing the process-wide engine configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("engine configuration is already installed")]
    AlreadyInstalled,

    #[error("point scale factor must be finite and non-negative, got {0}")]
    InvalidScaleFactor(f32),
}
