//! View side of the bridge.
//!
//! The view hierarchy is owned by the host. The shadow tree only ever refers
//! to views by [`ViewId`] and talks to them through [`ViewHost`]; it never
//! keeps a view alive.

mod arena;

pub use arena::{ViewArena, ViewKind};

use crate::types::{Rect, Size};

/// Non-owning handle to a host view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

/// Operations the layout bridge needs from the host's view hierarchy.
///
/// Frames are expressed as top-left origin plus size in the superview's
/// coordinate space, whatever the host's own anchor convention is.
pub trait ViewHost {
    /// Whether the view is still alive.
    fn contains(&self, view: ViewId) -> bool;

    /// Size of the view's bounds (content box).
    fn bounds_size(&self, view: ViewId) -> Size;

    fn frame(&self, view: ViewId) -> Rect;

    fn set_frame(&mut self, view: ViewId, frame: Rect);

    fn is_hidden(&self, view: ViewId) -> bool;

    fn set_hidden(&mut self, view: ViewId, hidden: bool);

    /// Direct children, in z-order.
    fn subviews(&self, view: ViewId) -> &[ViewId];

    /// Preferred size for the given constraints. An axis set to
    /// [`UNCONSTRAINED`](crate::types::UNCONSTRAINED) has no limit.
    fn size_that_fits(&self, view: ViewId, constraints: Size) -> Size;

    /// Whether the view is a bare container with no content of its own.
    fn is_plain_container(&self, view: ViewId) -> bool;
}
