//! Layout metrics and per-pass traversal state.

use indexmap::IndexSet;

use crate::engine::{LayoutEngine, NodeRef};
use crate::types::{DisplayType, EdgeInsets, LayoutDirection, Point, Rect};

use super::ShadowId;

/// Nodes whose recorded metrics changed during a pass, in visit order.
pub type AffectedSet = IndexSet<ShadowId>;

/// Computed geometry of one shadow node, as recorded after a pass.
///
/// Equality compares frame, content frame, border and direction. The display
/// type only drives the hidden flag when frames are applied.
#[derive(Debug, Clone, Copy)]
pub struct LayoutMetrics {
    /// Frame relative to the superview.
    pub frame: Rect,
    /// Bounds inset by border and padding.
    pub content_frame: Rect,
    pub border: EdgeInsets,
    pub display_type: DisplayType,
    pub layout_direction: LayoutDirection,
}

impl PartialEq for LayoutMetrics {
    fn eq(&self, other: &Self) -> bool {
        self.frame == other.frame
            && self.content_frame == other.content_frame
            && self.border == other.border
            && self.layout_direction == other.layout_direction
    }
}

impl LayoutMetrics {
    /// Read the metrics of an engine node from its last solve.
    pub(crate) fn from_engine(engine: &LayoutEngine, node: NodeRef) -> Self {
        let layout = engine.layout(node);
        let frame = Rect::new(layout.left, layout.top, layout.width, layout.height);
        let bounds = Rect::from_origin_size(Point::ZERO, frame.size);
        Self {
            frame,
            content_frame: bounds.inset_by(layout.border.combine(layout.padding)),
            border: layout.border,
            display_type: engine.style(node).display.into(),
            layout_direction: layout.direction,
        }
    }
}

/// Traversal state of one layout pass.
///
/// The absolute position is scoped per branch: a child context starts from
/// its parent's position plus the child's own origin, so siblings never see
/// each other's offsets. Every context of a pass shares the same affected
/// set.
#[derive(Debug)]
pub struct LayoutContext<'a> {
    absolute_position: Point,
    affected: &'a mut AffectedSet,
}

impl<'a> LayoutContext<'a> {
    pub fn new(affected: &'a mut AffectedSet) -> Self {
        Self {
            absolute_position: Point::ZERO,
            affected,
        }
    }

    /// Absolute position of the node this context belongs to.
    pub fn absolute_position(&self) -> Point {
        self.absolute_position
    }

    /// Context for a node whose frame starts at `origin` in this context's
    /// coordinate space.
    pub fn descend(&mut self, origin: Point) -> LayoutContext<'_> {
        LayoutContext {
            absolute_position: self.absolute_position.offset_by(origin),
            affected: &mut *self.affected,
        }
    }

    /// Add a node to the affected set.
    pub(crate) fn mark_affected(&mut self, node: ShadowId) {
        self.affected.insert(node);
    }

    pub fn affected(&self) -> &AffectedSet {
        &*self.affected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Size;

    fn metrics(frame: Rect, display_type: DisplayType) -> LayoutMetrics {
        LayoutMetrics {
            frame,
            content_frame: Rect::from_origin_size(Point::ZERO, frame.size),
            border: EdgeInsets::ZERO,
            display_type,
            layout_direction: LayoutDirection::LeftToRight,
        }
    }

    #[test]
    fn test_equality_ignores_display_type() {
        let frame = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(
            metrics(frame, DisplayType::Flex),
            metrics(frame, DisplayType::None)
        );
        assert_ne!(
            metrics(frame, DisplayType::Flex),
            metrics(Rect::new(0.0, 2.0, 3.0, 4.0), DisplayType::Flex)
        );
    }

    #[test]
    fn test_nan_frames_never_compare_equal() {
        let frame = Rect::from_origin_size(Point::new(f32::NAN, 0.0), Size::ZERO);
        assert_ne!(metrics(frame, DisplayType::Flex), metrics(frame, DisplayType::Flex));
    }

    #[test]
    fn test_context_position_is_scoped_per_branch() {
        let mut affected = AffectedSet::new();
        let mut root = LayoutContext::new(&mut affected);

        let first = root.descend(Point::new(10.0, 5.0));
        assert_eq!(first.absolute_position(), Point::new(10.0, 5.0));

        let mut second = root.descend(Point::new(0.0, 50.0));
        assert_eq!(second.absolute_position(), Point::new(0.0, 50.0));

        let nested = second.descend(Point::new(3.0, 3.0));
        assert_eq!(nested.absolute_position(), Point::new(3.0, 53.0));
        assert_eq!(root.absolute_position(), Point::ZERO);
    }
}
