//! ShadowNode - off-screen counterpart of one UI element.

use crate::engine::NodeRef;
use crate::types::{MeasureMode, Size, UNCONSTRAINED};
use crate::view::ViewId;

use super::metrics::LayoutMetrics;

bitflags::bitflags! {
    /// Capabilities of a shadow node, fixed at construction.
    ///
    /// `CAN_HAVE_SUBVIEWS` - the node accepts children at all.
    /// `LEAF_FOR_LAYOUT` - the node's descendants are not laid out by the
    /// engine; the node is sized by its measure callback instead.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeCapabilities: u8 {
        const CAN_HAVE_SUBVIEWS = 1 << 0;
        const LEAF_FOR_LAYOUT = 1 << 1;
    }
}

/// Where the natural size of a measured node comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureSource {
    /// The node's assigned intrinsic content size.
    IntrinsicContentSize,
    /// A fits query against the node's view.
    ViewFits,
}

/// One measure query: proposed size and mode per axis.
///
/// Proposed values are engine floats, NaN on an `Undefined` axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureRequest {
    pub width: f32,
    pub width_mode: MeasureMode,
    pub height: f32,
    pub height_mode: MeasureMode,
}

impl MeasureRequest {
    pub fn new(width: f32, width_mode: MeasureMode, height: f32, height_mode: MeasureMode) -> Self {
        Self {
            width,
            width_mode,
            height,
            height_mode,
        }
    }

    /// Constraints for a fits query; undefined axes are unconstrained.
    pub fn constraints(&self) -> Size {
        let axis = |value: f32, mode: MeasureMode| match mode {
            MeasureMode::Undefined => UNCONSTRAINED,
            _ => value,
        };
        Size::new(
            axis(self.width, self.width_mode),
            axis(self.height, self.height_mode),
        )
    }

    /// Apply the modes to a natural size, clamped to non-negative first.
    pub fn sanitize(&self, natural: Size) -> Size {
        let natural = natural.non_negative();
        Size::new(
            self.width_mode.resolve(self.width, natural.width),
            self.height_mode.resolve(self.height, natural.height),
        )
    }
}

/// One shadow node. Owns exactly one engine node.
#[derive(Debug, Clone)]
pub struct ShadowNode {
    pub(crate) engine_node: NodeRef,
    pub(crate) capabilities: NodeCapabilities,
    pub(crate) metrics: Option<LayoutMetrics>,
    pub(crate) intrinsic_content_size: Size,
    pub(crate) measure: Option<MeasureSource>,
    pub(crate) view: Option<ViewId>,
}

impl ShadowNode {
    pub(crate) fn new(engine_node: NodeRef, capabilities: NodeCapabilities) -> Self {
        Self {
            engine_node,
            capabilities,
            metrics: None,
            intrinsic_content_size: Size::NO_INTRINSIC,
            measure: None,
            view: None,
        }
    }

    pub fn engine_node(&self) -> NodeRef {
        self.engine_node
    }

    pub fn capabilities(&self) -> NodeCapabilities {
        self.capabilities
    }

    pub fn can_have_subviews(&self) -> bool {
        self.capabilities.contains(NodeCapabilities::CAN_HAVE_SUBVIEWS)
    }

    pub fn is_leaf_for_layout(&self) -> bool {
        self.capabilities.contains(NodeCapabilities::LEAF_FOR_LAYOUT)
    }

    /// Metrics recorded by the last pass that changed them.
    pub fn metrics(&self) -> Option<&LayoutMetrics> {
        self.metrics.as_ref()
    }

    pub fn intrinsic_content_size(&self) -> Size {
        self.intrinsic_content_size
    }

    pub fn measure_source(&self) -> Option<MeasureSource> {
        self.measure
    }

    /// The paired view, for view-backed nodes.
    pub fn view(&self) -> Option<ViewId> {
        self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_applies_modes() {
        let request = MeasureRequest::new(50.0, MeasureMode::AtMost, 8.0, MeasureMode::Exactly);
        assert_eq!(request.sanitize(Size::new(80.0, 3.0)), Size::new(50.0, 8.0));
        assert_eq!(request.sanitize(Size::new(20.0, 3.0)), Size::new(20.0, 8.0));
    }

    #[test]
    fn test_sanitize_clamps_negative_natural_size() {
        let request = MeasureRequest::new(
            f32::NAN,
            MeasureMode::Undefined,
            f32::NAN,
            MeasureMode::Undefined,
        );
        assert_eq!(request.sanitize(Size::new(3.0, -1.0)), Size::new(3.0, 0.0));
    }

    #[test]
    fn test_constraints_unconstrained_when_undefined() {
        let request = MeasureRequest::new(f32::NAN, MeasureMode::Undefined, 12.0, MeasureMode::AtMost);
        assert_eq!(request.constraints(), Size::new(UNCONSTRAINED, 12.0));
    }
}
