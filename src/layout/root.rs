//! RootLayoutCoordinator - drives one layout pass from a root node.

use crate::error::LayoutError;
use crate::shadow::{AffectedSet, LayoutContext, ShadowId, ShadowTree};
use crate::types::{LayoutDirection, Size};
use crate::view::ViewHost;

/// Root constraints of a layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootLayoutCoordinator {
    node: ShadowId,
    /// Minimum size of the root. Defaults to zero.
    minimum_size: Size,
    /// Space the root may take. Defaults to unconstrained on both axes.
    available_size: Size,
    /// Direction the root resolves `Inherit` against. Defaults to LTR.
    base_direction: LayoutDirection,
}

impl RootLayoutCoordinator {
    pub fn new(node: ShadowId) -> Self {
        Self {
            node,
            minimum_size: Size::ZERO,
            available_size: Size::UNCONSTRAINED,
            base_direction: LayoutDirection::LeftToRight,
        }
    }

    pub fn node(&self) -> ShadowId {
        self.node
    }

    pub fn minimum_size(&self) -> Size {
        self.minimum_size
    }

    pub fn set_minimum_size(&mut self, size: Size) {
        self.minimum_size = size;
    }

    pub fn available_size(&self) -> Size {
        self.available_size
    }

    pub fn set_available_size(&mut self, size: Size) {
        self.available_size = size;
    }

    pub fn base_direction(&self) -> LayoutDirection {
        self.base_direction
    }

    pub fn set_base_direction(&mut self, direction: LayoutDirection) {
        self.base_direction = direction;
    }

    /// Lay out the root's subtree, collecting changed nodes into `affected`.
    pub fn layout(
        &self,
        tree: &mut ShadowTree,
        host: &dyn ViewHost,
        affected: &mut AffectedSet,
    ) -> Result<(), LayoutError> {
        let mut ctx = LayoutContext::new(affected);
        tree.layout(
            self.node,
            self.minimum_size,
            self.available_size,
            self.base_direction,
            &mut ctx,
            host,
        )
    }
}
