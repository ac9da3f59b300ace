//! Engine node records and handles.

use crate::types::{EdgeInsets, LayoutDirection};

use super::style::NodeStyle;

/// Stable handle to an engine node.
///
/// Carries a generation so a handle to a freed slot is never confused with
/// the node that later reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// Geometry computed for one node by the last solve.
///
/// `left`/`top` are relative to the owner's border box. Every field starts
/// out undefined (NaN) until the first solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeLayout {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub padding: EdgeInsets,
    pub border: EdgeInsets,
    pub direction: LayoutDirection,
}

impl NodeLayout {
    pub const UNDEFINED: Self = Self {
        left: f32::NAN,
        top: f32::NAN,
        width: f32::NAN,
        height: f32::NAN,
        padding: EdgeInsets::ZERO,
        border: EdgeInsets::ZERO,
        direction: LayoutDirection::LeftToRight,
    };
}

/// Constraints of the last solve rooted at a node, for the memoized fast path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SolveKey {
    width_bits: u32,
    height_bits: u32,
    direction: LayoutDirection,
}

impl SolveKey {
    pub(crate) fn new(width: f32, height: f32, direction: LayoutDirection) -> Self {
        // Every NaN maps onto one key.
        let bits = |value: f32| if value.is_nan() { u32::MAX } else { value.to_bits() };
        Self {
            width_bits: bits(width),
            height_bits: bits(height),
            direction,
        }
    }
}

/// One engine node.
#[derive(Debug, Clone)]
pub(crate) struct EngineNode {
    pub(crate) style: NodeStyle,
    pub(crate) children: Vec<NodeRef>,
    /// Node whose child list owns this node. A clone shares the original's
    /// children without owning them.
    pub(crate) owner: Option<NodeRef>,
    /// Index of the object that created this node, round-tripped to callbacks.
    pub(crate) context: Option<usize>,
    pub(crate) has_measure: bool,
    pub(crate) dirty: bool,
    pub(crate) has_new_layout: bool,
    pub(crate) layout: NodeLayout,
    pub(crate) last_solve: Option<SolveKey>,
}

impl EngineNode {
    pub(crate) fn new() -> Self {
        Self {
            style: NodeStyle::default(),
            children: Vec::new(),
            owner: None,
            context: None,
            has_measure: false,
            dirty: false,
            has_new_layout: true,
            layout: NodeLayout::UNDEFINED,
            last_solve: None,
        }
    }
}
