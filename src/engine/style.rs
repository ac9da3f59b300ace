//! NodeStyle - style input of one engine node.
//!
//! Per-edge values are stored unresolved (specific edges, start/end,
//! horizontal/vertical and all) and only resolved against a direction when
//! the node tree is handed to the solver.

use crate::types::{
    Align, Dimension, Direction, Display, Edge, FlexDirection, Justify, LayoutDirection,
    Overflow, PositionType, Wrap,
};

/// Style input of one engine node. Defaults match a fresh engine node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    pub direction: Direction,
    pub flex_direction: FlexDirection,
    pub justify_content: Justify,
    pub align_content: Align,
    pub align_items: Align,
    pub align_self: Align,
    pub position_type: PositionType,
    pub flex_wrap: Wrap,
    pub overflow: Overflow,
    pub display: Display,

    /// `flex` shorthand. Positive values grow, negative values shrink.
    pub flex: Option<f32>,
    pub flex_grow: Option<f32>,
    pub flex_shrink: Option<f32>,
    pub flex_basis: Dimension,

    margin: [Dimension; Edge::COUNT],
    position: [Dimension; Edge::COUNT],
    padding: [Dimension; Edge::COUNT],
    border: [Option<f32>; Edge::COUNT],

    pub width: Dimension,
    pub height: Dimension,
    pub min_width: Dimension,
    pub min_height: Dimension,
    pub max_width: Dimension,
    pub max_height: Dimension,

    pub aspect_ratio: Option<f32>,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            direction: Direction::Inherit,
            flex_direction: FlexDirection::Column,
            justify_content: Justify::FlexStart,
            align_content: Align::FlexStart,
            align_items: Align::Stretch,
            align_self: Align::Auto,
            position_type: PositionType::Relative,
            flex_wrap: Wrap::NoWrap,
            overflow: Overflow::Visible,
            display: Display::Flex,
            flex: None,
            flex_grow: None,
            flex_shrink: None,
            flex_basis: Dimension::Auto,
            margin: [Dimension::Undefined; Edge::COUNT],
            position: [Dimension::Undefined; Edge::COUNT],
            padding: [Dimension::Undefined; Edge::COUNT],
            border: [None; Edge::COUNT],
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_width: Dimension::Undefined,
            min_height: Dimension::Undefined,
            max_width: Dimension::Undefined,
            max_height: Dimension::Undefined,
            aspect_ratio: None,
        }
    }
}

/// Physical side, after start/end resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Top,
    Right,
    Bottom,
}

impl Side {
    fn physical_edge(self) -> Edge {
        match self {
            Side::Left => Edge::Left,
            Side::Top => Edge::Top,
            Side::Right => Edge::Right,
            Side::Bottom => Edge::Bottom,
        }
    }

    fn axis_edge(self) -> Edge {
        match self {
            Side::Left | Side::Right => Edge::Horizontal,
            Side::Top | Side::Bottom => Edge::Vertical,
        }
    }

    /// Logical edge mapped onto this side in the given direction, if any.
    fn logical_edge(self, direction: LayoutDirection) -> Option<Edge> {
        match (self, direction) {
            (Side::Left, LayoutDirection::LeftToRight) => Some(Edge::Start),
            (Side::Right, LayoutDirection::LeftToRight) => Some(Edge::End),
            (Side::Left, LayoutDirection::RightToLeft) => Some(Edge::End),
            (Side::Right, LayoutDirection::RightToLeft) => Some(Edge::Start),
            _ => None,
        }
    }
}

/// Resolve a side from per-edge storage.
///
/// Precedence: start/end, the physical edge, the axis shorthand, `All`.
fn resolve_side<T: Copy>(
    values: &[T; Edge::COUNT],
    side: Side,
    direction: LayoutDirection,
    is_set: impl Fn(&T) -> bool,
) -> Option<T> {
    let logical = side.logical_edge(direction);
    let candidates = [
        logical,
        Some(side.physical_edge()),
        Some(side.axis_edge()),
        Some(Edge::All),
    ];
    candidates
        .into_iter()
        .flatten()
        .map(|edge| values[edge as usize])
        .find(|value| is_set(value))
}

impl NodeStyle {
    // =========================================================================
    // Per-edge accessors
    // =========================================================================

    pub fn margin(&self, edge: Edge) -> Dimension {
        self.margin[edge as usize]
    }

    pub fn set_margin(&mut self, edge: Edge, value: Dimension) {
        self.margin[edge as usize] = value;
    }

    pub fn position(&self, edge: Edge) -> Dimension {
        self.position[edge as usize]
    }

    pub fn set_position(&mut self, edge: Edge, value: Dimension) {
        self.position[edge as usize] = value;
    }

    pub fn padding(&self, edge: Edge) -> Dimension {
        self.padding[edge as usize]
    }

    /// Padding does not accept `Auto`; it is stored as undefined.
    pub fn set_padding(&mut self, edge: Edge, value: Dimension) {
        let value = match value {
            Dimension::Auto => Dimension::Undefined,
            other => other,
        };
        self.padding[edge as usize] = value;
    }

    /// Border width on an edge; `NaN` when unset.
    pub fn border(&self, edge: Edge) -> f32 {
        self.border[edge as usize].unwrap_or(f32::NAN)
    }

    /// Set a border width. NaN clears the edge.
    pub fn set_border(&mut self, edge: Edge, value: f32) {
        self.border[edge as usize] = (!value.is_nan()).then_some(value);
    }

    // =========================================================================
    // Resolution (used by the solver bridge and metrics)
    // =========================================================================

    pub(crate) fn resolved_margin(&self, side: Side, direction: LayoutDirection) -> Dimension {
        resolve_side(&self.margin, side, direction, |value| {
            *value != Dimension::Undefined
        })
        .unwrap_or(Dimension::Undefined)
    }

    pub(crate) fn resolved_position(&self, side: Side, direction: LayoutDirection) -> Dimension {
        resolve_side(&self.position, side, direction, |value| {
            *value != Dimension::Undefined
        })
        .unwrap_or(Dimension::Undefined)
    }

    pub(crate) fn resolved_padding(&self, side: Side, direction: LayoutDirection) -> Dimension {
        resolve_side(&self.padding, side, direction, |value| {
            *value != Dimension::Undefined
        })
        .unwrap_or(Dimension::Undefined)
    }

    pub(crate) fn resolved_border(&self, side: Side, direction: LayoutDirection) -> f32 {
        resolve_side(&self.border, side, direction, Option::is_some)
            .flatten()
            .unwrap_or(0.0)
            .max(0.0)
    }

    /// Effective grow factor; a positive `flex` doubles as grow.
    pub fn resolved_flex_grow(&self) -> f32 {
        match (self.flex_grow, self.flex) {
            (Some(grow), _) => grow,
            (None, Some(flex)) if flex > 0.0 => flex,
            _ => 0.0,
        }
    }

    /// Effective shrink factor; a negative `flex` doubles as shrink.
    pub fn resolved_flex_shrink(&self) -> f32 {
        match (self.flex_shrink, self.flex) {
            (Some(shrink), _) => shrink,
            (None, Some(flex)) if flex < 0.0 => -flex,
            _ => 0.0,
        }
    }

    /// Effective basis; a positive `flex` without a basis means a zero basis.
    pub fn resolved_flex_basis(&self) -> Dimension {
        if !self.flex_basis.is_unset() {
            return self.flex_basis;
        }
        match self.flex {
            Some(flex) if flex > 0.0 => Dimension::Points(0.0),
            _ => Dimension::Auto,
        }
    }
}
