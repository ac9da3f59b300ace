//! Core types for flex-shadow.
//!
//! Geometry values exchanged with the view host, style enums understood by the
//! layout engine, and the float conversions between the two worlds.
//!
//! The view side represents "no limit" as [`UNCONSTRAINED`] (the largest finite
//! float), the engine side represents it as NaN. Always cross the boundary
//! through [`engine_float`] / [`view_float`].

// =============================================================================
// Float conversion
// =============================================================================

/// Sentinel the view side uses for an axis without an upper bound.
pub const UNCONSTRAINED: f32 = f32::MAX;

/// Intrinsic metric meaning "this axis has no natural size".
pub const NO_INTRINSIC_METRIC: f32 = -1.0;

/// Convert a view-space float to the engine representation.
///
/// `UNCONSTRAINED`, NaN and infinities all become NaN (undefined).
#[inline]
pub fn engine_float(value: f32) -> f32 {
    if value == UNCONSTRAINED || value.is_nan() || value.is_infinite() {
        return f32::NAN;
    }
    value
}

/// Convert an engine float to the view representation.
///
/// Undefined (NaN) and infinite values become [`UNCONSTRAINED`].
#[inline]
pub fn view_float(value: f32) -> f32 {
    if value.is_nan() || value.is_infinite() {
        return UNCONSTRAINED;
    }
    value
}

// =============================================================================
// Geometry
// =============================================================================

/// A point in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise sum.
    #[inline]
    pub fn offset_by(self, other: Point) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Both axes unconstrained.
    pub const UNCONSTRAINED: Self = Self {
        width: UNCONSTRAINED,
        height: UNCONSTRAINED,
    };

    /// No intrinsic size on either axis.
    pub const NO_INTRINSIC: Self = Self {
        width: NO_INTRINSIC_METRIC,
        height: NO_INTRINSIC_METRIC,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Clamp both axes to be non-negative (NaN becomes zero).
    #[inline]
    pub fn non_negative(self) -> Self {
        Self::new(self.width.max(0.0), self.height.max(0.0))
    }
}

/// An axis-aligned rectangle (origin is the top-left corner).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Self = Self {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Inset the rectangle by the given insets on every side.
    pub fn inset_by(self, insets: EdgeInsets) -> Self {
        Self::new(
            self.origin.x + insets.left,
            self.origin.y + insets.top,
            self.size.width - insets.left - insets.right,
            self.size.height - insets.top - insets.bottom,
        )
    }

    /// True when any coordinate is NaN.
    pub fn has_nan(&self) -> bool {
        self.origin.x.is_nan()
            || self.origin.y.is_nan()
            || self.size.width.is_nan()
            || self.size.height.is_nan()
    }
}

/// Insets on each side of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeInsets {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl EdgeInsets {
    pub const ZERO: Self = Self {
        top: 0.0,
        left: 0.0,
        bottom: 0.0,
        right: 0.0,
    };

    pub const fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub const fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Side-wise sum.
    pub fn combine(self, other: EdgeInsets) -> Self {
        Self::new(
            self.top + other.top,
            self.left + other.left,
            self.bottom + other.bottom,
            self.right + other.right,
        )
    }
}

// =============================================================================
// Direction / display / measurement
// =============================================================================

/// Resolved horizontal layout direction of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum LayoutDirection {
    #[default]
    LeftToRight,
    RightToLeft,
}

/// Direction as a style value; `Inherit` takes the owner's resolved direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Direction {
    #[default]
    Inherit,
    Ltr,
    Rtl,
}

impl Direction {
    /// Resolve against the owner's direction.
    pub fn resolve(self, owner: LayoutDirection) -> LayoutDirection {
        match self {
            Direction::Inherit => owner,
            Direction::Ltr => LayoutDirection::LeftToRight,
            Direction::Rtl => LayoutDirection::RightToLeft,
        }
    }
}

impl From<LayoutDirection> for Direction {
    fn from(value: LayoutDirection) -> Self {
        match value {
            LayoutDirection::LeftToRight => Direction::Ltr,
            LayoutDirection::RightToLeft => Direction::Rtl,
        }
    }
}

impl From<Direction> for LayoutDirection {
    fn from(value: Direction) -> Self {
        value.resolve(LayoutDirection::LeftToRight)
    }
}

/// How a node participates in layout, as reported in layout metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayType {
    None,
    #[default]
    Flex,
    /// Reserved. Never produced by the engine.
    Inline,
}

/// Constraint mode handed to a measure callback for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureMode {
    /// No constraint; report the natural size.
    Undefined,
    /// The node must be exactly the proposed size.
    Exactly,
    /// The node may be at most the proposed size.
    AtMost,
}

impl MeasureMode {
    /// Apply the mode to a proposed value and a natural value.
    #[inline]
    pub fn resolve(self, proposed: f32, natural: f32) -> f32 {
        match self {
            MeasureMode::Exactly => proposed,
            MeasureMode::AtMost => proposed.min(natural),
            MeasureMode::Undefined => natural,
        }
    }
}

bitflags::bitflags! {
    /// Axes along which the root view may grow past its current bounds.
    ///
    /// Combine with bitwise OR: `Flexibility::WIDTH | Flexibility::HEIGHT`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Flexibility: u8 {
        const NONE = 0;
        const WIDTH = 1 << 0;
        const HEIGHT = 1 << 1;
    }
}

// =============================================================================
// Style values
// =============================================================================

/// A style length.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    /// Not set.
    #[default]
    Undefined,
    /// Let the engine decide.
    Auto,
    /// Absolute length in points.
    Points(f32),
    /// Percentage of the owner's size (0-100).
    Percent(f32),
}

impl Dimension {
    /// True for `Undefined` and `Auto`.
    pub fn is_unset(&self) -> bool {
        matches!(self, Dimension::Undefined | Dimension::Auto)
    }

    /// Resolve to a concrete float against a base value.
    ///
    /// Points are taken as-is, percentages (0-100) scale the base, anything
    /// else falls back to the base.
    pub fn resolve(&self, base: f32) -> f32 {
        match *self {
            Dimension::Points(value) => view_float(value),
            Dimension::Percent(value) => view_float(value) / 100.0 * base,
            Dimension::Undefined | Dimension::Auto => base,
        }
    }

    /// Build a points value from a view float (unconstrained becomes undefined).
    pub fn from_view_float(value: f32) -> Self {
        let value = engine_float(value);
        if value.is_nan() {
            Dimension::Undefined
        } else {
            Dimension::Points(value)
        }
    }
}

impl From<f32> for Dimension {
    fn from(value: f32) -> Self {
        Dimension::Points(value)
    }
}

/// Edge selector for per-edge style values.
///
/// `Start`/`End` follow the resolved direction, `Horizontal`/`Vertical`/`All`
/// are shorthands with lower precedence than a specific edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left = 0,
    Top = 1,
    Right = 2,
    Bottom = 3,
    Start = 4,
    End = 5,
    Horizontal = 6,
    Vertical = 7,
    All = 8,
}

impl Edge {
    pub const COUNT: usize = 9;
}

/// Main axis direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Column,
    ColumnReverse,
    Row,
    RowReverse,
}

impl FlexDirection {
    pub fn is_row(&self) -> bool {
        matches!(self, FlexDirection::Row | FlexDirection::RowReverse)
    }
}

/// Main-axis distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justify {
    #[default]
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Cross-axis alignment (items, self and content share one vocabulary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Auto,
    FlexStart,
    Center,
    FlexEnd,
    Stretch,
    Baseline,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Positioning scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionType {
    #[default]
    Relative,
    Absolute,
}

/// Line wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrap {
    #[default]
    NoWrap,
    Wrap,
    WrapReverse,
}

/// Overflow behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
}

/// Display style value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Flex,
    None,
}

impl From<Display> for DisplayType {
    fn from(value: Display) -> Self {
        match value {
            Display::Flex => DisplayType::Flex,
            Display::None => DisplayType::None,
        }
    }
}
