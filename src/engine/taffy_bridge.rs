//! Taffy Bridge - Integration with the Taffy layout engine
//!
//! Converts NodeStyle to Taffy styles, mirrors an engine subtree into a fresh
//! TaffyTree, runs the flexbox solve with the node measure callbacks, and
//! writes the results back onto the engine nodes (dirty cleared,
//! has-new-layout raised where the geometry changed).

use taffy::{
    AlignContent as TaffyAlignContent, AlignItems as TaffyAlignItems, AvailableSpace,
    Dimension as TaffyDimension, Display as TaffyDisplay, FlexDirection as TaffyFlexDirection,
    FlexWrap as TaffyFlexWrap, JustifyContent as TaffyJustifyContent, LengthPercentage,
    LengthPercentageAuto, NodeId, Overflow as TaffyOverflow, Position as TaffyPosition,
    Rect as TaffyRect, Size as TaffySize, Style, TaffyError, TaffyTree,
};

use crate::types::{
    Align, Dimension, Display, EdgeInsets, FlexDirection, Justify, LayoutDirection, MeasureMode,
    Overflow, PositionType, Size, Wrap, UNCONSTRAINED,
};

use super::config::EngineConfig;
use super::node::{NodeLayout, NodeRef, SolveKey};
use super::style::{NodeStyle, Side};
use super::tree::LayoutEngine;

// =============================================================================
// DIMENSION CONVERSION
// =============================================================================

/// Convert a size-like Dimension (width, min, max, basis).
fn to_taffy_dimension(dim: Dimension) -> TaffyDimension {
    match dim {
        Dimension::Points(value) if !value.is_nan() => TaffyDimension::Length(value),
        Dimension::Percent(value) if !value.is_nan() => TaffyDimension::Percent(value / 100.0),
        _ => TaffyDimension::Auto,
    }
}

/// Convert a min-size Dimension. An unset minimum is zero, so flex items
/// may shrink below their content; only an explicit `Auto` asks the solver
/// for an automatic minimum.
fn to_taffy_min_dimension(dim: Dimension) -> TaffyDimension {
    match dim {
        Dimension::Auto => TaffyDimension::Auto,
        Dimension::Points(value) if !value.is_nan() => TaffyDimension::Length(value),
        Dimension::Percent(value) if !value.is_nan() => TaffyDimension::Percent(value / 100.0),
        _ => TaffyDimension::Length(0.0),
    }
}

/// Convert a margin Dimension; unset margins are zero.
fn to_taffy_margin(dim: Dimension) -> LengthPercentageAuto {
    match dim {
        Dimension::Auto => LengthPercentageAuto::Auto,
        Dimension::Points(value) if !value.is_nan() => LengthPercentageAuto::Length(value),
        Dimension::Percent(value) if !value.is_nan() => LengthPercentageAuto::Percent(value / 100.0),
        _ => LengthPercentageAuto::Length(0.0),
    }
}

/// Convert a position (inset) Dimension; unset insets are auto.
fn to_taffy_inset(dim: Dimension) -> LengthPercentageAuto {
    match dim {
        Dimension::Points(value) if !value.is_nan() => LengthPercentageAuto::Length(value),
        Dimension::Percent(value) if !value.is_nan() => LengthPercentageAuto::Percent(value / 100.0),
        _ => LengthPercentageAuto::Auto,
    }
}

/// Convert a padding Dimension; unset padding is zero.
fn to_taffy_padding(dim: Dimension) -> LengthPercentage {
    match dim {
        Dimension::Points(value) if !value.is_nan() => LengthPercentage::Length(value),
        Dimension::Percent(value) if !value.is_nan() => LengthPercentage::Percent(value / 100.0),
        _ => LengthPercentage::Length(0.0),
    }
}

// =============================================================================
// ENUM CONVERSIONS
// =============================================================================

/// Row directions flip in right-to-left layout.
fn to_taffy_flex_direction(dir: FlexDirection, direction: LayoutDirection) -> TaffyFlexDirection {
    let rtl = direction == LayoutDirection::RightToLeft;
    match dir {
        FlexDirection::Column => TaffyFlexDirection::Column,
        FlexDirection::ColumnReverse => TaffyFlexDirection::ColumnReverse,
        FlexDirection::Row if rtl => TaffyFlexDirection::RowReverse,
        FlexDirection::Row => TaffyFlexDirection::Row,
        FlexDirection::RowReverse if rtl => TaffyFlexDirection::Row,
        FlexDirection::RowReverse => TaffyFlexDirection::RowReverse,
    }
}

fn to_taffy_flex_wrap(wrap: Wrap) -> TaffyFlexWrap {
    match wrap {
        Wrap::NoWrap => TaffyFlexWrap::NoWrap,
        Wrap::Wrap => TaffyFlexWrap::Wrap,
        Wrap::WrapReverse => TaffyFlexWrap::WrapReverse,
    }
}

fn to_taffy_justify_content(justify: Justify) -> Option<TaffyJustifyContent> {
    Some(match justify {
        Justify::FlexStart => TaffyJustifyContent::FlexStart,
        Justify::Center => TaffyJustifyContent::Center,
        Justify::FlexEnd => TaffyJustifyContent::FlexEnd,
        Justify::SpaceBetween => TaffyJustifyContent::SpaceBetween,
        Justify::SpaceAround => TaffyJustifyContent::SpaceAround,
        Justify::SpaceEvenly => TaffyJustifyContent::SpaceEvenly,
    })
}

/// Item alignment (align-items and align-self). `Auto` defers to the parent.
fn to_taffy_align_items(align: Align) -> Option<TaffyAlignItems> {
    match align {
        Align::FlexStart => Some(TaffyAlignItems::FlexStart),
        Align::Center => Some(TaffyAlignItems::Center),
        Align::FlexEnd => Some(TaffyAlignItems::FlexEnd),
        Align::Stretch => Some(TaffyAlignItems::Stretch),
        Align::Baseline => Some(TaffyAlignItems::Baseline),
        Align::Auto | Align::SpaceBetween | Align::SpaceAround | Align::SpaceEvenly => None,
    }
}

fn to_taffy_align_content(align: Align) -> Option<TaffyAlignContent> {
    match align {
        Align::FlexStart => Some(TaffyAlignContent::FlexStart),
        Align::Center => Some(TaffyAlignContent::Center),
        Align::FlexEnd => Some(TaffyAlignContent::FlexEnd),
        Align::Stretch => Some(TaffyAlignContent::Stretch),
        Align::SpaceBetween => Some(TaffyAlignContent::SpaceBetween),
        Align::SpaceAround => Some(TaffyAlignContent::SpaceAround),
        Align::SpaceEvenly => Some(TaffyAlignContent::SpaceEvenly),
        Align::Auto | Align::Baseline => None,
    }
}

fn to_taffy_overflow(overflow: Overflow) -> TaffyOverflow {
    match overflow {
        Overflow::Visible => TaffyOverflow::Visible,
        Overflow::Hidden => TaffyOverflow::Clip,
        Overflow::Scroll => TaffyOverflow::Scroll,
    }
}

fn to_taffy_position(position: PositionType) -> TaffyPosition {
    match position {
        PositionType::Relative => TaffyPosition::Relative,
        PositionType::Absolute => TaffyPosition::Absolute,
    }
}

// =============================================================================
// STYLE BUILDING
// =============================================================================

/// Build a Taffy Style from a NodeStyle resolved in `direction`.
pub(crate) fn build_style(style: &NodeStyle, direction: LayoutDirection) -> Style {
    let margin = |side| to_taffy_margin(style.resolved_margin(side, direction));
    let inset = |side| to_taffy_inset(style.resolved_position(side, direction));
    let padding = |side| to_taffy_padding(style.resolved_padding(side, direction));
    let border = |side| LengthPercentage::Length(style.resolved_border(side, direction));

    Style {
        display: match style.display {
            Display::Flex => TaffyDisplay::Flex,
            Display::None => TaffyDisplay::None,
        },
        position: to_taffy_position(style.position_type),
        inset: TaffyRect {
            left: inset(Side::Left),
            right: inset(Side::Right),
            top: inset(Side::Top),
            bottom: inset(Side::Bottom),
        },

        // Flex container properties
        flex_direction: to_taffy_flex_direction(style.flex_direction, direction),
        flex_wrap: to_taffy_flex_wrap(style.flex_wrap),
        justify_content: to_taffy_justify_content(style.justify_content),
        align_items: to_taffy_align_items(style.align_items),
        align_content: to_taffy_align_content(style.align_content),

        // Flex item properties
        flex_grow: style.resolved_flex_grow(),
        flex_shrink: style.resolved_flex_shrink(),
        flex_basis: to_taffy_dimension(style.resolved_flex_basis()),
        align_self: to_taffy_align_items(style.align_self),

        // Dimensions
        size: TaffySize {
            width: to_taffy_dimension(style.width),
            height: to_taffy_dimension(style.height),
        },
        min_size: TaffySize {
            width: to_taffy_min_dimension(style.min_width),
            height: to_taffy_min_dimension(style.min_height),
        },
        max_size: TaffySize {
            width: to_taffy_dimension(style.max_width),
            height: to_taffy_dimension(style.max_height),
        },
        aspect_ratio: style.aspect_ratio.filter(|ratio| ratio.is_finite() && *ratio > 0.0),

        margin: TaffyRect {
            left: margin(Side::Left),
            right: margin(Side::Right),
            top: margin(Side::Top),
            bottom: margin(Side::Bottom),
        },
        padding: TaffyRect {
            left: padding(Side::Left),
            right: padding(Side::Right),
            top: padding(Side::Top),
            bottom: padding(Side::Bottom),
        },
        border: TaffyRect {
            left: border(Side::Left),
            right: border(Side::Right),
            top: border(Side::Top),
            bottom: border(Side::Bottom),
        },

        overflow: taffy::Point {
            x: to_taffy_overflow(style.overflow),
            y: to_taffy_overflow(style.overflow),
        },

        ..Default::default()
    }
}

// =============================================================================
// MEASUREMENT
// =============================================================================

fn available_space(value: f32) -> AvailableSpace {
    if value.is_nan() {
        AvailableSpace::MaxContent
    } else {
        AvailableSpace::Definite(value)
    }
}

/// Translate one axis of a Taffy measure query into (proposed, mode).
fn measure_axis(known: Option<f32>, available: AvailableSpace, legacy: bool) -> (f32, MeasureMode) {
    if let Some(value) = known {
        return (value, MeasureMode::Exactly);
    }
    match available {
        AvailableSpace::Definite(value) => (value, MeasureMode::AtMost),
        _ if legacy => (UNCONSTRAINED, MeasureMode::AtMost),
        _ => (f32::NAN, MeasureMode::Undefined),
    }
}

// =============================================================================
// SOLVE
// =============================================================================

/// One engine node mirrored into the Taffy tree.
struct Mirrored {
    node: NodeRef,
    id: NodeId,
    parent: Option<usize>,
    direction: LayoutDirection,
}

fn edge_insets(rect: TaffyRect<f32>) -> EdgeInsets {
    EdgeInsets::new(rect.top, rect.left, rect.bottom, rect.right)
}

impl LayoutEngine {
    /// Solve the subtree rooted at `root`.
    ///
    /// `width`/`height` are the owner size in engine floats (NaN = undefined).
    /// A root without an explicit size (and without a max size) on an axis
    /// fills a defined owner size exactly.
    ///
    /// The measure callback receives the node context index and the
    /// (proposed width, mode, proposed height, mode) query.
    ///
    /// Solving again with the same constraints while nothing is dirty is a
    /// no-op.
    pub fn calculate_layout<M>(
        &mut self,
        root: NodeRef,
        width: f32,
        height: f32,
        direction: LayoutDirection,
        mut measure: M,
    ) -> Result<(), TaffyError>
    where
        M: FnMut(usize, f32, MeasureMode, f32, MeasureMode) -> Size,
    {
        let key = SolveKey::new(width, height, direction);
        {
            let record = self.node(root);
            if !record.dirty && record.last_solve == Some(key) {
                log::trace!("solve of {root:?} skipped, nothing dirty");
                return Ok(());
            }
        }

        let config = EngineConfig::global();

        // Create Taffy tree
        let mut tree: TaffyTree<usize> = TaffyTree::new();
        tree.disable_rounding();

        let mut mirrored: Vec<Mirrored> = Vec::new();
        let root_id = self.mirror_subtree(&mut tree, root, None, direction, &mut mirrored)?;

        let root_style = self.node(root).style.clone();
        let mut taffy_root_style = tree.style(root_id)?.clone();
        if root_style.width.is_unset() && root_style.max_width.is_unset() && !width.is_nan() {
            taffy_root_style.size.width = TaffyDimension::Length(width);
        }
        if root_style.height.is_unset() && root_style.max_height.is_unset() && !height.is_nan() {
            taffy_root_style.size.height = TaffyDimension::Length(height);
        }
        tree.set_style(root_id, taffy_root_style)?;

        let available = TaffySize {
            width: available_space(width),
            height: available_space(height),
        };
        let legacy = config.use_legacy_stretch_behaviour;

        tree.compute_layout_with_measure(
            root_id,
            available,
            |known_dimensions, available_space, _node_id, context, _style| {
                let Some(&mut index) = context else {
                    return TaffySize::ZERO;
                };
                let (width, width_mode) =
                    measure_axis(known_dimensions.width, available_space.width, legacy);
                let (height, height_mode) =
                    measure_axis(known_dimensions.height, available_space.height, legacy);
                let size = measure(index, width, width_mode, height, height_mode);
                TaffySize {
                    width: size.width,
                    height: size.height,
                }
            },
        )?;

        self.write_back(&tree, &mirrored, config)?;

        let root_record = self.node_mut(root);
        root_record.last_solve = Some(key);
        log::debug!(
            "solved {root:?} ({} nodes) -> {}x{}",
            mirrored.len(),
            root_record.layout.width,
            root_record.layout.height
        );
        Ok(())
    }

    /// Mirror `node` and its descendants, pre-order.
    ///
    /// Results are written into every visited node, so aliased children are
    /// cloned into owned children first.
    fn mirror_subtree(
        &mut self,
        tree: &mut TaffyTree<usize>,
        node: NodeRef,
        parent: Option<usize>,
        owner_direction: LayoutDirection,
        mirrored: &mut Vec<Mirrored>,
    ) -> Result<NodeId, TaffyError> {
        self.clone_children_if_needed(node);

        let record = self.node(node);
        let direction = record.style.direction.resolve(owner_direction);
        let style = build_style(&record.style, direction);
        let id = match record.context.filter(|_| record.has_measure) {
            Some(context) => tree.new_leaf_with_context(style, context)?,
            None => tree.new_leaf(style)?,
        };
        let children = record.children.clone();

        let position = mirrored.len();
        mirrored.push(Mirrored {
            node,
            id,
            parent,
            direction,
        });

        for child in children {
            let child_id = self.mirror_subtree(tree, child, Some(position), direction, mirrored)?;
            tree.add_child(id, child_id)?;
        }
        Ok(id)
    }

    /// Copy solved geometry back, rounding to the pixel grid on absolute
    /// edges so adjacent siblings never open sub-pixel gaps.
    fn write_back(
        &mut self,
        tree: &TaffyTree<usize>,
        mirrored: &[Mirrored],
        config: &EngineConfig,
    ) -> Result<(), TaffyError> {
        let mut absolute: Vec<(f32, f32)> = Vec::with_capacity(mirrored.len());

        for (position, entry) in mirrored.iter().enumerate() {
            let layout = tree.layout(entry.id)?;
            let (parent_x, parent_y) = entry
                .parent
                .map(|parent| absolute[parent])
                .unwrap_or((0.0, 0.0));
            let abs_x = parent_x + layout.location.x;
            let abs_y = parent_y + layout.location.y;
            absolute.push((abs_x, abs_y));

            let round = |value: f32| config.round_to_pixel_grid(value);
            let computed = NodeLayout {
                left: round(layout.location.x),
                top: round(layout.location.y),
                width: round(abs_x + layout.size.width) - round(abs_x),
                height: round(abs_y + layout.size.height) - round(abs_y),
                padding: edge_insets(layout.padding),
                border: edge_insets(layout.border),
                direction: entry.direction,
            };

            let record = self.node_mut(entry.node);
            if record.dirty || record.layout != computed {
                record.has_new_layout = true;
            }
            record.layout = computed;
            record.dirty = false;
            if position != 0 {
                record.last_solve = None;
            }
        }
        Ok(())
    }
}
