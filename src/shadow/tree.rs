//! ShadowTree - arena of shadow nodes and their layout engine.
//!
//! The tree owns the engine, every shadow node, the view side tables and the
//! pending layout requests. It is bound to the thread that created it:
//! every public entry point panics when called from another thread.
//!
//! Mutations return `Err(LayoutError::UnknownNode)` for a handle whose node
//! was destroyed; read-only queries answer `None`/`false`/empty instead.

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;

use crate::engine::{LayoutEngine, NodeRef, NodeStyle};
use crate::error::LayoutError;
use crate::pipeline::UiThread;
use crate::types::{
    engine_float, view_float, Dimension, DisplayType, EdgeInsets, LayoutDirection, Point, Rect,
    Size,
};
use crate::view::{ViewHost, ViewId};

use super::metrics::{LayoutContext, LayoutMetrics};
use super::node::{MeasureRequest, MeasureSource, NodeCapabilities, ShadowNode};
use super::view_node::measure_view;
use super::ShadowId;

// =============================================================================
// Arena
// =============================================================================

#[derive(Debug)]
pub(super) struct ShadowSlot {
    generation: u32,
    node: Option<ShadowNode>,
}

/// Arena of shadow nodes bound to one UI thread.
#[derive(Debug)]
pub struct ShadowTree {
    pub(super) engine: LayoutEngine,
    slots: Vec<ShadowSlot>,
    free_slots: Vec<u32>,
    pub(super) view_nodes: HashMap<ViewId, ShadowId>,
    pub(super) managed: HashSet<ViewId>,
    layout_requests: IndexSet<ShadowId>,
    pub(super) ui_thread: UiThread,
}

impl Default for ShadowTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ShadowTree {
    /// Create an empty tree bound to the calling thread.
    pub fn new() -> Self {
        Self {
            engine: LayoutEngine::new(),
            slots: Vec::new(),
            free_slots: Vec::new(),
            view_nodes: HashMap::new(),
            managed: HashSet::new(),
            layout_requests: IndexSet::new(),
            ui_thread: UiThread::current(),
        }
    }

    pub fn ui_thread(&self) -> UiThread {
        self.ui_thread
    }

    /// Read access to the underlying engine.
    pub fn engine(&self) -> &LayoutEngine {
        self.ui_thread.assert_current("ShadowTree::engine");
        &self.engine
    }

    fn allocate(&mut self, node: ShadowNode) -> ShadowId {
        if let Some(index) = self.free_slots.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return ShadowId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(ShadowSlot {
            generation: 0,
            node: Some(node),
        });
        ShadowId {
            index,
            generation: 0,
        }
    }

    fn release(&mut self, id: ShadowId) -> Option<ShadowNode> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(id.index);

        if let Some(view) = node.view {
            if self.view_nodes.get(&view) == Some(&id) {
                self.view_nodes.remove(&view);
            }
        }
        self.layout_requests.shift_remove(&id);
        Some(node)
    }

    /// The node behind a handle, if it is still alive.
    pub fn node(&self, id: ShadowId) -> Option<&ShadowNode> {
        self.ui_thread.assert_current("ShadowTree::node");
        self.lookup(id)
    }

    pub(super) fn lookup(&self, id: ShadowId) -> Option<&ShadowNode> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub(super) fn get(&self, id: ShadowId) -> Result<&ShadowNode, LayoutError> {
        self.lookup(id).ok_or(LayoutError::UnknownNode(id))
    }

    pub(super) fn get_mut(&mut self, id: ShadowId) -> Result<&mut ShadowNode, LayoutError> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(LayoutError::UnknownNode(id))
    }

    /// Handle of the live node stored at an engine context index.
    fn id_at(&self, index: usize) -> Option<ShadowId> {
        let slot = self.slots.get(index)?;
        slot.node.as_ref()?;
        Some(ShadowId {
            index: index as u32,
            generation: slot.generation,
        })
    }

    pub fn contains(&self, id: ShadowId) -> bool {
        self.ui_thread.assert_current("ShadowTree::contains");
        self.lookup(id).is_some()
    }

    /// Number of live shadow nodes.
    pub fn len(&self) -> usize {
        self.ui_thread.assert_current("ShadowTree::len");
        self.slots.len() - self.free_slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create a node with its own engine node.
    pub fn create_node(&mut self, capabilities: NodeCapabilities) -> ShadowId {
        self.ui_thread.assert_current("ShadowTree::create_node");
        let engine_node = self.engine.new_node();
        let id = self.allocate(ShadowNode::new(engine_node, capabilities));
        self.engine.set_context(engine_node, Some(id.index as usize));
        log::trace!("created shadow node {id:?} with {capabilities:?}");
        id
    }

    /// Tear down a node and its whole subtree.
    ///
    /// Engine nodes are freed recursively; view markers survive, so a
    /// managed view gets a fresh node the next time it is synchronized.
    pub fn destroy_node(&mut self, id: ShadowId) -> Result<(), LayoutError> {
        self.ui_thread.assert_current("ShadowTree::destroy_node");
        let engine_node = self.get(id)?.engine_node;

        let mut doomed = Vec::new();
        self.collect_subtree(id, &mut doomed);
        self.engine.free_recursive(engine_node);
        for node in &doomed {
            self.release(*node);
        }
        log::debug!("destroyed shadow subtree {id:?} ({} nodes)", doomed.len());
        Ok(())
    }

    /// Free a single node after detaching its children, which stay alive.
    pub(super) fn destroy_single(&mut self, id: ShadowId) -> Result<(), LayoutError> {
        let engine_node = self.get(id)?.engine_node;
        self.engine.remove_all_children(engine_node);
        self.engine.free(engine_node);
        self.release(id);
        Ok(())
    }

    fn collect_subtree(&self, id: ShadowId, out: &mut Vec<ShadowId>) {
        out.push(id);
        for child in self.child_ids(id) {
            self.collect_subtree(child, out);
        }
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Insert `child` under `parent` at `index`.
    ///
    /// # Panics
    ///
    /// If the parent cannot have subviews or is a leaf for layout, or the
    /// child is still attached elsewhere.
    pub fn insert_subview(
        &mut self,
        parent: ShadowId,
        child: ShadowId,
        index: usize,
    ) -> Result<(), LayoutError> {
        self.ui_thread.assert_current("ShadowTree::insert_subview");
        let parent_node = self.get(parent)?;
        assert!(
            parent_node.can_have_subviews(),
            "attempt to insert a subview inside a node that cannot have subviews"
        );
        assert!(
            !parent_node.is_leaf_for_layout(),
            "attempt to insert a subview inside a leaf-for-layout node"
        );
        let parent_engine = parent_node.engine_node;
        let child_engine = self.get(child)?.engine_node;
        self.engine.insert_child(parent_engine, child_engine, index);
        Ok(())
    }

    /// Remove `child` from `parent`.
    ///
    /// # Panics
    ///
    /// If the parent is a leaf for layout.
    pub fn remove_subview(&mut self, parent: ShadowId, child: ShadowId) -> Result<(), LayoutError> {
        self.ui_thread.assert_current("ShadowTree::remove_subview");
        let parent_node = self.get(parent)?;
        assert!(
            !parent_node.is_leaf_for_layout(),
            "attempt to remove a subview from a leaf-for-layout node"
        );
        let parent_engine = parent_node.engine_node;
        let child_engine = self.get(child)?.engine_node;
        self.engine.remove_child(parent_engine, child_engine);
        Ok(())
    }

    /// Remove every engine child of `parent`. Returns how many were removed.
    pub(crate) fn remove_all_subviews(&mut self, parent: ShadowId) -> Result<usize, LayoutError> {
        let parent_node = self.get(parent)?;
        assert!(
            !parent_node.is_leaf_for_layout(),
            "attempt to remove subviews from a leaf-for-layout node"
        );
        let engine_node = parent_node.engine_node;
        let removed = self.engine.child_count(engine_node);
        if removed > 0 {
            self.engine.remove_all_children(engine_node);
        }
        Ok(removed)
    }

    /// Detach `child` from whatever engine parent holds it.
    pub(crate) fn detach_from_superview(&mut self, child: ShadowId) -> Result<bool, LayoutError> {
        let child_engine = self.get(child)?.engine_node;
        let Some(owner) = self.engine.owner(child_engine) else {
            return Ok(false);
        };
        self.engine.remove_child(owner, child_engine);
        Ok(true)
    }

    fn child_ids(&self, id: ShadowId) -> Vec<ShadowId> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        self.engine
            .children(node.engine_node)
            .iter()
            .filter_map(|child| self.engine.context(*child))
            .filter_map(|index| self.id_at(index))
            .collect()
    }

    fn parent_id(&self, id: ShadowId) -> Option<ShadowId> {
        let node = self.node(id)?;
        let owner = self.engine.owner(node.engine_node)?;
        self.engine
            .context(owner)
            .and_then(|index| self.id_at(index))
    }

    /// Engine-tracked children, in order.
    pub fn subviews(&self, id: ShadowId) -> Vec<ShadowId> {
        self.ui_thread.assert_current("ShadowTree::subviews");
        self.child_ids(id)
    }

    /// Parent node, read from the engine owner link.
    pub fn superview(&self, id: ShadowId) -> Option<ShadowId> {
        self.ui_thread.assert_current("ShadowTree::superview");
        self.parent_id(id)
    }

    /// Whether `ancestor` is `id` itself or one of its superviews.
    pub fn is_descendant_of(&self, id: ShadowId, ancestor: ShadowId) -> bool {
        self.ui_thread.assert_current("ShadowTree::is_descendant_of");
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent_id(node);
        }
        false
    }

    // =========================================================================
    // Dirtying
    // =========================================================================

    /// Signal that the node's content may have changed.
    ///
    /// A node without engine children is measured, so the engine is told to
    /// re-measure it. A node with children is laid out; dirtying it would
    /// discard valid child geometry, so a layout request is recorded for the
    /// coordination layer instead.
    pub fn dirty_layout(&mut self, id: ShadowId) -> Result<(), LayoutError> {
        self.ui_thread.assert_current("ShadowTree::dirty_layout");
        let engine_node = self.get(id)?.engine_node;
        if self.engine.child_count(engine_node) == 0 {
            self.engine.mark_dirty(engine_node);
        } else if self.layout_requests.insert(id) {
            log::trace!("layout requested for {id:?}");
        }
        Ok(())
    }

    /// Whether a layout pass was requested for the node.
    pub fn needs_layout(&self, id: ShadowId) -> bool {
        self.ui_thread.assert_current("ShadowTree::needs_layout");
        self.layout_requests.contains(&id)
    }

    /// Drain pending layout requests, oldest first.
    pub fn take_layout_requests(&mut self) -> Vec<ShadowId> {
        self.ui_thread.assert_current("ShadowTree::take_layout_requests");
        self.layout_requests.drain(..).collect()
    }

    /// Drop requests for `root` and its descendants.
    pub(crate) fn clear_layout_requests_under(&mut self, root: ShadowId) {
        let covered: Vec<ShadowId> = self
            .layout_requests
            .iter()
            .copied()
            .filter(|id| self.is_descendant_of(*id, root))
            .collect();
        for id in covered {
            self.layout_requests.shift_remove(&id);
        }
    }

    /// Assign the natural size of a node.
    ///
    /// `Size::NO_INTRINSIC` removes the intrinsic measure callback, anything
    /// else installs it. A no-op when the size is unchanged.
    ///
    /// # Panics
    ///
    /// When installing the callback on a node that has engine children.
    pub fn set_intrinsic_content_size(&mut self, id: ShadowId, size: Size) -> Result<(), LayoutError> {
        self.ui_thread
            .assert_current("ShadowTree::set_intrinsic_content_size");
        let node = self.get_mut(id)?;
        if node.intrinsic_content_size == size {
            return Ok(());
        }
        node.intrinsic_content_size = size;
        node.measure = (size != Size::NO_INTRINSIC).then_some(MeasureSource::IntrinsicContentSize);
        let has_measure = node.measure.is_some();
        let engine_node = node.engine_node;
        self.engine.set_has_measure(engine_node, has_measure);
        self.dirty_layout(id)
    }

    // =========================================================================
    // Style
    // =========================================================================

    pub fn style(&self, id: ShadowId) -> Option<&NodeStyle> {
        self.ui_thread.assert_current("ShadowTree::style");
        let node = self.node(id)?;
        Some(self.engine.style(node.engine_node))
    }

    /// Edit a node's style. Returns whether anything changed.
    pub fn update_style(
        &mut self,
        id: ShadowId,
        edit: impl FnOnce(&mut NodeStyle),
    ) -> Result<bool, LayoutError> {
        self.ui_thread.assert_current("ShadowTree::update_style");
        let engine_node = self.get(id)?.engine_node;
        Ok(self.engine.update_style(engine_node, edit))
    }

    // =========================================================================
    // Geometry queries
    // =========================================================================

    pub fn layout_metrics(&self, id: ShadowId) -> Option<LayoutMetrics> {
        self.ui_thread.assert_current("ShadowTree::layout_metrics");
        self.node(id)?.metrics
    }

    fn recorded_origin(&self, id: ShadowId) -> Point {
        self.node(id)
            .and_then(|node| node.metrics)
            .map(|metrics| metrics.frame.origin)
            .unwrap_or(Point::ZERO)
    }

    /// Frame of `id` in `ancestor`'s coordinate space, summed from recorded
    /// frame origins. `None` when `ancestor` is not on the superview chain.
    pub fn measure_layout_relative_to_ancestor(
        &self,
        id: ShadowId,
        ancestor: ShadowId,
    ) -> Option<Rect> {
        self.ui_thread
            .assert_current("ShadowTree::measure_layout_relative_to_ancestor");
        let mut offset = Point::ZERO;
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                break;
            }
            offset = offset.offset_by(self.recorded_origin(node));
            current = self.parent_id(node);
        }
        if current != Some(ancestor) {
            return None;
        }
        let size = self
            .node(id)?
            .metrics
            .map(|metrics| metrics.frame.size)
            .unwrap_or(Size::ZERO);
        Some(Rect::from_origin_size(offset, size))
    }

    /// Position in the coordinate space of the topmost superview, derived
    /// from this node's own chain of recorded frame origins.
    pub fn absolute_position(&self, id: ShadowId) -> Option<Point> {
        self.ui_thread.assert_current("ShadowTree::absolute_position");
        self.node(id)?;
        let mut position = Point::ZERO;
        let mut current = Some(id);
        while let Some(node) = current {
            position = position.offset_by(self.recorded_origin(node));
            current = self.parent_id(node);
        }
        Some(position)
    }

    /// Computed padding of the last solve.
    pub fn padding_as_insets(&self, id: ShadowId) -> Option<EdgeInsets> {
        self.ui_thread.assert_current("ShadowTree::padding_as_insets");
        let node = self.node(id)?;
        Some(self.engine.layout(node.engine_node).padding)
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Run the engine on `engine_node`, dispatching measure callbacks back to
    /// the shadow nodes through their context index.
    fn solve(
        &mut self,
        engine_node: NodeRef,
        width: f32,
        height: f32,
        direction: LayoutDirection,
        host: &dyn ViewHost,
    ) -> Result<(), LayoutError> {
        let Self {
            engine,
            slots,
            ui_thread,
            ..
        } = self;
        let slots: &[ShadowSlot] = slots;
        let ui_thread = *ui_thread;

        engine.calculate_layout(
            engine_node,
            width,
            height,
            direction,
            |index, width, width_mode, height, height_mode| {
                let request = MeasureRequest::new(width, width_mode, height, height_mode);
                measure_slot(slots, ui_thread, host, index, request)
            },
        )?;
        Ok(())
    }

    /// Lay out the subtree rooted at `id`.
    ///
    /// Applies `minimum` as the node's min-size style when it differs, solves
    /// within `maximum` (view floats, `UNCONSTRAINED` = no limit) and records
    /// metrics for every node with a new layout. Nodes whose metrics changed
    /// are added to the context's affected set.
    ///
    /// # Panics
    ///
    /// If a node is still dirty after the solve.
    pub fn layout(
        &mut self,
        id: ShadowId,
        minimum: Size,
        maximum: Size,
        direction: LayoutDirection,
        ctx: &mut LayoutContext<'_>,
        host: &dyn ViewHost,
    ) -> Result<(), LayoutError> {
        self.ui_thread.assert_current("ShadowTree::layout");
        let engine_node = self.get(id)?.engine_node;

        let style = self.engine.style(engine_node);
        let current_minimum = Size::new(style.min_width.resolve(0.0), style.min_height.resolve(0.0));
        if current_minimum != minimum {
            self.engine.update_style(engine_node, |style| {
                style.min_width = Dimension::from_view_float(minimum.width);
                style.min_height = Dimension::from_view_float(minimum.height);
            });
        }

        self.solve(
            engine_node,
            engine_float(maximum.width),
            engine_float(maximum.height),
            direction,
            host,
        )?;
        assert!(
            !self.engine.is_dirty(engine_node),
            "attempt to read layout metrics from a dirty engine node"
        );

        if !self.engine.has_new_layout(engine_node) {
            return Ok(());
        }
        self.engine.set_has_new_layout(engine_node, false);

        let metrics = LayoutMetrics::from_engine(&self.engine, engine_node);
        let mut ctx = ctx.descend(metrics.frame.origin);
        self.record_metrics(id, metrics, &mut ctx)?;
        self.layout_subviews(id, &mut ctx)
    }

    fn layout_subviews(&mut self, id: ShadowId, ctx: &mut LayoutContext<'_>) -> Result<(), LayoutError> {
        let node = self.get(id)?;
        if node
            .metrics
            .is_some_and(|metrics| metrics.display_type == DisplayType::None)
        {
            return Ok(());
        }

        let children = self.engine.children(node.engine_node).to_vec();
        for child in children {
            assert!(
                !self.engine.is_dirty(child),
                "attempt to read layout metrics from a dirty engine node"
            );
            if !self.engine.has_new_layout(child) {
                continue;
            }
            let Some(child_id) = self.engine.context(child).and_then(|index| self.id_at(index))
            else {
                continue;
            };
            self.engine.set_has_new_layout(child, false);

            let metrics = LayoutMetrics::from_engine(&self.engine, child);
            let mut child_ctx = ctx.descend(metrics.frame.origin);
            self.record_metrics(child_id, metrics, &mut child_ctx)?;
            self.layout_subviews(child_id, &mut child_ctx)?;
        }
        Ok(())
    }

    fn record_metrics(
        &mut self,
        id: ShadowId,
        metrics: LayoutMetrics,
        ctx: &mut LayoutContext<'_>,
    ) -> Result<(), LayoutError> {
        let node = self.get_mut(id)?;
        if node.metrics == Some(metrics) {
            return Ok(());
        }
        node.metrics = Some(metrics);
        ctx.mark_affected(id);
        log::trace!(
            "{id:?} laid out at {:?} (absolute {:?})",
            metrics.frame,
            ctx.absolute_position()
        );
        Ok(())
    }

    /// Measure a node without touching the live tree.
    ///
    /// The node is cloned under a disposable constraint root carrying
    /// `minimum`/`maximum` as min/max style, solved with an undefined
    /// available size and freed again. Aliased children of the clone are
    /// never freed.
    pub fn size_that_fits(
        &mut self,
        id: ShadowId,
        minimum: Size,
        maximum: Size,
        host: &dyn ViewHost,
    ) -> Result<Size, LayoutError> {
        self.ui_thread.assert_current("ShadowTree::size_that_fits");
        let node = self.get(id)?;
        let engine_node = node.engine_node;
        let direction = node
            .metrics
            .map(|metrics| metrics.layout_direction)
            .unwrap_or_default();

        let clone = self.engine.clone_node(engine_node);
        let constraint = self.engine.new_node();
        self.engine.insert_child(constraint, clone, 0);
        self.engine.update_style(constraint, |style| {
            style.min_width = Dimension::from_view_float(minimum.width);
            style.min_height = Dimension::from_view_float(minimum.height);
            style.max_width = Dimension::from_view_float(maximum.width);
            style.max_height = Dimension::from_view_float(maximum.height);
        });

        let solved = self.solve(constraint, f32::NAN, f32::NAN, direction, host);
        let layout = self.engine.layout(constraint);
        let size = Size::new(view_float(layout.width), view_float(layout.height));
        self.engine.free_recursive(constraint);
        solved?;
        Ok(size)
    }
}

/// Measure callback dispatch: engine context index → shadow node.
fn measure_slot(
    slots: &[ShadowSlot],
    ui_thread: UiThread,
    host: &dyn ViewHost,
    index: usize,
    request: MeasureRequest,
) -> Size {
    let Some(node) = slots.get(index).and_then(|slot| slot.node.as_ref()) else {
        return Size::ZERO;
    };
    match (node.measure, node.view) {
        (Some(MeasureSource::IntrinsicContentSize), _) => {
            request.sanitize(node.intrinsic_content_size)
        }
        (Some(MeasureSource::ViewFits), Some(view)) => measure_view(host, ui_thread, view, request),
        _ => request.sanitize(Size::ZERO),
    }
}
