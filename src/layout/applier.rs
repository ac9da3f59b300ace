//! LayoutApplier - top-level layout entry point.
//!
//! One call synchronizes the engine tree with the view tree, lays out the
//! root and writes frames to every view whose metrics changed.

use std::collections::HashMap;

use crate::error::LayoutError;
use crate::pipeline::{FrameDispatcher, FrameReport, FrameSender, FrameUpdate, UiThread};
use crate::shadow::{AffectedSet, ShadowId, ShadowTree};
use crate::types::{Flexibility, LayoutDirection, Size, UNCONSTRAINED};
use crate::view::{ViewHost, ViewId};

use super::root::RootLayoutCoordinator;
use super::synchronizer::TreeSynchronizer;

/// Applies layout to managed view hierarchies.
#[derive(Debug)]
pub struct LayoutApplier {
    coordinators: HashMap<ShadowId, RootLayoutCoordinator>,
    dispatcher: FrameDispatcher,
    base_direction: LayoutDirection,
}

impl LayoutApplier {
    pub fn new(ui_thread: UiThread) -> Self {
        Self {
            coordinators: HashMap::new(),
            dispatcher: FrameDispatcher::new(ui_thread),
            base_direction: LayoutDirection::LeftToRight,
        }
    }

    /// Applier bound to the tree's UI thread.
    pub fn for_tree(tree: &ShadowTree) -> Self {
        Self::new(tree.ui_thread())
    }

    pub fn dispatcher(&self) -> &FrameDispatcher {
        &self.dispatcher
    }

    /// Handle for queueing frame updates from other threads.
    pub fn frame_sender(&self) -> FrameSender {
        self.dispatcher.sender()
    }

    /// Direction roots resolve `Inherit` against.
    pub fn set_base_direction(&mut self, direction: LayoutDirection) {
        self.base_direction = direction;
    }

    /// Lay out the hierarchy under `root_view` and apply changed frames.
    ///
    /// A no-op when `root_view` is not managed. Axes set in `flexibility`
    /// are laid out unconstrained instead of within the view's bounds. With
    /// `preserve_origin` the root view keeps its current origin.
    ///
    /// # Panics
    ///
    /// Off the UI thread.
    pub fn apply_layout(
        &mut self,
        tree: &mut ShadowTree,
        host: &mut dyn ViewHost,
        preserve_origin: bool,
        flexibility: Flexibility,
        root_view: ViewId,
    ) -> Result<FrameReport, LayoutError> {
        tree.ui_thread().assert_current("LayoutApplier::apply_layout");
        if !tree.is_managed(root_view) {
            return Ok(FrameReport::default());
        }
        self.coordinators.retain(|node, _| tree.contains(*node));

        // 1. Structure
        TreeSynchronizer::synchronize(tree, &*host, root_view)?;
        let Some(root) = tree.view_node(root_view) else {
            return Ok(FrameReport::default());
        };

        // 2. Coordinator
        let style = tree.style(root).ok_or(LayoutError::UnknownNode(root))?;
        let minimum = Size::new(style.min_width.resolve(0.0), style.min_height.resolve(0.0));
        let coordinator = self
            .coordinators
            .entry(root)
            .or_insert_with(|| RootLayoutCoordinator::new(root));
        coordinator.set_minimum_size(minimum);
        coordinator.set_base_direction(self.base_direction);

        // 3. Available size
        let bounds = host.bounds_size(root_view);
        coordinator.set_available_size(Size::new(
            if flexibility.contains(Flexibility::WIDTH) {
                UNCONSTRAINED
            } else {
                bounds.width
            },
            if flexibility.contains(Flexibility::HEIGHT) {
                UNCONSTRAINED
            } else {
                bounds.height
            },
        ));

        // 4. Layout
        let mut affected = AffectedSet::new();
        coordinator.layout(tree, &*host, &mut affected)?;
        tree.clear_layout_requests_under(root);

        // 5. Nothing changed
        if affected.is_empty() {
            log::trace!("layout of {root_view:?} changed nothing");
            return Ok(FrameReport::default());
        }

        // 6. Frames
        let updates: Vec<FrameUpdate> = affected
            .iter()
            .filter_map(|id| {
                let node = tree.node(*id)?;
                let view = node.view()?;
                let metrics = *node.metrics()?;
                host.contains(view).then_some(FrameUpdate {
                    view,
                    metrics,
                    preserve_origin: preserve_origin && view == root_view,
                })
            })
            .collect();
        log::debug!(
            "layout of {root_view:?}: {} nodes affected, {} frame updates",
            affected.len(),
            updates.len()
        );
        Ok(self.dispatcher.dispatch(updates, host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Dimension, Rect};
    use crate::view::{ViewArena, ViewKind};

    fn setup() -> (ShadowTree, ViewArena, LayoutApplier, ViewId) {
        let tree = ShadowTree::new();
        let mut host = ViewArena::new();
        let root = host.add_view(ViewKind::Plain, Rect::new(20.0, 30.0, 200.0, 100.0));
        let applier = LayoutApplier::for_tree(&tree);
        (tree, host, applier, root)
    }

    #[test]
    fn test_unmanaged_root_is_a_no_op() {
        let (mut tree, mut host, mut applier, root) = setup();
        let report = applier
            .apply_layout(&mut tree, &mut host, false, Flexibility::NONE, root)
            .unwrap();
        assert_eq!(report, FrameReport::default());
        assert_eq!(host.frame_writes(), 0);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_children_fill_root_bounds() {
        let (mut tree, mut host, mut applier, root) = setup();
        tree.attach_view(root);
        let child = host.add_view(ViewKind::Plain, Rect::ZERO);
        host.add_subview(root, child);
        let child_node = tree.attach_view(child);
        tree.update_style(child_node, |style| style.height = Dimension::Points(40.0))
            .unwrap();

        let report = applier
            .apply_layout(&mut tree, &mut host, false, Flexibility::NONE, root)
            .unwrap();

        assert_eq!(report.applied, 2);
        assert_eq!(host.frame(root), Rect::new(0.0, 0.0, 200.0, 100.0));
        assert_eq!(host.frame(child), Rect::new(0.0, 0.0, 200.0, 40.0));
    }

    #[test]
    fn test_preserve_origin_keeps_root_position() {
        let (mut tree, mut host, mut applier, root) = setup();
        tree.attach_view(root);
        applier
            .apply_layout(&mut tree, &mut host, true, Flexibility::NONE, root)
            .unwrap();
        assert_eq!(host.frame(root), Rect::new(20.0, 30.0, 200.0, 100.0));
    }

    #[test]
    fn test_flexible_height_shrinks_to_content() {
        let (mut tree, mut host, mut applier, root) = setup();
        tree.attach_view(root);
        let child = host.add_view(ViewKind::Plain, Rect::ZERO);
        host.add_subview(root, child);
        let child_node = tree.attach_view(child);
        tree.update_style(child_node, |style| style.height = Dimension::Points(25.0))
            .unwrap();

        applier
            .apply_layout(&mut tree, &mut host, false, Flexibility::HEIGHT, root)
            .unwrap();

        assert_eq!(host.frame(root), Rect::new(0.0, 0.0, 200.0, 25.0));
    }

    #[test]
    fn test_clears_layout_requests_of_processed_root() {
        let (mut tree, mut host, mut applier, root) = setup();
        let root_node = tree.attach_view(root);
        let child = host.add_view(ViewKind::Plain, Rect::ZERO);
        host.add_subview(root, child);
        tree.attach_view(child);
        applier
            .apply_layout(&mut tree, &mut host, false, Flexibility::NONE, root)
            .unwrap();

        tree.dirty_layout(root_node).unwrap();
        assert!(tree.needs_layout(root_node));
        applier
            .apply_layout(&mut tree, &mut host, false, Flexibility::NONE, root)
            .unwrap();
        assert!(!tree.needs_layout(root_node));
    }
}
