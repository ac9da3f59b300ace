//! View-backed shadow nodes.
//!
//! A view enters management through [`ShadowTree::attach_view`]; its node is
//! created lazily and cached in the tree's view table. Whether such a node is
//! a leaf is never stored: it is recomputed from the live view's children.

use crate::error::LayoutError;
use crate::pipeline::UiThread;
use crate::types::Size;
use crate::view::{ViewHost, ViewId};

use super::node::{MeasureRequest, MeasureSource, NodeCapabilities};
use super::tree::ShadowTree;
use super::ShadowId;

impl ShadowTree {
    // =========================================================================
    // Management
    // =========================================================================

    /// Put a view under layout management, creating its node if needed.
    pub fn attach_view(&mut self, view: ViewId) -> ShadowId {
        self.ui_thread.assert_current("ShadowTree::attach_view");
        if self.managed.insert(view) {
            log::debug!("view {view:?} attached");
        }
        self.view_node_or_create(view)
    }

    /// Take a view out of layout management.
    ///
    /// The cached node survives; the next synchronization of the superview
    /// drops it from the engine tree.
    pub fn detach_view(&mut self, view: ViewId) {
        self.ui_thread.assert_current("ShadowTree::detach_view");
        if self.managed.remove(&view) {
            log::debug!("view {view:?} detached");
        }
    }

    pub fn is_managed(&self, view: ViewId) -> bool {
        self.ui_thread.assert_current("ShadowTree::is_managed");
        self.managed.contains(&view)
    }

    /// Cached node of a view, if one was created.
    pub fn view_node(&self, view: ViewId) -> Option<ShadowId> {
        self.ui_thread.assert_current("ShadowTree::view_node");
        self.view_nodes
            .get(&view)
            .copied()
            .filter(|id| self.lookup(*id).is_some())
    }

    pub(crate) fn view_node_or_create(&mut self, view: ViewId) -> ShadowId {
        if let Some(id) = self.view_node(view) {
            return id;
        }
        let id = self.create_node(NodeCapabilities::CAN_HAVE_SUBVIEWS);
        if let Ok(node) = self.get_mut(id) {
            node.view = Some(view);
        }
        self.view_nodes.insert(view, id);
        id
    }

    /// The view was deallocated: free its node only.
    ///
    /// Children are detached first since their views may still be alive.
    pub fn forget_view(&mut self, view: ViewId) {
        self.ui_thread.assert_current("ShadowTree::forget_view");
        self.managed.remove(&view);
        let Some(id) = self.view_nodes.remove(&view) else {
            return;
        };
        if self.destroy_single(id).is_ok() {
            log::debug!("node {id:?} of deallocated view {view:?} freed");
        }
    }

    // =========================================================================
    // Leaf detection / reconciliation helpers
    // =========================================================================

    /// True iff none of the view's direct children is managed.
    pub fn view_is_leaf(&self, host: &dyn ViewHost, view: ViewId) -> bool {
        self.ui_thread.assert_current("ShadowTree::view_is_leaf");
        !host
            .subviews(view)
            .iter()
            .any(|child| self.is_managed(*child))
    }

    /// Whether the node's engine children are exactly `candidates`, in order.
    pub fn has_exact_same_children(&self, id: ShadowId, candidates: &[ShadowId]) -> bool {
        self.ui_thread
            .assert_current("ShadowTree::has_exact_same_children");
        let Some(node) = self.lookup(id) else {
            return false;
        };
        let children = self.engine.children(node.engine_node);
        children.len() == candidates.len()
            && children
                .iter()
                .zip(candidates)
                .all(|(child, candidate)| {
                    self.node(*candidate)
                        .is_some_and(|candidate| candidate.engine_node == *child)
                })
    }

    /// Install or clear the view fits measure callback.
    ///
    /// Clearing also removes an intrinsic-size callback: a view node with
    /// managed children is always laid out, never measured.
    pub(crate) fn set_view_measure(&mut self, id: ShadowId, enabled: bool) -> Result<(), LayoutError> {
        let node = self.get_mut(id)?;
        let measure = enabled.then_some(MeasureSource::ViewFits);
        if node.measure == measure {
            return Ok(());
        }
        node.measure = measure;
        let engine_node = node.engine_node;
        self.engine.set_has_measure(engine_node, enabled);
        Ok(())
    }
}

/// Measure callback of a view-backed node.
///
/// A view that is neither a bare container nor has child views reports a
/// zero natural size rather than its current frame.
///
/// # Panics
///
/// Off the UI thread.
pub(crate) fn measure_view(
    host: &dyn ViewHost,
    ui_thread: UiThread,
    view: ViewId,
    request: MeasureRequest,
) -> Size {
    ui_thread.assert_current("view measure callback");
    let natural = if host.is_plain_container(view) || !host.subviews(view).is_empty() {
        host.size_that_fits(view, request.constraints())
    } else {
        Size::ZERO
    };
    request.sanitize(natural)
}
