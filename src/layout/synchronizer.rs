//! TreeSynchronizer - reconciles engine children with the live view tree.
//!
//! Depth-first, parent before children. A node whose engine children already
//! match its managed view children (same count, same identity per index) is
//! left untouched, so unchanged subtrees cause no layout churn.

use crate::error::LayoutError;
use crate::shadow::{ShadowId, ShadowTree};
use crate::view::{ViewHost, ViewId};

/// Structural mutations performed by one synchronization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub inserted: usize,
    pub removed: usize,
}

impl SyncStats {
    /// Whether the engine tree was left exactly as it was.
    pub fn is_unchanged(&self) -> bool {
        self.inserted == 0 && self.removed == 0
    }
}

/// Mirrors managed view hierarchies into the engine tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSynchronizer;

impl TreeSynchronizer {
    /// Reconcile the subtree of a managed view.
    ///
    /// # Arguments
    /// * `tree` - Shadow tree holding the nodes
    /// * `host` - The live view hierarchy
    /// * `view` - Root of the subtree; its node is created if needed
    pub fn synchronize(
        tree: &mut ShadowTree,
        host: &dyn ViewHost,
        view: ViewId,
    ) -> Result<SyncStats, LayoutError> {
        tree.ui_thread()
            .assert_current("TreeSynchronizer::synchronize");
        let node = tree.view_node_or_create(view);
        let mut stats = SyncStats::default();
        sync_node(tree, host, view, node, &mut stats)?;
        if !stats.is_unchanged() {
            log::debug!(
                "synchronized {view:?}: {} inserted, {} removed",
                stats.inserted,
                stats.removed
            );
        }
        Ok(stats)
    }
}

fn sync_node(
    tree: &mut ShadowTree,
    host: &dyn ViewHost,
    view: ViewId,
    node: ShadowId,
    stats: &mut SyncStats,
) -> Result<(), LayoutError> {
    // 1. Leaf: measured by the view, no engine children.
    if tree.view_is_leaf(host, view) {
        stats.removed += tree.remove_all_subviews(node)?;
        tree.set_view_measure(node, true)?;
        return Ok(());
    }
    tree.set_view_measure(node, false)?;

    // 2. Candidates: managed, live direct children in view order.
    let managed: Vec<ViewId> = host
        .subviews(view)
        .iter()
        .copied()
        .filter(|child| host.contains(*child) && tree.is_managed(*child))
        .collect();
    let candidates: Vec<(ViewId, ShadowId)> = managed
        .into_iter()
        .map(|child| (child, tree.view_node_or_create(child)))
        .collect();
    let ids: Vec<ShadowId> = candidates.iter().map(|(_, id)| *id).collect();

    // 3./4. Rebuild the engine child list only when it differs.
    if !tree.has_exact_same_children(node, &ids) {
        stats.removed += tree.remove_all_subviews(node)?;
        for (index, child) in ids.iter().enumerate() {
            if tree.detach_from_superview(*child)? {
                stats.removed += 1;
            }
            tree.insert_subview(node, *child, index)?;
            stats.inserted += 1;
        }
    }

    for (child_view, child) in candidates {
        sync_node(tree, host, child_view, child, stats)?;
    }
    Ok(())
}
