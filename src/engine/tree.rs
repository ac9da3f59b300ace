//! LayoutEngine - arena of engine nodes.
//!
//! Nodes are addressed by [`NodeRef`] handles. Structure is owned through the
//! parent → children lists; every node also records its owner explicitly so
//! that clones, which share their original's children without owning them,
//! can be torn down without touching the original.

use super::node::{EngineNode, NodeLayout, NodeRef};
use super::style::NodeStyle;

// =============================================================================
// Arena
// =============================================================================

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<EngineNode>,
}

/// Arena of engine nodes.
#[derive(Debug, Default)]
pub struct LayoutEngine {
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    live: usize,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self, node: EngineNode) -> NodeRef {
        self.live += 1;
        if let Some(index) = self.free_slots.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeRef {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeRef {
            index,
            generation: 0,
        }
    }

    pub(crate) fn node(&self, node: NodeRef) -> &EngineNode {
        self.get(node)
            .unwrap_or_else(|| panic!("engine node {node:?} was freed"))
    }

    pub(crate) fn node_mut(&mut self, node: NodeRef) -> &mut EngineNode {
        self.get_mut(node)
            .unwrap_or_else(|| panic!("engine node {node:?} was freed"))
    }

    fn get(&self, node: NodeRef) -> Option<&EngineNode> {
        self.slots
            .get(node.index as usize)
            .filter(|slot| slot.generation == node.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, node: NodeRef) -> Option<&mut EngineNode> {
        self.slots
            .get_mut(node.index as usize)
            .filter(|slot| slot.generation == node.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Owner check that tolerates a freed child handle.
    fn is_owned_by(&self, child: NodeRef, owner: NodeRef) -> bool {
        self.get(child).is_some_and(|record| record.owner == Some(owner))
    }

    /// Whether the handle still refers to a live node.
    pub fn contains(&self, node: NodeRef) -> bool {
        self.get(node).is_some()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.live
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create a node with default style.
    pub fn new_node(&mut self) -> NodeRef {
        self.allocate(EngineNode::new())
    }

    /// Structural clone.
    ///
    /// The clone copies style, layout and flags and shares the original's
    /// children: they keep their original owner until a write through the
    /// clone clones them in turn. The clone itself has no owner.
    pub fn clone_node(&mut self, node: NodeRef) -> NodeRef {
        let mut copy = self.node(node).clone();
        copy.owner = None;
        self.allocate(copy)
    }

    /// Free one node.
    ///
    /// Detaches it from its owner and orphans the children it owns. Aliased
    /// children are left alone.
    pub fn free(&mut self, node: NodeRef) {
        let Some(record) = self.get(node) else {
            return;
        };
        let owner = record.owner;
        let children = record.children.clone();

        if let Some(owner_record) = owner.and_then(|owner| self.get_mut(owner)) {
            owner_record.children.retain(|child| *child != node);
        }
        for child in children {
            if self.is_owned_by(child, node) {
                self.node_mut(child).owner = None;
            }
        }

        let slot = &mut self.slots[node.index as usize];
        slot.node = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(node.index);
        self.live -= 1;
    }

    /// Free a node and every descendant it owns.
    ///
    /// A child whose owner is some other node (shared after a clone) is
    /// skipped, never freed. Owned children are removed and freed first;
    /// the remaining aliased slots are then cleared and the node is freed.
    pub fn free_recursive(&mut self, root: NodeRef) {
        let mut skipped = 0;
        while self.child_count(root) > skipped {
            let Some(child) = self.child(root, skipped) else {
                break;
            };
            if !self.is_owned_by(child, root) {
                skipped += 1;
            } else {
                self.remove_child(root, child);
                self.free_recursive(child);
            }
        }
        // Only aliased children remain; clearing the list must not orphan them.
        self.remove_all_children(root);
        self.free(root);
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Replace aliased children with owned clones before mutating a child list.
    pub(crate) fn clone_children_if_needed(&mut self, parent: NodeRef) {
        let children = self.node(parent).children.clone();
        let Some(first) = children.first() else {
            return;
        };
        if self.is_owned_by(*first, parent) {
            return;
        }
        let cloned: Vec<NodeRef> = children
            .into_iter()
            .map(|child| {
                let copy = self.clone_node(child);
                self.node_mut(copy).owner = Some(parent);
                copy
            })
            .collect();
        self.node_mut(parent).children = cloned;
    }

    /// Insert `child` at `index` (clamped to the child count).
    ///
    /// # Panics
    ///
    /// If the child already has an owner, or the parent has a measure callback.
    pub fn insert_child(&mut self, parent: NodeRef, child: NodeRef, index: usize) {
        assert!(
            self.owner(child).is_none(),
            "child already has an owner, it must be removed first"
        );
        assert!(
            !self.node(parent).has_measure,
            "cannot add a child to a node with a measure callback"
        );
        self.clone_children_if_needed(parent);

        let parent_record = self.node_mut(parent);
        let index = index.min(parent_record.children.len());
        parent_record.children.insert(index, child);
        self.node_mut(child).owner = Some(parent);
        self.mark_dirty(parent);
    }

    /// Remove `child` from `parent`'s child list.
    pub fn remove_child(&mut self, parent: NodeRef, child: NodeRef) {
        let parent_record = self.node_mut(parent);
        let before = parent_record.children.len();
        parent_record.children.retain(|existing| *existing != child);
        if parent_record.children.len() == before {
            return;
        }
        if self.is_owned_by(child, parent) {
            let child_record = self.node_mut(child);
            child_record.owner = None;
            child_record.layout = NodeLayout::UNDEFINED;
            child_record.last_solve = None;
        }
        self.mark_dirty(parent);
    }

    /// Remove every child.
    ///
    /// Owned children are orphaned; aliased children only lose the slot.
    pub fn remove_all_children(&mut self, parent: NodeRef) {
        let children = std::mem::take(&mut self.node_mut(parent).children);
        let Some(first) = children.first() else {
            return;
        };
        if self.is_owned_by(*first, parent) {
            for child in children {
                let child_record = self.node_mut(child);
                child_record.owner = None;
                child_record.layout = NodeLayout::UNDEFINED;
                child_record.last_solve = None;
            }
        }
        self.mark_dirty(parent);
    }

    pub fn child_count(&self, node: NodeRef) -> usize {
        self.node(node).children.len()
    }

    pub fn child(&self, node: NodeRef, index: usize) -> Option<NodeRef> {
        self.node(node).children.get(index).copied()
    }

    pub fn children(&self, node: NodeRef) -> &[NodeRef] {
        &self.node(node).children
    }

    pub fn owner(&self, node: NodeRef) -> Option<NodeRef> {
        self.node(node).owner
    }

    // =========================================================================
    // Style
    // =========================================================================

    pub fn style(&self, node: NodeRef) -> &NodeStyle {
        &self.node(node).style
    }

    /// Edit the style; marks the node dirty when anything changed.
    ///
    /// Returns whether the style changed.
    pub fn update_style(&mut self, node: NodeRef, edit: impl FnOnce(&mut NodeStyle)) -> bool {
        let mut style = self.node(node).style.clone();
        edit(&mut style);
        if style == self.node(node).style {
            return false;
        }
        self.node_mut(node).style = style;
        self.mark_dirty(node);
        true
    }

    // =========================================================================
    // Callbacks / flags
    // =========================================================================

    pub fn context(&self, node: NodeRef) -> Option<usize> {
        self.node(node).context
    }

    pub fn set_context(&mut self, node: NodeRef, context: Option<usize>) {
        self.node_mut(node).context = context;
    }

    pub fn has_measure(&self, node: NodeRef) -> bool {
        self.node(node).has_measure
    }

    /// Install or remove the measure callback marker.
    ///
    /// # Panics
    ///
    /// When installing on a node that has children.
    pub fn set_has_measure(&mut self, node: NodeRef, has_measure: bool) {
        if has_measure {
            assert!(
                self.child_count(node) == 0,
                "cannot set a measure callback on a node with children"
            );
        }
        if self.node(node).has_measure != has_measure {
            self.node_mut(node).has_measure = has_measure;
            self.mark_dirty(node);
        }
    }

    /// Mark a node dirty and propagate up the owner chain.
    pub fn mark_dirty(&mut self, node: NodeRef) {
        let mut current = Some(node);
        while let Some(id) = current {
            let Some(record) = self.get_mut(id) else {
                break;
            };
            if record.dirty {
                break;
            }
            record.dirty = true;
            current = record.owner;
        }
    }

    pub fn is_dirty(&self, node: NodeRef) -> bool {
        self.node(node).dirty
    }

    pub fn has_new_layout(&self, node: NodeRef) -> bool {
        self.node(node).has_new_layout
    }

    pub fn set_has_new_layout(&mut self, node: NodeRef, has_new_layout: bool) {
        self.node_mut(node).has_new_layout = has_new_layout;
    }

    /// Geometry from the last solve that reached this node.
    pub fn layout(&self, node: NodeRef) -> &NodeLayout {
        &self.node(node).layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dimension;

    fn setup() -> LayoutEngine {
        LayoutEngine::new()
    }

    #[test]
    fn test_insert_sets_owner_and_dirties_chain() {
        let mut engine = setup();
        let root = engine.new_node();
        let parent = engine.new_node();
        let child = engine.new_node();
        engine.insert_child(root, parent, 0);
        engine.insert_child(parent, child, 0);

        assert_eq!(engine.owner(child), Some(parent));
        assert_eq!(engine.owner(parent), Some(root));
        assert!(engine.is_dirty(root));
        assert!(engine.is_dirty(parent));
    }

    #[test]
    #[should_panic(expected = "already has an owner")]
    fn test_insert_owned_child_panics() {
        let mut engine = setup();
        let a = engine.new_node();
        let b = engine.new_node();
        let child = engine.new_node();
        engine.insert_child(a, child, 0);
        engine.insert_child(b, child, 0);
    }

    #[test]
    fn test_clone_aliases_children() {
        let mut engine = setup();
        let original = engine.new_node();
        let child = engine.new_node();
        engine.insert_child(original, child, 0);

        let copy = engine.clone_node(original);
        assert_eq!(engine.children(copy), &[child]);
        assert_eq!(engine.owner(child), Some(original));
        assert_eq!(engine.owner(copy), None);
    }

    #[test]
    fn test_free_recursive_skips_aliased_children() {
        let mut engine = setup();
        let original = engine.new_node();
        let child = engine.new_node();
        let grandchild = engine.new_node();
        engine.insert_child(original, child, 0);
        engine.insert_child(child, grandchild, 0);

        let copy = engine.clone_node(original);
        let count_before = engine.node_count();
        engine.free_recursive(copy);

        assert!(!engine.contains(copy));
        assert!(engine.contains(child));
        assert!(engine.contains(grandchild));
        assert_eq!(engine.owner(child), Some(original));
        assert_eq!(engine.children(original), &[child]);
        assert_eq!(engine.node_count(), count_before - 1);
    }

    #[test]
    fn test_free_recursive_frees_owned_children() {
        let mut engine = setup();
        let root = engine.new_node();
        let child = engine.new_node();
        let grandchild = engine.new_node();
        engine.insert_child(root, child, 0);
        engine.insert_child(child, grandchild, 0);

        engine.free_recursive(root);
        assert_eq!(engine.node_count(), 0);
        assert!(!engine.contains(grandchild));
    }

    #[test]
    fn test_mutating_clone_clones_children() {
        let mut engine = setup();
        let original = engine.new_node();
        let child = engine.new_node();
        engine.insert_child(original, child, 0);

        let copy = engine.clone_node(original);
        let extra = engine.new_node();
        engine.insert_child(copy, extra, 1);

        let copy_children = engine.children(copy).to_vec();
        assert_eq!(copy_children.len(), 2);
        assert_ne!(copy_children[0], child);
        assert_eq!(engine.owner(copy_children[0]), Some(copy));
        assert_eq!(engine.children(original), &[child]);
    }

    #[test]
    fn test_freed_handle_is_not_reused() {
        let mut engine = setup();
        let first = engine.new_node();
        engine.free(first);
        let second = engine.new_node();
        assert_eq!(first.index, second.index);
        assert!(!engine.contains(first));
        assert!(engine.contains(second));
    }

    #[test]
    fn test_update_style_dirties_only_on_change() {
        let mut engine = setup();
        let node = engine.new_node();
        assert!(!engine.update_style(node, |_| {}));
        assert!(!engine.is_dirty(node));
        assert!(engine.update_style(node, |style| style.width = Dimension::Points(10.0)));
        assert!(engine.is_dirty(node));
    }

    #[test]
    #[should_panic(expected = "measure callback")]
    fn test_measure_node_rejects_children() {
        let mut engine = setup();
        let parent = engine.new_node();
        let child = engine.new_node();
        engine.set_has_measure(parent, true);
        engine.insert_child(parent, child, 0);
    }
}
