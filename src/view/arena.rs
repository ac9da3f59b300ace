//! ViewArena - in-memory view hierarchy.
//!
//! A headless [`ViewHost`] for hosts without a native toolkit and for tests.
//! Views are plain records keyed by [`ViewId`]; ids are never reused.

use std::collections::HashMap;

use crate::types::{Rect, Size};

use super::{ViewHost, ViewId};

/// What kind of view a record models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewKind {
    /// Bare container with no content of its own.
    #[default]
    Plain,
    /// View that draws its own content (text, image, control).
    Content,
}

#[derive(Debug, Clone)]
struct ViewRecord {
    kind: ViewKind,
    frame: Rect,
    hidden: bool,
    superview: Option<ViewId>,
    subviews: Vec<ViewId>,
    /// Size reported by fits queries. Without one, the view reports its
    /// current frame size.
    fitting_size: Option<Size>,
}

/// In-memory view hierarchy.
#[derive(Debug, Default)]
pub struct ViewArena {
    views: HashMap<ViewId, ViewRecord>,
    next_id: u64,
    frame_writes: usize,
}

impl ViewArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached view.
    pub fn add_view(&mut self, kind: ViewKind, frame: Rect) -> ViewId {
        let id = ViewId(self.next_id);
        self.next_id += 1;
        self.views.insert(
            id,
            ViewRecord {
                kind,
                frame,
                hidden: false,
                superview: None,
                subviews: Vec::new(),
                fitting_size: None,
            },
        );
        id
    }

    /// Append `child` to `parent`, moving it out of any previous superview.
    pub fn add_subview(&mut self, parent: ViewId, child: ViewId) {
        let index = self.subviews(parent).len();
        self.insert_subview(parent, child, index);
    }

    /// Insert `child` at `index` (clamped), moving it out of any previous
    /// superview.
    pub fn insert_subview(&mut self, parent: ViewId, child: ViewId, index: usize) {
        if parent == child || !self.views.contains_key(&parent) || !self.views.contains_key(&child) {
            return;
        }
        self.remove_from_superview(child);
        if let Some(record) = self.views.get_mut(&parent) {
            let index = index.min(record.subviews.len());
            record.subviews.insert(index, child);
        }
        if let Some(record) = self.views.get_mut(&child) {
            record.superview = Some(parent);
        }
    }

    pub fn remove_from_superview(&mut self, view: ViewId) {
        let Some(parent) = self.views.get_mut(&view).and_then(|record| record.superview.take())
        else {
            return;
        };
        if let Some(record) = self.views.get_mut(&parent) {
            record.subviews.retain(|existing| *existing != view);
        }
    }

    /// Deallocate a view. Its subviews survive as detached views.
    pub fn remove_view(&mut self, view: ViewId) {
        self.remove_from_superview(view);
        let Some(record) = self.views.remove(&view) else {
            return;
        };
        for child in record.subviews {
            if let Some(child_record) = self.views.get_mut(&child) {
                child_record.superview = None;
            }
        }
    }

    pub fn superview(&self, view: ViewId) -> Option<ViewId> {
        self.views.get(&view).and_then(|record| record.superview)
    }

    pub fn kind(&self, view: ViewId) -> Option<ViewKind> {
        self.views.get(&view).map(|record| record.kind)
    }

    /// Set the size fits queries report for this view.
    pub fn set_fitting_size(&mut self, view: ViewId, size: Size) {
        if let Some(record) = self.views.get_mut(&view) {
            record.fitting_size = Some(size);
        }
    }

    /// Number of frame writes applied so far, across all views.
    pub fn frame_writes(&self) -> usize {
        self.frame_writes
    }
}

impl ViewHost for ViewArena {
    fn contains(&self, view: ViewId) -> bool {
        self.views.contains_key(&view)
    }

    fn bounds_size(&self, view: ViewId) -> Size {
        self.views
            .get(&view)
            .map(|record| record.frame.size)
            .unwrap_or_default()
    }

    fn frame(&self, view: ViewId) -> Rect {
        self.views
            .get(&view)
            .map(|record| record.frame)
            .unwrap_or_default()
    }

    fn set_frame(&mut self, view: ViewId, frame: Rect) {
        if let Some(record) = self.views.get_mut(&view) {
            record.frame = frame;
            self.frame_writes += 1;
        }
    }

    fn is_hidden(&self, view: ViewId) -> bool {
        self.views.get(&view).is_some_and(|record| record.hidden)
    }

    fn set_hidden(&mut self, view: ViewId, hidden: bool) {
        if let Some(record) = self.views.get_mut(&view) {
            record.hidden = hidden;
        }
    }

    fn subviews(&self, view: ViewId) -> &[ViewId] {
        self.views
            .get(&view)
            .map(|record| record.subviews.as_slice())
            .unwrap_or(&[])
    }

    fn size_that_fits(&self, view: ViewId, constraints: Size) -> Size {
        let Some(record) = self.views.get(&view) else {
            return Size::ZERO;
        };
        let natural = record.fitting_size.unwrap_or(record.frame.size);
        Size::new(
            natural.width.min(constraints.width),
            natural.height.min(constraints.height),
        )
    }

    fn is_plain_container(&self, view: ViewId) -> bool {
        self.kind(view) == Some(ViewKind::Plain)
    }
}
