//! UI thread affinity.
//!
//! Every structural mutation, engine access and style read happens on one
//! thread: the thread that created the shadow tree. Violations are
//! programming errors and fail fast.

use std::thread::{self, ThreadId};

/// Identity of the UI-owning thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiThread {
    id: ThreadId,
}

impl UiThread {
    /// Capture the calling thread as the UI thread.
    pub fn current() -> Self {
        Self {
            id: thread::current().id(),
        }
    }

    /// Whether the caller runs on the UI thread.
    #[inline]
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.id
    }

    /// Panic unless the caller runs on the UI thread.
    ///
    /// # Arguments
    /// * `operation` - Name of the entry point, for the panic message
    #[track_caller]
    pub fn assert_current(&self, operation: &str) {
        if !self.is_current() {
            panic!(
                "{operation} must run on the UI thread {:?}, called from {:?}",
                self.id,
                thread::current().id()
            );
        }
    }
}
