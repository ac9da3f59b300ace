//! Frame dispatch - applying computed metrics to views.
//!
//! A frame update is plain data. On the UI thread it is applied right away;
//! from any other thread it is queued and the UI thread drains the queue in
//! FIFO order.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::error::FrameError;
use crate::shadow::LayoutMetrics;
use crate::types::DisplayType;
use crate::view::{ViewHost, ViewId};

use super::UiThread;

/// One unit of frame application work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUpdate {
    pub view: ViewId,
    pub metrics: LayoutMetrics,
    /// Offset the frame by the view's pre-update origin (root view only).
    pub preserve_origin: bool,
}

/// Apply one update to its view.
///
/// The hidden flag follows the display type. A frame with a NaN coordinate
/// is not written.
pub fn apply_frame_update(host: &mut dyn ViewHost, update: &FrameUpdate) -> Result<(), FrameError> {
    let view = update.view;
    if !host.contains(view) {
        return Err(FrameError::ViewGone { view });
    }
    host.set_hidden(view, update.metrics.display_type == DisplayType::None);

    let mut frame = update.metrics.frame;
    if update.preserve_origin {
        frame.origin = frame.origin.offset_by(host.frame(view).origin);
    }
    if frame.has_nan() {
        return Err(FrameError::NonFiniteFrame { view, frame });
    }
    host.set_frame(view, frame);
    Ok(())
}

/// Outcome of a dispatch or drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub applied: usize,
    pub skipped: usize,
    pub queued: usize,
}

/// Cloneable, thread-safe handle for queueing frame updates.
#[derive(Debug, Clone)]
pub struct FrameSender {
    sender: Sender<FrameUpdate>,
}

impl FrameSender {
    /// Queue an update for the UI thread. Returns false when the dispatcher
    /// is gone.
    pub fn send(&self, update: FrameUpdate) -> bool {
        self.sender.send(update).is_ok()
    }

    /// Queue a batch in order. Only `queued` is set in the report.
    pub fn send_all(&self, updates: impl IntoIterator<Item = FrameUpdate>) -> FrameReport {
        let mut report = FrameReport::default();
        for update in updates {
            if !self.send(update) {
                break;
            }
            report.queued += 1;
        }
        log::trace!("queued {} frame updates for the UI thread", report.queued);
        report
    }
}

/// Applies frame updates on the UI thread.
///
/// Other threads never touch the host: they queue through a [`FrameSender`]
/// and the UI thread applies the queue with [`FrameDispatcher::drain`].
#[derive(Debug)]
pub struct FrameDispatcher {
    ui_thread: UiThread,
    sender: Sender<FrameUpdate>,
    receiver: Receiver<FrameUpdate>,
}

impl FrameDispatcher {
    pub fn new(ui_thread: UiThread) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            ui_thread,
            sender,
            receiver,
        }
    }

    pub fn sender(&self) -> FrameSender {
        FrameSender {
            sender: self.sender.clone(),
        }
    }

    /// Number of queued updates not yet drained.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Apply updates immediately, in order.
    ///
    /// A failing update is logged and skipped; the rest still apply.
    ///
    /// # Panics
    ///
    /// Off the UI thread. Use [`FrameSender::send_all`] there instead.
    pub fn dispatch(
        &self,
        updates: impl IntoIterator<Item = FrameUpdate>,
        host: &mut dyn ViewHost,
    ) -> FrameReport {
        self.ui_thread.assert_current("FrameDispatcher::dispatch");
        let mut report = FrameReport::default();
        for update in updates {
            apply_logged(host, &update, &mut report);
        }
        report
    }

    /// Apply every queued update, oldest first.
    ///
    /// # Panics
    ///
    /// Off the UI thread.
    pub fn drain(&self, host: &mut dyn ViewHost) -> FrameReport {
        self.ui_thread.assert_current("FrameDispatcher::drain");
        let mut report = FrameReport::default();
        for update in self.receiver.try_iter() {
            apply_logged(host, &update, &mut report);
        }
        report
    }
}

fn apply_logged(host: &mut dyn ViewHost, update: &FrameUpdate, report: &mut FrameReport) {
    match apply_frame_update(host, update) {
        Ok(()) => report.applied += 1,
        Err(err) => {
            log::warn!("skipping frame update: {err}");
            report.skipped += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EdgeInsets, LayoutDirection, Point, Rect};
    use crate::view::{ViewArena, ViewKind};

    fn setup() -> (ViewArena, ViewId, FrameDispatcher) {
        let mut host = ViewArena::new();
        let view = host.add_view(ViewKind::Plain, Rect::new(5.0, 7.0, 1.0, 1.0));
        (host, view, FrameDispatcher::new(UiThread::current()))
    }

    fn update(view: ViewId, frame: Rect) -> FrameUpdate {
        FrameUpdate {
            view,
            metrics: LayoutMetrics {
                frame,
                content_frame: Rect::from_origin_size(Point::ZERO, frame.size),
                border: EdgeInsets::ZERO,
                display_type: DisplayType::Flex,
                layout_direction: LayoutDirection::LeftToRight,
            },
            preserve_origin: false,
        }
    }

    #[test]
    fn test_apply_sets_frame_and_hidden() {
        let (mut host, view, _) = setup();
        let mut hidden = update(view, Rect::new(0.0, 0.0, 10.0, 10.0));
        hidden.metrics.display_type = DisplayType::None;

        apply_frame_update(&mut host, &hidden).unwrap();

        assert!(host.is_hidden(view));
        assert_eq!(host.frame(view), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_preserve_origin_offsets_by_previous_origin() {
        let (mut host, view, _) = setup();
        let mut root = update(view, Rect::new(1.0, 1.0, 10.0, 10.0));
        root.preserve_origin = true;

        apply_frame_update(&mut host, &root).unwrap();
        assert_eq!(host.frame(view), Rect::new(6.0, 8.0, 10.0, 10.0));
    }

    #[test]
    fn test_nan_frame_is_rejected() {
        let (mut host, view, _) = setup();
        let bad = update(view, Rect::new(f32::NAN, 0.0, 10.0, 10.0));
        assert!(matches!(
            apply_frame_update(&mut host, &bad),
            Err(FrameError::NonFiniteFrame { .. })
        ));
        assert_eq!(host.frame(view), Rect::new(5.0, 7.0, 1.0, 1.0));
    }

    #[test]
    fn test_dispatch_continues_past_bad_frame() {
        let (mut host, view, dispatcher) = setup();
        let other = host.add_view(ViewKind::Plain, Rect::ZERO);
        let updates = [
            update(view, Rect::new(0.0, f32::NAN, 1.0, 1.0)),
            update(other, Rect::new(0.0, 0.0, 3.0, 3.0)),
        ];

        let report = dispatcher.dispatch(updates, &mut host);

        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(host.frame(other), Rect::new(0.0, 0.0, 3.0, 3.0));
    }

    #[test]
    fn test_gone_view_is_skipped() {
        let (mut host, view, dispatcher) = setup();
        host.remove_view(view);
        let report = dispatcher.dispatch([update(view, Rect::ZERO)], &mut host);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_dispatch_off_ui_thread_panics() {
        let (mut host, view, dispatcher) = setup();
        let result = std::thread::spawn(move || {
            dispatcher.dispatch([update(view, Rect::ZERO)], &mut host);
        })
        .join();
        assert!(result.is_err());
    }

    #[test]
    fn test_send_all_queues_batch_for_drain() {
        let (mut host, view, dispatcher) = setup();
        let sender = dispatcher.sender();
        let queued = std::thread::spawn(move || {
            sender.send_all([
                update(view, Rect::new(0.0, 0.0, 4.0, 4.0)),
                update(view, Rect::new(0.0, 0.0, 8.0, 8.0)),
            ])
        })
        .join()
        .unwrap();

        assert_eq!(queued, FrameReport { queued: 2, ..FrameReport::default() });
        assert_eq!(host.frame_writes(), 0);
        let report = dispatcher.drain(&mut host);
        assert_eq!(report.applied, 2);
        assert_eq!(host.frame(view), Rect::new(0.0, 0.0, 8.0, 8.0));
    }

    #[test]
    fn test_queued_updates_drain_in_order() {
        let (mut host, view, dispatcher) = setup();
        let sender = dispatcher.sender();
        std::thread::spawn(move || {
            sender.send(update(view, Rect::new(0.0, 0.0, 1.0, 1.0)));
            sender.send(update(view, Rect::new(0.0, 0.0, 2.0, 2.0)));
        })
        .join()
        .unwrap();

        assert_eq!(dispatcher.pending(), 2);
        let report = dispatcher.drain(&mut host);

        assert_eq!(report.applied, 2);
        assert_eq!(host.frame(view), Rect::new(0.0, 0.0, 2.0, 2.0));
        assert_eq!(host.frame_writes(), 2);
        assert_eq!(dispatcher.pending(), 0);
    }
}
