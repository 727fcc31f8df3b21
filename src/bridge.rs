//! Focus-Change Bridge
//!
//! Turns a host focus notification into a clipped target rectangle and moves
//! the overlay only when that rectangle differs from the one last drawn.

use std::sync::Mutex;

use log::debug;

use crate::geometry::{BorderStrips, FocusRegion, Rect};
use crate::overlay::OverlaySink;

/// One focus change as delivered by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusEvent {
    /// Location attached to the event, if the host had one
    pub location: Option<FocusRegion>,
}

impl FocusEvent {
    pub fn at(location: FocusRegion) -> Self {
        Self { location: Some(location) }
    }

    pub fn without_location() -> Self {
        Self { location: None }
    }
}

/// What the bridge needs to know about the host's screen state
pub trait FocusProvider {
    /// Bounds of the currently focused object, if there is one
    fn focused_region(&self) -> Option<Rect>;

    /// Bounds of the whole desktop
    fn desktop_bounds(&self) -> Rect;
}

pub struct FocusBridge {
    thickness: i32,
    /// Last rectangle the surfaces were moved around. Starts all-zero, so a
    /// zero-sized report before any real focus leaves the overlay alone.
    last_drawn: Mutex<Rect>,
}

impl FocusBridge {
    pub fn new(thickness: i32) -> Self {
        Self {
            thickness,
            last_drawn: Mutex::new(Rect::default()),
        }
    }

    pub fn last_drawn(&self) -> Rect {
        *self.last_drawn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Handle one focus change. Returns true if the overlay was moved.
    ///
    /// The lock is held across the move so concurrent callers cannot leave
    /// the cache and the surfaces disagreeing.
    pub fn on_focus_changed(
        &self,
        event: &FocusEvent,
        provider: &dyn FocusProvider,
        sink: &dyn OverlaySink,
    ) -> bool {
        let region = match event.location {
            Some(location) => Rect::from(location),
            None => match provider.focused_region() {
                Some(rect) => rect,
                None => {
                    debug!("Focus change without a location, overlay unchanged");
                    return false;
                }
            },
        };

        let target = region.clip_to_desktop(&provider.desktop_bounds());

        let mut last_drawn = self
            .last_drawn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *last_drawn == target {
            return false;
        }
        *last_drawn = target;

        debug!("Focus moved to {:?}", target);
        sink.reposition(&BorderStrips::around(&target, self.thickness));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct RecordingSink {
        moves: Mutex<Vec<BorderStrips>>,
    }

    impl RecordingSink {
        fn moves(&self) -> Vec<BorderStrips> {
            self.moves.lock().unwrap().clone()
        }
    }

    impl OverlaySink for RecordingSink {
        fn reposition(&self, strips: &BorderStrips) {
            self.moves.lock().unwrap().push(*strips);
        }

        fn request_shutdown(&self) {}
    }

    struct FakeHost {
        focused: Option<Rect>,
        desktop: Rect,
        queries: Cell<usize>,
    }

    impl FakeHost {
        fn new(focused: Option<Rect>) -> Self {
            Self {
                focused,
                desktop: Rect::new(0, 0, 1920, 1080),
                queries: Cell::new(0),
            }
        }
    }

    impl FocusProvider for FakeHost {
        fn focused_region(&self) -> Option<Rect> {
            self.queries.set(self.queries.get() + 1);
            self.focused
        }

        fn desktop_bounds(&self) -> Rect {
            self.desktop
        }
    }

    #[test]
    fn moves_the_overlay_when_focus_changes() {
        let bridge = FocusBridge::new(4);
        let host = FakeHost::new(None);
        let sink = RecordingSink::default();

        let moved = bridge.on_focus_changed(
            &FocusEvent::at(FocusRegion::new(100, 100, 50, 20)),
            &host,
            &sink,
        );

        assert!(moved);
        assert_eq!(bridge.last_drawn(), Rect::new(100, 100, 150, 120));
        let moves = sink.moves();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].top, Rect::new(100, 96, 150, 100));
        assert_eq!(moves[0].bottom, Rect::new(100, 120, 150, 124));
        assert_eq!(moves[0].left, Rect::new(96, 96, 100, 124));
        assert_eq!(moves[0].right, Rect::new(150, 96, 154, 124));
    }

    #[test]
    fn identical_reports_are_suppressed() {
        let bridge = FocusBridge::new(4);
        let host = FakeHost::new(None);
        let sink = RecordingSink::default();
        let event = FocusEvent::at(FocusRegion::new(10, 20, 30, 40));

        assert!(bridge.on_focus_changed(&event, &host, &sink));
        for _ in 0..5 {
            assert!(!bridge.on_focus_changed(&event, &host, &sink));
        }
        assert_eq!(sink.moves().len(), 1);
    }

    #[test]
    fn different_regions_clipping_to_the_same_rect_are_suppressed() {
        let bridge = FocusBridge::new(4);
        let host = FakeHost::new(None);
        let sink = RecordingSink::default();

        bridge.on_focus_changed(&FocusEvent::at(FocusRegion::new(1800, 10, 500, 10)), &host, &sink);
        bridge.on_focus_changed(&FocusEvent::at(FocusRegion::new(1800, 10, 900, 10)), &host, &sink);

        assert_eq!(sink.moves().len(), 1);
        assert_eq!(bridge.last_drawn(), Rect::new(1800, 10, 1920, 20));
    }

    #[test]
    fn falls_back_to_the_host_focus_object() {
        let bridge = FocusBridge::new(4);
        let host = FakeHost::new(Some(Rect::new(200, 300, 260, 330)));
        let sink = RecordingSink::default();

        assert!(bridge.on_focus_changed(&FocusEvent::without_location(), &host, &sink));
        assert_eq!(host.queries.get(), 1);
        assert_eq!(bridge.last_drawn(), Rect::new(200, 300, 260, 330));
    }

    #[test]
    fn payload_location_wins_over_the_host_query() {
        let bridge = FocusBridge::new(4);
        let host = FakeHost::new(Some(Rect::new(200, 300, 260, 330)));
        let sink = RecordingSink::default();

        bridge.on_focus_changed(&FocusEvent::at(FocusRegion::new(1, 2, 3, 4)), &host, &sink);
        assert_eq!(host.queries.get(), 0);
        assert_eq!(bridge.last_drawn(), Rect::new(1, 2, 4, 6));
    }

    #[test]
    fn missing_focus_is_a_no_op() {
        let bridge = FocusBridge::new(4);
        let host = FakeHost::new(None);
        let sink = RecordingSink::default();

        assert!(!bridge.on_focus_changed(&FocusEvent::without_location(), &host, &sink));
        assert!(sink.moves().is_empty());
        assert_eq!(bridge.last_drawn(), Rect::default());
    }

    #[test]
    fn oversized_host_report_is_clipped_without_overflow() {
        let bridge = FocusBridge::new(4);
        let host = FakeHost::new(None);
        let sink = RecordingSink::default();

        let event = FocusEvent::at(FocusRegion::new(i32::MAX - 10, 0, 100, 10));
        assert!(bridge.on_focus_changed(&event, &host, &sink));
        assert_eq!(bridge.last_drawn(), Rect::new(i32::MAX - 10, 0, i32::MAX - 10, 10));
        assert_eq!(sink.moves()[0].right.right, i32::MAX - 6);
    }

    #[test]
    fn region_off_the_top_is_clipped_before_caching() {
        let bridge = FocusBridge::new(4);
        let host = FakeHost::new(None);
        let sink = RecordingSink::default();

        bridge.on_focus_changed(&FocusEvent::at(FocusRegion::new(100, -10, 50, 30)), &host, &sink);

        assert_eq!(bridge.last_drawn(), Rect::new(100, 0, 150, 20));
        let moves = sink.moves();
        assert_eq!(moves[0].top, Rect::new(100, 0, 150, 0));
    }

    #[test]
    fn zero_rect_before_any_focus_is_ignored() {
        let bridge = FocusBridge::new(4);
        let host = FakeHost::new(Some(Rect::default()));
        let sink = RecordingSink::default();

        assert!(!bridge.on_focus_changed(&FocusEvent::without_location(), &host, &sink));
        assert!(sink.moves().is_empty());
    }
}
