// scheduler.rs - Periodic Repaint Scheduling
//
// Layered windows can lose their pixels without getting a paint request, so
// one recurring timer forces all border surfaces to redraw. This type only
// decides when the timer is armed and which ticks belong to it; the backend
// owns the native timer.

use std::time::Duration;

use crate::constants::repaint;

#[derive(Debug, Clone)]
pub struct RepaintScheduler {
    period: Duration,
    timer_id: usize,
    /// Surface index the timer is registered on
    armed_on: Option<usize>,
}

impl Default for RepaintScheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(repaint::PERIOD_MS))
    }
}

impl RepaintScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            timer_id: repaint::TIMER_ID,
            armed_on: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed_on.is_some()
    }

    /// A border surface became visible. Returns the period and timer id to
    /// arm the first time only; later shows keep the existing timer.
    pub fn on_surface_shown(&mut self, surface: usize) -> Option<(Duration, usize)> {
        if self.armed_on.is_some() {
            return None;
        }
        self.armed_on = Some(surface);
        Some((self.period, self.timer_id))
    }

    /// True when a timer message is our repaint tick
    pub fn is_repaint_tick(&self, timer_id: usize) -> bool {
        self.armed_on.is_some() && timer_id == self.timer_id
    }

    /// The OS drops a window's timers together with the window
    pub fn on_surface_destroyed(&mut self, surface: usize) {
        if self.armed_on == Some(surface) {
            self.armed_on = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arms_once_on_first_show() {
        let mut scheduler = RepaintScheduler::default();
        assert!(!scheduler.is_armed());

        assert_eq!(
            scheduler.on_surface_shown(2),
            Some((Duration::from_millis(300), repaint::TIMER_ID))
        );
        assert!(scheduler.is_armed());
        assert_eq!(scheduler.on_surface_shown(0), None);
        assert_eq!(scheduler.on_surface_shown(2), None);
    }

    #[test]
    fn only_recognises_its_own_timer() {
        let mut scheduler = RepaintScheduler::default();
        assert!(!scheduler.is_repaint_tick(repaint::TIMER_ID));

        scheduler.on_surface_shown(0);
        assert!(scheduler.is_repaint_tick(repaint::TIMER_ID));
        assert!(!scheduler.is_repaint_tick(repaint::TIMER_ID + 1));
    }

    #[test]
    fn destroying_the_timer_surface_disarms() {
        let mut scheduler = RepaintScheduler::new(Duration::from_millis(50));
        scheduler.on_surface_shown(1);

        scheduler.on_surface_destroyed(3);
        assert!(scheduler.is_armed());

        scheduler.on_surface_destroyed(1);
        assert!(!scheduler.is_armed());
        assert_eq!(
            scheduler.on_surface_shown(3),
            Some((Duration::from_millis(50), repaint::TIMER_ID))
        );
    }
}
