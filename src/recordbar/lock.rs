//! Slide-to-lock affordance.
//!
//! Tracks the drag-derived lock progress and pins it once the gesture
//! completes: within a session `locked` is monotonic, progress updates are
//! ignored until the session tears the affordance down again.

use std::time::{Duration, Instant};

use super::animation::AnimValue;

/// Duration of the icon slide played when the lock engages.
const LOCKED_SLIDE_DURATION: Duration = Duration::from_millis(150);

pub struct LockAffordance {
    /// Drag progress in `[0, 1]`; exactly 1.0 means locked
    progress: f64,
    hidden: bool,
    /// Icon slide played once when progress reaches 1.0
    locked_slide: AnimValue,
}

impl LockAffordance {
    pub fn new(animations_enabled: bool) -> Self {
        Self {
            progress: 0.0,
            hidden: true,
            locked_slide: AnimValue::new(0.0, LOCKED_SLIDE_DURATION, animations_enabled),
        }
    }

    /// Makes the affordance visible; progress updates are accepted from here on.
    pub fn show(&mut self) {
        self.hidden = false;
    }

    /// Hides and fully resets the affordance at session end.
    pub fn hide_reset(&mut self) {
        self.hidden = true;
        self.progress = 0.0;
        self.locked_slide.reset(0.0);
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Stores a new drag progress value. Ignored while hidden or already
    /// locked. Returns true exactly once per session, at the instant the
    /// progress reaches 1.0.
    pub fn set_progress(&mut self, value: f64, now: Instant) -> bool {
        if self.hidden || self.is_locked() {
            return false;
        }
        self.progress = value;
        if self.is_locked() {
            self.locked_slide.start(0.0, 1.0, now);
            return true;
        }
        false
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_locked(&self) -> bool {
        self.progress == 1.0
    }

    /// Progress of the icon slide that plays after locking.
    pub fn locked_slide_ratio(&self, now: Instant) -> f64 {
        self.locked_slide.value(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shown_lock() -> LockAffordance {
        let mut lock = LockAffordance::new(false);
        lock.show();
        lock
    }

    #[test]
    fn test_progress_ignored_while_hidden() {
        let now = Instant::now();
        let mut lock = LockAffordance::new(false);
        assert!(!lock.set_progress(0.5, now));
        assert_eq!(lock.progress(), 0.0);
    }

    #[test]
    fn test_locks_at_exactly_one() {
        let now = Instant::now();
        let mut lock = shown_lock();
        assert!(!lock.set_progress(0.999, now));
        assert!(!lock.is_locked());
        assert!(lock.set_progress(1.0, now));
        assert!(lock.is_locked());
    }

    #[test]
    fn test_locked_event_fires_exactly_once() {
        let now = Instant::now();
        let mut lock = shown_lock();
        assert!(lock.set_progress(1.0, now));
        assert!(!lock.set_progress(1.0, now));
        assert!(!lock.set_progress(0.3, now));
    }

    #[test]
    fn test_locked_progress_is_pinned() {
        let now = Instant::now();
        let mut lock = shown_lock();
        lock.set_progress(1.0, now);
        lock.set_progress(0.2, now);
        assert_eq!(lock.progress(), 1.0);
        assert!(lock.is_locked());
    }

    #[test]
    fn test_hide_reset_clears_lock() {
        let now = Instant::now();
        let mut lock = shown_lock();
        lock.set_progress(1.0, now);
        lock.hide_reset();
        assert!(lock.is_hidden());
        assert!(!lock.is_locked());
        assert_eq!(lock.progress(), 0.0);
        assert_eq!(lock.locked_slide_ratio(now), 0.0);

        // A fresh session can lock (and fire) again
        lock.show();
        assert!(lock.set_progress(1.0, now));
    }
}
