//! Pulsing amplitude indicator.
//!
//! Renders the live microphone level as a circle that grows and shrinks with
//! the captured amplitude. Incoming levels are smoothed with a short
//! animation; because recording sessions can run for a very long time, the
//! smoothing driver is perpetual rather than one-shot and must be stopped
//! explicitly when the indicator is hidden.

use std::time::{Duration, Instant};

use super::animation::AnimValue;

/// Full-scale reference for incoming level values. Levels at or above this
/// draw the ring at its maximum radius.
pub const LEVEL_FULL_SCALE: f64 = 0x4000 as f64;

/// Duration of the smoothing animation between two level samples.
const SMOOTHING: Duration = Duration::from_millis(100);

pub struct LevelIndicator {
    animations_enabled: bool,
    /// Hit-test radius, in cells (corrected for cell aspect by the caller)
    radius: i32,
    /// Visible/hidden scale, driven by the session's show animation
    show_progress: f64,
    /// Inactive/active tint blend, driven by the session's active animation
    color_progress: f64,
    /// Smoothed amplitude in raw level units
    level: AnimValue,
    /// Perpetual repaint driver; true from the first level until hidden
    driving: bool,
    /// Pointer currently inside the circle
    active: bool,
}

impl LevelIndicator {
    pub fn new(radius: i32, animations_enabled: bool) -> Self {
        Self {
            animations_enabled,
            radius,
            show_progress: 0.0,
            color_progress: 0.0,
            level: AnimValue::new(0.0, SMOOTHING, animations_enabled),
            driving: false,
            active: false,
        }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Feeds a fresh amplitude sample, restarting the smoothing animation
    /// from the currently displayed value.
    pub fn set_level(&mut self, level: u16, now: Instant) {
        self.level.restart_to(level as f64, now);
        self.driving = true;
    }

    /// Smoothed amplitude as a ratio of full scale, in `[0, 1]`.
    pub fn level_ratio(&self, now: Instant) -> f64 {
        (self.level.value(now) / LEVEL_FULL_SCALE).clamp(0.0, 1.0)
    }

    /// Whether the indicator needs continuous repaints.
    pub fn is_driving(&self) -> bool {
        self.driving
    }

    pub fn show_progress(&self) -> f64 {
        self.show_progress
    }

    /// Updates the visible/hidden scale. Reaching zero stops the perpetual
    /// smoothing driver and clears transient state so nothing animates (or
    /// repaints) after the session is gone.
    pub fn set_show_progress(&mut self, value: f64) {
        self.show_progress = value;
        if value == 0.0 && self.driving {
            self.level = AnimValue::new(0.0, SMOOTHING, self.animations_enabled);
            self.driving = false;
            self.active = false;
        }
    }

    pub fn color_progress(&self) -> f64 {
        self.color_progress
    }

    pub fn set_color_progress(&mut self, value: f64) {
        self.color_progress = value;
    }

    /// Edge-triggered pointer-inside tracking: returns `Some(new_state)` only
    /// when the state actually changes.
    pub fn set_active(&mut self, inside: bool) -> Option<bool> {
        if self.active == inside {
            return None;
        }
        self.active = inside;
        Some(inside)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether a point at the given offset from the center lies inside the
    /// circle. Takes the cheap Manhattan paths before falling back to the
    /// Euclidean check.
    pub fn in_circle(&self, dx: i32, dy: i32) -> bool {
        let radius = self.radius;
        let dx = dx.abs();
        if dx > radius {
            return false;
        }
        let dy = dy.abs();
        if dy > radius {
            return false;
        }
        if dx + dy <= radius {
            return true;
        }
        dx * dx + dy * dy <= radius * radius
    }
}
