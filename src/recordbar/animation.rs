//! Frame-clocked animation values for the record bar.
//!
//! Every animated quantity is an [`AnimValue`] evaluated lazily against the
//! frame clock; nothing runs on its own timer. When animations are disabled
//! in the configuration, values jump straight to their targets.

use std::f64::consts::PI;
use std::time::{Duration, Instant};

/// Sine ease-in-ease-out over `t` in `[0, 1]`.
pub fn sine_in_out(t: f64) -> f64 {
    0.5 - 0.5 * (PI * t).cos()
}

/// A value animating between two endpoints over a fixed duration.
#[derive(Debug, Clone)]
pub struct AnimValue {
    from: f64,
    to: f64,
    started_at: Option<Instant>,
    duration: Duration,
    enabled: bool,
}

impl AnimValue {
    pub fn new(initial: f64, duration: Duration, enabled: bool) -> Self {
        Self {
            from: initial,
            to: initial,
            started_at: None,
            duration,
            enabled,
        }
    }

    /// Starts animating from `from` to `to`. With animations disabled (or a
    /// zero-length transition) the value jumps to `to` immediately.
    pub fn start(&mut self, from: f64, to: f64, now: Instant) {
        self.to = to;
        if self.enabled && from != to {
            self.from = from;
            self.started_at = Some(now);
        } else {
            self.from = to;
            self.started_at = None;
        }
    }

    /// Restarts toward `to` from whatever value is currently displayed.
    pub fn restart_to(&mut self, to: f64, now: Instant) {
        let current = self.value(now);
        self.start(current, to, now);
    }

    /// Resets to a fixed value with no transition in flight.
    pub fn reset(&mut self, value: f64) {
        self.from = value;
        self.to = value;
        self.started_at = None;
    }

    /// Jumps to the target and stops animating.
    pub fn finish(&mut self) {
        self.from = self.to;
        self.started_at = None;
    }

    /// Eased value at `now`.
    pub fn value(&self, now: Instant) -> f64 {
        let Some(started_at) = self.started_at else {
            return self.to;
        };
        let elapsed = now.saturating_duration_since(started_at).as_secs_f64();
        let dt = elapsed / self.duration.as_secs_f64();
        if dt >= 1.0 {
            self.to
        } else {
            self.from + (self.to - self.from) * sine_in_out(dt)
        }
    }

    pub fn animating(&self, now: Instant) -> bool {
        self.started_at
            .is_some_and(|started_at| now.saturating_duration_since(started_at) < self.duration)
    }
}

/// Perpetual pulse for the "recording active" dot: `|sin(t / 400ms)|`.
///
/// Unlike [`AnimValue`] this has no target; it runs until stopped with the
/// session. Disabled animations keep it permanently off.
#[derive(Debug, Clone)]
pub struct PulseAnimation {
    started_at: Option<Instant>,
    enabled: bool,
}

impl PulseAnimation {
    const PERIOD_MS: f64 = 400.0;

    pub fn new(enabled: bool) -> Self {
        Self {
            started_at: None,
            enabled,
        }
    }

    pub fn start(&mut self, now: Instant) {
        if self.enabled && self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    pub fn stop(&mut self) {
        self.started_at = None;
    }

    pub fn value(&self, now: Instant) -> f64 {
        match self.started_at {
            None => 0.0,
            Some(started_at) => {
                let elapsed_ms = now.saturating_duration_since(started_at).as_millis() as f64;
                (elapsed_ms / Self::PERIOD_MS).sin().abs()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D: Duration = Duration::from_millis(100);

    #[test]
    fn test_disabled_jumps_to_target() {
        let now = Instant::now();
        let mut v = AnimValue::new(0.0, D, false);
        v.start(0.0, 1.0, now);
        assert_eq!(v.value(now), 1.0);
        assert!(!v.animating(now));
    }

    #[test]
    fn test_enabled_interpolates() {
        let now = Instant::now();
        let mut v = AnimValue::new(0.0, D, true);
        v.start(0.0, 1.0, now);
        assert_eq!(v.value(now), 0.0);
        assert!(v.animating(now));

        let mid = v.value(now + Duration::from_millis(50));
        assert!(mid > 0.4 && mid < 0.6, "midpoint was {mid}");

        let end = now + D;
        assert_eq!(v.value(end), 1.0);
        assert!(!v.animating(end));
    }

    #[test]
    fn test_restart_picks_up_current_value() {
        let now = Instant::now();
        let mut v = AnimValue::new(0.0, D, true);
        v.start(0.0, 1.0, now);

        let halfway = now + Duration::from_millis(50);
        let current = v.value(halfway);
        v.restart_to(0.0, halfway);
        assert_eq!(v.value(halfway), current);
        assert_eq!(v.value(halfway + D), 0.0);
    }

    #[test]
    fn test_finish_stops_at_target() {
        let now = Instant::now();
        let mut v = AnimValue::new(0.0, D, true);
        v.start(0.0, 1.0, now);
        v.finish();
        assert_eq!(v.value(now), 1.0);
        assert!(!v.animating(now));
    }

    #[test]
    fn test_pulse_disabled_stays_zero() {
        let now = Instant::now();
        let mut pulse = PulseAnimation::new(false);
        pulse.start(now);
        assert_eq!(pulse.value(now + Duration::from_millis(200)), 0.0);
    }

    #[test]
    fn test_pulse_oscillates() {
        let now = Instant::now();
        let mut pulse = PulseAnimation::new(true);
        pulse.start(now);
        assert_eq!(pulse.value(now), 0.0);
        let peak = pulse.value(now + Duration::from_millis(628));
        assert!(peak > 0.99, "expected peak near 1.0, got {peak}");
        pulse.stop();
        assert_eq!(pulse.value(now + Duration::from_millis(628)), 0.0);
    }

    #[test]
    fn test_sine_in_out_endpoints() {
        assert!(sine_in_out(0.0).abs() < 1e-9);
        assert!((sine_in_out(1.0) - 1.0).abs() < 1e-9);
        assert!((sine_in_out(0.5) - 0.5).abs() < 1e-9);
    }
}
