//! Recording session controller.
//!
//! Owns the recording lifecycle and couples the pointer gesture, the capture
//! collaborator, and the animated visuals into one state machine:
//!
//! ```text
//! Idle -> Showing -> Active(unlocked) -> Active(locked)? -> Hiding -> Idle
//! ```
//!
//! Show and hide are animation-driven; both Active states may terminate
//! directly to Hiding via [`RecordBar::stop`]. Unlocked-to-locked is one-way
//! per session. All transitions happen on the UI thread, driven by
//! [`RecordBar::tick`], pointer/keyboard events, and capture updates polled
//! each frame.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::capture::{CaptureBackend, CapturePoll};

use super::animation::{AnimValue, PulseAnimation};
use super::format;
use super::geom::{Point, Rect};
use super::level::LevelIndicator;
use super::lock::LockAffordance;

/// Maximum voice message length: 100 minutes at the capture rate.
pub const MAX_VOICE_SECONDS: i64 = 100 * 60;

/// Show/hide animation length for the whole bar.
const SHOW_DURATION: Duration = Duration::from_millis(150);
/// Lock affordance slide-in/out length.
const LOCK_SHOW_DURATION: Duration = Duration::from_millis(150);
/// Cancel-field tint transition length.
const ACTIVE_DURATION: Duration = Duration::from_millis(120);

/// Default hit radius of the level indicator, in rows.
const LEVEL_RADIUS: i32 = 3;

/// Session-level state. `Active` covers both the unlocked and locked phases;
/// the lock affordance distinguishes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Showing,
    Active,
    Hiding,
}

/// Typing-indicator-style progress notifications for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendAction {
    /// A recording is in progress (fired per capture update)
    RecordVoice,
    /// The recording indicator should be cleared
    Cancel,
}

/// The finished clip handed to the host on a successful stop-with-send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceClipResult {
    pub bytes: Vec<u8>,
    pub waveform: Vec<u8>,
    pub duration_secs: i64,
}

/// Events emitted by the controller, drained by the host each frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    RecordingStateChanged(bool),
    SendAction(SendAction),
    VoiceClip(VoiceClipResult),
    LockShowChanged(bool),
    /// The host should return focus to its composer
    FocusRequested,
}

/// Keys relevant to the locked-input filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    Enter,
    Escape,
    Other,
}

/// What the locked-input filter decided about an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    /// Not ours; let the input pass through
    Continue,
    /// Consumed by the session (e.g. Enter sent the clip)
    Handled,
    /// The discard confirmation prompt should be visible
    ShowPrompt,
}

/// Geometry the gesture math works in, in global terminal cells.
#[derive(Debug, Clone, Copy)]
pub struct BarLayout {
    /// The recording bar itself (part of the cancel field)
    pub bar: Rect,
    /// Center of the level indicator circle
    pub level_center: Point,
    /// Vertical drag distance, in rows, required to reach the lock
    pub lock_height: i32,
}

impl Default for BarLayout {
    fn default() -> Self {
        Self {
            bar: Rect { x: 0, y: 20, w: 80, h: 3 },
            level_center: Point { x: 74, y: 21 },
            lock_height: 8,
        }
    }
}

/// The press-and-hold voice recording bar.
pub struct RecordBar {
    capture: Box<dyn CaptureBackend>,

    state: SessionState,
    /// Reported recording state; becomes true once capture actually starts
    recording: bool,
    /// Total samples captured, from the latest capture update
    samples: i64,
    /// Whether releasing the pointer right now would send (vs. cancel)
    in_cancel_field: bool,
    /// First capture update reveals the lock and starts the pulse
    seen_first_update: bool,
    /// Lock affordance visibility requested by the session
    lock_showing: bool,
    /// Set while the lock slide-in runs; progress is applied when it lands
    lock_reveal_pending: bool,
    /// What to do with the capture once the hide animation completes
    pending_stop_send: Option<bool>,
    /// Single-instance discard confirmation prompt
    prompt_open: bool,
    /// Last known global pointer position
    last_pointer: Point,

    layout: BarLayout,
    level: LevelIndicator,
    lock: LockAffordance,

    show_anim: AnimValue,
    active_anim: AnimValue,
    lock_show_anim: AnimValue,
    pulse: PulseAnimation,

    escape_override: Option<Box<dyn Fn() -> bool>>,
    events: VecDeque<SessionEvent>,
}

impl RecordBar {
    pub fn new(capture: Box<dyn CaptureBackend>, animations_enabled: bool) -> Self {
        let layout = BarLayout::default();
        Self {
            capture,
            state: SessionState::Idle,
            recording: false,
            samples: 0,
            in_cancel_field: false,
            seen_first_update: false,
            lock_showing: false,
            lock_reveal_pending: false,
            pending_stop_send: None,
            prompt_open: false,
            last_pointer: layout.level_center,
            layout,
            level: LevelIndicator::new(LEVEL_RADIUS, animations_enabled),
            lock: LockAffordance::new(animations_enabled),
            show_anim: AnimValue::new(0.0, SHOW_DURATION, animations_enabled),
            active_anim: AnimValue::new(0.0, ACTIVE_DURATION, animations_enabled),
            lock_show_anim: AnimValue::new(0.0, LOCK_SHOW_DURATION, animations_enabled),
            pulse: PulseAnimation::new(animations_enabled),
            escape_override: None,
            events: VecDeque::new(),
        }
    }

    /// Installs the host's Escape hook. When it returns true, Escape passes
    /// through instead of opening the discard prompt.
    pub fn set_escape_override(&mut self, f: Box<dyn Fn() -> bool>) {
        self.escape_override = Some(f);
    }

    pub fn set_layout(&mut self, layout: BarLayout) {
        self.layout = layout;
    }

    pub fn layout(&self) -> &BarLayout {
        &self.layout
    }

    pub fn poll_event(&mut self) -> Option<SessionEvent> {
        self.events.pop_front()
    }

    // State accessors, mostly for rendering.

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    pub fn is_lock_present(&self) -> bool {
        self.lock_showing
    }

    pub fn prompt_open(&self) -> bool {
        self.prompt_open
    }

    pub fn in_cancel_field(&self) -> bool {
        self.in_cancel_field
    }

    pub fn samples(&self) -> i64 {
        self.samples
    }

    pub fn level(&self) -> &LevelIndicator {
        &self.level
    }

    pub fn lock(&self) -> &LockAffordance {
        &self.lock
    }

    pub fn show_ratio(&self, now: Instant) -> f64 {
        self.show_anim.value(now)
    }

    pub fn lock_show_ratio(&self, now: Instant) -> f64 {
        self.lock_show_anim.value(now)
    }

    pub fn pulse_ratio(&self, now: Instant) -> f64 {
        self.pulse.value(now)
    }

    pub fn duration_text(&self) -> String {
        format::format_voice_duration(self.samples, self.capture.sample_rate())
    }

    pub fn cancel_message(&self) -> &'static str {
        if self.lock.is_locked() {
            "Click outside the indicator to cancel"
        } else {
            "Release outside this field to cancel"
        }
    }

    fn max_samples(&self) -> i64 {
        MAX_VOICE_SECONDS * self.capture.sample_rate() as i64
    }

    /// Whether a global point lies inside the level indicator's circle.
    /// Terminal cells are roughly twice as tall as wide, so the horizontal
    /// offset is halved before the hit test.
    pub fn level_hit(&self, p: Point) -> bool {
        let center = self.layout.level_center;
        self.level.in_circle((p.x - center.x) / 2, p.y - center.y)
    }

    // Lifecycle.

    /// Starts a new recording session. No-op unless idle.
    pub fn start_recording(&mut self, now: Instant) {
        if self.state != SessionState::Idle {
            return;
        }
        tracing::debug!("Recording session starting");
        self.state = SessionState::Showing;
        self.last_pointer = self.layout.level_center;
        self.set_in_cancel_field(true, now);
        self.show_anim.start(0.0, 1.0, now);
        self.level.set_show_progress(self.show_anim.value(now));
        if !self.show_anim.animating(now) {
            self.on_show_complete(now);
        }
    }

    /// Stops the session. Idempotent: a session already hiding (or no
    /// session at all) ignores further stops. The capture is finalized once
    /// the hide animation completes; `send` decides whether its result is
    /// delivered or discarded.
    pub fn stop(&mut self, send: bool, now: Instant) {
        match self.state {
            SessionState::Idle | SessionState::Hiding => return,
            SessionState::Showing | SessionState::Active => {}
        }
        tracing::debug!("Recording session stopping (send={send})");
        self.pending_stop_send = Some(send);
        self.state = SessionState::Hiding;
        self.set_lock_showing(false, now);
        self.show_anim.restart_to(0.0, now);
        if !self.show_anim.animating(now) {
            self.on_hide_complete(now);
        }
    }

    /// Fast-forwards the show/hide animation to its target.
    pub fn finish_animating(&mut self) {
        self.show_anim.finish();
    }

    /// Advances the frame clock: completes pending show/hide transitions,
    /// polls capture, and keeps the visual components fed.
    pub fn tick(&mut self, now: Instant) {
        self.level.set_show_progress(self.show_anim.value(now));
        self.level.set_color_progress(self.active_anim.value(now));

        match self.state {
            SessionState::Idle => {}
            SessionState::Showing => {
                if !self.show_anim.animating(now) {
                    self.on_show_complete(now);
                }
            }
            SessionState::Active => {
                self.poll_capture(now);
                if self.lock_reveal_pending && !self.lock_show_anim.animating(now) {
                    self.lock_reveal_pending = false;
                    // The drag may already be above the bar when the reveal lands.
                    self.apply_lock_progress(self.last_pointer, now);
                }
            }
            SessionState::Hiding => {
                if !self.show_anim.animating(now) {
                    self.on_hide_complete(now);
                }
            }
        }
    }

    // Input.

    /// Pointer movement in global terminal coordinates.
    pub fn on_pointer_move(&mut self, global: Point, now: Instant) {
        self.last_pointer = global;
        if !matches!(self.state, SessionState::Showing | SessionState::Active) {
            return;
        }
        if self.lock.is_locked() {
            // Hands-free: hovering the level indicator is what keeps a click
            // inside the cancel field.
            let inside = self.level_hit(global);
            if self.level.set_active(inside).is_some() {
                self.set_in_cancel_field(inside, now);
            }
            return;
        }
        let _ = self.level.set_active(self.level_hit(global));
        let in_field = self.layout.bar.contains(global) || self.level_hit(global);
        self.set_in_cancel_field(in_field, now);
        if self.lock_show_anim.animating(now) {
            return;
        }
        self.apply_lock_progress(global, now);
    }

    /// The terminal lost focus: the pointer is no longer ours, so an unlocked
    /// gesture is treated as having left the cancel field.
    pub fn on_window_leave(&mut self, now: Instant) {
        if !matches!(self.state, SessionState::Showing | SessionState::Active) {
            return;
        }
        if self.lock.is_locked() {
            return;
        }
        let _ = self.level.set_active(false);
        self.set_in_cancel_field(false, now);
    }

    /// Pointer release. Unlocked sessions stop here, sending only when the
    /// pointer is inside the cancel field; locked sessions ignore releases.
    pub fn on_pointer_release(&mut self, now: Instant) {
        if !matches!(self.state, SessionState::Showing | SessionState::Active) {
            return;
        }
        if self.lock.is_locked() {
            return;
        }
        self.stop(self.in_cancel_field, now);
    }

    /// Pointer press while a session is live. Only meaningful once locked:
    /// clicking the level indicator sends, clicking outside the cancel field
    /// asks for discard confirmation.
    pub fn on_pointer_press(&mut self, global: Point, now: Instant) -> FilterDecision {
        self.last_pointer = global;
        if self.state != SessionState::Active || !self.lock.is_locked() {
            return FilterDecision::Continue;
        }
        if self.prompt_open {
            return FilterDecision::Continue;
        }
        if self.level_hit(global) {
            self.stop(true, now);
            return FilterDecision::Handled;
        }
        if !self.in_cancel_field {
            return self.apply_decision(FilterDecision::ShowPrompt);
        }
        FilterDecision::Continue
    }

    /// Keyboard filter, active only while locked. Enter sends immediately;
    /// Escape defers to the host's escape-override; anything else dismissive
    /// opens the discard prompt.
    pub fn on_key(&mut self, key: FilterKey, now: Instant) -> FilterDecision {
        if self.state != SessionState::Active || !self.lock.is_locked() {
            return FilterDecision::Continue;
        }
        let decision = if self.prompt_open {
            match key {
                FilterKey::Enter | FilterKey::Escape => FilterDecision::Continue,
                FilterKey::Other => FilterDecision::ShowPrompt,
            }
        } else {
            match key {
                FilterKey::Enter => {
                    self.stop(true, now);
                    FilterDecision::Handled
                }
                FilterKey::Escape => {
                    if self.escape_override.as_ref().is_some_and(|f| f()) {
                        FilterDecision::Continue
                    } else {
                        FilterDecision::ShowPrompt
                    }
                }
                FilterKey::Other => FilterDecision::ShowPrompt,
            }
        };
        self.apply_decision(decision)
    }

    /// Dismissive input that is not a key or click (context menu, shortcut).
    pub fn on_dismissive_input(&mut self) -> FilterDecision {
        if self.state != SessionState::Active || !self.lock.is_locked() {
            return FilterDecision::Continue;
        }
        self.apply_decision(FilterDecision::ShowPrompt)
    }

    /// Accepts the discard prompt: stop without sending.
    pub fn confirm_discard(&mut self, now: Instant) {
        if !self.prompt_open {
            return;
        }
        self.prompt_open = false;
        self.stop(false, now);
    }

    /// Dismisses the discard prompt, keeping the recording running.
    pub fn dismiss_prompt(&mut self) {
        self.prompt_open = false;
    }

    /// A periodic update from the capture collaborator.
    pub fn on_capture_update(&mut self, level: u16, samples: i64, now: Instant) {
        if self.state != SessionState::Active {
            // The subscription is torn down with the session; late updates
            // must not resurrect it.
            return;
        }
        if !self.seen_first_update && !self.show_anim.animating(now) {
            // Reveal the lock after the first successful update.
            self.seen_first_update = true;
            self.set_lock_showing(true, now);
            self.pulse.start(now);
        }
        self.level.set_level(level, now);
        self.samples = samples;
        if samples < 0 || samples >= self.max_samples() {
            // Forced stop honors the last-known cancel-field state.
            self.stop(samples > 0 && self.in_cancel_field, now);
            return;
        }
        self.events
            .push_back(SessionEvent::SendAction(SendAction::RecordVoice));
    }

    // Internals.

    fn poll_capture(&mut self, now: Instant) {
        match self.capture.poll_update() {
            CapturePoll::Idle => {}
            CapturePoll::Update(sample) => {
                self.on_capture_update(sample.level, sample.samples, now);
            }
            CapturePoll::Failed => {
                tracing::warn!("Capture stream failed, stopping without send");
                self.stop(false, now);
            }
        }
    }

    fn on_show_complete(&mut self, now: Instant) {
        debug_assert!(!self.show_anim.animating(now));
        if self.state != SessionState::Showing {
            return;
        }
        if !self.capture.available() {
            tracing::warn!("Capture backend unavailable, aborting session");
            self.stop(false, now);
            return;
        }
        self.state = SessionState::Active;
        self.set_recording(true);
        self.events.push_back(SessionEvent::FocusRequested);
        if let Err(e) = self.capture.start() {
            tracing::warn!("Failed to start capture: {e}");
            self.stop(false, now);
        }
    }

    fn on_hide_complete(&mut self, now: Instant) {
        debug_assert!(!self.show_anim.animating(now));
        if self.state != SessionState::Hiding {
            return;
        }
        let send = self.pending_stop_send.take().unwrap_or(false);

        self.finish_capture(send);

        self.state = SessionState::Idle;
        self.samples = 0;
        self.seen_first_update = false;
        self.lock_reveal_pending = false;
        self.prompt_open = false;
        self.pulse.stop();
        self.lock.hide_reset();
        self.in_cancel_field = false;
        self.active_anim.reset(0.0);
        self.level.set_show_progress(0.0);
        self.set_recording(false);
        self.events
            .push_back(SessionEvent::SendAction(SendAction::Cancel));
        self.events.push_back(SessionEvent::FocusRequested);
    }

    fn finish_capture(&mut self, send: bool) {
        if !self.recording {
            // Capture never started for this session.
            return;
        }
        if !send {
            self.capture.stop_discard();
            return;
        }
        match self.capture.stop_with_result() {
            Ok(Some(result)) => {
                let duration_secs =
                    format::duration_seconds(result.samples, self.capture.sample_rate());
                self.events.push_back(SessionEvent::VoiceClip(VoiceClipResult {
                    bytes: result.bytes,
                    waveform: result.waveform,
                    duration_secs,
                }));
            }
            Ok(None) => tracing::debug!("Nothing captured, nothing to send"),
            Err(e) => tracing::warn!("Failed to finalize capture: {e}"),
        }
    }

    fn set_recording(&mut self, value: bool) {
        if self.recording == value {
            return;
        }
        self.recording = value;
        self.events
            .push_back(SessionEvent::RecordingStateChanged(value));
    }

    fn set_in_cancel_field(&mut self, value: bool, now: Instant) {
        if self.in_cancel_field == value {
            return;
        }
        self.in_cancel_field = value;
        self.active_anim
            .restart_to(if value { 1.0 } else { 0.0 }, now);
    }

    fn set_lock_showing(&mut self, show: bool, now: Instant) {
        if self.lock_showing == show {
            return;
        }
        self.lock_showing = show;
        self.events.push_back(SessionEvent::LockShowChanged(show));
        self.lock_show_anim
            .restart_to(if show { 1.0 } else { 0.0 }, now);
        if show {
            self.lock.show();
            self.lock_reveal_pending = true;
            if !self.lock_show_anim.animating(now) {
                self.lock_reveal_pending = false;
                self.apply_lock_progress(self.last_pointer, now);
            }
        } else {
            self.lock_reveal_pending = false;
        }
    }

    /// Lock progress is derived solely from the latest vertical offset above
    /// the bar, as a share of the lock travel distance.
    fn apply_lock_progress(&mut self, global: Point, now: Instant) {
        let local_y = global.y - self.layout.bar.y;
        let progress = (-(local_y as f64) / self.layout.lock_height as f64).clamp(0.0, 1.0);
        if self.lock.set_progress(progress, now) {
            self.on_locked(now);
        }
    }

    fn apply_decision(&mut self, decision: FilterDecision) -> FilterDecision {
        if decision == FilterDecision::ShowPrompt {
            self.prompt_open = true;
        }
        decision
    }

    fn on_locked(&mut self, now: Instant) {
        tracing::debug!("Recording locked");
        // The gesture converts to a free-standing click; from here the cancel
        // field follows hover over the level indicator, starting outside it.
        let _ = self.level.set_active(false);
        self.set_in_cancel_field(false, now);
    }
}

impl Drop for RecordBar {
    fn drop(&mut self) {
        if self.recording {
            self.capture.stop_discard();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureResult, LevelSample};
    use std::cell::RefCell;
    use std::rc::Rc;

    const RATE: u32 = 48000;

    #[derive(Default)]
    struct FakeState {
        available: bool,
        started: bool,
        discarded: bool,
        finished: bool,
        result: Option<CaptureResult>,
        updates: VecDeque<LevelSample>,
        fail_next_poll: bool,
    }

    struct FakeCapture {
        state: Rc<RefCell<FakeState>>,
    }

    impl CaptureBackend for FakeCapture {
        fn available(&self) -> bool {
            self.state.borrow().available
        }

        fn start(&mut self) -> anyhow::Result<()> {
            self.state.borrow_mut().started = true;
            Ok(())
        }

        fn sample_rate(&self) -> u32 {
            RATE
        }

        fn poll_update(&mut self) -> CapturePoll {
            let mut state = self.state.borrow_mut();
            if state.fail_next_poll {
                state.fail_next_poll = false;
                return CapturePoll::Failed;
            }
            match state.updates.pop_front() {
                Some(sample) => CapturePoll::Update(sample),
                None => CapturePoll::Idle,
            }
        }

        fn stop_discard(&mut self) {
            self.state.borrow_mut().discarded = true;
        }

        fn stop_with_result(&mut self) -> anyhow::Result<Option<CaptureResult>> {
            let mut state = self.state.borrow_mut();
            state.finished = true;
            Ok(state.result.take())
        }
    }

    fn clip() -> CaptureResult {
        CaptureResult {
            bytes: vec![1, 2, 3],
            waveform: vec![9],
            samples: RATE as i64 * 2,
        }
    }

    fn bar_with(result: Option<CaptureResult>) -> (RecordBar, Rc<RefCell<FakeState>>) {
        let state = Rc::new(RefCell::new(FakeState {
            available: true,
            result,
            ..FakeState::default()
        }));
        let capture = FakeCapture {
            state: Rc::clone(&state),
        };
        // Animations disabled: transitions complete synchronously
        (RecordBar::new(Box::new(capture), false), state)
    }

    fn active_bar(result: Option<CaptureResult>) -> (RecordBar, Rc<RefCell<FakeState>>, Instant) {
        let now = Instant::now();
        let (mut bar, state) = bar_with(result);
        bar.start_recording(now);
        assert_eq!(bar.state(), SessionState::Active);
        (bar, state, now)
    }

    fn drain(bar: &mut RecordBar) -> Vec<SessionEvent> {
        std::iter::from_fn(|| bar.poll_event()).collect()
    }

    fn lock_session(bar: &mut RecordBar, now: Instant) {
        bar.on_capture_update(100, 4800, now);
        let above = Point {
            x: bar.layout().level_center.x,
            y: bar.layout().bar.y - bar.layout().lock_height,
        };
        bar.on_pointer_move(above, now);
        assert!(bar.is_locked());
    }

    #[test]
    fn test_send_flow_emits_clip_and_state_changes() {
        let (mut bar, state, now) = active_bar(Some(clip()));
        assert!(state.borrow().started);

        bar.on_capture_update(1000, 4800, now);
        assert!(bar.is_lock_present());
        // Pointer stayed on the button: release sends
        bar.on_pointer_release(now);
        assert_eq!(bar.state(), SessionState::Idle);

        let events = drain(&mut bar);
        assert!(events.contains(&SessionEvent::RecordingStateChanged(true)));
        assert!(events.contains(&SessionEvent::RecordingStateChanged(false)));
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::VoiceClip(c) if c.duration_secs == 2)));
        assert!(state.borrow().finished);
        assert!(!state.borrow().discarded);
    }

    #[test]
    fn test_release_outside_cancel_field_discards() {
        let (mut bar, state, now) = active_bar(Some(clip()));
        bar.on_capture_update(1000, 4800, now);

        // Drag below the bar, away from the indicator: outside the cancel
        // field without accumulating any lock progress
        let below = Point {
            x: 10,
            y: bar.layout().bar.y + bar.layout().bar.h,
        };
        bar.on_pointer_move(below, now);
        assert!(!bar.is_locked());
        assert!(!bar.in_cancel_field());
        bar.on_pointer_release(now);

        let events = drain(&mut bar);
        assert!(!events.iter().any(|e| matches!(e, SessionEvent::VoiceClip(_))));
        assert!(events.contains(&SessionEvent::RecordingStateChanged(false)));
        assert!(state.borrow().discarded);
        assert!(!state.borrow().finished);
    }

    #[test]
    fn test_lock_progress_tracks_latest_offset_only() {
        let (mut bar, _state, now) = active_bar(None);
        bar.on_capture_update(100, 4800, now);
        let x = bar.layout().level_center.x;
        let bar_y = bar.layout().bar.y;

        bar.on_pointer_move(Point { x, y: bar_y - 4 }, now);
        assert_eq!(bar.lock().progress(), 0.5);

        // Dragging back down lowers the progress: no history involved
        bar.on_pointer_move(Point { x, y: bar_y - 1 }, now);
        assert_eq!(bar.lock().progress(), 0.125);

        // Below the bar clamps to zero, far above clamps to one (and locks)
        bar.on_pointer_move(Point { x, y: bar_y + 10 }, now);
        assert_eq!(bar.lock().progress(), 0.0);
        bar.on_pointer_move(Point { x, y: 0 }, now);
        assert!(bar.is_locked());
        assert_eq!(bar.lock().progress(), 1.0);
    }

    #[test]
    fn test_locked_release_is_noop_and_enter_sends() {
        let (mut bar, state, now) = active_bar(Some(clip()));
        lock_session(&mut bar, now);

        bar.on_pointer_release(now);
        assert_eq!(bar.state(), SessionState::Active);
        assert!(bar.is_recording());

        assert_eq!(bar.on_key(FilterKey::Enter, now), FilterDecision::Handled);
        assert_eq!(bar.state(), SessionState::Idle);
        assert!(state.borrow().finished);
        assert!(drain(&mut bar)
            .iter()
            .any(|e| matches!(e, SessionEvent::VoiceClip(_))));
    }

    #[test]
    fn test_locked_click_on_indicator_sends() {
        let (mut bar, _state, now) = active_bar(Some(clip()));
        lock_session(&mut bar, now);

        let center = bar.layout().level_center;
        assert_eq!(bar.on_pointer_press(center, now), FilterDecision::Handled);
        assert_eq!(bar.state(), SessionState::Idle);
    }

    #[test]
    fn test_locked_click_outside_opens_prompt_once() {
        let (mut bar, _state, now) = active_bar(None);
        lock_session(&mut bar, now);

        let outside = Point { x: 5, y: 2 };
        assert_eq!(bar.on_pointer_press(outside, now), FilterDecision::ShowPrompt);
        assert!(bar.prompt_open());

        // Further dismissive input does not stack prompts
        assert_eq!(bar.on_key(FilterKey::Other, now), FilterDecision::ShowPrompt);
        assert!(bar.prompt_open());
        assert_eq!(bar.on_pointer_press(outside, now), FilterDecision::Continue);

        bar.confirm_discard(now);
        assert_eq!(bar.state(), SessionState::Idle);
        assert!(!drain(&mut bar)
            .iter()
            .any(|e| matches!(e, SessionEvent::VoiceClip(_))));
    }

    #[test]
    fn test_escape_override_bypasses_prompt() {
        let (mut bar, _state, now) = active_bar(None);
        bar.set_escape_override(Box::new(|| true));
        lock_session(&mut bar, now);

        assert_eq!(bar.on_key(FilterKey::Escape, now), FilterDecision::Continue);
        assert!(!bar.prompt_open());
        assert_eq!(bar.state(), SessionState::Active);
    }

    #[test]
    fn test_escape_without_override_prompts() {
        let (mut bar, _state, now) = active_bar(None);
        lock_session(&mut bar, now);

        assert_eq!(bar.on_key(FilterKey::Escape, now), FilterDecision::ShowPrompt);
        assert!(bar.prompt_open());

        bar.dismiss_prompt();
        assert!(!bar.prompt_open());
        assert_eq!(bar.state(), SessionState::Active);
    }

    #[test]
    fn test_duration_overflow_sends_iff_in_cancel_field() {
        let over = MAX_VOICE_SECONDS * RATE as i64;

        // Pointer last known inside the cancel field: send
        let (mut bar, state, now) = active_bar(Some(clip()));
        bar.on_capture_update(10, over, now);
        assert_eq!(bar.state(), SessionState::Idle);
        assert!(state.borrow().finished);

        // Pointer last known outside (below the bar, so still unlocked): discard
        let (mut bar, state, now) = active_bar(Some(clip()));
        bar.on_capture_update(10, 4800, now);
        let below = Point {
            x: 10,
            y: bar.layout().bar.y + bar.layout().bar.h,
        };
        bar.on_pointer_move(below, now);
        assert!(!bar.is_locked());
        bar.on_capture_update(10, over, now);
        assert_eq!(bar.state(), SessionState::Idle);
        assert!(state.borrow().discarded);
        assert!(!state.borrow().finished);
    }

    #[test]
    fn test_negative_sample_count_discards() {
        let (mut bar, state, now) = active_bar(Some(clip()));
        bar.on_capture_update(10, -1, now);
        assert_eq!(bar.state(), SessionState::Idle);
        assert!(state.borrow().discarded);
    }

    #[test]
    fn test_empty_buffer_emits_no_clip() {
        let (mut bar, state, now) = active_bar(None);
        bar.on_capture_update(10, 4800, now);
        bar.on_pointer_release(now);

        assert!(state.borrow().finished);
        let events = drain(&mut bar);
        assert!(!events.iter().any(|e| matches!(e, SessionEvent::VoiceClip(_))));
        assert!(events.contains(&SessionEvent::RecordingStateChanged(false)));
    }

    #[test]
    fn test_unavailable_backend_returns_to_idle_silently() {
        let now = Instant::now();
        let (mut bar, state) = bar_with(None);
        state.borrow_mut().available = false;

        bar.start_recording(now);
        assert_eq!(bar.state(), SessionState::Idle);
        assert!(!state.borrow().started);
        assert!(!bar.is_recording());

        // Recording never became true, so no state-change events
        assert!(!drain(&mut bar)
            .iter()
            .any(|e| matches!(e, SessionEvent::RecordingStateChanged(_))));
    }

    #[test]
    fn test_capture_failure_stops_without_send() {
        let (mut bar, state, now) = active_bar(Some(clip()));
        state.borrow_mut().fail_next_poll = true;
        bar.tick(now);

        assert_eq!(bar.state(), SessionState::Idle);
        assert!(state.borrow().discarded);
        assert!(!state.borrow().finished);
    }

    #[test]
    fn test_stop_is_idempotent_and_updates_cannot_resurrect() {
        let (mut bar, state, now) = active_bar(Some(clip()));
        bar.on_capture_update(10, 4800, now);
        bar.stop(false, now);
        assert_eq!(bar.state(), SessionState::Idle);

        // A late queued update is ignored
        bar.on_capture_update(10, 9600, now);
        assert_eq!(bar.state(), SessionState::Idle);
        assert_eq!(bar.samples(), 0);

        // Second stop is a no-op
        bar.stop(true, now);
        assert_eq!(bar.state(), SessionState::Idle);
        assert!(!state.borrow().finished);
    }

    #[test]
    fn test_double_start_is_rejected() {
        let (mut bar, _state, now) = active_bar(None);
        bar.start_recording(now);
        assert_eq!(bar.state(), SessionState::Active);
    }

    #[test]
    fn test_lock_reveal_fires_once_per_session() {
        let (mut bar, _state, now) = active_bar(None);
        bar.on_capture_update(10, 100, now);
        bar.on_capture_update(10, 200, now);

        let shows = drain(&mut bar)
            .iter()
            .filter(|e| matches!(e, SessionEvent::LockShowChanged(true)))
            .count();
        assert_eq!(shows, 1);
    }

    #[test]
    fn test_animated_show_defers_capture_start() {
        let now = Instant::now();
        let state = Rc::new(RefCell::new(FakeState {
            available: true,
            ..FakeState::default()
        }));
        let capture = FakeCapture {
            state: Rc::clone(&state),
        };
        let mut bar = RecordBar::new(Box::new(capture), true);

        bar.start_recording(now);
        assert_eq!(bar.state(), SessionState::Showing);
        assert!(!state.borrow().started);

        // Mid-show ticks stay in Showing
        bar.tick(now + Duration::from_millis(50));
        assert_eq!(bar.state(), SessionState::Showing);

        let shown = now + Duration::from_millis(200);
        bar.tick(shown);
        assert_eq!(bar.state(), SessionState::Active);
        assert!(state.borrow().started);

        bar.stop(false, shown);
        assert_eq!(bar.state(), SessionState::Hiding);
        bar.tick(shown + Duration::from_millis(200));
        assert_eq!(bar.state(), SessionState::Idle);
        assert!(state.borrow().discarded);
    }

    #[test]
    fn test_window_leave_exits_cancel_field() {
        let (mut bar, state, now) = active_bar(Some(clip()));
        bar.on_capture_update(10, 4800, now);
        assert!(bar.in_cancel_field());

        bar.on_window_leave(now);
        assert!(!bar.in_cancel_field());

        // Releasing after the focus loss discards
        bar.on_pointer_release(now);
        assert!(state.borrow().discarded);
    }

    #[test]
    fn test_release_during_show_cancels_cleanly() {
        let now = Instant::now();
        let state = Rc::new(RefCell::new(FakeState {
            available: true,
            result: Some(clip()),
            ..FakeState::default()
        }));
        let capture = FakeCapture {
            state: Rc::clone(&state),
        };
        let mut bar = RecordBar::new(Box::new(capture), true);

        bar.start_recording(now);
        assert_eq!(bar.state(), SessionState::Showing);

        // Releasing before the show animation lands stops the session; the
        // hide plays out and capture is never started or finalized
        bar.on_pointer_release(now + Duration::from_millis(50));
        assert_eq!(bar.state(), SessionState::Hiding);

        bar.tick(now + Duration::from_millis(500));
        assert_eq!(bar.state(), SessionState::Idle);
        assert!(!state.borrow().started);
        assert!(!state.borrow().finished);
        assert!(!state.borrow().discarded);

        let events = drain(&mut bar);
        assert!(!events.iter().any(|e| matches!(e, SessionEvent::VoiceClip(_))));
        assert!(!events
            .iter()
            .any(|e| matches!(e, SessionEvent::RecordingStateChanged(_))));
    }

    #[test]
    fn test_cancel_message_switches_when_locked() {
        let (mut bar, _state, now) = active_bar(None);
        let unlocked = bar.cancel_message();
        lock_session(&mut bar, now);
        assert_ne!(unlocked, bar.cancel_message());
    }

    #[test]
    fn test_duration_text_reflects_samples() {
        let (mut bar, _state, now) = active_bar(None);
        bar.on_capture_update(10, RATE as i64, now);
        assert_eq!(bar.duration_text(), "0:01.0");
    }
}
