//! Press-and-hold voice recording bar.
//!
//! Couples the pointer gesture (hold to record, drag up to lock, drag away to
//! cancel), the capture collaborator, and the animated visuals into a single
//! session state machine:
//!
//! - [`session`]: recording lifecycle, drag math, show/hide animations and
//!   the locked-input filter
//! - [`level`]: pulsing amplitude indicator with hit-testing
//! - [`lock`]: slide-to-lock affordance
//! - [`animation`], [`format`], [`geom`]: shared helpers

pub mod animation;
pub mod format;
pub mod geom;
pub mod level;
pub mod lock;
pub mod session;

pub use geom::{Point, Rect};
pub use session::{
    BarLayout, FilterDecision, FilterKey, RecordBar, SendAction, SessionEvent, SessionState,
    VoiceClipResult,
};
