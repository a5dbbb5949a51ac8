//! Audio capture collaborator for the record bar.
//!
//! The session controller consumes capture through the [`CaptureBackend`]
//! trait: periodic level/sample-count updates while recording, and a final
//! encoded buffer on stop-with-send. The microphone implementation lives in
//! [`mic`]; tests substitute their own backend.

pub mod mic;

use anyhow::Result;

pub use mic::MicCapture;

/// Number of buckets in the waveform summary of a finished clip.
const WAVEFORM_BUCKETS: usize = 100;

/// A periodic amplitude/progress update from the capture backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSample {
    /// Peak amplitude of the last update window (i16 magnitude range)
    pub level: u16,
    /// Total samples captured so far
    pub samples: i64,
}

/// The finished clip produced by a stop-with-send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResult {
    /// Encoded audio (WAV container)
    pub bytes: Vec<u8>,
    /// Coarse peak-per-bucket summary for waveform previews
    pub waveform: Vec<u8>,
    /// Total captured samples
    pub samples: i64,
}

/// Outcome of polling the backend for an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePoll {
    /// No update due yet
    Idle,
    /// A fresh level/sample-count update
    Update(LevelSample),
    /// The capture stream reported an error; the session must stop without sending
    Failed,
}

/// Capture backend consumed by the session controller.
///
/// Start and stop are fire-and-forget from the controller's point of view;
/// updates and errors surface through [`CaptureBackend::poll_update`] on the
/// UI thread.
pub trait CaptureBackend {
    /// Whether an input device is available for recording.
    fn available(&self) -> bool;

    /// Starts capturing. Idempotent while a stream is already running.
    ///
    /// # Errors
    /// - If the input device or stream cannot be set up
    fn start(&mut self) -> Result<()>;

    /// Actual capture sample rate in Hz.
    fn sample_rate(&self) -> u32;

    /// Polls for the next update. Called once per UI frame.
    fn poll_update(&mut self) -> CapturePoll;

    /// Stops capturing and discards everything captured so far.
    fn stop_discard(&mut self);

    /// Stops capturing and returns the finished clip.
    ///
    /// Returns `Ok(None)` when nothing was captured; an empty buffer is not
    /// an error, there is just nothing to send.
    ///
    /// # Errors
    /// - If the captured samples cannot be encoded
    fn stop_with_result(&mut self) -> Result<Option<CaptureResult>>;
}

/// Reduces captured samples to a fixed number of peak buckets.
///
/// Each bucket holds the peak magnitude of its slice of the recording,
/// scaled down to a byte. Empty input yields an empty summary.
pub fn waveform_summary(samples: &[i16]) -> Vec<u8> {
    if samples.is_empty() {
        return Vec::new();
    }
    let bucket_len = samples.len().div_ceil(WAVEFORM_BUCKETS);
    samples
        .chunks(bucket_len)
        .map(|bucket| {
            let peak = bucket.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
            (peak >> 7).min(u8::MAX as u16) as u8
        })
        .collect()
}
