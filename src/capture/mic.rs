//! Microphone capture backend built on cpal.
//!
//! Captures i16 PCM from the configured input device at its native sample
//! rate, converts multi-channel audio to mono by averaging channels, and
//! accumulates samples behind a mutex. The UI thread polls for level updates
//! at a fixed cadence; the finished clip is encoded as a WAV container.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::{waveform_summary, CaptureBackend, CapturePoll, CaptureResult, LevelSample};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Cadence of level/sample-count updates delivered to the session controller.
const UPDATE_INTERVAL: Duration = Duration::from_millis(100);

/// Microphone capture via cpal.
pub struct MicCapture {
    /// Device name, numeric index, or "default"
    device_name: String,
    /// Actual capture sample rate (device-native once started)
    sample_rate: u32,
    /// Captured mono i16 samples
    samples: Arc<Mutex<Vec<i16>>>,
    /// Set by the stream error callback; observed at poll time
    failed: Arc<AtomicBool>,
    /// Active input stream, kept alive while recording
    stream: Option<cpal::Stream>,
    /// Sample index already consumed for level computation
    polled_len: usize,
    /// When the last update was emitted
    last_update: Instant,
}

impl MicCapture {
    pub fn new(requested_sample_rate: u32, device_name: String) -> Self {
        Self {
            device_name,
            sample_rate: requested_sample_rate,
            samples: Arc::new(Mutex::new(Vec::new())),
            failed: Arc::new(AtomicBool::new(false)),
            stream: None,
            polled_len: 0,
            last_update: Instant::now(),
        }
    }

    fn resolve_device(&self) -> Result<cpal::Device> {
        let host = cpal::default_host();
        if self.device_name == "default" {
            return host
                .default_input_device()
                .ok_or_else(|| anyhow!("No audio input device available"));
        }

        // A numeric spec selects by enumeration index, otherwise match by name
        if let Ok(index) = self.device_name.parse::<usize>() {
            let mut devices = host
                .input_devices()
                .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?;
            return devices.nth(index).ok_or_else(|| {
                anyhow!("Audio input device index {index} is out of range")
            });
        }

        let devices = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?;
        for device in devices {
            if device.name().is_ok_and(|name| name == self.device_name) {
                return Ok(device);
            }
        }
        Err(anyhow!(
            "Audio input device '{}' not found. Use 'holdrec list-devices' to see available devices.",
            self.device_name
        ))
    }

    /// Averages interleaved multi-channel frames into mono samples.
    fn push_mono(samples: &mut Vec<i16>, data: &[i16], channels: usize) {
        match channels {
            0 => {}
            1 => samples.extend_from_slice(data),
            _ => {
                for frame in data.chunks_exact(channels) {
                    let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                    samples.push((sum / channels as i32) as i16);
                }
            }
        }
    }

    /// Encodes the captured samples into an in-memory WAV container.
    fn encode_wav(&self, samples: &[i16]) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for &sample in samples {
                writer.write_sample(sample)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }
}

impl CaptureBackend for MicCapture {
    fn available(&self) -> bool {
        suppress_alsa_warnings(|| Ok(self.resolve_device().is_ok())).unwrap_or(false)
    }

    fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let device = suppress_alsa_warnings(|| self.resolve_device())?;
        let device_label = device.name().unwrap_or_else(|_| "Unknown device".to_string());
        let device_config = device.default_input_config()?;
        let channels = device_config.channels() as usize;

        if device_config.sample_rate().0 != self.sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Recording at device rate.",
                self.sample_rate,
                device_config.sample_rate().0
            );
        }
        self.sample_rate = device_config.sample_rate().0;

        tracing::info!(
            "Capture starting: device={device_label}, {}Hz, {channels} channels",
            self.sample_rate
        );

        self.samples.lock().unwrap().clear();
        self.failed.store(false, Ordering::Relaxed);
        self.polled_len = 0;
        self.last_update = Instant::now();

        let samples_arc = Arc::clone(&self.samples);
        let failed_arc = Arc::clone(&self.failed);
        let stream = device.build_input_stream(
            &device_config.into(),
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let mut samples = samples_arc.lock().unwrap();
                Self::push_mono(&mut samples, data, channels);
            },
            move |err| {
                tracing::error!("Audio stream error: {err}");
                failed_arc.store(true, Ordering::Relaxed);
            },
            None,
        )?;

        stream.play()?;
        self.stream = Some(stream);

        tracing::debug!("Audio stream started");
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn poll_update(&mut self) -> CapturePoll {
        if self.stream.is_none() {
            return CapturePoll::Idle;
        }
        if self.failed.load(Ordering::Relaxed) {
            return CapturePoll::Failed;
        }
        if self.last_update.elapsed() < UPDATE_INTERVAL {
            return CapturePoll::Idle;
        }

        let samples = self.samples.lock().unwrap();
        let total = samples.len();
        let level = samples[self.polled_len.min(total)..]
            .iter()
            .map(|s| s.unsigned_abs())
            .max()
            .unwrap_or(0);
        drop(samples);

        self.polled_len = total;
        self.last_update = Instant::now();

        CapturePoll::Update(LevelSample {
            level,
            samples: total as i64,
        })
    }

    fn stop_discard(&mut self) {
        self.stream = None;
        let discarded = std::mem::take(&mut *self.samples.lock().unwrap());
        self.polled_len = 0;
        if !discarded.is_empty() {
            tracing::info!("Capture stopped, {} samples discarded", discarded.len());
        }
    }

    fn stop_with_result(&mut self) -> Result<Option<CaptureResult>> {
        self.stream = None;
        let samples = std::mem::take(&mut *self.samples.lock().unwrap());
        self.polled_len = 0;

        if samples.is_empty() {
            tracing::warn!("Capture stopped with no samples captured");
            return Ok(None);
        }

        let duration_secs = samples.len() as f32 / self.sample_rate as f32;
        tracing::info!(
            "Capture stopped: {:.2}s ({} samples at {}Hz)",
            duration_secs,
            samples.len(),
            self.sample_rate
        );

        let bytes = self.encode_wav(&samples)?;
        let waveform = waveform_summary(&samples);
        Ok(Some(CaptureResult {
            bytes,
            waveform,
            samples: samples.len() as i64,
        }))
    }
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
/// On non-Linux platforms, this is a no-op since ALSA doesn't exist.
#[cfg(target_os = "linux")]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms, no stderr suppression is needed since ALSA doesn't exist.
#[cfg(not(target_os = "linux"))]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}
