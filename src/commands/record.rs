//! The press-and-hold recording command.
//!
//! Wires the session controller, the microphone backend, and the terminal UI
//! into a frame loop. Sent clips are written as WAV files into the output
//! directory; cancelled clips leave no trace.

use anyhow::{anyhow, Context};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::capture::MicCapture;
use crate::config::HoldrecConfig;
use crate::recordbar::{RecordBar, SendAction, SessionEvent, VoiceClipResult};
use crate::ui::{ErrorScreen, RecordBarTui, UiCommand};

/// Runs the recording bar until the user quits.
///
/// # Arguments
/// * `output` - Directory for sent voice clips; defaults to the current directory
///
/// # Errors
/// - If the configuration cannot be loaded
/// - If the output directory cannot be created
/// - If the terminal UI cannot be set up
pub async fn handle_record(output: Option<String>) -> Result<(), anyhow::Error> {
    let config = HoldrecConfig::load()?;

    let output_dir = match output.or_else(|| config.audio.output_dir.clone()) {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    tracing::info!(
        "Recording bar starting: device={}, output={}",
        config.audio.device,
        output_dir.display()
    );

    let capture = MicCapture::new(config.audio.sample_rate, config.audio.device.clone());
    let mut bar = RecordBar::new(Box::new(capture), config.ui.animations_enabled);
    let mut tui = RecordBarTui::new(config.ui.tick_ms)?;

    let result = run_loop(&mut tui, &mut bar, &output_dir);

    tui.cleanup()?;
    drop(tui);

    if let Err(e) = result {
        tracing::error!("Recording bar failed: {e}");
        let mut error_screen = ErrorScreen::new()?;
        error_screen.show_error(&format!("Recording failed: {e}"))?;
        error_screen.cleanup()?;
        return Err(e);
    }

    Ok(())
}

fn run_loop(
    tui: &mut RecordBarTui,
    bar: &mut RecordBar,
    output_dir: &Path,
) -> Result<(), anyhow::Error> {
    let mut status = String::from("holdrec · voice messages stay in your terminal");

    loop {
        tui.update_layout(bar)?;

        let now = Instant::now();
        if tui.handle_input(bar, now)? == UiCommand::Quit {
            tracing::info!("Quit requested");
            return Ok(());
        }

        bar.tick(Instant::now());

        while let Some(event) = bar.poll_event() {
            match event {
                SessionEvent::VoiceClip(clip) => {
                    let path = save_clip(output_dir, &clip)?;
                    status = format!(
                        "Sent {} ({}s)",
                        path.file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_else(|| path.display().to_string()),
                        clip.duration_secs
                    );
                    tracing::info!("Voice clip written to {}", path.display());
                }
                SessionEvent::RecordingStateChanged(recording) => {
                    tracing::debug!("Recording state changed: {recording}");
                    if recording {
                        status = String::from("Recording…");
                    }
                }
                SessionEvent::SendAction(SendAction::Cancel) => {
                    tracing::debug!("Recording indicator cleared");
                }
                SessionEvent::SendAction(SendAction::RecordVoice)
                | SessionEvent::LockShowChanged(_)
                | SessionEvent::FocusRequested => {}
            }
        }

        tui.render(bar, Instant::now(), &status)?;
    }
}

/// Writes a sent clip into the output directory as `voice-<unix-secs>.wav`.
fn save_clip(output_dir: &Path, clip: &VoiceClipResult) -> Result<PathBuf, anyhow::Error> {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow!("System clock before Unix epoch: {e}"))?
        .as_secs();
    let path = output_dir.join(format!("voice-{stamp}.wav"));
    fs::write(&path, &clip.bytes)
        .with_context(|| format!("Failed to write voice clip to {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_clip_writes_bytes() {
        let dir = std::env::temp_dir().join("holdrec-test-save-clip");
        fs::create_dir_all(&dir).unwrap();

        let clip = VoiceClipResult {
            bytes: vec![0x52, 0x49, 0x46, 0x46],
            waveform: vec![1, 2, 3],
            duration_secs: 2,
        };
        let path = save_clip(&dir, &clip).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("voice-"));
        assert!(name.ends_with(".wav"));
        assert_eq!(fs::read(&path).unwrap(), clip.bytes);

        fs::remove_file(&path).unwrap();
    }
}
