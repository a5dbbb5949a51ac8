//! Duration formatting for the recording bar.

/// Sub-second precision of the displayed duration (tenths of a second).
const PRECISION: i64 = 10;

/// Whole seconds represented by a sample count at the given rate.
pub fn duration_seconds(samples: i64, sample_rate: u32) -> i64 {
    if samples <= 0 || sample_rate == 0 {
        return 0;
    }
    samples / sample_rate as i64
}

/// Formats a sample count as `M:SS.d` (or `H:MM:SS.d` past an hour),
/// always with one decimal digit of sub-second precision.
pub fn format_voice_duration(samples: i64, sample_rate: u32) -> String {
    let tenths = if samples <= 0 || sample_rate == 0 {
        0
    } else {
        samples * PRECISION / sample_rate as i64
    };
    let decimal = tenths % PRECISION;
    format!("{}.{decimal}", format_duration_text(tenths / PRECISION))
}

/// Formats whole seconds as `M:SS`, adding an hours part when reached.
fn format_duration_text(total_secs: i64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs / 60) % 60;
    let secs = total_secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 48000;

    #[test]
    fn test_zero_samples() {
        assert_eq!(format_voice_duration(0, RATE), "0:00.0");
    }

    #[test]
    fn test_one_second() {
        assert_eq!(format_voice_duration(RATE as i64, RATE), "0:01.0");
    }

    #[test]
    fn test_subsecond_digit() {
        assert_eq!(format_voice_duration(RATE as i64 * 3 / 2, RATE), "0:01.5");
        assert_eq!(format_voice_duration(RATE as i64 / 10, RATE), "0:00.1");
    }

    #[test]
    fn test_minutes_and_hours() {
        assert_eq!(format_voice_duration(RATE as i64 * 61, RATE), "1:01.0");
        assert_eq!(format_voice_duration(RATE as i64 * 3600, RATE), "1:00:00.0");
        assert_eq!(format_voice_duration(RATE as i64 * 3725, RATE), "1:02:05.0");
    }

    #[test]
    fn test_negative_clamps_to_zero() {
        assert_eq!(format_voice_duration(-48000, RATE), "0:00.0");
        assert_eq!(duration_seconds(-1, RATE), 0);
    }

    #[test]
    fn test_duration_seconds_truncates() {
        assert_eq!(duration_seconds(RATE as i64 * 2 - 1, RATE), 1);
        assert_eq!(duration_seconds(RATE as i64 * 2, RATE), 2);
    }
}
