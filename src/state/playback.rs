//! Audio playback state for the uploaded track.

use serde::{Deserialize, Serialize};

/// Playback state of the audio track most recently uploaded to the device.
///
/// Initialized when the device confirms an upload with a name and total
/// duration; position updates then arrive once per second while the channel
/// is busy. All reads that depend on the total duration short-circuit to
/// `None` until it is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioPlayback {
    /// Track name as confirmed by the device (may be truncated server-side).
    pub name: String,
    /// Total duration in whole seconds.
    pub duration_secs: u32,
    /// Current position in seconds.
    pub position_secs: f64,
    pub paused: bool,
    pub muted: bool,
    pub looping: bool,
}

impl AudioPlayback {
    /// Build playback state from the device's confirmation message.
    ///
    /// The duration arrives on the wire as `"m:ss"`. An unparseable duration
    /// yields `None` rather than a half-initialized state.
    pub fn from_confirmation(name: impl Into<String>, duration: &str) -> Option<Self> {
        let duration_secs = parse_duration(duration)?;
        Some(Self {
            name: name.into(),
            duration_secs,
            position_secs: 0.0,
            paused: false,
            muted: false,
            looping: false,
        })
    }

    /// Playback progress as a percentage of the total duration.
    ///
    /// Returns `None` for a zero duration; a position past the end clamps
    /// to 100.
    pub fn progress_percent(&self) -> Option<f64> {
        if self.duration_secs == 0 {
            return None;
        }
        Some((self.position_secs / f64::from(self.duration_secs) * 100.0).min(100.0))
    }

    /// Current position formatted as `m:ss` for display.
    pub fn position_display(&self) -> String {
        let whole = self.position_secs.max(0.0) as u64;
        format!("{}:{:02}", whole / 60, whole % 60)
    }

    /// Total duration formatted as `m:ss` for display.
    pub fn duration_display(&self) -> String {
        format!("{}:{:02}", self.duration_secs / 60, self.duration_secs % 60)
    }
}

/// Parse a `"m:ss"` duration into whole seconds.
pub fn parse_duration(text: &str) -> Option<u32> {
    let (minutes, seconds) = text.split_once(':')?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    let seconds: u32 = seconds.trim().parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    Some(minutes * 60 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_parsing() {
        assert_eq!(parse_duration("3:25"), Some(205));
        assert_eq!(parse_duration("0:00"), Some(0));
        assert_eq!(parse_duration("10:05"), Some(605));
        assert_eq!(parse_duration("3:70"), None);
        assert_eq!(parse_duration("abc"), None);
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn confirmation_initializes_at_start() {
        let playback = AudioPlayback::from_confirmation("track.mp3", "2:30").unwrap();
        assert_eq!(playback.duration_secs, 150);
        assert_eq!(playback.position_secs, 0.0);
        assert!(!playback.paused);
        assert_eq!(playback.duration_display(), "2:30");
    }

    #[test]
    fn progress_short_circuits_on_zero_duration() {
        let playback = AudioPlayback::from_confirmation("empty.wav", "0:00").unwrap();
        assert_eq!(playback.progress_percent(), None);
    }

    #[test]
    fn progress_is_percent_of_total_and_clamped() {
        let mut playback = AudioPlayback::from_confirmation("track.mp3", "2:00").unwrap();
        playback.position_secs = 30.0;
        assert_eq!(playback.progress_percent(), Some(25.0));

        playback.position_secs = 500.0;
        assert_eq!(playback.progress_percent(), Some(100.0));
    }

    #[test]
    fn position_display_is_m_ss() {
        let mut playback = AudioPlayback::from_confirmation("track.mp3", "3:00").unwrap();
        playback.position_secs = 65.7;
        assert_eq!(playback.position_display(), "1:05");
    }
}
