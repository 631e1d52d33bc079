//! Beep sources and the tone timeline they are scheduled into.

mod error;
mod scheduler;

use serde::{Deserialize, Serialize};

pub use error::ScheduleError;
pub use scheduler::{schedule, schedule_with_capacity};

/// Maximum number of beep sources a single timeline accepts.
pub const MAX_BEEP_SOURCES: usize = 32;
/// Default number of tone slots in a timeline.
pub const DEFAULT_TONE_CAPACITY: usize = 30;
/// Level used for every silence tone.
pub const SILENCE_LEVEL_DB: i32 = -99;
/// Length of the silence that opens every timeline.
pub const LEAD_IN_SILENCE_US: u64 = 500 * 1000;

/// A periodic beep: what it sounds like and how often it repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BeepSource {
    /// Tone frequency in Hz. Zero marks a source whose frequency is not set yet.
    pub frequency: i32,
    /// Level in dB.
    pub attenuation: i32,
    /// Beep length in milliseconds.
    pub duration_ms: u32,
    /// Repeat period in milliseconds.
    pub interval_ms: u32,
}

impl BeepSource {
    pub fn new(frequency: i32, attenuation: i32, duration_ms: u32, interval_ms: u32) -> Self {
        Self {
            frequency,
            attenuation,
            duration_ms,
            interval_ms,
        }
    }

    /// Check that the source can be phase-initialized.
    ///
    /// # Errors
    /// Returns [`ScheduleError::ZeroInterval`] when the interval is zero.
    pub fn validate(&self, index: usize) -> Result<(), ScheduleError> {
        if self.interval_ms == 0 {
            return Err(ScheduleError::ZeroInterval { index });
        }
        Ok(())
    }
}

/// One scheduled event: a beep, or silence when `frequency` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tone {
    #[serde(rename = "hz")]
    pub frequency: i32,
    #[serde(rename = "db")]
    pub level: i32,
    #[serde(rename = "us")]
    pub duration_us: u64,
}

impl Tone {
    pub fn silence(duration_us: u64) -> Self {
        Self {
            frequency: 0,
            level: SILENCE_LEVEL_DB,
            duration_us,
        }
    }

    pub fn is_silence(&self) -> bool {
        self.frequency == 0
    }
}

/// Ordered tones with a fixed number of slots.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneSequence {
    tones: Vec<Tone>,
    capacity: usize,
}

impl ToneSequence {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            tones: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn push(&mut self, tone: Tone) {
        debug_assert!(self.tones.len() < self.capacity);
        self.tones.push(tone);
    }

    pub(crate) fn free_slots(&self) -> usize {
        self.capacity - self.tones.len()
    }

    pub fn tones(&self) -> &[Tone] {
        &self.tones
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.tones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tones.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tone> {
        self.tones.iter()
    }

    /// Total timeline length in microseconds.
    pub fn length_us(&self) -> u64 {
        self.tones.iter().map(|tone| tone.duration_us).sum()
    }

    /// Total timeline length in samples at `sample_rate` Hz.
    pub fn length_samples(&self, sample_rate: f64) -> u64 {
        us_to_samples(self.length_us(), sample_rate)
    }
}

impl<'a> IntoIterator for &'a ToneSequence {
    type Item = &'a Tone;
    type IntoIter = std::slice::Iter<'a, Tone>;

    fn into_iter(self) -> Self::IntoIter {
        self.tones.iter()
    }
}

/// Convert a duration in microseconds to whole samples.
pub fn us_to_samples(us: u64, sample_rate: f64) -> u64 {
    (us as f64 * sample_rate / 1_000_000.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_sums_durations() {
        let mut tones = ToneSequence::with_capacity(4);
        tones.push(Tone::silence(500_000));
        tones.push(Tone {
            frequency: 1000,
            level: -10,
            duration_us: 250_000,
        });
        assert_eq!(tones.length_us(), 750_000);
        assert_eq!(tones.length_samples(2_048_000.0), 1_536_000);
        assert_eq!(tones.free_slots(), 2);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let source = BeepSource::new(1000, 0, 10, 0);
        assert_eq!(source.validate(3), Err(ScheduleError::ZeroInterval { index: 3 }));
        assert!(BeepSource::new(1000, 0, 10, 1).validate(0).is_ok());
    }

    #[test]
    fn tone_serializes_with_short_names() {
        let json = serde_json::to_string(&Tone::silence(1000)).unwrap();
        assert_eq!(json, r#"{"hz":0,"db":-99,"us":1000}"#);
    }
}
