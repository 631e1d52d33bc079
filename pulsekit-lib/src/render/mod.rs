//! Render configuration and the seam between the tone scheduler and whatever
//! turns a timeline into output.

mod error;
mod timeline;

use std::io::Write;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::beep::ToneSequence;
use crate::cancel::CancelToken;
use crate::endpoint::open_output;

pub use error::RenderError;
pub use timeline::TimelineRenderer;

/// Smallest accepted output block size in bytes.
pub const MINIMAL_BUF_LENGTH: usize = 512;
/// Largest accepted output block size in bytes.
pub const MAXIMAL_BUF_LENGTH: usize = 256 * 16384;
/// Output block size used when none (or an out-of-range one) is given.
pub const DEFAULT_BUF_LENGTH: usize = 16 * 16384;
/// Default sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: f64 = 2_048_000.0;

/// Sample encoding of rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    #[default]
    Cu8,
    Cs8,
    Cs16,
    Cf32,
}

impl SampleFormat {
    /// Bytes per interleaved I/Q pair.
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            Self::Cu8 | Self::Cs8 => 2,
            Self::Cs16 => 4,
            Self::Cf32 => 8,
        }
    }
}

impl std::str::FromStr for SampleFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "cu8" => Ok(Self::Cu8),
            "cs8" => Ok(Self::Cs8),
            "cs16" => Ok(Self::Cs16),
            "cf32" => Ok(Self::Cf32),
            other => Err(format!("unknown sample format \"{}\"", other)),
        }
    }
}

/// Settings handed to a renderer along with the timeline.
///
/// Levels are linear multipliers; zero turns a noise source off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub sample_rate: f64,
    /// Output block size in bytes.
    pub frame_size: usize,
    pub noise_floor: f64,
    pub noise_signal: f64,
    pub gain: f64,
    /// Filter cutoff as a ratio of the sample rate.
    pub filter_wc: f64,
    /// Frequency step width in microseconds.
    pub step_width: u32,
    /// Output full-scale clamp, zero for the format's natural full scale.
    pub full_scale: f64,
    pub sample_format: SampleFormat,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            frame_size: DEFAULT_BUF_LENGTH,
            noise_floor: 0.0,
            noise_signal: 0.0,
            gain: 0.0,
            filter_wc: 0.0,
            step_width: 0,
            full_scale: 0.0,
            sample_format: SampleFormat::default(),
        }
    }
}

impl RenderConfig {
    /// The frame size to render with.
    ///
    /// Sizes outside `MINIMAL_BUF_LENGTH..=MAXIMAL_BUF_LENGTH` fall back to
    /// [`DEFAULT_BUF_LENGTH`] with a warning.
    pub fn clamped_frame_size(&self) -> usize {
        if (MINIMAL_BUF_LENGTH..=MAXIMAL_BUF_LENGTH).contains(&self.frame_size) {
            return self.frame_size;
        }
        warn!(
            "Output block size {} out of range ({}..={}), falling back to {}",
            self.frame_size, MINIMAL_BUF_LENGTH, MAXIMAL_BUF_LENGTH, DEFAULT_BUF_LENGTH
        );
        DEFAULT_BUF_LENGTH
    }

    /// Copy of this config with the frame size clamped.
    pub fn clamped(&self) -> Self {
        Self {
            frame_size: self.clamped_frame_size(),
            ..self.clone()
        }
    }
}

/// What a renderer reports when it finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub tones_rendered: usize,
    pub bytes_written: u64,
    /// Rendering stopped on a cancellation request.
    pub cancelled: bool,
}

/// Turns a tone timeline into output bytes.
///
/// Implementations poll `cancel` between internal steps and stop early when it
/// is set, leaving already written output in place.
pub trait ToneRenderer {
    fn render(
        &mut self,
        config: &RenderConfig,
        tones: &ToneSequence,
        out: &mut dyn Write,
        cancel: &CancelToken,
    ) -> Result<RenderSummary, RenderError>;
}

/// Render `tones` into the named destination (`-` for standard output).
///
/// # Errors
/// Returns [`RenderError::Open`] if the destination cannot be created, or
/// whatever the renderer reports.
pub fn render_to_destination<R: ToneRenderer + ?Sized>(
    renderer: &mut R,
    destination: &str,
    config: &RenderConfig,
    tones: &ToneSequence,
    cancel: &CancelToken,
) -> Result<RenderSummary, RenderError> {
    let mut out = open_output(destination).map_err(|source| RenderError::Open {
        path: destination.to_string(),
        source,
    })?;
    let summary = renderer.render(config, tones, &mut out, cancel)?;
    out.flush()?;
    Ok(summary)
}
