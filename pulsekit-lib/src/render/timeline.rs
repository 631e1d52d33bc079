//! Renderer that writes the tone timeline itself as JSON lines.
//!
//! The first line describes the render settings and totals; every following
//! line is one tone with its start position in samples. No waveform is
//! synthesized.

use std::io::Write;

use log::{debug, warn};
use serde::Serialize;

use crate::beep::{us_to_samples, Tone, ToneSequence};
use crate::cancel::CancelToken;

use super::{RenderConfig, RenderError, RenderSummary, ToneRenderer};

#[derive(Serialize)]
struct Header<'a> {
    config: &'a RenderConfig,
    tones: usize,
    length_us: u64,
    length_samples: u64,
    length_bytes: u64,
}

#[derive(Serialize)]
struct Entry<'a> {
    index: usize,
    start_sample: u64,
    #[serde(flatten)]
    tone: &'a Tone,
}

/// JSON-lines timeline writer.
#[derive(Debug, Default)]
pub struct TimelineRenderer;

impl TimelineRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ToneRenderer for TimelineRenderer {
    fn render(
        &mut self,
        config: &RenderConfig,
        tones: &ToneSequence,
        out: &mut dyn Write,
        cancel: &CancelToken,
    ) -> Result<RenderSummary, RenderError> {
        let length_samples = tones.length_samples(config.sample_rate);
        let header = Header {
            config,
            tones: tones.len(),
            length_us: tones.length_us(),
            length_samples,
            length_bytes: length_samples * config.sample_format.bytes_per_sample() as u64,
        };

        let mut summary = RenderSummary::default();
        summary.bytes_written += write_line(out, &header)?;

        let mut elapsed_us = 0_u64;
        for (index, tone) in tones.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!("Render cancelled after {} tones", summary.tones_rendered);
                summary.cancelled = true;
                break;
            }
            let entry = Entry {
                index,
                start_sample: us_to_samples(elapsed_us, config.sample_rate),
                tone,
            };
            summary.bytes_written += write_line(out, &entry)?;
            summary.tones_rendered += 1;
            elapsed_us += tone.duration_us;
        }

        debug!(
            "Timeline written: {} tones, {} bytes",
            summary.tones_rendered, summary.bytes_written
        );
        Ok(summary)
    }
}

fn write_line<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<u64, RenderError> {
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    out.write_all(&line)?;
    Ok(line.len() as u64)
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::beep::{schedule_with_capacity, BeepSource};
    use crate::render::render_to_destination;

    fn timeline() -> ToneSequence {
        let source = BeepSource::new(433_920_000, -10, 20, 100);
        schedule_with_capacity(&[source], 5, 5).unwrap()
    }

    fn lines(bytes: &[u8]) -> Vec<Value> {
        String::from_utf8(bytes.to_vec())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn writes_header_and_one_line_per_tone() {
        let tones = timeline();
        let config = RenderConfig {
            sample_rate: 1_000_000.0,
            ..RenderConfig::default()
        };
        let mut out = Vec::new();
        let summary = TimelineRenderer::new()
            .render(&config, &tones, &mut out, &CancelToken::new())
            .unwrap();

        assert_eq!(summary.tones_rendered, 5);
        assert_eq!(summary.bytes_written, out.len() as u64);
        assert!(!summary.cancelled);

        let lines = lines(&out);
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0]["tones"], 5);
        assert_eq!(lines[0]["length_us"], tones.length_us());
        assert_eq!(lines[0]["config"]["sample_format"], "cu8");
        assert_eq!(lines[1]["index"], 0);
        assert_eq!(lines[1]["start_sample"], 0);
        assert_eq!(lines[1]["hz"], 0);
        assert_eq!(lines[1]["us"], 500_000);
        // At 1 MHz one sample is one microsecond.
        let second_start = 500_000 + tones.tones()[1].duration_us;
        assert_eq!(lines[3]["start_sample"], second_start);
        assert_eq!(lines[3]["hz"], 433_920_000);
    }

    #[test]
    fn cancelled_render_keeps_the_header() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut out = Vec::new();
        let summary = TimelineRenderer::new()
            .render(&RenderConfig::default(), &timeline(), &mut out, &cancel)
            .unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.tones_rendered, 0);
        assert_eq!(lines(&out).len(), 1);
    }

    #[test]
    fn renders_into_a_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beeps.jsonl");
        let summary = render_to_destination(
            &mut TimelineRenderer::new(),
            path.to_str().unwrap(),
            &RenderConfig::default(),
            &timeline(),
            &CancelToken::new(),
        )
        .unwrap();
        let written = std::fs::read(&path).unwrap();
        assert_eq!(written.len() as u64, summary.bytes_written);
        assert_eq!(lines(&written).len(), 6);
    }

    #[test]
    fn unopenable_destination_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("beeps.jsonl");
        let err = render_to_destination(
            &mut TimelineRenderer::new(),
            path.to_str().unwrap(),
            &RenderConfig::default(),
            &timeline(),
            &CancelToken::new(),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::Open { .. }));
    }
}
