//! Streaming mixer for headerless interleaved unsigned 8-bit I/Q streams.
//!
//! Each block is read from every channel in declaration order, offset into the
//! signed domain, scaled by the channel gain and summed, then offset back and
//! written out. Scaling and summing wrap on overflow.

mod convert;
mod error;

use std::io::{Read, Write};

use log::{debug, error, info, warn};

use crate::cancel::CancelToken;
use crate::endpoint::{open_input, read_block};

pub use error::MixError;

/// Maximum number of input channels in one mix.
pub const MAX_INPUT_CHANNELS: usize = 32;
/// Default number of bytes processed per block.
pub const DEFAULT_MIX_BLOCK_SIZE: usize = 16 * 16384;
/// Gain of a channel declared without one.
pub const DEFAULT_CHANNEL_GAIN: f64 = 1.0;

/// Declared input: where to read from and how loud.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSpec {
    pub path: String,
    /// Linear amplitude multiplier.
    pub gain: f64,
}

impl ChannelSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            gain: DEFAULT_CHANNEL_GAIN,
        }
    }

    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }
}

/// An opened input stream. The stream is closed when the channel is dropped.
pub struct InputChannel {
    pub path: String,
    pub gain: f64,
    reader: Box<dyn Read>,
}

impl std::fmt::Debug for InputChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputChannel")
            .field("path", &self.path)
            .field("gain", &self.gain)
            .finish()
    }
}

impl InputChannel {
    pub fn new(path: impl Into<String>, gain: f64, reader: Box<dyn Read>) -> Self {
        Self {
            path: path.into(),
            gain,
            reader,
        }
    }

    /// Open the stream named by `spec`.
    ///
    /// # Errors
    /// Returns [`MixError::Open`] if the path cannot be opened.
    pub fn open(spec: &ChannelSpec) -> Result<Self, MixError> {
        let reader = open_input(&spec.path).map_err(|source| MixError::Open {
            path: spec.path.clone(),
            source,
        })?;
        Ok(Self::new(spec.path.clone(), spec.gain, reader))
    }

    fn read_into(&mut self, index: usize, buf: &mut [u8]) -> Result<usize, MixError> {
        read_block(&mut self.reader, buf).map_err(|source| {
            error!(
                "Failed to read input {} \"{}\" of {} bytes: {}",
                index,
                self.path,
                buf.len(),
                source
            );
            MixError::Read {
                index,
                path: self.path.clone(),
                source,
            }
        })
    }
}

/// Open every declared channel, stopping at the first failure.
///
/// Channels opened before a failure are dropped, and so closed, on return.
///
/// # Errors
/// Returns [`MixError::NoInputs`] or [`MixError::TooManyChannels`] for a bad
/// channel count, or [`MixError::Open`] for the first channel that fails.
pub fn open_channels(specs: &[ChannelSpec]) -> Result<Vec<InputChannel>, MixError> {
    check_channel_count(specs.len())?;
    specs.iter().map(InputChannel::open).collect()
}

/// Counters reported after a mix finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MixSummary {
    pub blocks: u64,
    pub bytes_written: u64,
    /// The run stopped on a cancellation request rather than end of input.
    pub cancelled: bool,
}

/// Mix `channels` into `output` block by block until an input runs dry.
///
/// Channel 0 is the primary. Past the end of a short read every channel
/// contributes silence, so the block written is as long as the longest read of
/// any channel. A block shorter than `block_size` is the last one.
///
/// `block_size` is used as given. Unlike the beep renderer's frame size it is
/// not clamped into a range; only zero is rejected.
///
/// `cancel` is polled before every block.
///
/// # Errors
/// Returns an error for a bad channel count or block size, or for the first
/// read or write failure. Nothing is retried.
pub fn mix<W: Write + ?Sized>(
    channels: &mut [InputChannel],
    output: &mut W,
    block_size: usize,
    cancel: &CancelToken,
) -> Result<MixSummary, MixError> {
    check_channel_count(channels.len())?;
    if block_size == 0 {
        return Err(MixError::BlockSize);
    }
    let (primary, secondaries) = channels.split_first_mut().ok_or(MixError::NoInputs)?;

    let mut block = vec![0_u8; block_size];
    let mut acc = vec![0_i8; block_size];
    let mut summary = MixSummary::default();

    loop {
        if cancel.is_cancelled() {
            warn!("Mix cancelled after {} blocks", summary.blocks);
            summary.cancelled = true;
            break;
        }

        let read = primary.read_into(0, &mut block)?;
        let mut write_size = read;
        convert::load(&block[..read], primary.gain, &mut acc);
        acc[read..].fill(0);

        for (offset, channel) in secondaries.iter_mut().enumerate() {
            let read = channel.read_into(offset + 1, &mut block)?;
            write_size = write_size.max(read);
            convert::accumulate(&block[..read], channel.gain, &mut acc);
        }

        for (dst, &sample) in block.iter_mut().zip(&acc[..write_size]) {
            *dst = convert::to_unsigned(sample);
        }

        output
            .write_all(&block[..write_size])
            .map_err(|source| MixError::Write {
                size: write_size,
                source,
            })?;
        summary.blocks += 1;
        summary.bytes_written += write_size as u64;

        if write_size < block_size {
            debug!("Final block of {} bytes", write_size);
            break;
        }
    }

    output.flush().map_err(|source| MixError::Write { size: 0, source })?;
    info!(
        "Mixed {} blocks, {} bytes",
        summary.blocks, summary.bytes_written
    );
    Ok(summary)
}

fn check_channel_count(count: usize) -> Result<(), MixError> {
    if count == 0 {
        return Err(MixError::NoInputs);
    }
    if count > MAX_INPUT_CHANNELS {
        return Err(MixError::TooManyChannels {
            count,
            max: MAX_INPUT_CHANNELS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use super::*;

    fn channel(data: Vec<u8>, gain: f64) -> InputChannel {
        InputChannel::new("mem", gain, Box::new(Cursor::new(data)))
    }

    fn run(channels: &mut [InputChannel], block_size: usize) -> (Vec<u8>, MixSummary) {
        let mut out = Vec::new();
        let summary = mix(channels, &mut out, block_size, &CancelToken::new()).unwrap();
        (out, summary)
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device gone"))
        }
    }

    /// Accepts a fixed number of bytes, then refuses more.
    struct ShortWriter {
        room: usize,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = self.room.min(buf.len());
            self.room -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn single_unity_channel_is_passthrough() {
        let input: Vec<u8> = (0..=255).cycle().take(1000).collect();
        let mut channels = vec![channel(input.clone(), 1.0)];
        let (out, summary) = run(&mut channels, 64);
        assert_eq!(out, input);
        // 15 full blocks and one 40 byte tail.
        assert_eq!(summary.blocks, 16);
        assert_eq!(summary.bytes_written, 1000);
        assert!(!summary.cancelled);
    }

    #[test]
    fn exact_multiple_ends_with_an_empty_block() {
        let input = vec![200_u8; 128];
        let mut channels = vec![channel(input.clone(), 1.0)];
        let (out, summary) = run(&mut channels, 64);
        assert_eq!(out, input);
        assert_eq!(summary.blocks, 3);
    }

    #[test]
    fn zero_signal_stays_zero_for_any_gain() {
        let mut channels = vec![
            channel(vec![128; 300], 0.7),
            channel(vec![128; 300], 3.5),
            channel(vec![128; 250], -2.0),
            channel(vec![128; 300], 1.0),
        ];
        let (out, _) = run(&mut channels, 128);
        assert_eq!(out.len(), 300);
        assert!(out.iter().all(|&b| b == 128));
    }

    #[test]
    fn longer_secondary_extends_the_output() {
        let primary: Vec<u8> = vec![140; 10];
        let secondary: Vec<u8> = (100..130).collect();
        let mut channels = vec![channel(primary, 1.0), channel(secondary.clone(), 1.0)];
        let (out, _) = run(&mut channels, 64);

        assert_eq!(out.len(), 30);
        for k in 0..10 {
            let expected = (140_i32 - 128) + (i32::from(secondary[k]) - 128) + 128;
            assert_eq!(i32::from(out[k]), expected);
        }
        assert_eq!(&out[10..], &secondary[10..]);
    }

    #[test]
    fn unity_gain_matches_general_path_for_every_byte() {
        let input: Vec<u8> = (0..=255).collect();
        let mut fast = vec![channel(input.clone(), 1.0)];
        let (fast_out, _) = run(&mut fast, 256);

        let mut general = vec![0_i8; 256];
        for (dst, &byte) in general.iter_mut().zip(&input) {
            *dst = convert::attenuate(byte, 1.0);
        }
        let general_out: Vec<u8> = general.iter().map(|&s| convert::to_unsigned(s)).collect();
        assert_eq!(fast_out, general_out);
        assert_eq!(fast_out, input);
    }

    #[test]
    fn sums_wrap_instead_of_saturating() {
        let mut channels = vec![channel(vec![255; 4], 1.0), channel(vec![255; 4], 1.0)];
        let (out, _) = run(&mut channels, 16);
        assert_eq!(out, vec![126; 4]);
    }

    #[test]
    fn gains_are_applied_per_channel() {
        let mut channels = vec![channel(vec![148; 8], 0.5), channel(vec![108; 8], 0.25)];
        let (out, _) = run(&mut channels, 8 * 4);
        // 20 * 0.5 + -20 * 0.25 = 5
        assert_eq!(out, vec![133; 8]);
    }

    #[test]
    fn secondary_read_failure_aborts() {
        let mut channels = vec![
            channel(vec![128; 16], 1.0),
            InputChannel::new("broken", 1.0, Box::new(FailingReader)),
        ];
        let mut out = Vec::new();
        let err = mix(&mut channels, &mut out, 8, &CancelToken::new()).unwrap_err();
        match err {
            MixError::Read { index, path, .. } => {
                assert_eq!(index, 1);
                assert_eq!(path, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(out.is_empty());
    }

    #[test]
    fn short_write_aborts() {
        let mut channels = vec![channel(vec![1; 32], 1.0)];
        let mut out = ShortWriter { room: 4 };
        let err = mix(&mut channels, &mut out, 8, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, MixError::Write { size: 8, .. }));
    }

    #[test]
    fn cancelled_token_stops_before_reading() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut channels = vec![channel(vec![1; 32], 1.0)];
        let mut out = Vec::new();
        let summary = mix(&mut channels, &mut out, 8, &cancel).unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.blocks, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn channel_count_and_block_size_are_checked() {
        let mut out = Vec::new();
        let cancel = CancelToken::new();
        let err = mix(&mut [], &mut out, 8, &cancel).unwrap_err();
        assert!(matches!(err, MixError::NoInputs));

        let mut many: Vec<InputChannel> = (0..=MAX_INPUT_CHANNELS)
            .map(|_| channel(Vec::new(), 1.0))
            .collect();
        let err = mix(&mut many, &mut out, 8, &cancel).unwrap_err();
        assert!(matches!(err, MixError::TooManyChannels { count: 33, max: 32 }));

        let mut one = vec![channel(Vec::new(), 1.0)];
        let err = mix(&mut one, &mut out, 0, &cancel).unwrap_err();
        assert!(matches!(err, MixError::BlockSize));
    }

    #[test]
    fn open_channels_fails_fast_on_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.cu8");
        std::fs::write(&good, [128_u8; 4]).unwrap();
        let missing = dir.path().join("missing.cu8");
        let specs = vec![
            ChannelSpec::new(good.to_str().unwrap()),
            ChannelSpec::new(missing.to_str().unwrap()).with_gain(0.5),
        ];
        let err = open_channels(&specs).unwrap_err();
        match err {
            MixError::Open { path, .. } => assert_eq!(path, missing.to_str().unwrap()),
            other => panic!("unexpected error: {other}"),
        }

        let opened = open_channels(&specs[..1]).unwrap();
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].gain, DEFAULT_CHANNEL_GAIN);
        assert!(matches!(open_channels(&[]), Err(MixError::NoInputs)));
    }
}
