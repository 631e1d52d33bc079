//! Interleaving periodic beep sources into one tone timeline.

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    BeepSource, ScheduleError, Tone, ToneSequence, DEFAULT_TONE_CAPACITY, LEAD_IN_SILENCE_US,
    MAX_BEEP_SOURCES,
};

/// Schedule `sources` into a timeline of [`DEFAULT_TONE_CAPACITY`] slots.
///
/// See [`schedule_with_capacity`].
pub fn schedule(sources: &[BeepSource], seed: u64) -> Result<ToneSequence, ScheduleError> {
    schedule_with_capacity(sources, seed, DEFAULT_TONE_CAPACITY)
}

/// Schedule `sources` into a timeline of at most `capacity` tones.
///
/// Every source gets a random initial countdown in `1..=interval` drawn from a
/// generator seeded with `seed`, so equal inputs give equal timelines. The
/// timeline opens with half a second of silence and then grows by one
/// silence+beep pair per step for the source that fires next. On ties the
/// earlier source wins. Scheduling stops once fewer than two slots are free.
///
/// A firing source (and any other source whose countdown has run out) restarts
/// from its full interval, without carrying over the overshoot.
///
/// # Errors
/// Rejects an empty source list, more than [`MAX_BEEP_SOURCES`] sources, a
/// source with a zero interval, and a capacity of zero.
pub fn schedule_with_capacity(
    sources: &[BeepSource],
    seed: u64,
    capacity: usize,
) -> Result<ToneSequence, ScheduleError> {
    if sources.is_empty() {
        return Err(ScheduleError::NoSources);
    }
    if sources.len() > MAX_BEEP_SOURCES {
        return Err(ScheduleError::TooManySources {
            count: sources.len(),
            max: MAX_BEEP_SOURCES,
        });
    }
    for (index, source) in sources.iter().enumerate() {
        source.validate(index)?;
    }
    if capacity == 0 {
        return Err(ScheduleError::Capacity);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut countdowns: Vec<u32> = sources
        .iter()
        .map(|source| rng.gen_range(1..=source.interval_ms))
        .collect();
    debug!("initial countdowns: {:?}", countdowns);

    let mut tones = ToneSequence::with_capacity(capacity);
    tones.push(Tone::silence(LEAD_IN_SILENCE_US));

    while tones.free_slots() >= 2 {
        let selected = next_source(&countdowns);
        let gap = countdowns[selected];
        let source = &sources[selected];
        trace!("source {} fires after {} ms", selected, gap);

        tones.push(Tone::silence(u64::from(gap) * 1000));
        tones.push(Tone {
            frequency: source.frequency,
            level: source.attenuation,
            duration_us: u64::from(source.duration_ms) * 1000,
        });

        for (countdown, source) in countdowns.iter_mut().zip(sources) {
            if *countdown <= gap {
                *countdown = source.interval_ms;
            } else {
                *countdown -= gap;
            }
        }
    }

    Ok(tones)
}

/// Index of the smallest countdown, first one on ties.
fn next_source(countdowns: &[u32]) -> usize {
    let mut selected = 0;
    let mut gap = u32::MAX;
    for (index, &countdown) in countdowns.iter().enumerate() {
        if countdown < gap {
            gap = countdown;
            selected = index;
        }
    }
    selected
}
