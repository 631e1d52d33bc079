//! `pulsekit beep`: schedule beep sources into a timeline and render it.

use clap::ArgMatches;
use log::{debug, info, warn};

use pulsekit_lib::beep::{schedule, BeepSource, ScheduleError, MAX_BEEP_SOURCES};
use pulsekit_lib::cancel::CancelToken;
use pulsekit_lib::endpoint::STDIO_NAME;
use pulsekit_lib::level::{
    parse_i32_metric, parse_level, parse_metric, parse_u32_metric, parse_usize_metric, ParseError,
};
use pulsekit_lib::render::{render_to_destination, RenderConfig, TimelineRenderer};

use super::args::{positioned_values, value};
use crate::error::CliError;

/// Everything the beep tool needs, fixed before any work starts.
#[derive(Debug, Clone)]
pub struct BeepConfig {
    pub sources: Vec<BeepSource>,
    pub seed: u64,
    pub render: RenderConfig,
    pub destination: String,
}

#[derive(Debug, Clone, Copy)]
enum SourceOption {
    Frequency,
    Attenuation,
    Length,
    Interval,
}

impl BeepConfig {
    /// Build the config from the `beep` subcommand matches.
    ///
    /// A `-f` starts a new source unless the current one has no frequency yet;
    /// `-a`, `-l` and `-i` set fields of the current source.
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, CliError> {
        let sources = collect_sources(matches)?;
        if sources.len() > MAX_BEEP_SOURCES {
            return Err(ScheduleError::TooManySources {
                count: sources.len(),
                max: MAX_BEEP_SOURCES,
            }
            .into());
        }
        for (index, source) in sources.iter().enumerate() {
            source.validate(index)?;
        }

        let seed = value(matches, "seed").trim().parse::<u64>().map_err(|_| {
            CliError::InvalidArgument {
                flag: "-S",
                source: ParseError::Invalid(value(matches, "seed").to_string()),
            }
        })?;

        let render = RenderConfig {
            sample_rate: parse_metric(value(matches, "sample-rate"))
                .map_err(CliError::invalid("-s"))?,
            frame_size: parse_usize_metric(value(matches, "block-size"))
                .map_err(CliError::invalid("-b"))?,
            noise_floor: parse_level(value(matches, "noise-floor"))
                .map_err(CliError::invalid("-n"))?,
            noise_signal: parse_level(value(matches, "noise-signal"))
                .map_err(CliError::invalid("-N"))?,
            gain: parse_level(value(matches, "gain")).map_err(CliError::invalid("-g"))?,
            filter_wc: parse_metric(value(matches, "filter-ratio"))
                .map_err(CliError::invalid("-W"))?,
            step_width: parse_u32_metric(value(matches, "step-width"))
                .map_err(CliError::invalid("-G"))?,
            full_scale: parse_metric(value(matches, "full-scale"))
                .map_err(CliError::invalid("-M"))?,
            sample_format: value(matches, "format")
                .parse()
                .map_err(CliError::Usage)?,
        }
        .clamped();

        let destination = match matches.get_one::<String>("output") {
            Some(path) => path.clone(),
            None => {
                info!("Output to stdout.");
                STDIO_NAME.to_string()
            }
        };

        Ok(Self {
            sources,
            seed,
            render,
            destination,
        })
    }
}

fn collect_sources(matches: &ArgMatches) -> Result<Vec<BeepSource>, CliError> {
    let mut options: Vec<(usize, SourceOption, &str)> = Vec::new();
    for (option, id) in [
        (SourceOption::Frequency, "frequency"),
        (SourceOption::Attenuation, "attenuation"),
        (SourceOption::Length, "length"),
        (SourceOption::Interval, "interval"),
    ] {
        for (index, raw) in positioned_values(matches, id) {
            options.push((index, option, raw));
        }
    }
    options.sort_by_key(|(index, _, _)| *index);

    let mut sources = Vec::new();
    let mut current = BeepSource::default();
    for (_, option, raw) in options {
        match option {
            SourceOption::Frequency => {
                let frequency = parse_i32_metric(raw).map_err(CliError::invalid("-f"))?;
                if current.frequency != 0 {
                    sources.push(current);
                    current = BeepSource::default();
                }
                current.frequency = frequency;
            }
            SourceOption::Attenuation => {
                current.attenuation = parse_i32_metric(raw).map_err(CliError::invalid("-a"))?;
            }
            SourceOption::Length => {
                current.duration_ms = parse_u32_metric(raw).map_err(CliError::invalid("-l"))?;
            }
            SourceOption::Interval => {
                current.interval_ms = parse_u32_metric(raw).map_err(CliError::invalid("-i"))?;
            }
        }
    }
    sources.push(current);

    Ok(sources)
}

/// Schedule the configured beeps and render the timeline.
pub fn run(config: &BeepConfig, cancel: &CancelToken) -> Result<i32, CliError> {
    let described: Vec<String> = config
        .sources
        .iter()
        .map(|p| {
            format!(
                "{} Hz at {} dB {} ms / {} ms",
                p.frequency, p.attenuation, p.duration_ms, p.interval_ms
            )
        })
        .collect();
    info!("Beeps: {}", described.join("; "));

    let tones = schedule(&config.sources, config.seed)?;
    for tone in &tones {
        debug!("{} Hz {} dB {} us", tone.frequency, tone.level, tone.duration_us);
    }
    info!(
        "Signal length: {} us, {} smp",
        tones.length_us(),
        tones.length_samples(config.render.sample_rate)
    );

    let summary = render_to_destination(
        &mut TimelineRenderer::new(),
        &config.destination,
        &config.render,
        &tones,
        cancel,
    )?;
    if summary.cancelled {
        warn!("Signal caught, exiting!");
    }
    info!(
        "Rendered {} tones ({} bytes) to {}",
        summary.tones_rendered, summary.bytes_written, config.destination
    );

    Ok(0)
}
