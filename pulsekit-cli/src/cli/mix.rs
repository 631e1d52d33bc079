//! `pulsekit mix`: sum attenuated cu8 I/Q streams into one.

use clap::ArgMatches;
use log::{info, warn};

use pulsekit_lib::cancel::CancelToken;
use pulsekit_lib::endpoint::{open_output, STDIO_NAME};
use pulsekit_lib::level::{linear_to_db, parse_level, parse_usize_metric, ParseError};
use pulsekit_lib::mix::{mix, open_channels, ChannelSpec, MixError, MAX_INPUT_CHANNELS};

use super::args::{positioned_values, value};
use crate::error::CliError;

/// Inputs, output and block size for one mix run.
#[derive(Debug, Clone)]
pub struct MixConfig {
    pub channels: Vec<ChannelSpec>,
    pub destination: String,
    /// Used as given; see [`pulsekit_lib::mix::mix`].
    pub block_size: usize,
}

impl MixConfig {
    /// Build the config from the `mix` subcommand matches.
    ///
    /// Every `-r` adds a channel at unity gain; `-g` sets the gain of the most
    /// recent one.
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, CliError> {
        let channels = collect_channels(matches)?;
        if channels.is_empty() {
            return Err(MixError::NoInputs.into());
        }
        if channels.len() > MAX_INPUT_CHANNELS {
            return Err(MixError::TooManyChannels {
                count: channels.len(),
                max: MAX_INPUT_CHANNELS,
            }
            .into());
        }

        let block_size =
            parse_usize_metric(value(matches, "block-size")).map_err(CliError::invalid("-b"))?;
        if block_size == 0 {
            return Err(CliError::InvalidArgument {
                flag: "-b",
                source: ParseError::OutOfRange(value(matches, "block-size").to_string()),
            });
        }

        let destination = match matches.get_one::<String>("output") {
            Some(path) => path.clone(),
            None => {
                info!("Output to stdout.");
                STDIO_NAME.to_string()
            }
        };

        Ok(Self {
            channels,
            destination,
            block_size,
        })
    }
}

fn collect_channels(matches: &ArgMatches) -> Result<Vec<ChannelSpec>, CliError> {
    let mut options: Vec<(usize, bool, &str)> = positioned_values(matches, "input")
        .into_iter()
        .map(|(index, path)| (index, true, path))
        .chain(
            positioned_values(matches, "gain")
                .into_iter()
                .map(|(index, gain)| (index, false, gain)),
        )
        .collect();
    options.sort_by_key(|(index, _, _)| *index);

    let mut channels: Vec<ChannelSpec> = Vec::new();
    for (_, is_input, raw) in options {
        if is_input {
            channels.push(ChannelSpec::new(raw));
            continue;
        }
        let gain = parse_level(raw).map_err(CliError::invalid("-g"))?;
        match channels.last_mut() {
            Some(channel) => channel.gain = gain,
            None => warn!("Ignoring gain {} given before any input", raw),
        }
    }

    Ok(channels)
}

/// Open every input and the output, then run the mixer.
pub fn run(config: &MixConfig, cancel: &CancelToken) -> Result<i32, CliError> {
    for (index, channel) in config.channels.iter().enumerate() {
        info!(
            "Input {} \"{}\" gain {} ({:.1} dB)",
            index,
            channel.path,
            channel.gain,
            linear_to_db(channel.gain)
        );
    }

    let mut channels = open_channels(&config.channels)?;
    let mut output = open_output(&config.destination).map_err(|source| CliError::Output {
        path: config.destination.clone(),
        source,
    })?;

    let summary = mix(&mut channels, &mut output, config.block_size, cancel)?;
    if summary.cancelled {
        warn!("Signal caught, exiting!");
    } else {
        info!("Done.");
    }

    Ok(0)
}
