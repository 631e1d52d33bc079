//! CLI argument definitions for `pulsekit`.

use clap::{Arg, ArgAction, ArgMatches, Command};

/// Build the CLI argument parser and command definitions.
pub fn build_cli() -> Command {
    Command::new("pulsekit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Beep pulse timeline generator and SDR I/Q sample file mixer")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase verbosity (can be used multiple times)"),
        )
        .subcommand(beep_command())
        .subcommand(mix_command())
}

fn beep_command() -> Command {
    Command::new("beep")
        .about("Schedule periodic beeps into a tone timeline and render it")
        .after_help(
            "Levels < 0 are attenuation in dBFS, otherwise amplitude multipliers; \
             a \"db\" suffix always means dBFS.\n\
             -a, -l and -i apply to the beep started by the most recent -f.",
        )
        .arg(
            Arg::new("sample-rate")
                .short('s')
                .long("sample-rate")
                .value_name("HZ")
                .default_value("2048k")
                .help("Sample rate"),
        )
        .arg(
            Arg::new("frequency")
                .short('f')
                .long("frequency")
                .value_name("HZ")
                .action(ArgAction::Append)
                .allow_hyphen_values(true)
                .help("Add a new beep at this frequency"),
        )
        .arg(
            Arg::new("attenuation")
                .short('a')
                .long("attenuation")
                .value_name("DB")
                .action(ArgAction::Append)
                .allow_hyphen_values(true)
                .help("Set the current beep's attenuation"),
        )
        .arg(
            Arg::new("length")
                .short('l')
                .long("length")
                .value_name("MS")
                .action(ArgAction::Append)
                .help("Set the current beep's length"),
        )
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval")
                .value_name("MS")
                .action(ArgAction::Append)
                .help("Set the current beep's repeat interval"),
        )
        .arg(
            Arg::new("noise-floor")
                .short('n')
                .long("noise-floor")
                .value_name("LEVEL")
                .default_value("0")
                .allow_hyphen_values(true)
                .help("Noise floor, 0 is off"),
        )
        .arg(
            Arg::new("noise-signal")
                .short('N')
                .long("noise-signal")
                .value_name("LEVEL")
                .default_value("0")
                .allow_hyphen_values(true)
                .help("Noise on signal, 0 is off"),
        )
        .arg(
            Arg::new("gain")
                .short('g')
                .long("gain")
                .value_name("LEVEL")
                .default_value("0")
                .allow_hyphen_values(true)
                .help("Signal gain, 0 is 0 dBFS"),
        )
        .arg(
            Arg::new("filter-ratio")
                .short('W')
                .long("filter-ratio")
                .value_name("RATIO")
                .default_value("0")
                .help("Filter cutoff ratio"),
        )
        .arg(
            Arg::new("step-width")
                .short('G')
                .long("step-width")
                .value_name("US")
                .default_value("0")
                .help("Step width in microseconds"),
        )
        .arg(
            Arg::new("block-size")
                .short('b')
                .long("block-size")
                .value_name("BYTES")
                .default_value("262144")
                .help("Output block size (out of range values fall back to the default)"),
        )
        .arg(
            Arg::new("seed")
                .short('S')
                .long("seed")
                .value_name("SEED")
                .default_value("1")
                .help("Random seed for reproducible output"),
        )
        .arg(
            Arg::new("full-scale")
                .short('M')
                .long("full-scale")
                .value_name("FULL_SCALE")
                .default_value("0")
                .help("Limit the output full scale, e.g. 2048 with cs16"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .default_value("cu8")
                .help("Output sample format: cu8, cs8, cs16 or cf32"),
        )
        .arg(
            Arg::new("output")
                .short('w')
                .long("output")
                .value_name("FILE")
                .help("Write output to file ('-' writes to stdout, the default)"),
        )
}

fn mix_command() -> Command {
    Command::new("mix")
        .about("Mix raw cu8 I/Q sample files into one")
        .after_help(
            "Gain levels < 0 are attenuation in dBFS, otherwise amplitude multipliers; \
             1 is 0 dBFS, 0 is -inf dBFS.\n\
             -g applies to the input added by the most recent -r.",
        )
        .arg(
            Arg::new("input")
                .short('r')
                .long("input")
                .value_name("FILE")
                .action(ArgAction::Append)
                .help("Add a file to read samples from ('-' reads from stdin)"),
        )
        .arg(
            Arg::new("gain")
                .short('g')
                .long("gain")
                .value_name("LEVEL")
                .action(ArgAction::Append)
                .allow_hyphen_values(true)
                .help("Set the current input's gain"),
        )
        .arg(
            Arg::new("block-size")
                .short('b')
                .long("block-size")
                .value_name("BYTES")
                .default_value("262144")
                .help("Block size in bytes"),
        )
        .arg(
            Arg::new("output")
                .short('w')
                .long("output")
                .value_name("FILE")
                .help("Write samples to file ('-' writes to stdout, the default)"),
        )
}

/// Values of a repeatable option paired with their command-line positions.
///
/// Positions let per-item options be attached to the item started before them.
pub fn positioned_values<'a>(matches: &'a ArgMatches, id: &str) -> Vec<(usize, &'a str)> {
    match (matches.indices_of(id), matches.get_many::<String>(id)) {
        (Some(indices), Some(values)) => indices.zip(values.map(String::as_str)).collect(),
        _ => Vec::new(),
    }
}

/// The single value of an option that has a default.
pub fn value<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .unwrap_or_default()
}
