use clap::ArgMatches;
use log::debug;

use crate::cli::beep::BeepConfig;
use crate::cli::mix::MixConfig;
use crate::error::CliError;
use crate::{cli, signals};

pub fn run(args: &ArgMatches) -> Result<i32, CliError> {
    let cancel = signals::install();

    match args.subcommand() {
        Some(("beep", sub)) => {
            let config = BeepConfig::from_matches(sub)?;
            debug!("{:?}", config);
            cli::beep::run(&config, &cancel)
        }
        Some(("mix", sub)) => {
            let config = MixConfig::from_matches(sub)?;
            debug!("{:?}", config);
            cli::mix::run(&config, &cancel)
        }
        _ => Err(CliError::Usage("expected a subcommand, see --help".to_string())),
    }
}
