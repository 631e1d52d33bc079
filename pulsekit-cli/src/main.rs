//! # Pulsekit
//!
//! Command-line beep timeline generator and I/Q sample file mixer.

use log::error;

mod cli;
mod error;
mod logging;
mod runner;
mod signals;

fn main() {
    dotenv::dotenv().ok();
    let args = cli::args::build_cli().get_matches();
    logging::init(args.get_count("verbose"));

    let code = match runner::run(&args) {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err);
            1
        }
    };

    std::process::exit(code)
}
