use std::io;

use pulsekit_lib::beep::ScheduleError;
use pulsekit_lib::level::ParseError;
use pulsekit_lib::mix::MixError;
use pulsekit_lib::render::RenderError;
use thiserror::Error;

/// Everything that ends a CLI run with a non-zero status.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{flag}: {source}")]
    InvalidArgument {
        flag: &'static str,
        #[source]
        source: ParseError,
    },
    #[error("{0}")]
    Usage(String),
    #[error("failed to open output \"{path}\": {source}")]
    Output {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Mix(#[from] MixError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl CliError {
    pub fn invalid(flag: &'static str) -> impl FnOnce(ParseError) -> Self {
        move |source| Self::InvalidArgument { flag, source }
    }
}
