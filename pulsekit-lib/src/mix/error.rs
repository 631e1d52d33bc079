use std::io;

use thiserror::Error;

/// Errors raised while setting up or running a mix.
#[derive(Debug, Error)]
pub enum MixError {
    #[error("no input channels given")]
    NoInputs,
    #[error("too many input channels: {count} (at most {max})")]
    TooManyChannels { count: usize, max: usize },
    #[error("block size must be greater than zero")]
    BlockSize,
    #[error("failed to open input \"{path}\": {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to read input {index} \"{path}\": {source}")]
    Read {
        index: usize,
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write output block of {size} bytes: {source}")]
    Write {
        size: usize,
        #[source]
        source: io::Error,
    },
}
