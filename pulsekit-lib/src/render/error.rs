use std::io;

use thiserror::Error;

/// Errors raised while rendering a tone timeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to open output \"{path}\": {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode timeline: {0}")]
    Encode(#[from] serde_json::Error),
}
