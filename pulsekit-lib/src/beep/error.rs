use thiserror::Error;

/// Reasons a beep source list cannot be turned into a timeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("no beep sources given")]
    NoSources,
    #[error("too many beep sources: {count} (at most {max})")]
    TooManySources { count: usize, max: usize },
    #[error("beep source {index} has a zero interval")]
    ZeroInterval { index: usize },
    #[error("tone capacity must be at least 1")]
    Capacity,
}
