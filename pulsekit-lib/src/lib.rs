//! # Pulsekit Library
//!
//! Core pieces of the pulsekit radio sample tools: the beep tone scheduler,
//! the 8-bit I/Q stream mixer, and the renderer seam the beep tool hands its
//! timeline to.

pub mod beep;
pub mod cancel;
pub mod endpoint;
pub mod level;
pub mod mix;
pub mod render;
