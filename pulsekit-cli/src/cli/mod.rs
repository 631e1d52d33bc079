pub mod args;
pub mod beep;
pub mod mix;
