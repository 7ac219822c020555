//! Command-line interface

pub mod args;
pub mod commands;
pub mod surface;

pub use args::{Cli, Commands};
pub use surface::ConsoleSurface;
