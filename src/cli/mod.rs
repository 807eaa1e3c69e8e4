//! Command-line surface

mod commands;

pub use commands::{Cli, Commands, ConfigCommands, DecodeArgs, DecodeTarget};
