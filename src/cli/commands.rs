//! CLI command definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// idl-codec - Validate Anchor IDLs and encode/decode program data with them
#[derive(Debug, Parser)]
#[command(name = "idl-codec")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// IDL JSON file (defaults to `default_idl` from the config)
    #[arg(short, long, global = true)]
    pub idl: Option<PathBuf>,

    /// Treat the IDL file as raw on-chain IDL account data
    #[arg(long, global = true)]
    pub account_data: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate the IDL and derive every codec
    Check,

    /// List discriminators of accounts, events and instructions
    Discriminators,

    /// Show derived wire layouts
    Layout {
        /// Only show this type
        name: Option<String>,
    },

    /// Decode base64 account, event or instruction data
    Decode(DecodeArgs),

    /// Print the IDL account address of a program
    Address {
        /// Program ID (base58)
        program_id: String,
    },

    /// Manage idl-codec configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Base64-encoded data, discriminator included
    #[arg(short, long)]
    pub data: String,

    /// Decode as this account
    #[arg(long, conflicts_with_all = ["event", "instruction"])]
    pub account: Option<String>,

    /// Decode as this event
    #[arg(long, conflicts_with = "instruction")]
    pub event: Option<String>,

    /// Decode as this instruction's data
    #[arg(long)]
    pub instruction: Option<String>,
}

/// What `decode` should treat the data as
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeTarget {
    /// Identify by discriminator
    Auto,
    Account(String),
    Event(String),
    Instruction(String),
}

impl DecodeArgs {
    pub fn target(&self) -> DecodeTarget {
        match (&self.account, &self.event, &self.instruction) {
            (Some(name), _, _) => DecodeTarget::Account(name.clone()),
            (_, Some(name), _) => DecodeTarget::Event(name.clone()),
            (_, _, Some(name)) => DecodeTarget::Instruction(name.clone()),
            _ => DecodeTarget::Auto,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration values
    Set {
        /// Log filter: a level or module=level directives, e.g. idl_codec=debug,warn
        #[arg(long)]
        log_level: Option<String>,

        /// Colour output
        #[arg(long)]
        color: Option<bool>,

        /// IDL file used when --idl is not given
        #[arg(long)]
        default_idl: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// IDL path from `--idl`, falling back to the configured default
    pub fn idl_path(&self, default_idl: Option<&PathBuf>) -> Option<PathBuf> {
        self.idl.clone().or_else(|| default_idl.cloned())
    }
}
