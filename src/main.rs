use anyhow::{anyhow, Context, Result};
use solana_sdk::pubkey::Pubkey;
use std::path::Path;
use std::str::FromStr;

use idl_codec::cli::{Cli, Commands, ConfigCommands, DecodeArgs, DecodeTarget};
use idl_codec::config::Config;
use idl_codec::display::{
    display_decoded, display_discriminators, display_error, display_idl_overview,
    display_layouts, display_not_found, display_validation_errors,
};
use idl_codec::idl::{idl_address, idl_from_account_data, load_idl_from_file, Idl};
use idl_codec::{IdlCodecError, Program};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let config = Config::load().unwrap_or_default();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    if !config.color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(&cli, &config) {
        display_error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    match &cli.command {
        Commands::Check => cmd_check(cli, config),
        Commands::Discriminators => {
            let program = load_program(cli, config)?;
            display_discriminators(&program);
            Ok(())
        }
        Commands::Layout { name } => cmd_layout(cli, config, name.as_deref()),
        Commands::Decode(args) => cmd_decode(cli, config, args),
        Commands::Address { program_id } => cmd_address(program_id),
        Commands::Config { action } => cmd_config(action.clone()),
    }
}

// ============================================================================
// Command handlers
// ============================================================================

/// Handle `check` - validate and derive, listing every problem found
fn cmd_check(cli: &Cli, config: &Config) -> Result<()> {
    let idl = load_idl(cli, config)?;

    match Program::new(idl) {
        Ok(program) => {
            display_idl_overview(&program);
            Ok(())
        }
        Err(IdlCodecError::Validation(errors)) => {
            display_validation_errors(&errors);
            Err(anyhow!("IDL has {} problem(s)", errors.len()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Handle `layout` - show derived layouts
fn cmd_layout(cli: &Cli, config: &Config, name: Option<&str>) -> Result<()> {
    let program = load_program(cli, config)?;
    let codecs = program.codecs();

    if let Some(name) = name {
        if !codecs.contains(name) {
            let available: Vec<&str> = codecs.iter().map(|(key, _)| key).collect();
            display_not_found("Type", name, &available);
            return Err(anyhow!("Type '{}' not found", name));
        }
    }

    display_layouts(codecs, name);
    Ok(())
}

/// Handle `decode` - decode base64 data by name or by discriminator
fn cmd_decode(cli: &Cli, config: &Config, args: &DecodeArgs) -> Result<()> {
    let program = load_program(cli, config)?;
    let data = base64::decode(args.data.trim()).context("--data is not valid base64")?;

    match args.target() {
        DecodeTarget::Auto => {
            let (identified, value) = program.decode_any(&data)?;
            display_decoded(Some(identified), &value);
        }
        DecodeTarget::Account(name) => {
            display_decoded(None, &program.decode_account(&name, &data)?)
        }
        DecodeTarget::Event(name) => display_decoded(None, &program.decode_event(&name, &data)?),
        DecodeTarget::Instruction(name) => {
            display_decoded(None, &program.decode_instruction(&name, &data)?)
        }
    }

    Ok(())
}

/// Handle `address` - print the IDL account address
fn cmd_address(program_id: &str) -> Result<()> {
    let program_id = Pubkey::from_str(program_id)
        .map_err(|_| IdlCodecError::InvalidProgramId(program_id.to_string()))?;
    println!("{}", idl_address(&program_id)?);
    Ok(())
}

/// Handle `config` subcommands
fn cmd_config(action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let config = Config::load()?;
            let config_path = Config::file_path()?;
            let exists = Config::exists();

            println!();
            println!("idl-codec Configuration:");
            println!("  Config file: {}", config_path.display());
            println!("  File exists: {}", if exists { "yes" } else { "no (using defaults)" });
            println!();
            println!("  log_level:   {}", config.log_level);
            println!("  color:       {}", config.color);
            println!(
                "  default_idl: {}",
                config
                    .default_idl
                    .as_ref()
                    .map_or_else(|| "-".to_string(), |p| p.display().to_string())
            );
            println!();
            Ok(())
        }
        ConfigCommands::Set {
            log_level,
            color,
            default_idl,
        } => {
            if log_level.is_none() && color.is_none() && default_idl.is_none() {
                println!("No value provided to set.");
                println!("Usage: idl-codec config set [--log-level <LEVEL>] [--color <BOOL>] [--default-idl <PATH>]");
                return Ok(());
            }

            let mut config = Config::load()?;
            if let Some(level) = log_level {
                config.log_level = level;
            }
            if let Some(color) = color {
                config.color = color;
            }
            if let Some(path) = default_idl {
                config.default_idl = Some(path);
            }

            config.validate()?;
            config.save()?;

            println!("Saved configuration to {}", Config::file_path()?.display());
            Ok(())
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Load the IDL from `--idl` or the configured default
fn load_idl(cli: &Cli, config: &Config) -> Result<Idl> {
    let path = cli.idl_path(config.default_idl.as_ref()).ok_or_else(|| {
        anyhow!("No IDL given. Pass --idl <PATH> or set one with `idl-codec config set --default-idl <PATH>`.")
    })?;

    let idl = if cli.account_data {
        read_account_data(&path)?
    } else {
        load_idl_from_file(&path).with_context(|| format!("Failed to load {}", path.display()))?
    };
    Ok(idl)
}

fn read_account_data(path: &Path) -> Result<Idl> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(idl_from_account_data(&bytes)?)
}

fn load_program(cli: &Cli, config: &Config) -> Result<Program> {
    Ok(Program::new(load_idl(cli, config)?)?)
}
