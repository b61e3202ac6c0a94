//! CLI command definitions and execution
//!
//! Every remote command resolves a profile, refuses to run with an expired
//! token, then drives one or more client operations.

use clap::{Parser, Subcommand};
use http::StatusCode;
use stk_core::config::Defaults;
use stk_core::{Client, ConfigManager, Error, ObjectRef, ProfileManager, RemotePath, parse_path};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod cat;
mod completions;
mod get;
mod ls;
mod profile;
mod put;
mod rm;
mod stat;

/// stk - OpenStack Swift CLI client
///
/// Lists, reads, uploads and deletes objects in Swift accounts.
#[derive(Parser, Debug)]
#[command(name = "stk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Disable progress bars
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage account profiles
    #[command(subcommand)]
    Profile(profile::ProfileCommands),

    /// List containers or objects
    Ls(ls::LsArgs),

    /// Write object content to stdout
    Cat(cat::CatArgs),

    /// Download an object to a file
    Get(get::GetArgs),

    /// Upload a file or stdin to an object
    Put(put::PutArgs),

    /// Remove objects
    Rm(rm::RmArgs),

    /// Show object attributes and metadata
    Stat(stat::StatArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let defaults = load_defaults();
    let output_config = output_config(&cli, &defaults);

    match cli.command {
        Commands::Profile(cmd) => profile::execute(cmd, output_config),
        Commands::Ls(args) => ls::execute(args, defaults.page_size, output_config).await,
        Commands::Cat(args) => cat::execute(args, output_config).await,
        Commands::Get(args) => get::execute(args, output_config).await,
        Commands::Put(args) => put::execute(args, output_config).await,
        Commands::Rm(args) => rm::execute(args, output_config).await,
        Commands::Stat(args) => stat::execute(args, output_config).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

/// `[defaults]` from the config file; a missing or unreadable file gives built-in defaults
fn load_defaults() -> Defaults {
    match ConfigManager::new().and_then(|manager| manager.load()) {
        Ok(config) => config.defaults,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring configuration defaults");
            Defaults::default()
        }
    }
}

/// Command-line flags can only add to what the config file turns on
fn output_config(cli: &Cli, defaults: &Defaults) -> OutputConfig {
    match defaults.color.as_str() {
        "always" if !cli.no_color => {
            console::set_colors_enabled(true);
            console::set_colors_enabled_stderr(true);
        }
        _ => {}
    }

    OutputConfig {
        json: cli.json || defaults.output == "json",
        no_color: cli.no_color || defaults.color == "never",
        no_progress: cli.no_progress || !defaults.progress,
        quiet: cli.quiet,
    }
}

/// Load a profile and build an authorized client for it
fn connect(profile_name: &str, formatter: &Formatter) -> Result<Client, ExitCode> {
    let manager = ProfileManager::new().map_err(|e| {
        formatter.error(&format!("Failed to load profiles: {e}"));
        ExitCode::GeneralError
    })?;

    let profile = manager.get(profile_name).map_err(|e| {
        formatter.error(&e.to_string());
        ExitCode::from_error(&e)
    })?;

    if !profile.token().is_valid() {
        formatter.error(&format!(
            "Token for profile '{profile_name}' is missing or expired. Update it with `stk profile set`."
        ));
        return Err(ExitCode::AuthError);
    }

    tracing::debug!(profile = profile_name, endpoint = %profile.endpoint, "Connecting");
    stk_swift::connect(&profile).map_err(|e| {
        formatter.error(&format!("Failed to create client: {e}"));
        ExitCode::from_error(&e)
    })
}

/// Parse a path that must address a single object
fn parse_object_path(
    path: &str,
    formatter: &Formatter,
) -> Result<(RemotePath, ObjectRef), ExitCode> {
    let remote = parse_path(path).map_err(|e| usage_error(formatter, &e))?;
    let target = remote.object_ref().map_err(|e| usage_error(formatter, &e))?;
    Ok((remote, target))
}

fn usage_error(formatter: &Formatter, error: &Error) -> ExitCode {
    formatter.error(&error.to_string());
    ExitCode::UsageError
}

/// Report an operation that failed before a response arrived
fn report_error(formatter: &Formatter, action: &str, error: &Error) -> ExitCode {
    formatter.error(&format!("Failed to {action}: {error}"));
    ExitCode::from_error(error)
}

/// Report a non-2xx response
fn report_status(
    formatter: &Formatter,
    action: &str,
    target: &str,
    status: StatusCode,
) -> ExitCode {
    let reason = match status {
        StatusCode::NOT_FOUND => "not found".to_string(),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "access denied".to_string(),
        other => other.to_string(),
    };
    formatter.error(&format!("Failed to {action} {target}: {reason}"));
    ExitCode::from_status(status)
}
