//! Profile management commands
//!
//! Profiles name a Swift account: storage URL, token and transport settings.

use clap::Subcommand;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use jiff::Timestamp;
use serde::Serialize;
use stk_core::{Error, Profile, ProfileManager, TimeoutConfig};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Add or update a profile
    Set(SetArgs),

    /// List configured profiles
    List(ListArgs),

    /// Remove a profile
    Remove(RemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Profile name (letters, digits, `-` and `_`)
    pub name: String,

    /// Account storage URL, e.g. https://swift.example.com/v1/AUTH_demo
    pub endpoint: String,

    /// Auth token sent as X-Auth-Token
    pub token: String,

    /// Token expiry as an RFC 3339 timestamp
    #[arg(long, value_parser = parse_timestamp)]
    pub expires_at: Option<Timestamp>,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// Connection timeout in milliseconds
    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,

    /// Read timeout in milliseconds
    #[arg(long)]
    pub read_timeout_ms: Option<u64>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show a table with token state and settings
    #[arg(short, long)]
    pub long: bool,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    pub name: String,
}

/// Profile summary for output; never includes the token itself
#[derive(Debug, Serialize)]
struct ProfileInfo {
    name: String,
    endpoint: String,
    token_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_expires_at: Option<Timestamp>,
    insecure: bool,
}

impl From<&Profile> for ProfileInfo {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            endpoint: profile.endpoint.clone(),
            token_valid: profile.token().is_valid(),
            token_expires_at: profile.token_expires_at,
            insecure: profile.insecure,
        }
    }
}

#[derive(Debug, Serialize)]
struct ProfileListOutput {
    profiles: Vec<ProfileInfo>,
}

#[derive(Debug, Serialize)]
struct ProfileOperationOutput {
    success: bool,
    profile: String,
    message: String,
}

pub fn execute(cmd: ProfileCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let manager = match ProfileManager::new() {
        Ok(m) => m,
        Err(e) => {
            formatter.error(&format!("Failed to load profiles: {e}"));
            return ExitCode::GeneralError;
        }
    };

    match cmd {
        ProfileCommands::Set(args) => execute_set(args, &manager, &formatter),
        ProfileCommands::List(args) => execute_list(args, &manager, &formatter),
        ProfileCommands::Remove(args) => execute_remove(args, &manager, &formatter),
    }
}

fn execute_set(args: SetArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    if !stk_core::path::is_valid_profile_name(&args.name) {
        formatter.error(&format!(
            "Invalid profile name '{}'. Use letters, digits, '-' and '_'.",
            args.name
        ));
        return ExitCode::UsageError;
    }
    if args.token.is_empty() {
        formatter.error("Token cannot be empty");
        return ExitCode::UsageError;
    }

    let name = args.name.clone();
    let profile = build_profile(args);

    if !profile.token().is_valid() {
        formatter.warning(&format!("Token for '{name}' has already expired"));
    }

    match manager.set(profile) {
        Ok(()) => {
            let message = format!("Profile '{name}' configured successfully");
            print_operation(formatter, &name, &message);
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from_error(&e)
        }
    }
}

fn build_profile(args: SetArgs) -> Profile {
    let mut profile = Profile::new(args.name, args.endpoint, args.token);
    profile.token_expires_at = args.expires_at;
    profile.insecure = args.insecure;

    if args.connect_timeout_ms.is_some() || args.read_timeout_ms.is_some() {
        let defaults = TimeoutConfig::default();
        profile.timeout = Some(TimeoutConfig {
            connect_ms: args.connect_timeout_ms.unwrap_or(defaults.connect_ms),
            read_ms: args.read_timeout_ms.unwrap_or(defaults.read_ms),
        });
    }
    profile
}

fn execute_list(args: ListArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    let profiles = match manager.list() {
        Ok(p) => p,
        Err(e) => {
            formatter.error(&format!("Failed to load profiles: {e}"));
            return ExitCode::GeneralError;
        }
    };

    if formatter.is_json() {
        formatter.json(&ProfileListOutput {
            profiles: profiles.iter().map(ProfileInfo::from).collect(),
        });
    } else if profiles.is_empty() {
        formatter.println("No profiles configured.");
    } else if args.long {
        formatter.println(&profile_table(&profiles).to_string());
    } else {
        for profile in &profiles {
            formatter.println(&format!(
                "{:<12} {}",
                formatter.style_name(&profile.name),
                profile.endpoint
            ));
        }
    }
    ExitCode::Success
}

fn profile_table(profiles: &[Profile]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Name", "Endpoint", "Token", "Expires", "Insecure"]);

    for profile in profiles {
        let info = ProfileInfo::from(profile);
        table.add_row(vec![
            info.name,
            info.endpoint,
            if info.token_valid { "valid" } else { "expired" }.to_string(),
            info.token_expires_at
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string()),
            if info.insecure { "yes" } else { "no" }.to_string(),
        ]);
    }
    table
}

fn execute_remove(args: RemoveArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    match manager.remove(&args.name) {
        Ok(()) => {
            let message = format!("Profile '{}' removed successfully", args.name);
            print_operation(formatter, &args.name, &message);
            ExitCode::Success
        }
        Err(Error::ProfileNotFound(_)) => {
            formatter.error(&format!("Profile '{}' not found", args.name));
            ExitCode::NotFound
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from_error(&e)
        }
    }
}

fn print_operation(formatter: &Formatter, profile: &str, message: &str) {
    if formatter.is_json() {
        formatter.json(&ProfileOperationOutput {
            success: true,
            profile: profile.to_string(),
            message: message.to_string(),
        });
    } else {
        formatter.success(message);
    }
}

fn parse_timestamp(value: &str) -> anyhow::Result<Timestamp> {
    value.parse::<Timestamp>().map_err(|e| {
        anyhow::anyhow!("expected an RFC 3339 timestamp like 2030-01-01T00:00:00Z: {e}")
    })
}
