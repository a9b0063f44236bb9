//! Profile management commands
//!
//! A profile names a storage kind together with the options used to dial
//! it, so other commands can refer to a location by name.

use clap::Subcommand;
use serde::Serialize;

use sw_core::path::is_valid_profile_name;
use sw_core::{Profile, ProfileManager};

use super::{build_registry, config_from_options, parse_option};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Options whose values are never printed
const SECRET_OPTIONS: &[&str] = &["secret_key"];

/// Profile subcommands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Add or replace a profile
    Set(SetArgs),

    /// List all configured profiles
    List(ListArgs),

    /// Remove a profile
    Remove(RemoveArgs),
}

/// Arguments for the `profile set` command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Profile name (letters, digits, '-' and '_')
    pub name: String,

    /// Storage kind (see `sw kinds`)
    pub kind: String,

    /// Backend option as key=value, repeatable
    #[arg(short = 'o', long = "option", value_parser = parse_option)]
    pub options: Vec<(String, String)>,
}

/// Arguments for the `profile list` command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show options as well
    #[arg(short, long)]
    pub long: bool,
}

/// Arguments for the `profile remove` command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the profile to remove
    pub name: String,
}

/// Profile information for output, with secrets masked
#[derive(Debug, Serialize)]
struct ProfileInfo {
    name: String,
    kind: String,
    options: Vec<(String, String)>,
}

impl From<&Profile> for ProfileInfo {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            kind: profile.kind.clone(),
            options: profile
                .config
                .iter()
                .map(|(key, value)| {
                    let shown = if SECRET_OPTIONS.contains(&key) {
                        "********"
                    } else {
                        value
                    };
                    (key.to_string(), shown.to_string())
                })
                .collect(),
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

/// Execute a profile subcommand
pub async fn execute(cmd: ProfileCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let manager = match ProfileManager::new() {
        Ok(m) => m,
        Err(e) => return formatter.fail("Failed to locate profile file", &e),
    };

    run(cmd, &manager, &formatter)
}

fn run(cmd: ProfileCommands, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    match cmd {
        ProfileCommands::Set(args) => execute_set(args, manager, formatter),
        ProfileCommands::List(args) => execute_list(args, manager, formatter),
        ProfileCommands::Remove(args) => execute_remove(args, manager, formatter),
    }
}

fn report(formatter: &Formatter, name: &str, message: String) {
    if formatter.is_json() {
        formatter.json(&ProfileOperationOutput {
            success: true,
            profile: name.to_string(),
            message,
        });
    } else {
        formatter.success(&message);
    }
}

fn execute_set(args: SetArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    if !is_valid_profile_name(&args.name) {
        formatter.error(&format!(
            "Invalid profile name '{}': use letters, digits, '-' and '_'",
            args.name
        ));
        return ExitCode::UsageError;
    }

    let config = config_from_options(args.options);

    // Reject configs the backend would refuse before they reach disk
    let registry = match build_registry() {
        Ok(r) => r,
        Err(e) => return formatter.fail("Failed to register kinds", &e),
    };
    if let Err(e) = registry.validate(&args.kind, &config) {
        return formatter.fail(&format!("Invalid config for kind '{}'", args.kind), &e);
    }

    match manager.set(Profile::new(&args.name, &args.kind, config)) {
        Ok(()) => {
            report(
                formatter,
                &args.name,
                format!("Profile '{}' configured successfully", args.name),
            );
            ExitCode::Success
        }
        Err(e) => formatter.fail("Failed to save profile", &e),
    }
}

fn execute_list(args: ListArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    let profiles = match manager.list() {
        Ok(p) => p,
        Err(e) => return formatter.fail("Failed to load profiles", &e),
    };

    if formatter.is_json() {
        formatter.json(&ProfileListOutput {
            profiles: profiles.iter().map(ProfileInfo::from).collect(),
        });
        return ExitCode::Success;
    }

    if profiles.is_empty() {
        formatter.println("No profiles configured.");
        return ExitCode::Success;
    }

    let rows = profiles
        .iter()
        .map(ProfileInfo::from)
        .map(|info| {
            let mut row = vec![info.name, info.kind];
            if args.long {
                let options: Vec<String> = info
                    .options
                    .into_iter()
                    .map(|(key, value)| format!("{key}={value}"))
                    .collect();
                row.push(options.join(" "));
            }
            row
        })
        .collect();

    if args.long {
        formatter.table(&["NAME", "KIND", "OPTIONS"], rows);
    } else {
        formatter.table(&["NAME", "KIND"], rows);
    }
    ExitCode::Success
}

fn execute_remove(args: RemoveArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    match manager.remove(&args.name) {
        Ok(()) => {
            report(
                formatter,
                &args.name,
                format!("Profile '{}' removed successfully", args.name),
            );
            ExitCode::Success
        }
        Err(e) => formatter.fail("Failed to remove profile", &e),
    }
}
