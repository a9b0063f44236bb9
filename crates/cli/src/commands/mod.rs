//! CLI command definitions and execution
//!
//! Every command that touches storage resolves a profile, dials it through
//! the kind registry and then talks to the resulting location.

use clap::{Parser, Subcommand};
use url::Url;

use sw_core::{ConfigMap, Error, Item, Location, Profile, ProfileManager, Registry, Result};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod cat;
mod completions;
mod kinds;
mod ls;
mod profile;
mod stat;
mod validate;

/// sw - storage kinds behind one interface
///
/// Dial S3 and S3-compatible stores through named profiles, list containers
/// and items, and fetch items by URL.
#[derive(Parser, Debug)]
#[command(name = "sw")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage named profiles
    #[command(subcommand)]
    Profile(profile::ProfileCommands),

    /// List registered storage kinds
    Kinds,

    /// Check options for a kind without connecting
    Validate(validate::ValidateArgs),

    /// List containers or items
    Ls(ls::LsArgs),

    /// Show item details by URL
    Stat(stat::StatArgs),

    /// Write item contents to stdout by URL
    Cat(cat::CatArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Profile(cmd) => profile::execute(cmd, output_config).await,
        Commands::Kinds => kinds::execute(output_config),
        Commands::Validate(args) => validate::execute(args, output_config),
        Commands::Ls(args) => ls::execute(args, output_config).await,
        Commands::Stat(args) => stat::execute(args, output_config).await,
        Commands::Cat(args) => cat::execute(args, output_config).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Registry holding every backend compiled into the binary
pub fn build_registry() -> Result<Registry> {
    let mut registry = Registry::new();
    sw_s3::register(&mut registry)?;
    sw_unionmeta::register(&mut registry)?;
    Ok(registry)
}

/// Parse a `key=value` option
pub(crate) fn parse_option(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid option '{raw}', expected key=value")),
    }
}

/// Collect parsed options into a config map
pub(crate) fn config_from_options(options: Vec<(String, String)>) -> ConfigMap {
    options.into_iter().collect()
}

/// Load a profile and dial its location
///
/// Failures are reported through the formatter; the caller only needs the
/// exit code.
pub(crate) async fn dial_profile(
    name: &str,
    formatter: &Formatter,
) -> std::result::Result<(Profile, Box<dyn Location>), ExitCode> {
    let profile = ProfileManager::new()
        .and_then(|manager| manager.get(name))
        .map_err(|e| formatter.fail("Failed to load profile", &e))?;

    let registry = build_registry().map_err(|e| formatter.fail("Failed to register kinds", &e))?;

    let location = registry
        .dial(&profile.kind, &profile.config)
        .await
        .map_err(|e| formatter.fail(&format!("Failed to dial profile '{name}'"), &e))?;

    Ok((profile, location))
}

/// Dial a profile and fetch the item a URL points at
///
/// The URL's scheme must resolve to the profile's kind, so a `unionmeta`
/// URL is never handed to a plain `s3` profile.
pub(crate) async fn resolve_item(
    profile_name: &str,
    raw_url: &str,
    formatter: &Formatter,
) -> std::result::Result<(Box<dyn Location>, Box<dyn Item>), ExitCode> {
    let url = Url::parse(raw_url)
        .map_err(|e| Error::InvalidUrl(format!("{raw_url}: {e}")))
        .map_err(|e| formatter.fail("Invalid URL", &e))?;

    let kind = build_registry()
        .and_then(|registry| registry.match_url(&url))
        .map_err(|e| formatter.fail("Cannot resolve URL", &e))?;

    let (profile, location) = dial_profile(profile_name, formatter).await?;
    if profile.kind != kind {
        formatter.error(&format!(
            "URL scheme '{kind}' does not match profile '{}' of kind '{}'",
            profile.name, profile.kind
        ));
        close_location(location.as_ref(), formatter).await;
        return Err(ExitCode::UsageError);
    }

    match location.item_by_url(&url).await {
        Ok(item) => Ok((location, item)),
        Err(e) => {
            let code = formatter.fail(&format!("Failed to fetch {url}"), &e);
            close_location(location.as_ref(), formatter).await;
            Err(code)
        }
    }
}

/// Close a location, reporting but not failing on errors
pub(crate) async fn close_location(location: &dyn Location, formatter: &Formatter) {
    if let Err(e) = location.close().await {
        formatter.warning(&format!("Failed to close location: {e}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_registry() {
        let registry = build_registry().unwrap();
        assert_eq!(registry.kinds(), vec!["s3", "unionmeta"]);
    }

    #[test]
    fn test_parse_option() {
        assert_eq!(
            parse_option("region=eu-west-1").unwrap(),
            ("region".to_string(), "eu-west-1".to_string())
        );
        assert_eq!(
            parse_option("secret_key=a=b").unwrap(),
            ("secret_key".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_option("endpoint=").unwrap(),
            ("endpoint".to_string(), String::new())
        );
        assert!(parse_option("region").is_err());
        assert!(parse_option("=value").is_err());
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["sw", "--json", "--debug", "kinds"]).unwrap();
        assert!(cli.json);
        assert!(cli.debug);
        assert!(matches!(cli.command, Commands::Kinds));
    }
}
