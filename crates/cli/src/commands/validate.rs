//! validate command - Check options for a kind without connecting

use clap::Args;
use serde::Serialize;

use super::{build_registry, config_from_options, parse_option};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Check options for a kind
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Storage kind (see `sw kinds`)
    pub kind: String,

    /// Backend option as key=value, repeatable
    #[arg(short = 'o', long = "option", value_parser = parse_option)]
    pub options: Vec<(String, String)>,
}

#[derive(Debug, Serialize)]
struct ValidateOutput {
    kind: String,
    valid: bool,
}

/// Execute the validate command
pub fn execute(args: ValidateArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let registry = match build_registry() {
        Ok(r) => r,
        Err(e) => return formatter.fail("Failed to register kinds", &e),
    };

    let config = config_from_options(args.options);
    if let Err(e) = registry.validate(&args.kind, &config) {
        return formatter.fail(&format!("Invalid config for kind '{}'", args.kind), &e);
    }

    if formatter.is_json() {
        formatter.json(&ValidateOutput {
            kind: args.kind,
            valid: true,
        });
    } else {
        formatter.success(&format!("Config for kind '{}' is valid", args.kind));
    }
    ExitCode::Success
}
