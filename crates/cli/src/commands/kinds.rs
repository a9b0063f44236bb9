//! kinds command - List registered storage kinds

use serde::Serialize;

use super::build_registry;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

#[derive(Debug, Serialize)]
struct KindsOutput {
    kinds: Vec<&'static str>,
}

/// Execute the kinds command
pub fn execute(output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let registry = match build_registry() {
        Ok(r) => r,
        Err(e) => return formatter.fail("Failed to register kinds", &e),
    };

    let kinds = registry.kinds();
    if formatter.is_json() {
        formatter.json(&KindsOutput { kinds });
    } else {
        for kind in kinds {
            formatter.println(kind);
        }
    }
    ExitCode::Success
}
