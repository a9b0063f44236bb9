//! stat command - Show item details
//!
//! Fetches an item by its URL through a profile and prints what the backend
//! reports about it.

use clap::Args;

use sw_core::ItemInfo;

use super::{close_location, resolve_item};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Show item details
#[derive(Args, Debug)]
pub struct StatArgs {
    /// Profile to dial
    pub profile: String,

    /// Item URL, e.g. s3://s3-us-east-1.amazonaws.com/bucket/key
    pub url: String,
}

/// Execute the stat command
pub async fn execute(args: StatArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (location, item) = match resolve_item(&args.profile, &args.url, &formatter).await {
        Ok(resolved) => resolved,
        Err(code) => return code,
    };

    let info = ItemInfo::from_item(item.as_ref());
    if formatter.is_json() {
        formatter.json(&info);
    } else {
        for line in describe(&info) {
            formatter.println(&line);
        }
    }

    close_location(location.as_ref(), &formatter).await;
    ExitCode::Success
}

/// Human-readable lines for an item
fn describe(info: &ItemInfo) -> Vec<String> {
    let mut lines = vec![
        format!("Name      : {}", info.id),
        format!("URL       : {}", info.url),
    ];
    if let Some(modified) = info.last_modified {
        lines.push(format!(
            "Date      : {}",
            modified.strftime("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    if let (Some(size), Some(human)) = (info.size_bytes, &info.size_human) {
        lines.push(format!("Size      : {human} ({size} bytes)"));
    }
    if let Some(etag) = &info.etag {
        lines.push(format!("ETag      : {etag}"));
    }

    let mut keys: Vec<&String> = info.metadata.keys().collect();
    keys.sort();
    for key in keys {
        let value = &info.metadata[key];
        let shown = value.as_str().map_or_else(|| value.to_string(), str::to_string);
        lines.push(format!("Meta      : {key}={shown}"));
    }
    lines
}
