//! ls command - List containers and items
//!
//! `profile` lists containers; `profile/container[/prefix]` lists items.

use clap::Args;
use serde::Serialize;

use sw_core::{Container, Item, ItemInfo, ListOptions, Location, Result, parse_path};

use super::{close_location, dial_profile};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// List containers or items
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Path (profile or profile/container[/prefix])
    pub path: String,

    /// Stop after this many entries
    #[arg(long)]
    pub limit: Option<usize>,

    /// Entries requested per page
    #[arg(long, default_value = "1000")]
    pub page_size: i32,
}

#[derive(Debug, Serialize)]
struct ContainersOutput {
    containers: Vec<String>,
    truncated: bool,
}

#[derive(Debug, Serialize)]
struct ItemsOutput {
    container: String,
    items: Vec<ItemInfo>,
    truncated: bool,
}

/// Execute the ls command
pub async fn execute(args: LsArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_path(&args.path) {
        Ok(p) => p,
        Err(e) => return formatter.fail("Invalid path", &e),
    };

    let (_profile, location) = match dial_profile(&path.profile, &formatter).await {
        Ok(dialed) => dialed,
        Err(code) => return code,
    };

    let prefix = (!path.prefix.is_empty()).then(|| path.prefix.clone());
    let code = match &path.container {
        None => list_containers(location.as_ref(), &args, &formatter).await,
        Some(name) => match location.container(name).await {
            Ok(container) => list_items(container.as_ref(), prefix, &args, &formatter).await,
            Err(e) => formatter.fail(&format!("Failed to open container '{name}'"), &e),
        },
    };

    close_location(location.as_ref(), &formatter).await;
    code
}

async fn list_containers(
    location: &dyn Location,
    args: &LsArgs,
    formatter: &Formatter,
) -> ExitCode {
    let mut names = Vec::new();
    let mut options = ListOptions {
        count: Some(args.page_size),
        ..Default::default()
    };

    let truncated = loop {
        let page = match location.containers(options.clone()).await {
            Ok(p) => p,
            Err(e) => return formatter.fail("Failed to list containers", &e),
        };
        names.extend(page.items.iter().map(|c| c.name().to_string()));

        if limit_reached(&mut names, args.limit) {
            break true;
        }
        match page.next_cursor {
            Some(cursor) => options.cursor = Some(cursor),
            None => break false,
        }
    };

    if formatter.is_json() {
        formatter.json(&ContainersOutput {
            containers: names,
            truncated,
        });
    } else {
        for name in &names {
            formatter.println(&format!("{name}/"));
        }
        if truncated {
            formatter.warning("Listing stopped at --limit");
        }
    }
    ExitCode::Success
}

async fn list_items(
    container: &dyn Container,
    prefix: Option<String>,
    args: &LsArgs,
    formatter: &Formatter,
) -> ExitCode {
    let (items, truncated) =
        match collect_items(container, prefix, args.page_size, args.limit).await {
            Ok(collected) => collected,
            Err(e) => return formatter.fail("Failed to list items", &e),
        };

    let infos: Vec<ItemInfo> = items.iter().map(|i| ItemInfo::from_item(i.as_ref())).collect();

    if formatter.is_json() {
        formatter.json(&ItemsOutput {
            container: container.name().to_string(),
            items: infos,
            truncated,
        });
    } else {
        let rows = infos
            .into_iter()
            .map(|info| {
                vec![
                    info.last_modified
                        .map(|t| t.strftime("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_default(),
                    info.size_human.unwrap_or_default(),
                    info.id,
                ]
            })
            .collect();
        formatter.table(&["MODIFIED", "SIZE", "ID"], rows);
        if truncated {
            formatter.warning("Listing stopped at --limit");
        }
    }
    ExitCode::Success
}

/// Walk item pages until the listing ends or `limit` entries are collected
///
/// Returns the items and whether more were available.
async fn collect_items(
    container: &dyn Container,
    prefix: Option<String>,
    page_size: i32,
    limit: Option<usize>,
) -> Result<(Vec<Box<dyn Item>>, bool)> {
    let mut items = Vec::new();
    let mut options = ListOptions {
        prefix,
        cursor: None,
        count: Some(page_size),
    };

    loop {
        let page = container.items(options.clone()).await?;
        items.extend(page.items);

        if limit_reached(&mut items, limit) {
            return Ok((items, true));
        }
        match page.next_cursor {
            Some(cursor) => options.cursor = Some(cursor),
            None => return Ok((items, false)),
        }
    }
}

/// Truncate to `limit`, reporting whether the limit was hit
fn limit_reached<T>(entries: &mut Vec<T>, limit: Option<usize>) -> bool {
    match limit {
        Some(limit) if entries.len() >= limit => {
            entries.truncate(limit);
            true
        }
        _ => false,
    }
}
