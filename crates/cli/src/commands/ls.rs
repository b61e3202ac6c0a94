//! ls command - List containers and objects
//!
//! `stk ls PROFILE` lists containers; `stk ls PROFILE/CONTAINER[/PREFIX]`
//! lists objects. Pages are followed with `marker` until a short page.

use clap::Args;
use serde::Serialize;
use stk_core::{
    Client, Container, ListContainersOptions, ListObjectsOptions, RemotePath, StorageObject,
    parse_path,
};

use super::{connect, report_error, report_status};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// List containers or objects
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Remote path (profile or profile/container[/prefix])
    pub path: String,

    /// Page size requested from the server [default: `page_size` from config, 1000]
    #[arg(long)]
    pub limit: Option<u32>,

    /// Start listing after this name
    #[arg(long)]
    pub marker: Option<String>,

    /// Stop listing before this name
    #[arg(long)]
    pub end_marker: Option<String>,

    /// Roll names up to this delimiter (default `/` unless --recursive)
    #[arg(long)]
    pub delimiter: Option<String>,

    /// List every object below the prefix
    #[arg(short, long)]
    pub recursive: bool,

    /// Print totals after the listing
    #[arg(long)]
    pub summarize: bool,
}

#[derive(Debug, Serialize)]
struct Summary {
    total_objects: u64,
    total_size_bytes: u64,
    total_size_human: String,
}

#[derive(Debug, Serialize)]
struct ContainersOutput {
    containers: Vec<Container>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

#[derive(Debug, Serialize)]
struct ObjectsOutput {
    objects: Vec<StorageObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

pub async fn execute(
    args: LsArgs,
    default_page_size: u32,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let limit = page_size(&args, default_page_size);

    let path = match parse_path(&args.path) {
        Ok(p) => p,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::UsageError;
        }
    };
    if limit == 0 {
        formatter.error("Page size (--limit or defaults.page_size) must be greater than zero");
        return ExitCode::UsageError;
    }

    let client = match connect(&path.profile, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if path.is_account() {
        list_containers(&client, &path, &args, limit, &formatter).await
    } else {
        list_objects(&client, &path, &args, limit, &formatter).await
    }
}

async fn list_containers(
    client: &Client,
    path: &RemotePath,
    args: &LsArgs,
    limit: u32,
    formatter: &Formatter,
) -> ExitCode {
    let mut containers: Vec<Container> = Vec::new();
    let mut marker = args.marker.clone();

    loop {
        let mut options = ListContainersOptions::new().limit(limit);
        if let Some(m) = &marker {
            options = options.marker(m);
        }
        if let Some(end) = &args.end_marker {
            options = options.end_marker(end);
        }

        let envelope = match client.list_containers(options).await {
            Ok(e) => e,
            Err(e) => return report_error(formatter, "list containers", &e),
        };
        let status = envelope.status();
        let Some(page) = envelope.into_entity() else {
            return report_status(formatter, "list containers of", &path.to_string(), status);
        };

        let short_page = page.len() < limit as usize;
        marker = page.last().map(|c| c.name().to_string());
        containers.extend(page);
        if short_page || marker.is_none() {
            break;
        }
    }

    let summary = args.summarize.then(|| Summary {
        total_objects: containers.iter().map(Container::count).sum(),
        total_size_bytes: containers.iter().map(Container::bytes).sum(),
        total_size_human: formatter.format_size(containers.iter().map(Container::bytes).sum()),
    });

    if formatter.is_json() {
        formatter.json(&ContainersOutput {
            containers,
            summary,
        });
        return ExitCode::Success;
    }

    for container in &containers {
        formatter.println(&format!(
            "[{}] {:>10} {}",
            formatter.style_date(&formatter.format_date(container.last_modified())),
            formatter.style_size(&formatter.format_size(container.bytes())),
            formatter.style_dir(&format!("{}/", container.name())),
        ));
    }
    if let Some(summary) = summary {
        formatter.println(&format!(
            "\nTotal: {} containers, {} objects, {}",
            containers.len(),
            summary.total_objects,
            summary.total_size_human
        ));
    }
    ExitCode::Success
}

async fn list_objects(
    client: &Client,
    path: &RemotePath,
    args: &LsArgs,
    limit: u32,
    formatter: &Formatter,
) -> ExitCode {
    let base = ListObjectsOptions {
        limit: Some(limit),
        end_marker: args.end_marker.clone(),
        prefix: listing_prefix(&path.object),
        delimiter: effective_delimiter(args),
        ..ListObjectsOptions::new(&path.container)
    };

    let mut objects: Vec<StorageObject> = Vec::new();
    let mut marker = args.marker.clone();

    loop {
        let options = ListObjectsOptions {
            marker: marker.clone(),
            ..base.clone()
        };

        let envelope = match client.list_objects(options).await {
            Ok(e) => e,
            Err(e) => return report_error(formatter, "list objects", &e),
        };
        let status = envelope.status();
        let Some(page) = envelope.into_entity() else {
            return report_status(formatter, "list", &path.to_string(), status);
        };

        let short_page = page.len() < limit as usize;
        marker = page.last().map(|o| o.name().to_string());
        objects.extend(page);
        if short_page || marker.is_none() {
            break;
        }
    }

    let files = objects.iter().filter(|o| !o.is_dir());
    let total_size: u64 = files.clone().filter_map(StorageObject::size).sum();
    let summary = args.summarize.then(|| Summary {
        total_objects: files.count() as u64,
        total_size_bytes: total_size,
        total_size_human: formatter.format_size(total_size),
    });

    if formatter.is_json() {
        formatter.json(&ObjectsOutput { objects, summary });
        return ExitCode::Success;
    }

    for object in &objects {
        let date = formatter.style_date(&formatter.format_date(object.last_modified()));
        if object.is_dir() {
            formatter.println(&format!(
                "[{date}] {:>10} {}",
                "PRE",
                formatter.style_dir(object.name())
            ));
        } else {
            let size = formatter.format_size(object.size().unwrap_or(0));
            formatter.println(&format!(
                "[{date}] {:>10} {}",
                formatter.style_size(&size),
                object.name()
            ));
        }
    }
    if let Some(summary) = summary {
        formatter.println(&format!(
            "\nTotal: {} objects, {}",
            summary.total_objects, summary.total_size_human
        ));
    }
    ExitCode::Success
}

/// `--limit` wins over the configured page size
fn page_size(args: &LsArgs, default_page_size: u32) -> u32 {
    args.limit.unwrap_or(default_page_size)
}

/// Treat a non-empty object part as a directory prefix
fn listing_prefix(object: &str) -> Option<String> {
    match object {
        "" => None,
        p if p.ends_with('/') => Some(p.to_string()),
        p => Some(format!("{p}/")),
    }
}

fn effective_delimiter(args: &LsArgs) -> Option<String> {
    match (&args.delimiter, args.recursive) {
        (Some(d), _) => Some(d.clone()),
        (None, true) => None,
        (None, false) => Some("/".to_string()),
    }
}
