//! stat command - Show object attributes and user metadata
//!
//! Uses a HEAD request, so no content is transferred.

use clap::Args;
use stk_core::StorageObject;

use super::{connect, parse_object_path, report_error, report_status};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Show object attributes and metadata
#[derive(Args, Debug)]
pub struct StatArgs {
    /// Object path (profile/container/object)
    pub path: String,
}

pub async fn execute(args: StatArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (remote, target) = match parse_object_path(&args.path, &formatter) {
        Ok(parsed) => parsed,
        Err(code) => return code,
    };
    let client = match connect(&remote.profile, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let envelope = match client.get_object_metadata(target).await {
        Ok(e) => e,
        Err(e) => return report_error(&formatter, "stat object", &e),
    };
    let status = envelope.status();
    let Some(object) = envelope.into_entity() else {
        return report_status(&formatter, "stat", &args.path, status);
    };

    if formatter.is_json() {
        formatter.json(&object);
    } else {
        for line in describe(&object, &formatter) {
            formatter.println(&line);
        }
    }
    ExitCode::Success
}

fn describe(object: &StorageObject, formatter: &Formatter) -> Vec<String> {
    let field = |key: &str, value: String| {
        format!("{} : {value}", formatter.style_key(&format!("{key:<9}")))
    };

    let mut lines = vec![
        field("Name", object.name().to_string()),
        field("Container", object.container().to_string()),
    ];
    if let Some(size) = object.size() {
        lines.push(field("Size", format!("{} ({size} bytes)", formatter.format_size(size))));
    }
    if let Some(content_type) = object.content_type() {
        lines.push(field("Type", content_type.to_string()));
    }
    if let Some(etag) = object.etag() {
        lines.push(field("ETag", etag.to_string()));
    }
    if let Some(modified) = object.last_modified() {
        lines.push(field("Date", modified.strftime("%Y-%m-%d %H:%M:%S UTC").to_string()));
    }
    if !object.metadata().is_empty() {
        lines.push(field("Metadata", String::new()));
        for (key, value) in object.metadata() {
            lines.push(format!("  {key}: {value}"));
        }
    }
    lines
}
