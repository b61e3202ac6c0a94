//! rm command - Remove objects
//!
//! Each path is deleted independently; failures are reported and the
//! remaining paths are still processed.

use clap::Args;
use serde::Serialize;

use super::{connect, parse_object_path, report_error, report_status};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Remove objects
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Object path(s) to remove (profile/container/object)
    #[arg(required = true)]
    pub paths: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RmOutput {
    status: &'static str,
    deleted: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failed: Vec<String>,
    total: usize,
}

pub async fn execute(args: RmArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let mut deleted = Vec::new();
    let mut failed = Vec::new();
    let mut last_failure = ExitCode::Success;

    for path in &args.paths {
        match remove_one(path, &formatter).await {
            ExitCode::Success => {
                if !formatter.is_json() {
                    formatter.println(&format!("Removed {}", formatter.style_name(path)));
                }
                deleted.push(path.clone());
            }
            ExitCode::AuthError => return ExitCode::AuthError,
            code => {
                failed.push(path.clone());
                last_failure = code;
            }
        }
    }

    if formatter.is_json() {
        formatter.json(&RmOutput {
            status: if failed.is_empty() { "success" } else { "partial" },
            total: deleted.len(),
            deleted,
            failed,
        });
    } else if deleted.len() > 1 {
        formatter.success(&format!("Removed {} object(s).", deleted.len()));
    }

    last_failure
}

async fn remove_one(path: &str, formatter: &Formatter) -> ExitCode {
    let (remote, target) = match parse_object_path(path, formatter) {
        Ok(parsed) => parsed,
        Err(code) => return code,
    };
    let client = match connect(&remote.profile, formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    match client.delete_object(target).await {
        Ok(envelope) if envelope.is_success() => ExitCode::Success,
        Ok(envelope) => report_status(formatter, "remove", path, envelope.status()),
        Err(e) => report_error(formatter, "remove object", &e),
    }
}
