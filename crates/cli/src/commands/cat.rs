//! cat command - Write object content to stdout
//!
//! Content is streamed chunk by chunk; nothing is buffered in memory.

use std::io::{self, Write};

use clap::Args;
use stk_core::GetObjectOptions;

use super::{connect, parse_object_path, report_error, report_status};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Write object content to stdout
#[derive(Args, Debug)]
pub struct CatArgs {
    /// Object path (profile/container/object)
    pub path: String,
}

pub async fn execute(args: CatArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (remote, target) = match parse_object_path(&args.path, &formatter) {
        Ok(parsed) => parsed,
        Err(code) => return code,
    };
    let client = match connect(&remote.profile, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let mut stdout = io::stdout();
    let options = GetObjectOptions::new(target)
        .with_sink(move |chunk: &[u8]| -> io::Result<()> { stdout.write_all(chunk) });

    let result = client.get_object_content(options).await;
    if let Err(e) = io::stdout().flush() {
        formatter.error(&format!("Failed to write to stdout: {e}"));
        return ExitCode::GeneralError;
    }

    match result {
        Ok(envelope) if envelope.is_success() => ExitCode::Success,
        Ok(envelope) => report_status(&formatter, "read", &args.path, envelope.status()),
        Err(e) => report_error(&formatter, "read object", &e),
    }
}
