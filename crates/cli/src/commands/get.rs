//! get command - Download an object to a local file
//!
//! The object's size is read with a HEAD request first so the progress bar
//! has a total. Content is streamed into a temp file beside the destination,
//! which replaces the destination only once the download succeeded.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use clap::Args;
use tempfile::{NamedTempFile, TempPath};
use serde::Serialize;
use stk_core::{GetObjectOptions, ObjectRef};

use super::{connect, parse_object_path, report_error, report_status};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Download an object to a file
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Object path (profile/container/object)
    pub path: String,

    /// Destination file or directory
    pub destination: PathBuf,
}

#[derive(Debug, Serialize)]
struct GetOutput {
    status: &'static str,
    source: String,
    target: String,
    size_bytes: u64,
    size_human: String,
}

pub async fn execute(args: GetArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (remote, target) = match parse_object_path(&args.path, &formatter) {
        Ok(parsed) => parsed,
        Err(code) => return code,
    };
    let client = match connect(&remote.profile, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let size = match client.get_object_metadata(target.clone()).await {
        Ok(envelope) => match envelope.entity() {
            Some(object) => object.size(),
            None => return report_status(&formatter, "stat", &args.path, envelope.status()),
        },
        Err(e) => return report_error(&formatter, "stat object", &e),
    };

    let destination = resolve_destination(&args.destination, &target);
    let (temp_path, writer) = match create_partial(&destination) {
        Ok(parts) => parts,
        Err(e) => {
            formatter.error(&format!(
                "Failed to create a file next to {}: {e}",
                destination.display()
            ));
            return ExitCode::GeneralError;
        }
    };

    let progress = ProgressBar::new(formatter.config(), size, &target.object);
    let bar = progress.handle();
    let sink_writer = Arc::clone(&writer);
    let options = GetObjectOptions::new(target).with_sink(move |chunk: &[u8]| -> io::Result<()> {
        lock(&sink_writer)?.write_all(chunk)?;
        if let Some(bar) = &bar {
            bar.inc(chunk.len() as u64);
        }
        Ok(())
    });

    let result = client.get_object_content(options).await;
    progress.finish_and_clear();

    let code = match result {
        Ok(envelope) if envelope.is_success() => ExitCode::Success,
        Ok(envelope) => report_status(&formatter, "download", &args.path, envelope.status()),
        Err(e) => report_error(&formatter, "download object", &e),
    };
    if code != ExitCode::Success {
        discard_partial(temp_path);
        return code;
    }

    if let Err(e) = lock(&writer).and_then(|mut w| w.flush()) {
        formatter.error(&format!("Failed to write {}: {e}", destination.display()));
        discard_partial(temp_path);
        return ExitCode::GeneralError;
    }
    drop(writer);
    if let Err(e) = temp_path.persist(&destination) {
        formatter.error(&format!("Failed to move download to {}: {e}", destination.display()));
        discard_partial(e.path);
        return ExitCode::GeneralError;
    }

    let written = std::fs::metadata(&destination).map(|m| m.len()).unwrap_or(0);
    if formatter.is_json() {
        formatter.json(&GetOutput {
            status: "success",
            source: args.path,
            target: destination.display().to_string(),
            size_bytes: written,
            size_human: formatter.format_size(written),
        });
    } else {
        formatter.success(&format!(
            "{} -> {} ({})",
            args.path,
            destination.display(),
            formatter.format_size(written)
        ));
    }
    ExitCode::Success
}

/// Temp file in the destination's directory, so the final rename stays on one filesystem
fn create_partial(destination: &Path) -> io::Result<(TempPath, Arc<Mutex<BufWriter<File>>>)> {
    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let (file, path) = NamedTempFile::new_in(parent)?.into_parts();
    Ok((path, Arc::new(Mutex::new(BufWriter::new(file)))))
}

fn lock(writer: &Mutex<BufWriter<File>>) -> io::Result<MutexGuard<'_, BufWriter<File>>> {
    writer
        .lock()
        .map_err(|_| io::Error::other("download writer poisoned"))
}

fn discard_partial(path: TempPath) {
    let path_str = path.display().to_string();
    if let Err(e) = path.close() {
        tracing::warn!(path = %path_str, error = %e, "Failed to remove partial download");
    }
}

/// Directories receive the object's last path component as file name
fn resolve_destination(destination: &Path, target: &ObjectRef) -> PathBuf {
    if destination.is_dir() {
        let name = target
            .object
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&target.object);
        destination.join(name)
    } else {
        destination.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_destination_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = ObjectRef::new("photos", "2024/01/cat.jpg");
        assert_eq!(
            resolve_destination(dir.path(), &target),
            dir.path().join("cat.jpg")
        );
    }

    #[test]
    fn test_discarded_partial_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("report.pdf");
        std::fs::write(&destination, b"previous").unwrap();

        let (temp_path, writer) = create_partial(&destination).unwrap();
        lock(&writer).unwrap().write_all(b"half a downl").unwrap();
        lock(&writer).unwrap().flush().unwrap();
        let partial = temp_path.to_path_buf();
        assert_eq!(partial.parent(), Some(dir.path()));

        drop(writer);
        discard_partial(temp_path);
        assert!(!partial.exists());
        assert_eq!(std::fs::read(&destination).unwrap(), b"previous");
    }

    #[test]
    fn test_persisted_partial_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("report.pdf");
        std::fs::write(&destination, b"previous").unwrap();

        let (temp_path, writer) = create_partial(&destination).unwrap();
        lock(&writer).unwrap().write_all(b"new content").unwrap();
        lock(&writer).unwrap().flush().unwrap();
        drop(writer);
        temp_path.persist(&destination).unwrap();

        assert_eq!(std::fs::read(&destination).unwrap(), b"new content");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_resolve_destination_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("out.bin");
        let target = ObjectRef::new("photos", "cat.jpg");
        assert_eq!(resolve_destination(&file, &target), file);
    }
}
