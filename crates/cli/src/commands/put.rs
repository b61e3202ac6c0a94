//! put command - Upload a file or stdin to an object
//!
//! The content type is either given, guessed from the file name, or left to
//! the server to detect. The reloaded object is printed afterwards.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Args;
use futures::TryStreamExt;
use serde::Serialize;
use stk_core::{Content, CreateObjectOptions, RemotePath, StorageObject};

use super::{connect, report_error, report_status};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Upload a file or stdin to an object
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Source file, or `-` for stdin
    pub source: String,

    /// Destination (profile/container/object, or profile/container/prefix/)
    pub path: String,

    /// Content type to store
    #[arg(long, conflicts_with = "guess_type")]
    pub content_type: Option<String>,

    /// Guess the content type from the file name
    #[arg(long)]
    pub guess_type: bool,

    /// User metadata as KEY=VALUE (repeatable)
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_meta)]
    pub meta: Vec<(String, String)>,
}

#[derive(Debug, Serialize)]
struct PutOutput {
    status: &'static str,
    source: String,
    target: String,
    object: StorageObject,
}

pub async fn execute(args: PutArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let remote = match resolve_target(&args.source, &args.path) {
        Ok(r) => r,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            return ExitCode::UsageError;
        }
    };
    let target = match remote.object_ref() {
        Ok(t) => t,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::UsageError;
        }
    };

    let (content, size) = match open_source(&args.source).await {
        Ok(opened) => opened,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            return ExitCode::GeneralError;
        }
    };

    let client = match connect(&remote.profile, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let progress = ProgressBar::new(formatter.config(), size, &target.object);
    let content = track_progress(content, size, &progress);

    let mut options = CreateObjectOptions::new(target.clone(), content);
    if let Some(content_type) = content_type_for(&args, &target.object) {
        options = options.content_type(content_type);
    }
    for (key, value) in &args.meta {
        options = options.meta(key, value);
    }

    let result = client.create_object(options).await;
    progress.finish_and_clear();

    let envelope = match result {
        Ok(e) => e,
        Err(e) => return report_error(&formatter, "upload object", &e),
    };
    let status = envelope.status();
    let Some(object) = envelope.into_entity() else {
        return report_status(&formatter, "upload", &remote.to_string(), status);
    };

    if formatter.is_json() {
        formatter.json(&PutOutput {
            status: "success",
            source: args.source,
            target: remote.to_string(),
            object,
        });
    } else {
        formatter.success(&format!(
            "{} -> {} ({}, {})",
            args.source,
            remote,
            formatter.format_size(object.size().unwrap_or(0)),
            object.content_type().unwrap_or("unknown type"),
        ));
        if let Some(etag) = object.etag() {
            formatter.println(&format!("{} : {etag}", formatter.style_key("ETag")));
        }
    }
    ExitCode::Success
}

/// Destination path, with the source file name appended for `prefix/` targets
fn resolve_target(source: &str, path: &str) -> anyhow::Result<RemotePath> {
    let remote = stk_core::parse_path(path)?;
    if !remote.is_dir() {
        return Ok(remote);
    }
    if remote.is_account() {
        bail!("'{path}' does not name a container");
    }
    if source == "-" {
        bail!("An object name is required when uploading from stdin");
    }
    let file_name = Path::new(source)
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Cannot derive an object name from '{source}'"))?;
    Ok(remote.join(file_name))
}

/// Open the upload source; the size is known for regular files only
async fn open_source(source: &str) -> anyhow::Result<(Content, Option<u64>)> {
    if source == "-" {
        return Ok((Content::from_reader(tokio::io::stdin()), None));
    }

    let path = PathBuf::from(source);
    let file = tokio::fs::File::open(&path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let metadata = file
        .metadata()
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if !metadata.is_file() {
        bail!("{} is not a regular file", path.display());
    }

    let len = metadata.len();
    Ok((Content::from_reader(file).with_length(len), Some(len)))
}

/// Advance the progress bar as chunks are pulled by the transport
fn track_progress(content: Content, size: Option<u64>, progress: &ProgressBar) -> Content {
    let Some(bar) = progress.handle() else {
        return content;
    };
    let stream = match content {
        Content::Stream { stream, .. } => stream,
        inline => return inline,
    };

    let tracked = Content::from_stream(stream.inspect_ok(move |chunk| bar.inc(chunk.len() as u64)));
    match size {
        Some(len) => tracked.with_length(len),
        None => tracked,
    }
}

fn content_type_for(args: &PutArgs, object: &str) -> Option<String> {
    if let Some(content_type) = &args.content_type {
        return Some(content_type.clone());
    }
    if !args.guess_type {
        return None;
    }
    let name = if args.source == "-" { object } else { args.source.as_str() };
    mime_guess::from_path(name).first_raw().map(str::to_string)
}

fn parse_meta(value: &str) -> anyhow::Result<(String, String)> {
    let Some((key, val)) = value.split_once('=') else {
        bail!("expected KEY=VALUE, got '{value}'");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("metadata key cannot be empty");
    }
    Ok((key.to_string(), val.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_args(source: &str) -> PutArgs {
        PutArgs {
            source: source.to_string(),
            path: "prod/docs/".to_string(),
            content_type: None,
            guess_type: false,
            meta: Vec::new(),
        }
    }

    #[test]
    fn test_resolve_target_appends_file_name() {
        let remote = resolve_target("/tmp/report.pdf", "prod/docs/2024/").unwrap();
        assert_eq!(remote.to_string(), "prod/docs/2024/report.pdf");

        let remote = resolve_target("notes.txt", "prod/docs").unwrap();
        assert_eq!(remote.object, "notes.txt");

        let remote = resolve_target("notes.txt", "prod/docs/renamed.txt").unwrap();
        assert_eq!(remote.object, "renamed.txt");
    }

    #[test]
    fn test_resolve_target_stdin_needs_name() {
        assert!(resolve_target("-", "prod/docs/").is_err());
        assert!(resolve_target("-", "prod/docs/log.txt").is_ok());
        assert!(resolve_target("a.txt", "prod").is_err());
    }

    #[test]
    fn test_parse_meta() {
        assert_eq!(
            parse_meta("Color=red").unwrap(),
            ("Color".to_string(), "red".to_string())
        );
        assert_eq!(parse_meta("Note=a=b").unwrap().1, "a=b");
        assert_eq!(parse_meta("Empty=").unwrap().1, "");
        assert!(parse_meta("novalue").is_err());
        assert!(parse_meta("=x").is_err());
    }

    #[test]
    fn test_content_type_selection() {
        let mut args = put_args("photo.png");
        assert_eq!(content_type_for(&args, "photo.png"), None);

        args.guess_type = true;
        assert_eq!(
            content_type_for(&args, "photo.png").as_deref(),
            Some("image/png")
        );

        let mut stdin = put_args("-");
        stdin.guess_type = true;
        assert_eq!(
            content_type_for(&stdin, "data.json").as_deref(),
            Some("application/json")
        );

        let mut explicit = put_args("photo.png");
        explicit.content_type = Some("text/plain".into());
        assert_eq!(
            content_type_for(&explicit, "photo.png").as_deref(),
            Some("text/plain")
        );
    }

    #[tokio::test]
    async fn test_open_source_reports_length() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"12345").unwrap();

        let (content, size) = open_source(file.to_str().unwrap()).await.unwrap();
        assert_eq!(size, Some(5));
        let body = content.into_body();
        assert_eq!(body.content_length(), Some(5));
        assert_eq!(&body.collect().await.unwrap()[..], b"12345");

        assert!(open_source(dir.path().to_str().unwrap()).await.is_err());
    }
}
