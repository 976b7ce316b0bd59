//! Nephra: Kidney function estimation from labs or patient profiles.
//!
//! Reads an assessment request (or an array of them) as JSON from a file or
//! stdin and writes the assessment JSON to stdout.
//!
//! # Usage
//!
//! ```bash
//! nephra [<request.json>] [--pretty]
//! ```
//!
//! Requests in one batch share a history store, so a later request with the
//! same `patient_id` sees the estimates of the earlier ones.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nephra::adapters::memory::InMemoryHistoryStore;
use nephra::adapters::sanitize::SanitizingMakeWriter;
use nephra::application::{AssessmentConfig, AssessmentService};
use nephra::request::AssessmentRequest;

#[derive(Deserialize)]
#[serde(untagged)]
enum Input {
    Batch(Vec<AssessmentRequest>),
    Single(Box<AssessmentRequest>),
}

struct Args {
    input: Option<PathBuf>,
    pretty: bool,
}

fn usage() -> String {
    "Usage: nephra [<request.json>] [--pretty]\n\nReads from stdin when no file is given.".to_string()
}

fn parse_args() -> Result<Args> {
    let mut input = None;
    let mut pretty = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--pretty" => pretty = true,
            "-h" | "--help" => {
                println!("{}", usage());
                std::process::exit(0);
            }
            other if other.starts_with('-') => bail!("Unknown option {other}\n{}", usage()),
            other => {
                if input.is_some() {
                    bail!("Only one input file may be given\n{}", usage());
                }
                input = Some(PathBuf::from(other));
            }
        }
    }

    Ok(Args { input, pretty })
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn main() -> Result<()> {
    let args = parse_args()?;

    // stdout carries the assessment JSON, so logs go to stderr or a file.
    let (writer, _guard) = match std::env::var("NEPHRA_LOG_FILE") {
        Ok(log_file) => {
            if let Some(parent) = std::path::Path::new(&log_file).parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_file)
                .with_context(|| format!("Failed to open log file {log_file}"))?;
            tracing_appender::non_blocking(file)
        }
        Err(_) => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    let raw = read_input(args.input.as_ref())?;
    let input: Input = serde_json::from_str(&raw).context("Invalid request JSON")?;

    let config = AssessmentConfig::from_env_or_default();
    tracing::debug!(
        "History limit {}, persist results {}",
        config.history_limit,
        config.persist_results
    );
    let service = AssessmentService::new(Arc::new(InMemoryHistoryStore::new()), config);

    let output = match input {
        Input::Single(request) => serde_json::to_value(service.assess(&request)?)?,
        Input::Batch(requests) => {
            let assessments = requests
                .iter()
                .enumerate()
                .map(|(i, request)| {
                    service
                        .assess(request)
                        .with_context(|| format!("Request {i} failed"))
                })
                .collect::<Result<Vec<_>>>()?;
            serde_json::to_value(assessments)?
        }
    };

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");

    Ok(())
}
