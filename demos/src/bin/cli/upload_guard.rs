//! Upload Guard
//!
//! Checks untrusted upload paths against a trusted root before anything touches
//! the filesystem. Fragments come from the command line or from a manifest file
//! (one per line), the way an upload layer receives them from clients. Every
//! verdict is printed; the process exits non-zero when any fragment is blocked.
//!
//! Usage:
//!   upload_guard --root /srv/uploads reports/2025.pdf ../../etc/passwd
//!   upload_guard --root /srv/uploads --manifest incoming.txt --json

use anyhow::{bail, Context, Result};
use clap::Parser;
use sandbox_path::{Pipeline, TrustedRoot, ValidationVerdict};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

struct Uploads;

#[derive(Parser)]
#[command(name = "upload-guard")]
#[command(about = "Validate untrusted upload paths against a trusted root")]
struct Cli {
    /// Trusted upload root (absolute)
    #[arg(short, long)]
    root: TrustedRoot<()>,
    /// Read fragments from this file, one per line
    #[arg(short, long)]
    manifest: Option<PathBuf>,
    /// Print one JSON object per fragment instead of text
    #[arg(long)]
    json: bool,
    /// Fragments to check
    fragments: Vec<String>,
}

#[derive(Serialize)]
struct Report<'a> {
    fragment: &'a str,
    safe: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let fragments = collect_fragments(&cli)?;
    if fragments.is_empty() {
        bail!("no fragments given (pass them as arguments or with --manifest)");
    }

    let uploads: Pipeline<Uploads> = Pipeline::new(cli.root.change_marker());
    let mut blocked = 0usize;

    for fragment in &fragments {
        let verdict = uploads.check(fragment);
        if !verdict.is_safe() {
            blocked += 1;
        }
        if cli.json {
            let report = Report {
                fragment,
                safe: verdict.is_safe(),
                path: verdict.safe_path(),
                reason: verdict.reason().map(|reason| reason.to_string()),
            };
            println!("{}", serde_json::to_string(&report)?);
        } else {
            match &verdict {
                ValidationVerdict::Safe(path) => println!("SAFE     {fragment:?} -> {path}"),
                ValidationVerdict::Blocked(reason) => println!("BLOCKED  {fragment:?} ({reason})"),
            }
        }
    }

    if !cli.json {
        println!(
            "\n{} checked, {} safe, {} blocked under {}",
            fragments.len(),
            fragments.len() - blocked,
            blocked,
            uploads.root()
        );
    }

    Ok(if blocked == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn collect_fragments(cli: &Cli) -> Result<Vec<String>> {
    let mut fragments = cli.fragments.clone();
    if let Some(manifest) = &cli.manifest {
        let text = std::fs::read_to_string(manifest)
            .with_context(|| format!("reading manifest {}", manifest.display()))?;
        // Blank lines are separators here, not empty fragments.
        fragments.extend(
            text.lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_owned),
        );
    }
    Ok(fragments)
}
