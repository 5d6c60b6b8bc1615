//! Log Rotation Job
//!
//! Walks a log directory, validates every file it finds against the directory as
//! a trusted root, and computes a rotated name for each one. By default the plan
//! is only printed; `--apply` performs the renames.
//!
//! The rotation policy comes from `--token`/`--format`, or from a JSON policy
//! file such as `{"kind": "relocate", "value": "/var/log/archive"}`.
//!
//! Usage:
//!   rotate_logs --root /var/log/app
//!   rotate_logs --root /var/log/app --token 2025-01-04 --apply
//!   rotate_logs --root /var/log/app --policy policy.json

use anyhow::{Context, Result};
use clap::Parser;
use sandbox_path::{
    split, FileProcessor, FixedClock, Pipeline, SystemClock, Transformation, TransformPolicy,
    TrustedRoot,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

struct LogDir;

#[derive(Parser)]
#[command(name = "rotate-logs")]
#[command(about = "Plan or perform timestamp rotation of log files inside a trusted directory")]
struct Cli {
    /// Log directory to rotate (becomes the trusted root)
    #[arg(short, long)]
    root: PathBuf,
    /// Only rotate files whose extension chain contains this suffix
    #[arg(long, default_value = ".log")]
    ext: String,
    /// Fixed rotation token (defaults to today's date)
    #[arg(long, conflicts_with = "policy")]
    token: Option<String>,
    /// chrono format for the token when --token is not given
    #[arg(long, default_value = "%Y-%m-%d", conflicts_with = "policy")]
    format: String,
    /// JSON file holding a TransformPolicy
    #[arg(long)]
    policy: Option<PathBuf>,
    /// Descend into subdirectories
    #[arg(long)]
    recursive: bool,
    /// Perform the renames instead of printing the plan
    #[arg(long)]
    apply: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let root_dir = absolute(&cli.root)?;
    let root = TrustedRoot::<LogDir>::try_from_path(&root_dir)
        .with_context(|| format!("using {} as the log root", root_dir.display()))?;
    let logs = Pipeline::new(root);
    let policy = load_policy(&cli)?;

    println!("Root:   {}", logs.root());
    println!("Policy: {}", policy.describe());

    let candidates = find_logs(&root_dir, &cli.ext, cli.recursive, &policy)?;
    let plan = plan_rotation(&logs, &candidates, &policy);
    for (file, reason) in &plan.skipped {
        eprintln!("skip   {file}: {reason}");
    }
    for job in &plan.moves {
        if cli.apply {
            std::fs::rename(job.source().as_str(), job.target())
                .with_context(|| format!("renaming {job}"))?;
            println!("moved  {job}");
        } else {
            println!("plan   {job}");
        }
    }

    if !cli.apply && !plan.moves.is_empty() {
        println!(
            "\n{} file(s) would be rotated; re-run with --apply to rename them.",
            plan.moves.len()
        );
    }
    Ok(())
}

/// Renames to perform, plus the files left alone and why.
struct RotationPlan {
    moves: Vec<Transformation<LogDir>>,
    skipped: Vec<(String, String)>,
}

// Every target is checked before anything is renamed: a job never overwrites an
// existing file, and two jobs never share a target.
fn plan_rotation(
    logs: &Pipeline<LogDir>,
    candidates: &[String],
    policy: &TransformPolicy,
) -> RotationPlan {
    let mut plan = RotationPlan {
        moves: Vec::new(),
        skipped: Vec::new(),
    };
    let mut claimed = HashSet::new();
    for (relative, result) in candidates
        .iter()
        .zip(logs.process_each(candidates.iter(), policy))
    {
        let job = match result {
            Ok(job) => job,
            Err(err) => {
                plan.skipped.push((relative.clone(), err.to_string()));
                continue;
            }
        };
        if job.is_noop() {
            continue;
        }
        if Path::new(job.target()).exists() {
            plan.skipped
                .push((relative.clone(), format!("{} already exists", job.target())));
            continue;
        }
        if !claimed.insert(job.target().to_owned()) {
            plan.skipped.push((
                relative.clone(),
                format!("{} is the target of another file", job.target()),
            ));
            continue;
        }
        plan.moves.push(job);
    }
    plan
}

fn load_policy(cli: &Cli) -> Result<TransformPolicy> {
    if let Some(path) = &cli.policy {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading policy {}", path.display()))?;
        return serde_json::from_str(&text)
            .with_context(|| format!("parsing policy {}", path.display()));
    }
    let policy = match &cli.token {
        Some(token) => TransformPolicy::timestamp_rotate(&FixedClock::new(token.as_str()))?,
        None => TransformPolicy::timestamp_rotate(&SystemClock {
            format: cli.format.clone(),
        })?,
    };
    Ok(policy)
}

// Relative paths (as UTF-8 strings) of the matching regular files below `root_dir`.
// Under a timestamp policy, files already carrying the token are left out.
fn find_logs(
    root_dir: &Path,
    ext: &str,
    recursive: bool,
    policy: &TransformPolicy,
) -> Result<Vec<String>> {
    let rotated_marker = match policy {
        TransformPolicy::TimestampRotate(token) => Some(format!("_{token}")),
        _ => None,
    };
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut found = Vec::new();
    for entry in WalkDir::new(root_dir).min_depth(1).max_depth(max_depth) {
        let entry = entry?;
        // Symlinks are skipped: the lexical check cannot see where they point.
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root_dir)?;
        let Some(relative) = relative.to_str() else {
            tracing::warn!(path = %entry.path().display(), "skipping non-UTF-8 file name");
            continue;
        };
        let (stem, chain) = split(relative);
        if rotated_marker
            .as_deref()
            .is_some_and(|marker| stem.ends_with(marker))
        {
            tracing::debug!(path = relative, "already rotated");
            continue;
        }
        if chain.suffixes().iter().any(|suffix| suffix == ext) {
            found.push(relative.to_owned());
        }
    }
    found.sort();
    Ok(found)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()
        .context("resolving the current directory")?
        .join(path))
}
