//! SUMMARY:
//! Define error types for trusted-root construction, fragment resolution and
//! transformation-policy construction.
//!
//! OVERVIEW:
//! This module exposes the crate-wide error enum `SandboxError` and the
//! `BlockReason` tag carried by a blocked `ValidationVerdict`. Every failure in
//! this crate is deterministic and non-retryable; callers are expected to reject
//! the surrounding operation rather than substitute a default path.
//!
//! STYLE:
//! All items follow the standardized doc format with explicit sections to keep
//! behavior unambiguous for both humans and LLMs.
use std::fmt;

const MAX_ERROR_PATH_LEN: usize = 256;

// Internal helper: render error-friendly path display (truncate long values).
pub(crate) fn truncate_path_display(path: &str, max_len: usize) -> String {
    let char_count = path.chars().count();
    if char_count <= max_len {
        return path.to_owned();
    }
    let keep = max_len.saturating_sub(5) / 2;
    let start: String = path.chars().take(keep).collect();
    let mut tail_chars: Vec<char> = path.chars().rev().take(keep).collect();
    tail_chars.reverse();
    let end: String = tail_chars.into_iter().collect();
    format!("{start}...{end}")
}

fn shown(path: &str) -> String {
    truncate_path_display(path, MAX_ERROR_PATH_LEN)
}

/// SUMMARY:
/// Name why a fragment was refused.
///
/// DETAILS:
/// This is the payload of `ValidationVerdict::Blocked`. It is a plain tag so that
/// verdicts stay cheap to copy and compare; the richer `SandboxError` carries the
/// offending path for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockReason {
    /// The candidate resolves outside the trusted root.
    EscapesRoot,
    /// The fragment was empty or all whitespace.
    EmptyInput,
    /// The fragment contains characters this crate does not accept (NUL).
    NormalizationFailed,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BlockReason::EscapesRoot => "escapes root",
            BlockReason::EmptyInput => "empty input",
            BlockReason::NormalizationFailed => "normalization failed",
        };
        f.write_str(text)
    }
}

/// SUMMARY:
/// Represent errors produced by root construction, resolution and policy construction.
///
/// DETAILS:
/// Returned by `TrustedRoot::try_new`, `resolve`, `Pipeline::resolve`/`process`,
/// `SafePath` joins and the validated `TransformPolicy` constructors. Displayed
/// paths are truncated so attacker-sized inputs never bloat log lines.
///
/// VARIANTS:
/// - `EmptyInput`: The fragment was empty after trimming.
/// - `EscapesRoot`: The candidate would resolve outside the trusted root.
/// - `NormalizationFailed`: The input contains unsupported characters.
/// - `InvalidRoot`: The trusted root itself is unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SandboxError {
    /// SUMMARY:
    /// The caller-supplied fragment was empty or whitespace only.
    #[error("Path fragment is empty")]
    EmptyInput,
    /// SUMMARY:
    /// The resolved candidate lies outside the trusted root.
    ///
    /// FIELDS:
    /// - `attempted` (`String`): Normalized candidate path.
    /// - `root` (`String`): The trusted root it was checked against.
    #[error("Path '{}' escapes trusted root '{}'", shown(.attempted), shown(.root))]
    EscapesRoot { attempted: String, root: String },
    /// SUMMARY:
    /// The input cannot be normalized by this crate.
    ///
    /// FIELDS:
    /// - `input` (`String`): Offending input (lossy, truncated on display).
    /// - `reason` (`&'static str`): What was wrong with it.
    #[error("Cannot normalize {:?}: {reason}", shown(.input))]
    NormalizationFailed { input: String, reason: &'static str },
    /// SUMMARY:
    /// The trusted root is missing, relative, or malformed.
    ///
    /// FIELDS:
    /// - `root` (`String`): The attempted root.
    /// - `reason` (`&'static str`): Why it was refused.
    #[error("Invalid trusted root '{}': {reason}", shown(.root))]
    InvalidRoot { root: String, reason: &'static str },
}

impl SandboxError {
    // Internal helper: construct `EscapesRoot`.
    #[inline]
    pub(crate) fn escapes_root(attempted: impl Into<String>, root: impl Into<String>) -> Self {
        Self::EscapesRoot {
            attempted: attempted.into(),
            root: root.into(),
        }
    }

    // Internal helper: construct `NormalizationFailed`.
    #[inline]
    pub(crate) fn normalization_failed(input: impl Into<String>, reason: &'static str) -> Self {
        Self::NormalizationFailed {
            input: input.into(),
            reason,
        }
    }

    // Internal helper: construct `InvalidRoot`.
    #[inline]
    pub(crate) fn invalid_root(root: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidRoot {
            root: root.into(),
            reason,
        }
    }

    /// SUMMARY:
    /// Map this error onto the verdict tag, if it is a per-fragment rejection.
    ///
    /// RETURNS:
    /// - `Option<BlockReason>`: `None` for `InvalidRoot`, which is a configuration error.
    pub fn block_reason(&self) -> Option<BlockReason> {
        match self {
            SandboxError::EmptyInput => Some(BlockReason::EmptyInput),
            SandboxError::EscapesRoot { .. } => Some(BlockReason::EscapesRoot),
            SandboxError::NormalizationFailed { .. } => Some(BlockReason::NormalizationFailed),
            SandboxError::InvalidRoot { .. } => None,
        }
    }
}
