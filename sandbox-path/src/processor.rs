//! SUMMARY:
//! Compute new target paths for validated files: rewrite the extension, relocate
//! into another directory, or rotate with a timestamp token.
//!
//! DETAILS:
//! Every policy is a pure function of the original path. None of them touch the
//! filesystem; the caller performs the actual move or copy. The shipped set is
//! the closed `TransformPolicy` enum. `FileProcessor` is the seam a `Pipeline`
//! consumes, so callers can still plug in their own processor type.
use crate::extension::split;
use crate::normalize::{is_separator, LexicalPath};
use crate::{Result, SandboxError};
use std::fmt;

/// Joins stem and timestamp token in rotated names (`app_2025-01-04.log`).
pub const ROTATION_SEPARATOR: char = '_';

/// Token format used by `SystemClock::default()`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d";

/// SUMMARY:
/// Compute a target path from a validated original path.
pub trait FileProcessor {
    /// SUMMARY:
    /// Return the target path for `original_path`. Pure and total: inputs with no
    /// file name (`/`, `.`) come back normalized and otherwise unchanged.
    fn apply(&self, original_path: &str) -> String;

    /// Human-readable summary for logs and CLI output.
    fn describe(&self) -> String;
}

/// SUMMARY:
/// Supply the timestamp token for `TransformPolicy::TimestampRotate`.
///
/// DETAILS:
/// The clock is read once, when the policy is built, so `apply` stays pure and a
/// batch rotated with one policy shares one token.
pub trait Clock {
    fn token(&self) -> String;
}

/// A clock that always returns the same token. Handy for tests and replays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedClock(pub String);

impl FixedClock {
    #[inline]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl Clock for FixedClock {
    fn token(&self) -> String {
        self.0.clone()
    }
}

/// Local wall-clock time rendered with a `chrono` format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemClock {
    pub format: String,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            format: DEFAULT_TIMESTAMP_FORMAT.to_owned(),
        }
    }
}

impl Clock for SystemClock {
    fn token(&self) -> String {
        chrono::Local::now().format(&self.format).to_string()
    }
}

/// SUMMARY:
/// The shipped filename transformations.
///
/// VARIANTS:
/// - `ExtensionRewrite(suffix)`: Replace the final extension suffix (append when
///   there is none; an empty suffix removes it). Directory and stem unchanged.
/// - `Relocate(target_dir)`: Keep the file name, move it under `target_dir`.
/// - `TimestampRotate(token)`: Insert `_<token>` between stem and first suffix.
///
/// DETAILS:
/// Prefer the validated constructors (`extension_rewrite`, `relocate`,
/// `timestamp_rotate`). Values built directly are still handled: a separator
/// inside a suffix or token becomes `_`, and a rebuilt name that would read as
/// `.` or `..` leaves the path as it was. The two rename variants keep the
/// original directory in every case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(
        tag = "kind",
        content = "value",
        rename_all = "snake_case",
        try_from = "raw::RawPolicy"
    )
)]
pub enum TransformPolicy {
    ExtensionRewrite(String),
    Relocate(String),
    TimestampRotate(String),
}

impl TransformPolicy {
    /// SUMMARY:
    /// Build an extension rewrite. A suffix without a leading dot gets one.
    ///
    /// ERRORS:
    /// - `SandboxError::NormalizationFailed`: The suffix contains a separator or NUL,
    ///   or is nothing but dots (`.`, `..`).
    ///
    /// EXAMPLE:
    /// ```rust
    /// use sandbox_path::{FileProcessor, TransformPolicy};
    /// let to_zip = TransformPolicy::extension_rewrite("zip")?;
    /// assert_eq!(to_zip.apply("backups/archive.tar.gz"), "backups/archive.tar.zip");
    /// # Ok::<_, sandbox_path::SandboxError>(())
    /// ```
    pub fn extension_rewrite(suffix: impl AsRef<str>) -> Result<Self> {
        let suffix = suffix.as_ref();
        check_name_part(suffix, "extension contains a separator")?;
        if !suffix.is_empty() && suffix.chars().all(|c| c == '.') {
            return Err(SandboxError::normalization_failed(
                suffix,
                "extension has no characters after the dot",
            ));
        }
        let suffix = if suffix.is_empty() || suffix.starts_with('.') {
            suffix.to_owned()
        } else {
            format!(".{suffix}")
        };
        Ok(TransformPolicy::ExtensionRewrite(suffix))
    }

    /// SUMMARY:
    /// Build a relocation into `target_dir` (normalized on entry).
    ///
    /// ERRORS:
    /// - `SandboxError::EmptyInput`: `target_dir` is empty or whitespace.
    /// - `SandboxError::NormalizationFailed`: `target_dir` contains NUL.
    pub fn relocate(target_dir: impl AsRef<str>) -> Result<Self> {
        let target_dir = target_dir.as_ref();
        if target_dir.trim().is_empty() {
            return Err(SandboxError::EmptyInput);
        }
        if target_dir.contains('\0') {
            return Err(SandboxError::normalization_failed(
                target_dir,
                "target directory contains NUL byte",
            ));
        }
        Ok(TransformPolicy::Relocate(crate::normalize::normalize(
            target_dir,
        )))
    }

    /// SUMMARY:
    /// Build a timestamp rotation, reading `clock` once.
    ///
    /// ERRORS:
    /// - `SandboxError::EmptyInput`: The clock produced an empty token.
    /// - `SandboxError::NormalizationFailed`: The token contains a separator or NUL.
    ///
    /// EXAMPLE:
    /// ```rust
    /// use sandbox_path::{FileProcessor, FixedClock, TransformPolicy};
    /// let rotate = TransformPolicy::timestamp_rotate(&FixedClock("2025-01-04".into()))?;
    /// assert_eq!(rotate.apply("app.log"), "app_2025-01-04.log");
    /// # Ok::<_, sandbox_path::SandboxError>(())
    /// ```
    pub fn timestamp_rotate<C: Clock + ?Sized>(clock: &C) -> Result<Self> {
        let token = clock.token();
        if token.trim().is_empty() {
            return Err(SandboxError::EmptyInput);
        }
        check_name_part(&token, "timestamp token contains a separator")?;
        Ok(TransformPolicy::TimestampRotate(token))
    }

    fn rewrite_file_name(&self, file_name: &str) -> Option<String> {
        let (stem, chain) = split(file_name);
        match self {
            TransformPolicy::ExtensionRewrite(suffix) => {
                let chain = chain.with_last_replaced(&sanitize_name_part(suffix));
                Some(format!("{stem}{chain}"))
            }
            TransformPolicy::TimestampRotate(token) => Some(format!(
                "{stem}{ROTATION_SEPARATOR}{}{chain}",
                sanitize_name_part(token)
            )),
            TransformPolicy::Relocate(_) => None,
        }
    }
}

impl FileProcessor for TransformPolicy {
    fn apply(&self, original_path: &str) -> String {
        let original = LexicalPath::parse(original_path);
        let (Some(file_name), Some(dir)) = (original.file_name(), original.parent()) else {
            return original.to_string();
        };
        match self {
            TransformPolicy::Relocate(target_dir) => LexicalPath::parse(target_dir)
                .join_str(file_name)
                .to_string(),
            rename => rename
                .rewrite_file_name(file_name)
                .and_then(|new_name| dir.child(&new_name))
                .unwrap_or(original)
                .to_string(),
        }
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TransformPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformPolicy::ExtensionRewrite(suffix) if suffix.is_empty() => {
                f.write_str("extension rewrite (drop last extension)")
            }
            TransformPolicy::ExtensionRewrite(suffix) => {
                write!(f, "extension rewrite (to {suffix})")
            }
            TransformPolicy::Relocate(target_dir) => write!(f, "relocate (into {target_dir})"),
            TransformPolicy::TimestampRotate(token) => {
                write!(f, "timestamp rotate (token {token})")
            }
        }
    }
}

fn check_name_part(part: &str, reason: &'static str) -> Result<()> {
    if part.contains('\0') {
        return Err(SandboxError::normalization_failed(part, "contains NUL byte"));
    }
    if part.contains(is_separator) {
        return Err(SandboxError::normalization_failed(part, reason));
    }
    Ok(())
}

fn sanitize_name_part(part: &str) -> String {
    part.chars()
        .map(|c| if is_separator(c) || c == '\0' { '_' } else { c })
        .collect()
}

#[cfg(feature = "serde")]
mod raw {
    use super::TransformPolicy;

    // Wire shape of `TransformPolicy`; converted through the validated constructors.
    #[derive(serde::Deserialize)]
    #[serde(tag = "kind", content = "value", rename_all = "snake_case")]
    pub(super) enum RawPolicy {
        ExtensionRewrite(String),
        Relocate(String),
        TimestampRotate(String),
    }

    impl TryFrom<RawPolicy> for TransformPolicy {
        type Error = crate::SandboxError;

        fn try_from(raw: RawPolicy) -> Result<Self, Self::Error> {
            match raw {
                RawPolicy::ExtensionRewrite(suffix) => TransformPolicy::extension_rewrite(suffix),
                RawPolicy::Relocate(target_dir) => TransformPolicy::relocate(target_dir),
                RawPolicy::TimestampRotate(token) => {
                    TransformPolicy::timestamp_rotate(&super::FixedClock(token))
                }
            }
        }
    }
}
