//! SUMMARY:
//! Decide whether a resolved candidate lies inside a trusted root.
//!
//! DETAILS:
//! The check compares segment sequences, never raw characters. A plain
//! `candidate.starts_with(root)` on strings accepts `/home/user-evil` and
//! `/home/user2` for root `/home/user`; comparing whole segments cannot.
//!
//! This is a lexical check. It cannot see a symlink inside the root that points
//! outside it; deployments that write through this path must also canonicalize
//! against the live filesystem and re-check the physical target.
use crate::error::BlockReason;
use crate::normalize::LexicalPath;
use crate::resolver::CandidatePath;
use crate::validator::trusted_root::TrustedRoot;

/// SUMMARY:
/// Outcome of checking a candidate against a trusted root.
///
/// VARIANTS:
/// - `Safe(String)`: The normalized candidate, proven to sit at or below the root.
/// - `Blocked(BlockReason)`: Why the candidate was refused.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValidationVerdict {
    Safe(String),
    Blocked(BlockReason),
}

impl ValidationVerdict {
    #[inline]
    pub fn is_safe(&self) -> bool {
        matches!(self, ValidationVerdict::Safe(_))
    }

    /// The resolved path when Safe.
    #[inline]
    pub fn safe_path(&self) -> Option<&str> {
        match self {
            ValidationVerdict::Safe(path) => Some(path),
            ValidationVerdict::Blocked(_) => None,
        }
    }

    /// The block reason when Blocked.
    #[inline]
    pub fn reason(&self) -> Option<BlockReason> {
        match self {
            ValidationVerdict::Safe(_) => None,
            ValidationVerdict::Blocked(reason) => Some(*reason),
        }
    }

    /// SUMMARY:
    /// Convert into a `Result` so a Blocked verdict propagates with `?`.
    pub fn into_result(self) -> std::result::Result<String, BlockReason> {
        match self {
            ValidationVerdict::Safe(path) => Ok(path),
            ValidationVerdict::Blocked(reason) => Err(reason),
        }
    }
}

// Segment-aligned containment on already-normalized paths.
#[inline]
pub(crate) fn contains(root: &LexicalPath, candidate: &LexicalPath) -> bool {
    root.is_absolute() && candidate.starts_with(root)
}

/// SUMMARY:
/// Check a resolved candidate against `root`.
///
/// PARAMETERS:
/// - `root` (&`TrustedRoot<Marker>`): The boundary.
/// - `candidate` (&`CandidatePath`): Output of `resolve`.
///
/// RETURNS:
/// - `ValidationVerdict`: `Safe` with the normalized path, or `Blocked(EscapesRoot)`.
///
/// EXAMPLE:
/// ```rust
/// use sandbox_path::{resolve, validate, BlockReason, TrustedRoot, ValidationVerdict};
/// let root: TrustedRoot = TrustedRoot::try_new("/srv/uploads")?;
///
/// let ok = validate(&root, &resolve(&root, "reports/2025.pdf")?);
/// assert_eq!(ok, ValidationVerdict::Safe("/srv/uploads/reports/2025.pdf".into()));
///
/// let attack = validate(&root, &resolve(&root, "../../etc/passwd")?);
/// assert_eq!(attack, ValidationVerdict::Blocked(BlockReason::EscapesRoot));
/// # Ok::<_, sandbox_path::SandboxError>(())
/// ```
pub fn validate<Marker>(root: &TrustedRoot<Marker>, candidate: &CandidatePath) -> ValidationVerdict {
    match candidate.history().verdict(root) {
        None => ValidationVerdict::Safe(candidate.history().lexical().to_string()),
        Some(reason) => ValidationVerdict::Blocked(reason),
    }
}

/// SUMMARY:
/// Segment-aware containment test over plain strings.
///
/// DETAILS:
/// Both sides are normalized first. A relative `root` never contains anything:
/// containment is only meaningful against an anchored directory.
///
/// EXAMPLE:
/// ```rust
/// use sandbox_path::is_within;
/// assert!(is_within("/home/user", "/home/user/docs/../notes.txt"));
/// assert!(!is_within("/home/user", "/home/user2/secret"));
/// assert!(!is_within("/home/user", "/home/user-evil"));
/// ```
pub fn is_within(root: &str, candidate: &str) -> bool {
    contains(&LexicalPath::parse(root), &LexicalPath::parse(candidate))
}
