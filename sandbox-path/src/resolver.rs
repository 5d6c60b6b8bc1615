//! SUMMARY:
//! Join a trusted root with an untrusted fragment to produce a candidate path.
//!
//! DETAILS:
//! Resolution never checks containment; that is the job of
//! [`validate`](crate::validate), so a candidate can be inspected (or logged)
//! before a verdict is reached.
use crate::validator::path_history::{Normalized, PathHistory, Raw, Resolved};
use crate::validator::trusted_root::TrustedRoot;
use crate::Result;
use std::fmt;

/// SUMMARY:
/// A root-joined, normalized candidate that has not been boundary-checked yet.
///
/// DETAILS:
/// Only `resolve` produces one. It may still point outside the root
/// (`/srv/uploads` + `../../etc` gives `/etc`); pass it to `validate`.
#[derive(Debug, Clone)]
pub struct CandidatePath {
    path: PathHistory<((Raw, Normalized), Resolved)>,
}

impl CandidatePath {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.path.into_inner()
    }

    #[inline]
    pub(crate) fn history(&self) -> &PathHistory<((Raw, Normalized), Resolved)> {
        &self.path
    }
}

impl fmt::Display for CandidatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for CandidatePath {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for CandidatePath {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// SUMMARY:
/// Normalize `fragment` and join it below `root`.
///
/// PARAMETERS:
/// - `root` (&`TrustedRoot<Marker>`): Trusted base directory.
/// - `fragment` (&`str`): Untrusted relative path. A leading `/` or drive prefix is
///   dropped so the fragment is always read relative to `root`.
///
/// RETURNS:
/// - `Result<CandidatePath>`: Normalized, root-joined candidate (unchecked).
///
/// ERRORS:
/// - `SandboxError::EmptyInput`: `fragment` is empty or whitespace.
/// - `SandboxError::NormalizationFailed`: `fragment` contains NUL.
///
/// EXAMPLE:
/// ```rust
/// use sandbox_path::{resolve, SandboxError, TrustedRoot};
/// let root: TrustedRoot = TrustedRoot::try_new("/srv/uploads")?;
/// assert_eq!(resolve(&root, "reports//./2025.pdf")?, "/srv/uploads/reports/2025.pdf");
/// assert_eq!(resolve(&root, "../../etc/passwd")?, "/etc/passwd");
/// assert_eq!(resolve(&root, "   ").unwrap_err(), SandboxError::EmptyInput);
/// # Ok::<_, SandboxError>(())
/// ```
pub fn resolve<Marker>(root: &TrustedRoot<Marker>, fragment: &str) -> Result<CandidatePath> {
    let path = PathHistory::<Raw>::new(fragment)
        .normalize_fragment()?
        .resolve_under(root);
    Ok(CandidatePath { path })
}
