use crate::error::SandboxError;
use crate::normalize::LexicalPath;
use crate::path::safe_path::SafePath;
use crate::validator::path_history::*;
use crate::Result;

use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

/// SUMMARY:
/// Resolve an untrusted fragment under `root` and enforce the boundary, returning a `SafePath`.
///
/// PARAMETERS:
/// - `fragment` (&`str`): Untrusted relative path (anchors are dropped, `..` is resolved).
/// - `root` (&`TrustedRoot<Marker>`): Boundary to enforce.
///
/// RETURNS:
/// - `Result<SafePath<Marker>>`: Normalized path proven to sit at or below `root`.
///
/// ERRORS:
/// - `SandboxError::EmptyInput`: Fragment empty or whitespace.
/// - `SandboxError::NormalizationFailed`: Fragment contains NUL.
/// - `SandboxError::EscapesRoot`: Resolved path leaves `root`.
pub(crate) fn resolve_and_enforce_root_boundary<Marker>(
    fragment: &str,
    root: &TrustedRoot<Marker>,
) -> Result<SafePath<Marker>> {
    let validated = PathHistory::<Raw>::new(fragment)
        .normalize_fragment()?
        .resolve_under(root)
        .boundary_check(root)?;
    Ok(SafePath::new(root.clone(), validated))
}

struct RootPath {
    text: String,
    lexical: LexicalPath,
}

/// The directory no resolved path may escape.
///
/// SUMMARY:
/// Hold an absolute, normalized directory path that bounds every `SafePath`
/// derived from it. Immutable after construction and cheap to clone, so one
/// value can be shared across threads for the life of a `Pipeline`.
///
/// DETAILS:
/// Construction is purely lexical: the directory is not required to exist and
/// symlinks are not resolved. Build it from configuration you control, never
/// from request input.
///
/// EXAMPLE:
/// ```rust
/// # use sandbox_path::TrustedRoot;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = TrustedRoot::<()>::try_new("/srv//uploads/./")?;
/// assert_eq!(root.as_str(), "/srv/uploads");
/// let file = root.sandbox_join("logs/app.log")?;
/// assert_eq!(file.as_str(), "/srv/uploads/logs/app.log");
/// # Ok(())
/// # }
/// ```
pub struct TrustedRoot<Marker = ()> {
    path: Arc<RootPath>,
    _marker: PhantomData<Marker>,
}

impl<Marker> Clone for TrustedRoot<Marker> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            _marker: PhantomData,
        }
    }
}

impl<Marker> Eq for TrustedRoot<Marker> {}

impl<M1, M2> PartialEq<TrustedRoot<M2>> for TrustedRoot<M1> {
    #[inline]
    fn eq(&self, other: &TrustedRoot<M2>) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<Marker> PartialEq<str> for TrustedRoot<Marker> {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<Marker> PartialEq<&str> for TrustedRoot<Marker> {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl<Marker> std::hash::Hash for TrustedRoot<Marker> {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl<Marker> PartialOrd for TrustedRoot<Marker> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<Marker> Ord for TrustedRoot<Marker> {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl<Marker> TrustedRoot<Marker> {
    /// SUMMARY:
    /// Create a trusted root from an absolute directory path.
    ///
    /// PARAMETERS:
    /// - `root` (`AsRef<str>`): Absolute path (`/srv/data`, `C:\data`). Normalized on entry.
    ///
    /// RETURNS:
    /// - `Result<TrustedRoot<Marker>>`: The normalized root.
    ///
    /// ERRORS:
    /// - `SandboxError::InvalidRoot`: Empty, relative, or NUL-bearing input.
    pub fn try_new<S: AsRef<str>>(root: S) -> Result<Self> {
        let root = root.as_ref();
        if root.trim().is_empty() {
            return Err(SandboxError::invalid_root(root, "root is empty"));
        }
        if root.contains('\0') {
            return Err(SandboxError::invalid_root(root, "root contains NUL byte"));
        }
        let lexical = LexicalPath::parse(root);
        if !lexical.is_absolute() {
            return Err(SandboxError::invalid_root(root, "root must be absolute"));
        }
        Ok(Self {
            path: Arc::new(RootPath {
                text: lexical.to_string(),
                lexical,
            }),
            _marker: PhantomData,
        })
    }

    /// SUMMARY:
    /// Create a trusted root from a `Path`, which must be valid UTF-8.
    ///
    /// ERRORS:
    /// - `SandboxError::InvalidRoot`: Non-UTF-8, empty, relative, or NUL-bearing input.
    pub fn try_from_path<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        match root.to_str() {
            Some(text) => Self::try_new(text),
            None => Err(SandboxError::invalid_root(
                root.to_string_lossy(),
                "root is not valid UTF-8",
            )),
        }
    }

    /// SUMMARY:
    /// Resolve an untrusted fragment below this root and return a validated `SafePath`.
    ///
    /// ERRORS:
    /// - `SandboxError::EmptyInput`, `SandboxError::NormalizationFailed`, `SandboxError::EscapesRoot`.
    #[inline]
    pub fn sandbox_join(&self, fragment: impl AsRef<str>) -> Result<SafePath<Marker>> {
        resolve_and_enforce_root_boundary(fragment.as_ref(), self)
    }

    /// SUMMARY:
    /// Consume this root and return a `SafePath` naming the root directory itself.
    ///
    /// RETURNS:
    /// - `Result<SafePath<Marker>>`: Runs the same stages as `sandbox_join(".")`.
    #[inline]
    pub fn into_safepath(self) -> Result<SafePath<Marker>> {
        resolve_and_enforce_root_boundary(".", &self)
    }

    /// SUMMARY:
    /// Consume this root and substitute a new marker type.
    #[inline]
    pub fn change_marker<NewMarker>(self) -> TrustedRoot<NewMarker> {
        TrustedRoot {
            path: self.path,
            _marker: PhantomData,
        }
    }

    /// The normalized root as a string (always `/`-separated).
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.path.text
    }

    /// Root segments, outermost first.
    #[inline]
    pub fn segments(&self) -> &[String] {
        self.path.lexical.segments()
    }

    #[inline]
    pub(crate) fn lexical(&self) -> &LexicalPath {
        &self.path.lexical
    }
}

impl<Marker> AsRef<str> for TrustedRoot<Marker> {
    #[inline]
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<Marker> std::fmt::Display for TrustedRoot<Marker> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<Marker> std::fmt::Debug for TrustedRoot<Marker> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustedRoot")
            .field("path", &self.as_str())
            .field("marker", &std::any::type_name::<Marker>())
            .finish()
    }
}

impl<Marker> std::str::FromStr for TrustedRoot<Marker> {
    type Err = SandboxError;

    /// Parse a root from configuration text (clap values, env vars, config files).
    /// ```rust
    /// # use sandbox_path::TrustedRoot;
    /// let root: TrustedRoot = "/var/www".parse()?;
    /// assert_eq!(root, "/var/www");
    /// # Ok::<_, sandbox_path::SandboxError>(())
    /// ```
    #[inline]
    fn from_str(path: &str) -> std::result::Result<Self, Self::Err> {
        Self::try_new(path)
    }
}
