use crate::error::BlockReason;
use crate::normalize::LexicalPath;
use crate::processor::FileProcessor;
use crate::validator::sandbox::contains;
use crate::validator::trusted_root::TrustedRoot;
use crate::{Result, SandboxError};
use std::ops::Deref;

#[derive(Debug, Clone)]
pub struct Raw;
#[derive(Debug, Clone)]
pub struct Normalized;
#[derive(Debug, Clone)]
pub struct Resolved;
#[derive(Debug, Clone)]
pub struct BoundaryChecked;
#[derive(Debug, Clone)]
pub struct Transformed;

/// Fully validated stage: the only history a `SafePath` can hold.
pub type Validated = PathHistory<(((Raw, Normalized), Resolved), BoundaryChecked)>;

/// A path string tagged with the pipeline stages it has passed through.
///
/// Each stage method consumes the previous state, so a value typed as
/// `BoundaryChecked` cannot exist unless every earlier step ran.
#[derive(Debug, Clone)]
pub struct PathHistory<History> {
    inner: String,
    _marker: std::marker::PhantomData<History>,
}

impl<H> AsRef<str> for PathHistory<H> {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl<H> Deref for PathHistory<H> {
    type Target = str;
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl PathHistory<Raw> {
    #[inline]
    pub fn new<S: Into<String>>(path: S) -> Self {
        PathHistory {
            inner: path.into(),
            _marker: std::marker::PhantomData,
        }
    }
}

// Rejects what the normalizer must never see: empty fragments and NUL bytes.
pub(crate) fn screen_fragment(fragment: &str) -> Result<()> {
    if fragment.trim().is_empty() {
        return Err(SandboxError::EmptyInput);
    }
    if fragment.contains('\0') {
        return Err(SandboxError::normalization_failed(
            fragment,
            "contains NUL byte",
        ));
    }
    Ok(())
}

impl<H> PathHistory<H> {
    #[inline]
    pub fn into_inner(self) -> String {
        self.inner
    }

    #[inline]
    pub(crate) fn lexical(&self) -> LexicalPath {
        LexicalPath::parse(&self.inner)
    }

    /// Screen the raw fragment and collapse it into canonical lexical form.
    ///
    /// Errors:
    /// - `SandboxError::EmptyInput` when the fragment is empty or whitespace.
    /// - `SandboxError::NormalizationFailed` when it carries a NUL byte.
    pub fn normalize_fragment(self) -> Result<PathHistory<(H, Normalized)>> {
        screen_fragment(&self.inner)?;
        Ok(PathHistory {
            inner: crate::normalize::normalize(&self.inner),
            _marker: std::marker::PhantomData,
        })
    }
}

impl<H> PathHistory<(H, Normalized)> {
    /// Join the normalized fragment below `root`.
    ///
    /// Semantics:
    /// - An anchored fragment (`/etc/x`, `C:\x`) loses its anchor and is treated as
    ///   relative to the root; it never replaces the root.
    /// - Segments are joined, never string-concatenated, and the result is
    ///   normalized again. `..` may still climb above the root here; the boundary
    ///   check is a separate stage.
    pub fn resolve_under<Marker>(
        self,
        root: &TrustedRoot<Marker>,
    ) -> PathHistory<((H, Normalized), Resolved)> {
        let fragment = self.lexical().strip_anchor();
        let joined = root.lexical().join(&fragment).to_string();
        debug_assert_eq!(
            crate::normalize::normalize(&joined),
            joined,
            "joined candidate must already be normalized"
        );
        PathHistory {
            inner: joined,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<H> PathHistory<(H, Resolved)> {
    /// Enforce the segment-aligned boundary of `root`.
    #[inline]
    pub fn boundary_check<Marker>(
        self,
        root: &TrustedRoot<Marker>,
    ) -> Result<PathHistory<((H, Resolved), BoundaryChecked)>> {
        if !contains(root.lexical(), &self.lexical()) {
            return Err(SandboxError::escapes_root(self.into_inner(), root.as_str()));
        }
        Ok(PathHistory {
            inner: self.inner,
            _marker: std::marker::PhantomData,
        })
    }

    // Verdict form of `boundary_check`, for callers that want a value rather than an error.
    pub(crate) fn verdict<Marker>(&self, root: &TrustedRoot<Marker>) -> Option<BlockReason> {
        (!contains(root.lexical(), &self.lexical())).then_some(BlockReason::EscapesRoot)
    }
}

impl<H> PathHistory<(H, BoundaryChecked)> {
    /// Compute the processor's target for this validated path.
    ///
    /// The target is not re-checked against the root: relocation legitimately
    /// points elsewhere (a backup directory, for instance).
    pub fn transform<P: FileProcessor + ?Sized>(
        &self,
        processor: &P,
    ) -> PathHistory<((H, BoundaryChecked), Transformed)> {
        PathHistory {
            inner: processor.apply(&self.inner),
            _marker: std::marker::PhantomData,
        }
    }
}
