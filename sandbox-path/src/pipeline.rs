//! SUMMARY:
//! Orchestrate normalize, resolve, validate and transform for one trusted root.
//!
//! DETAILS:
//! A `Pipeline` owns its `TrustedRoot` and nothing else, so it is cheap to clone
//! and safe to share across threads. Every call is independent: no state is
//! carried from one fragment to the next and nothing is retried. Rejections come
//! back as typed errors (or a `Blocked` verdict from `check`); a fragment is never
//! coerced to a default path.
//!
//! Events are emitted through `tracing`: one `debug!` per stage and a `warn!`
//! for every refused fragment. Installing a subscriber is left to the binary.
use crate::error::{truncate_path_display, BlockReason};
use crate::path::safe_path::SafePath;
use crate::processor::FileProcessor;
use crate::resolver::resolve;
use crate::validator::sandbox::{validate, ValidationVerdict};
use crate::validator::trusted_root::TrustedRoot;
use crate::{Result, SandboxError};
use std::fmt;

const MAX_LOGGED_FRAGMENT_LEN: usize = 256;

fn logged(fragment: &str) -> String {
    truncate_path_display(fragment, MAX_LOGGED_FRAGMENT_LEN)
}

/// SUMMARY:
/// A validated source path and the target a `FileProcessor` computed for it.
///
/// DETAILS:
/// The source is a `SafePath` and carries the containment proof. The target is
/// a plain string: relocation may legitimately point outside the root, so the
/// caller decides whether the destination needs its own check.
pub struct Transformation<Marker = ()> {
    source: SafePath<Marker>,
    target: String,
}

impl<Marker> Transformation<Marker> {
    #[inline]
    pub fn source(&self) -> &SafePath<Marker> {
        &self.source
    }

    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// True when the processor left the path as it was.
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.source.as_str() == self.target
    }

    #[inline]
    pub fn into_parts(self) -> (SafePath<Marker>, String) {
        (self.source, self.target)
    }
}

impl<Marker> Clone for Transformation<Marker> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            target: self.target.clone(),
        }
    }
}

impl<Marker> PartialEq for Transformation<Marker> {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.target == other.target
    }
}

impl<Marker> Eq for Transformation<Marker> {}

impl<Marker> fmt::Debug for Transformation<Marker> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformation")
            .field("source", &self.source.as_str())
            .field("target", &self.target)
            .finish()
    }
}

impl<Marker> fmt::Display for Transformation<Marker> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// SUMMARY:
/// Resolve untrusted fragments below one `TrustedRoot` and optionally transform them.
///
/// EXAMPLE:
/// ```rust
/// use sandbox_path::{Pipeline, TransformPolicy, SandboxError};
/// let pipeline: Pipeline = Pipeline::try_new("/srv/uploads")?;
///
/// let report = pipeline.resolve("reports/2025.pdf")?;
/// assert_eq!(report, "/srv/uploads/reports/2025.pdf");
///
/// let backup = TransformPolicy::relocate("/backup")?;
/// let moved = pipeline.process("reports/2025.pdf", &backup)?;
/// assert_eq!(moved.target(), "/backup/2025.pdf");
///
/// assert!(matches!(
///     pipeline.resolve("../../etc/passwd"),
///     Err(SandboxError::EscapesRoot { .. })
/// ));
/// # Ok::<_, SandboxError>(())
/// ```
pub struct Pipeline<Marker = ()> {
    root: TrustedRoot<Marker>,
}

impl<Marker> Pipeline<Marker> {
    /// Build a pipeline around an existing root.
    #[inline]
    pub fn new(root: TrustedRoot<Marker>) -> Self {
        Self { root }
    }

    /// SUMMARY:
    /// Parse `root` into a `TrustedRoot` and build a pipeline around it.
    ///
    /// ERRORS:
    /// - `SandboxError::InvalidRoot`: Empty, relative, or NUL-bearing root.
    pub fn try_new(root: impl AsRef<str>) -> Result<Self> {
        TrustedRoot::try_new(root).map(Self::new)
    }

    #[inline]
    pub fn root(&self) -> &TrustedRoot<Marker> {
        &self.root
    }

    /// SUMMARY:
    /// Run normalize, resolve and validate, reporting the outcome as a verdict.
    ///
    /// DETAILS:
    /// Never fails: empty or NUL-bearing fragments come back as
    /// `Blocked(EmptyInput)` or `Blocked(NormalizationFailed)`.
    pub fn check(&self, fragment: &str) -> ValidationVerdict {
        let verdict = match resolve(&self.root, fragment) {
            Ok(candidate) => {
                tracing::debug!(root = %self.root, candidate = %candidate, "resolved fragment");
                validate(&self.root, &candidate)
            }
            Err(err) => ValidationVerdict::Blocked(
                err.block_reason()
                    .unwrap_or(BlockReason::NormalizationFailed),
            ),
        };
        if let ValidationVerdict::Blocked(reason) = &verdict {
            tracing::warn!(
                root = %self.root,
                fragment = %logged(fragment),
                reason = %reason,
                "fragment blocked"
            );
        }
        verdict
    }

    /// SUMMARY:
    /// Resolve `fragment` below the root and return the validated `SafePath`.
    ///
    /// ERRORS:
    /// - `SandboxError::EmptyInput`: Fragment empty or whitespace.
    /// - `SandboxError::NormalizationFailed`: Fragment contains NUL.
    /// - `SandboxError::EscapesRoot`: Resolved path leaves the root.
    pub fn resolve(&self, fragment: &str) -> Result<SafePath<Marker>> {
        tracing::debug!(root = %self.root, fragment = %logged(fragment), "resolving fragment");
        match self.root.sandbox_join(fragment) {
            Ok(path) => {
                tracing::debug!(path = %path, "fragment is inside root");
                Ok(path)
            }
            Err(err) => {
                self.log_rejection(fragment, &err);
                Err(err)
            }
        }
    }

    /// SUMMARY:
    /// Resolve `fragment`, then compute `processor`'s target for it.
    ///
    /// DETAILS:
    /// The processor only ever sees a path that passed the boundary check. Its
    /// output is not validated; see `Transformation`.
    ///
    /// ERRORS:
    /// - Same as `resolve`.
    pub fn process<P: FileProcessor + ?Sized>(
        &self,
        fragment: &str,
        processor: &P,
    ) -> Result<Transformation<Marker>> {
        let source = self.resolve(fragment)?;
        let target = source.transform(processor);
        tracing::debug!(
            source = %source,
            target = %target,
            processor = %processor.describe(),
            "transformed path"
        );
        Ok(Transformation { source, target })
    }

    /// SUMMARY:
    /// Lazily `process` each fragment in turn.
    ///
    /// DETAILS:
    /// Results are yielded in input order, one per fragment. A rejected fragment
    /// yields its error and iteration continues with the next one.
    pub fn process_each<'a, I, P>(
        &'a self,
        fragments: I,
        processor: &'a P,
    ) -> impl Iterator<Item = Result<Transformation<Marker>>> + 'a
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        I::IntoIter: 'a,
        P: FileProcessor + ?Sized,
    {
        fragments
            .into_iter()
            .map(move |fragment| self.process(fragment.as_ref(), processor))
    }

    fn log_rejection(&self, fragment: &str, err: &SandboxError) {
        match err.block_reason() {
            Some(reason) => tracing::warn!(
                root = %self.root,
                fragment = %logged(fragment),
                reason = %reason,
                "fragment blocked"
            ),
            None => tracing::warn!(root = %self.root, error = %err, "pipeline error"),
        }
    }
}

impl<Marker> Clone for Pipeline<Marker> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
        }
    }
}

impl<Marker> fmt::Debug for Pipeline<Marker> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("root", &self.root.as_str())
            .field("marker", &std::any::type_name::<Marker>())
            .finish()
    }
}

impl<Marker> From<TrustedRoot<Marker>> for Pipeline<Marker> {
    fn from(root: TrustedRoot<Marker>) -> Self {
        Self::new(root)
    }
}
