use crate::extension::{split, ExtensionChain};
use crate::normalize::LexicalPath;
use crate::processor::FileProcessor;
use crate::validator::path_history::{screen_fragment, Validated};
use crate::validator::trusted_root::TrustedRoot;
use crate::Result;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// SUMMARY:
/// Hold a normalized path proven to sit at or below its `TrustedRoot`.
///
/// DETAILS:
/// The only way to obtain one is through a boundary check (`TrustedRoot::sandbox_join`,
/// `Pipeline::resolve`), so a `SafePath<Marker>` in a signature is the proof.
/// Derived paths (`sandbox_join`, `sandbox_parent`, `with_file_name`) run the
/// check again against the same root. `Display` shows the `/`-separated path.
///
/// The proof is lexical; see the crate docs for the symlink caveat.
pub struct SafePath<Marker = ()> {
    path: Validated,
    root: TrustedRoot<Marker>,
    _marker: PhantomData<Marker>,
}

impl<Marker> Clone for SafePath<Marker> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            root: self.root.clone(),
            _marker: PhantomData,
        }
    }
}

impl<Marker> SafePath<Marker> {
    pub(crate) fn new(root: TrustedRoot<Marker>, validated_path: Validated) -> Self {
        Self {
            path: validated_path,
            root,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// The root this path was checked against.
    #[inline]
    pub fn root(&self) -> &TrustedRoot<Marker> {
        &self.root
    }

    /// SUMMARY:
    /// Return the path relative to its root (`.` for the root itself).
    pub fn relative(&self) -> String {
        self.path
            .lexical()
            .strip_prefix(self.root.lexical())
            .map(|rest| rest.to_string())
            .unwrap_or_else(|| ".".to_owned())
    }

    /// The final segment, or `None` when this is the root.
    pub fn file_name(&self) -> Option<String> {
        if self.is_root() {
            return None;
        }
        self.path.lexical().file_name().map(str::to_owned)
    }

    /// SUMMARY:
    /// Split the file name into stem and extension chain.
    pub fn split_name(&self) -> Option<(String, ExtensionChain)> {
        self.file_name().map(|name| split(&name))
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.as_str() == self.root.as_str()
    }

    /// SUMMARY:
    /// Join an untrusted fragment below this path and re-validate against the root.
    ///
    /// ERRORS:
    /// - `SandboxError::EmptyInput`, `SandboxError::NormalizationFailed`, `SandboxError::EscapesRoot`.
    pub fn sandbox_join(&self, fragment: impl AsRef<str>) -> Result<Self> {
        let fragment = fragment.as_ref();
        screen_fragment(fragment)?;
        let below = LexicalPath::parse(&self.relative())
            .join(&LexicalPath::parse(fragment).strip_anchor())
            .to_string();
        self.root.sandbox_join(below)
    }

    /// SUMMARY:
    /// Return the parent as a new `SafePath`, or `None` at the root.
    pub fn sandbox_parent(&self) -> Result<Option<Self>> {
        if self.is_root() {
            return Ok(None);
        }
        self.sandbox_join("..").map(Some)
    }

    /// SUMMARY:
    /// Return a sibling path with the file name replaced, re-validated against the root.
    ///
    /// ERRORS:
    /// - `SandboxError::NormalizationFailed`: This is the root, which has no file name
    ///   to replace, or `file_name` contains NUL.
    /// - `SandboxError::EmptyInput`: `file_name` is empty or whitespace.
    /// - `SandboxError::EscapesRoot`: The new name climbs out of the root.
    pub fn with_file_name(&self, file_name: impl AsRef<str>) -> Result<Self> {
        if self.is_root() {
            return Err(crate::SandboxError::normalization_failed(
                self.as_str(),
                "root has no file name",
            ));
        }
        let file_name = file_name.as_ref();
        screen_fragment(file_name)?;
        let sibling = LexicalPath::parse(&self.relative())
            .parent()
            .unwrap_or_else(|| LexicalPath::parse("."))
            .join(&LexicalPath::parse(file_name).strip_anchor())
            .to_string();
        self.root.sandbox_join(sibling)
    }

    /// SUMMARY:
    /// Compute the processor's target for this path. The target is not validated.
    #[inline]
    pub fn transform<P: FileProcessor + ?Sized>(&self, processor: &P) -> String {
        self.path.transform(processor).into_inner()
    }

    /// SUMMARY:
    /// Change the compile-time marker while reusing the validated path.
    ///
    /// SECURITY:
    /// The caller must ensure the new marker reflects a real check; this performs none.
    #[inline]
    pub fn change_marker<NewMarker>(self) -> SafePath<NewMarker> {
        SafePath {
            path: self.path,
            root: self.root.change_marker(),
            _marker: PhantomData,
        }
    }

    /// Consume and return the path string.
    #[inline]
    pub fn into_string(self) -> String {
        self.path.into_inner()
    }
}

impl<Marker> fmt::Display for SafePath<Marker> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<Marker> fmt::Debug for SafePath<Marker> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafePath")
            .field("path", &self.as_str())
            .field("root", &self.root.as_str())
            .field("marker", &std::any::type_name::<Marker>())
            .finish()
    }
}

impl<Marker> AsRef<str> for SafePath<Marker> {
    #[inline]
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(feature = "serde")]
impl<Marker> serde::Serialize for SafePath<Marker> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<Marker> PartialEq for SafePath<Marker> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<Marker> Eq for SafePath<Marker> {}

impl<Marker> Hash for SafePath<Marker> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl<Marker> PartialOrd for SafePath<Marker> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Marker> Ord for SafePath<Marker> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl<Marker> PartialEq<str> for SafePath<Marker> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<Marker> PartialEq<&str> for SafePath<Marker> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
