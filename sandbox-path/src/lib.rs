//! # sandbox-path
//!
//! Resolve untrusted path fragments below a trusted root, refuse anything that
//! escapes it, and compute new file names for the paths that pass.
//!
//! Everything here is lexical: no function in this crate touches the filesystem.
//! Paths are normalized as strings (`/` and `\` both accepted, `/` emitted),
//! joined segment by segment, and checked for containment by comparing whole
//! segments. A root of `/home/user` therefore never admits `/home/user2/secret`,
//! the classic failure of a `starts_with` check on raw strings.
//!
//! If a `SafePath<Marker>` value exists, it was produced by a boundary check
//! against its `TrustedRoot<Marker>`. Transformations (`TransformPolicy`) only
//! ever run on such a value.
//!
//! ## Quick start
//!
//! ```rust
//! use sandbox_path::{Pipeline, TransformPolicy, SandboxError};
//! # fn main() -> Result<(), SandboxError> {
//! let uploads: Pipeline = Pipeline::try_new("/srv/uploads")?;
//!
//! // Untrusted input from a request
//! let file = uploads.resolve("reports//./2025.pdf")?;
//! assert_eq!(file, "/srv/uploads/reports/2025.pdf");
//!
//! // Traversal is refused, never clamped
//! assert!(matches!(
//!     uploads.resolve("../../etc/passwd"),
//!     Err(SandboxError::EscapesRoot { .. })
//! ));
//!
//! // Compute a destination for a validated file
//! let to_mp3 = TransformPolicy::extension_rewrite(".mp3")?;
//! let job = uploads.process("music/take1.wav", &to_mp3)?;
//! assert_eq!(job.target(), "/srv/uploads/music/take1.mp3");
//! # Ok(()) }
//! ```
//!
//! ## Stages
//!
//! A fragment moves through `normalize` → `resolve` → `validate` → transform.
//! Each stage is also usable on its own:
//!
//! ```rust
//! use sandbox_path::{normalize, resolve, validate, split, TrustedRoot, ValidationVerdict};
//! # fn main() -> Result<(), sandbox_path::SandboxError> {
//! assert_eq!(normalize("a/b/../c//d.txt"), "a/c/d.txt");
//!
//! let root: TrustedRoot = "/home/user".parse()?;
//! let candidate = resolve(&root, "docs/../notes.txt")?;
//! assert_eq!(candidate, "/home/user/notes.txt");
//! assert!(validate(&root, &candidate).is_safe());
//!
//! let (stem, chain) = split("archive.tar.gz");
//! assert_eq!((stem.as_str(), chain.to_string().as_str()), ("archive", ".tar.gz"));
//! # Ok(()) }
//! ```
//!
//! Internally the stages are tracked with type-state markers, so a value that
//! reaches the transform stage has provably passed the boundary check.
//!
//! ## Markers
//!
//! `TrustedRoot`, `SafePath` and `Pipeline` carry a compile-time `Marker` (default
//! `()`). Give each storage area its own marker and the compiler stops a path
//! checked against one root from being handed to code that expects another:
//!
//! ```rust
//! use sandbox_path::{Pipeline, SafePath};
//! struct Uploads;
//! struct Logs;
//!
//! fn serve_upload(_file: &SafePath<Uploads>) {}
//!
//! # fn main() -> Result<(), sandbox_path::SandboxError> {
//! let uploads = Pipeline::<Uploads>::try_new("/srv/uploads")?;
//! let logs = Pipeline::<Logs>::try_new("/var/log/app")?;
//! serve_upload(&uploads.resolve("a.png")?);
//! let _log = logs.resolve("app.log")?;
//! // serve_upload(&_log); // does not compile: SafePath<Logs>
//! # Ok(()) }
//! ```
//!
//! ## Symlinks
//!
//! A lexical check cannot see a symlink inside the root that points outside it.
//! Before writing through a `SafePath`, a deployment that allows symlinks under
//! the root must canonicalize the physical path and check it again.
//!
//! ## Logging
//!
//! The `Pipeline` emits `tracing` events: `debug!` per stage and `warn!` for each
//! refused fragment, with `root`, `fragment` and `reason` fields. The crate never
//! installs a subscriber.
//!
//! ## Features
//!
//! - `serde`: `SafePath` serializes as its path string, `TransformPolicy`
//!   round-trips as `{"kind": "relocate", "value": "/backup"}`, and
//!   [`serde_ext`] deserializes paths with pipeline context.

#![forbid(unsafe_code)]

pub mod error;
pub mod extension;
pub mod normalize;
pub mod path;
pub mod pipeline;
pub mod processor;
pub mod resolver;
pub mod validator;

#[cfg(feature = "serde")]
pub mod serde_ext {
    //! Serde helpers.
    //!
    //! `SafePath` serializes as its path string. Deserializing one needs the root
    //! it must be checked against, so it goes through a `DeserializeSeed`:
    //!
    //! ```rust
    //! use sandbox_path::{Pipeline, SafePath};
    //! use sandbox_path::serde_ext::WithPipeline;
    //! use serde::de::DeserializeSeed;
    //! # fn main() -> Result<(), Box<dyn std::error::Error>> {
    //! let pipeline: Pipeline = Pipeline::try_new("/srv/uploads")?;
    //! let mut de = serde_json::Deserializer::from_str("\"a/b.txt\"");
    //! let path: SafePath = WithPipeline(&pipeline).deserialize(&mut de)?;
    //! assert_eq!(path, "/srv/uploads/a/b.txt");
    //! # Ok(()) }
    //! ```

    use crate::{Pipeline, SafePath, TrustedRoot};
    use serde::de::DeserializeSeed;
    use serde::Deserialize;

    /// Deserialize a `SafePath` through a `Pipeline` (logged like `Pipeline::resolve`).
    pub struct WithPipeline<'a, Marker>(pub &'a Pipeline<Marker>);

    impl<'a, 'de, Marker> DeserializeSeed<'de> for WithPipeline<'a, Marker> {
        type Value = SafePath<Marker>;
        fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            self.0.resolve(&s).map_err(serde::de::Error::custom)
        }
    }

    /// Deserialize a `SafePath` directly against a `TrustedRoot`.
    pub struct WithRoot<'a, Marker>(pub &'a TrustedRoot<Marker>);

    impl<'a, 'de, Marker> DeserializeSeed<'de> for WithRoot<'a, Marker> {
        type Value = SafePath<Marker>;
        fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            self.0.sandbox_join(s).map_err(serde::de::Error::custom)
        }
    }
}

// Public exports
pub use error::{BlockReason, SandboxError};
pub use extension::{split, ExtensionChain};
pub use normalize::{normalize, relative_to, Anchor, LexicalPath};
pub use path::safe_path::SafePath;
pub use pipeline::{Pipeline, Transformation};
pub use processor::{Clock, FileProcessor, FixedClock, SystemClock, TransformPolicy};
pub use resolver::{resolve, CandidatePath};
pub use validator::sandbox::{is_within, validate, ValidationVerdict};
pub use validator::trusted_root::TrustedRoot;

/// Result type alias for this crate's operations.
pub type Result<T> = std::result::Result<T, SandboxError>;

#[cfg(test)]
mod tests;
