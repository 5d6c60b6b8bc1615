//! SUMMARY:
//! Collapse path strings into their canonical lexical form without touching the filesystem.
//!
//! OVERVIEW:
//! Both `/` and `\` are accepted as separators on input and `/` is the only
//! separator on output, so results do not depend on the host convention.
//! Repeated separators collapse, `.` segments drop, and `..` pops the preceding
//! segment when one exists. A leading `..` on a relative path is kept: lexical
//! normalization cannot know whether the physical starting point has a parent.
//! Under an anchor (`/` or a drive such as `C:/`) an extra `..` is dropped, the
//! same way POSIX treats `/..`.
//!
//! `normalize(normalize(p)) == normalize(p)` holds for every input.
use std::fmt;

/// True for either separator convention.
#[inline]
pub(crate) fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// SUMMARY:
/// Describe what a path is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Anchor {
    /// No anchor; the path is relative to some unspecified start.
    Relative,
    /// Rooted at the separator (`/a/b`).
    Root,
    /// Rooted at a drive (`C:/a/b`). The letter keeps the case it was given in.
    Drive(char),
}

impl Anchor {
    #[inline]
    pub fn is_absolute(self) -> bool {
        !matches!(self, Anchor::Relative)
    }
}

/// SUMMARY:
/// Hold a lexically normalized path as an anchor plus a segment sequence.
///
/// DETAILS:
/// Every constructor runs the normalization rules, so a `LexicalPath` never
/// contains empty, `.` or separator-bearing segments, and only a relative path
/// may carry `..` (and then only as a leading run). Comparisons that must be
/// segment-aligned (`starts_with`, `strip_prefix`) operate on this form rather
/// than on raw characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LexicalPath {
    anchor: Anchor,
    segments: Vec<String>,
}

impl LexicalPath {
    /// SUMMARY:
    /// Parse and normalize a path string. Total: every input yields a value.
    ///
    /// EXAMPLE:
    /// ```rust
    /// use sandbox_path::normalize::LexicalPath;
    /// let p = LexicalPath::parse("./documents//folder///file.txt");
    /// assert_eq!(p.to_string(), "documents/folder/file.txt");
    /// assert_eq!(p.file_name(), Some("file.txt"));
    /// ```
    pub fn parse(input: &str) -> Self {
        let (anchor, rest) = split_anchor(input);
        let mut path = LexicalPath {
            anchor,
            segments: Vec::new(),
        };
        for part in rest.split(is_separator) {
            path.push_segment(part);
        }
        path
    }

    /// The empty path anchored at `anchor`.
    pub fn anchored(anchor: Anchor) -> Self {
        LexicalPath {
            anchor,
            segments: Vec::new(),
        }
    }

    #[inline]
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    #[inline]
    pub fn is_absolute(&self) -> bool {
        self.anchor.is_absolute()
    }

    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The final segment, unless the path is empty or ends in `..`.
    pub fn file_name(&self) -> Option<&str> {
        match self.segments.last() {
            Some(last) if last != ".." => Some(last.as_str()),
            _ => None,
        }
    }

    /// SUMMARY:
    /// Return the path without its final segment.
    ///
    /// RETURNS:
    /// - `Option<LexicalPath>`: `None` when there is no file name to remove
    ///   (an anchor, `.`, or a path ending in `..`).
    pub fn parent(&self) -> Option<LexicalPath> {
        self.file_name()?;
        let mut parent = self.clone();
        parent.segments.pop();
        Some(parent)
    }

    /// SUMMARY:
    /// Append `other`'s segments below this path, normalizing as it goes.
    ///
    /// DETAILS:
    /// This is a segment join: the anchor of `other` is ignored, so joining an
    /// absolute-looking path never replaces `self` the way `std::path::Path::join`
    /// does. `..` segments in `other` may still walk above `self`; callers that
    /// need containment must validate the result.
    pub fn join(&self, other: &LexicalPath) -> LexicalPath {
        let mut joined = self.clone();
        for segment in &other.segments {
            joined.push_segment(segment);
        }
        joined
    }

    /// Append a single name below this path (the name is parsed, never trusted).
    pub fn join_str(&self, other: &str) -> LexicalPath {
        self.join(&LexicalPath::parse(other))
    }

    /// SUMMARY:
    /// Append `name` as exactly one literal segment.
    ///
    /// RETURNS:
    /// - `Option<LexicalPath>`: `None` when `name` is empty, `.` or `..`, or contains
    ///   a separator, since any of those would move the result to another directory.
    pub fn child(&self, name: &str) -> Option<LexicalPath> {
        if matches!(name, "" | "." | "..") || name.contains(is_separator) {
            return None;
        }
        let mut child = self.clone();
        child.segments.push(name.to_owned());
        Some(child)
    }

    /// Drop the anchor, keeping the segments as a relative path.
    pub fn strip_anchor(self) -> LexicalPath {
        LexicalPath {
            anchor: Anchor::Relative,
            segments: self.segments,
        }
    }

    /// SUMMARY:
    /// Segment-aligned prefix test.
    ///
    /// DETAILS:
    /// `/home/user` is a prefix of `/home/user/docs` and of itself, never of
    /// `/home/user2`. Anchors must match exactly.
    pub fn starts_with(&self, prefix: &LexicalPath) -> bool {
        self.anchor == prefix.anchor
            && self.segments.len() >= prefix.segments.len()
            && self
                .segments
                .iter()
                .zip(prefix.segments.iter())
                .all(|(ours, theirs)| ours == theirs)
    }

    /// Remainder after a segment-aligned `prefix`, as a relative path.
    pub fn strip_prefix(&self, prefix: &LexicalPath) -> Option<LexicalPath> {
        if !self.starts_with(prefix) {
            return None;
        }
        Some(LexicalPath {
            anchor: Anchor::Relative,
            segments: self.segments[prefix.segments.len()..].to_vec(),
        })
    }

    fn push_segment(&mut self, part: &str) {
        match part {
            "" | "." => {}
            ".." => match self.segments.last() {
                Some(last) if last != ".." => {
                    self.segments.pop();
                }
                // Nothing above an anchor.
                _ if self.anchor.is_absolute() => {}
                _ => self.segments.push("..".to_owned()),
            },
            name => self.segments.push(name.to_owned()),
        }
    }
}

impl fmt::Display for LexicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.anchor {
            Anchor::Root => f.write_str("/")?,
            Anchor::Drive(letter) => write!(f, "{letter}:/")?,
            Anchor::Relative => {
                let Some(first) = self.segments.first() else {
                    return f.write_str(".");
                };
                // Keep a relative `C:/x` from reading back as drive-rooted.
                if looks_like_drive(first) {
                    f.write_str("./")?;
                }
            }
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl From<&str> for LexicalPath {
    fn from(value: &str) -> Self {
        LexicalPath::parse(value)
    }
}

fn looks_like_drive(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn split_anchor(input: &str) -> (Anchor, &str) {
    if input.starts_with(is_separator) {
        return (Anchor::Root, input);
    }
    let bytes = input.as_bytes();
    if bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\')
    {
        return (Anchor::Drive(bytes[0] as char), &input[2..]);
    }
    (Anchor::Relative, input)
}

/// SUMMARY:
/// Normalize a path string lexically.
///
/// EXAMPLE:
/// ```rust
/// use sandbox_path::normalize;
/// assert_eq!(normalize("a/b/c/../../d/file.txt"), "a/d/file.txt");
/// assert_eq!(normalize("../../etc/passwd"), "../../etc/passwd");
/// assert_eq!(normalize("/srv/uploads/../../etc"), "/etc");
/// assert_eq!(normalize(""), ".");
/// ```
pub fn normalize(path: &str) -> String {
    LexicalPath::parse(path).to_string()
}

/// SUMMARY:
/// Compute the lexical relative path that leads from `base` to `target`.
///
/// RETURNS:
/// - `Some(String)`: The relative path (`.` when both are equal).
/// - `None`: The anchors differ, or `base` keeps leading `..` segments that
///   cannot be walked back without knowing the filesystem.
///
/// EXAMPLE:
/// ```rust
/// use sandbox_path::normalize::relative_to;
/// assert_eq!(
///     relative_to("/home/user/projects/app", "/home/user/docs/readme.txt").as_deref(),
///     Some("../../docs/readme.txt")
/// );
/// ```
pub fn relative_to(base: &str, target: &str) -> Option<String> {
    let base = LexicalPath::parse(base);
    let target = LexicalPath::parse(target);
    if base.anchor != target.anchor {
        return None;
    }
    let common = base
        .segments
        .iter()
        .zip(target.segments.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let climb = &base.segments[common..];
    if climb.iter().any(|segment| segment == "..") {
        return None;
    }
    let mut segments: Vec<String> = climb.iter().map(|_| "..".to_owned()).collect();
    segments.extend(target.segments[common..].iter().cloned());
    Some(
        LexicalPath {
            anchor: Anchor::Relative,
            segments,
        }
        .to_string(),
    )
}
