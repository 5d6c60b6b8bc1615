//! SUMMARY:
//! Split a file name into a bare stem and its ordered chain of extension suffixes.
//!
//! DETAILS:
//! Suffixes are peeled from the right, one `.` at a time, for as long as the
//! remaining stem still holds a `.` that is not its first character. So
//! `archive.tar.gz` yields `archive` + `[".tar", ".gz"]`, and a hidden file such
//! as `.gitignore` keeps its whole name as the stem with no suffixes.
//!
//! The split is greedy: `name.with.dots.txt` becomes `name` +
//! `[".with", ".dots", ".txt"]`. There is no content sniffing; callers that
//! care about only the final suffix should use `ExtensionChain::last`.
use crate::normalize::is_separator;
use std::fmt;

/// SUMMARY:
/// Ordered extension suffixes, each with its leading dot (`[".tar", ".gz"]`).
///
/// DETAILS:
/// Never edited in place: every transformation returns a new chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ExtensionChain {
    suffixes: Vec<String>,
}

impl ExtensionChain {
    /// An empty chain.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    #[inline]
    pub fn first(&self) -> Option<&str> {
        self.suffixes.first().map(String::as_str)
    }

    #[inline]
    pub fn last(&self) -> Option<&str> {
        self.suffixes.last().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    /// SUMMARY:
    /// Replace the final suffix, or append when the chain is empty.
    ///
    /// DETAILS:
    /// An empty `suffix` removes the final element instead. The caller is
    /// responsible for passing a suffix without separators; `TransformPolicy`
    /// validates this at construction.
    pub fn with_last_replaced(&self, suffix: &str) -> ExtensionChain {
        let mut suffixes = self.suffixes.clone();
        suffixes.pop();
        if !suffix.is_empty() {
            suffixes.push(suffix.to_owned());
        }
        ExtensionChain { suffixes }
    }

    /// The chain without its final suffix.
    pub fn without_last(&self) -> ExtensionChain {
        let mut suffixes = self.suffixes.clone();
        suffixes.pop();
        ExtensionChain { suffixes }
    }
}

impl fmt::Display for ExtensionChain {
    /// The suffixes concatenated in order (`.tar.gz`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for suffix in &self.suffixes {
            f.write_str(suffix)?;
        }
        Ok(())
    }
}

/// SUMMARY:
/// Decompose a file name into `(stem, chain)`.
///
/// PARAMETERS:
/// - `filename` (&`str`): A file name. If it contains separators, only the final
///   component is split, so the stem never contains a separator.
///
/// RETURNS:
/// - `(String, ExtensionChain)`: Stem and suffixes; `stem + chain` rebuilds the name.
///
/// EXAMPLE:
/// ```rust
/// use sandbox_path::split;
/// let (stem, chain) = split("archive.tar.gz");
/// assert_eq!(stem, "archive");
/// assert_eq!(chain.suffixes(), [".tar", ".gz"]);
///
/// let (stem, chain) = split(".gitignore");
/// assert_eq!(stem, ".gitignore");
/// assert!(chain.is_empty());
/// ```
pub fn split(filename: &str) -> (String, ExtensionChain) {
    let name = filename.rsplit(is_separator).next().unwrap_or(filename);
    let mut stem = name;
    let mut suffixes = Vec::new();
    while let Some(dot) = stem.rfind('.') {
        // A leading dot marks a hidden file, not an extension.
        if dot == 0 {
            break;
        }
        let suffix = &stem[dot..];
        if suffix.len() == 1 {
            break;
        }
        suffixes.push(suffix.to_owned());
        stem = &stem[..dot];
    }
    suffixes.reverse();
    (stem.to_owned(), ExtensionChain { suffixes })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(name: &str) -> (String, Vec<String>) {
        let (stem, chain) = split(name);
        (stem, chain.suffixes().to_vec())
    }

    #[test]
    fn multi_suffix_archive() {
        assert_eq!(
            parts("archive.tar.gz"),
            ("archive".into(), vec![".tar".into(), ".gz".into()])
        );
    }

    #[test]
    fn hidden_files_are_extensionless() {
        assert_eq!(parts(".gitignore"), (".gitignore".into(), vec![]));
        assert_eq!(parts(".env"), (".env".into(), vec![]));
        assert_eq!(parts(".bashrc.bak"), (".bashrc".into(), vec![".bak".into()]));
    }

    #[test]
    fn names_without_dots_have_empty_chain() {
        assert_eq!(parts("Makefile"), ("Makefile".into(), vec![]));
        assert_eq!(parts(""), ("".into(), vec![]));
    }

    #[test]
    fn trailing_and_doubled_dots_stop_the_peel() {
        assert_eq!(parts("file."), ("file.".into(), vec![]));
        assert_eq!(parts("archive..gz"), ("archive.".into(), vec![".gz".into()]));
        assert_eq!(parts("..."), ("...".into(), vec![]));
        assert_eq!(parts(".."), ("..".into(), vec![]));
    }

    #[test]
    fn greedy_split_of_dotted_names() {
        assert_eq!(
            parts("name.with.dots.txt"),
            (
                "name".into(),
                vec![".with".into(), ".dots".into(), ".txt".into()]
            )
        );
    }

    #[test]
    fn only_the_final_component_is_split() {
        assert_eq!(
            parts("/data/v1.2/report.pdf"),
            ("report".into(), vec![".pdf".into()])
        );
        assert_eq!(parts("dir.d\\notes.md"), ("notes".into(), vec![".md".into()]));
        let (stem, _) = split("a.b/c.d/e");
        assert_eq!(stem, "e");
    }

    #[test]
    fn stem_plus_chain_rebuilds_the_name() {
        for name in ["archive.tar.gz", ".gitignore", "a.b.c", "x", "file.", ".bashrc.bak"] {
            let (stem, chain) = split(name);
            assert_eq!(format!("{stem}{chain}"), name);
        }
    }

    #[test]
    fn chain_transformations_return_new_chains() {
        let (_, chain) = split("archive.tar.gz");
        let rewritten = chain.with_last_replaced(".zip");
        assert_eq!(rewritten.to_string(), ".tar.zip");
        assert_eq!(chain.to_string(), ".tar.gz");
        assert_eq!(chain.without_last().to_string(), ".tar");
        assert_eq!(chain.with_last_replaced("").to_string(), ".tar");
        assert_eq!(ExtensionChain::new().with_last_replaced(".mp3").to_string(), ".mp3");
        assert_eq!(chain.first(), Some(".tar"));
        assert_eq!(chain.last(), Some(".gz"));
        assert_eq!(chain.len(), 2);
    }
}
