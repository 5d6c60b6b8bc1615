use crate::path::safe_path::SafePath;
use crate::processor::TransformPolicy;
use crate::TrustedRoot;
use std::collections::BTreeSet;

fn uploads() -> TrustedRoot {
    TrustedRoot::try_new("/srv/uploads").unwrap()
}

#[test]
fn test_accessors() {
    let path: SafePath = uploads().sandbox_join("reports/q1/summary.tar.gz").unwrap();
    assert_eq!(path.as_str(), "/srv/uploads/reports/q1/summary.tar.gz");
    assert_eq!(path.relative(), "reports/q1/summary.tar.gz");
    assert_eq!(path.file_name().as_deref(), Some("summary.tar.gz"));
    assert!(!path.is_root());

    let (stem, chain) = path.split_name().unwrap();
    assert_eq!(stem, "summary");
    assert_eq!(chain.suffixes(), [".tar", ".gz"]);
}

#[test]
fn test_root_path_has_no_file_name() {
    let top = uploads().sandbox_join(".").unwrap();
    assert!(top.is_root());
    assert_eq!(top.file_name(), None);
    assert_eq!(top.split_name(), None);
}

#[test]
fn test_transform_computes_without_revalidating() {
    let path = uploads().sandbox_join("data/sub/report.pdf").unwrap();
    let backup = TransformPolicy::relocate("/backup").unwrap();
    assert_eq!(path.transform(&backup), "/backup/report.pdf");
    // The source is untouched.
    assert_eq!(path, "/srv/uploads/data/sub/report.pdf");
}

#[test]
fn test_comparisons_use_the_path_text() {
    let root = uploads();
    let a = root.sandbox_join("a.txt").unwrap();
    let a_again = root.sandbox_join("x/../a.txt").unwrap();
    let b = root.sandbox_join("b.txt").unwrap();
    assert_eq!(a, a_again);
    assert!(a < b);

    let sorted: BTreeSet<_> = [b.clone(), a.clone(), a_again].into_iter().collect();
    assert_eq!(
        sorted.into_iter().map(SafePath::into_string).collect::<Vec<_>>(),
        vec!["/srv/uploads/a.txt", "/srv/uploads/b.txt"]
    );
}

#[test]
fn test_display_and_debug() {
    let path = uploads().sandbox_join("img/logo.png").unwrap();
    assert_eq!(format!("{path}"), "/srv/uploads/img/logo.png");
    let debug = format!("{path:?}");
    assert!(debug.contains("SafePath"));
    assert!(debug.contains("/srv/uploads/img/logo.png"));
}
