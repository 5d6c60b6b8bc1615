use crate::normalize::{is_separator, LexicalPath};
use crate::{
    is_within, normalize, split, BlockReason, FileProcessor, FixedClock, Pipeline, SandboxError,
    TransformPolicy, ValidationVerdict,
};

struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state >> 33
    }
    fn next_range(&mut self, max: usize) -> usize {
        (self.next_u64() as usize) % max
    }
    fn next_bool(&mut self) -> bool {
        self.next_u64() % 2 == 0
    }
}

fn generate_random_path(rng: &mut Lcg, depth: usize) -> String {
    let components = [
        ".",
        "..",
        "...",
        "",
        "uploads",
        "uploads2",
        "srv",
        "etc",
        "passwd",
        "C:",
        "mixed/sep",
        "mixed\\sep",
        "archive.tar.gz",
        "nul\0byte",
        " ",
    ];
    let mut path = String::new();

    // Maybe start with an anchor
    match rng.next_range(4) {
        0 => path.push('/'),
        1 => path.push_str("C:\\"),
        _ => {}
    }

    for i in 0..depth {
        if i > 0 {
            if rng.next_bool() {
                path.push('/');
            } else {
                path.push('\\');
            }
        }
        let idx = rng.next_range(components.len());
        path.push_str(components[idx]);
    }
    path
}

#[test]
fn fuzz_normalization_is_idempotent() {
    let mut rng = Lcg::new(12345);

    for _ in 0..2000 {
        let depth = rng.next_range(12) + 1;
        let input = generate_random_path(&mut rng, depth);
        let once = normalize(&input);
        let twice = normalize(&once);
        assert_eq!(once, twice, "normalize is not idempotent for {input:?}");
        assert!(!once.contains('\\'), "backslash survived in {once:?}");
        assert!(
            once == "/" || once == "C:/" || !once.ends_with('/'),
            "trailing separator in {once:?}"
        );
    }
}

#[test]
fn fuzz_resolve_security_invariant() {
    let pipeline: Pipeline = Pipeline::try_new("/srv/uploads").unwrap();
    let mut rng = Lcg::new(67890);
    let mut accepted = 0;
    let mut escaped = 0;

    for _ in 0..2000 {
        let depth = rng.next_range(10) + 1;
        let input = generate_random_path(&mut rng, depth);

        match pipeline.resolve(&input) {
            Ok(safe_path) => {
                accepted += 1;
                assert!(
                    is_within("/srv/uploads", safe_path.as_str()),
                    "Security invariant violated! Path escaped root.\nInput: {input:?}\nResult: {safe_path}"
                );
                assert!(!safe_path.as_str().starts_with("/srv/uploads2"));
                assert_eq!(normalize(safe_path.as_str()), safe_path.as_str());
            }
            Err(SandboxError::EscapesRoot { attempted, .. }) => {
                escaped += 1;
                assert!(!is_within("/srv/uploads", &attempted), "{input:?} -> {attempted}");
            }
            Err(SandboxError::NormalizationFailed { .. }) => {
                assert!(input.contains('\0'));
            }
            Err(SandboxError::EmptyInput) => {
                assert!(input.trim().is_empty());
            }
            Err(e) => panic!("unexpected error for {input:?}: {e:?}"),
        }
    }

    // The corpus must exercise both outcomes.
    assert!(accepted > 0);
    assert!(escaped > 0);
}

#[test]
fn fuzz_check_and_resolve_agree() {
    let pipeline: Pipeline = Pipeline::try_new("C:\\data").unwrap();
    let mut rng = Lcg::new(424242);

    for _ in 0..1000 {
        let depth = rng.next_range(8) + 1;
        let input = generate_random_path(&mut rng, depth);

        match (pipeline.check(&input), pipeline.resolve(&input)) {
            (ValidationVerdict::Safe(path), Ok(safe_path)) => assert_eq!(path, safe_path.as_str()),
            (ValidationVerdict::Blocked(reason), Err(err)) => {
                assert_eq!(Some(reason), err.block_reason(), "{input:?}")
            }
            (verdict, result) => panic!("{input:?}: check gave {verdict:?}, resolve gave {result:?}"),
        }
    }
}

#[test]
fn deep_traversal_chains_are_blocked() {
    let pipeline: Pipeline = Pipeline::try_new("/srv/uploads").unwrap();
    let deep = "../".repeat(10_000) + "etc/passwd";
    assert_eq!(
        pipeline.check(&deep),
        ValidationVerdict::Blocked(BlockReason::EscapesRoot)
    );
    let long_inside = "a/".repeat(10_000) + "b";
    assert!(pipeline.resolve(&long_inside).is_ok());
}

fn generate_random_file_name(rng: &mut Lcg) -> String {
    let pieces = [".", "..", "a", "log", "tar", "gz", "_", "2025-01-04"];
    loop {
        let mut name = String::new();
        for _ in 0..rng.next_range(5) + 1 {
            name.push_str(pieces[rng.next_range(pieces.len())]);
        }
        if name != "." && name != ".." {
            return name;
        }
    }
}

#[test]
fn fuzz_renames_keep_the_original_directory() {
    let policies = [
        TransformPolicy::extension_rewrite("").unwrap(),
        TransformPolicy::extension_rewrite(".zip").unwrap(),
        TransformPolicy::extension_rewrite(".a").unwrap(),
        TransformPolicy::timestamp_rotate(&FixedClock::new("2025-01-04")).unwrap(),
        TransformPolicy::timestamp_rotate(&FixedClock::new(".")).unwrap(),
        // Built directly, bypassing constructor validation.
        TransformPolicy::ExtensionRewrite(".".into()),
        TransformPolicy::ExtensionRewrite("..".into()),
        TransformPolicy::TimestampRotate("..".into()),
    ];
    let dirs = ["/srv/uploads", "/srv/uploads/inner", "relative/dir", "C:/logs"];
    let mut rng = Lcg::new(31337);

    for _ in 0..2000 {
        let name = generate_random_file_name(&mut rng);
        let original = format!("{}/{name}", dirs[rng.next_range(dirs.len())]);
        let original_path = LexicalPath::parse(&original);

        for policy in &policies {
            let target = policy.apply(&original);
            let target_path = LexicalPath::parse(&target);
            assert_eq!(
                target_path.parent(),
                original_path.parent(),
                "{policy} moved {original:?} to {target:?}"
            );
            let new_name = target_path.file_name().unwrap_or_default();
            let (stem, _) = split(new_name);
            assert!(!stem.contains(is_separator), "{policy}: stem {stem:?}");
        }
    }
}

#[test]
fn renames_of_dot_stems_under_the_pipeline_stay_inside_the_root() {
    let pipeline: Pipeline = Pipeline::try_new("/srv/uploads").unwrap();
    let dot = TransformPolicy::ExtensionRewrite(".".into());
    let drop_last = TransformPolicy::extension_rewrite("").unwrap();

    let job = pipeline.process("..a", &dot).unwrap();
    assert_eq!(job.target(), "/srv/uploads/..a");
    let job = pipeline.process("inner/..a", &drop_last).unwrap();
    assert_eq!(job.target(), "/srv/uploads/inner/..a");
    assert!(is_within("/srv/uploads", job.target()));
}
