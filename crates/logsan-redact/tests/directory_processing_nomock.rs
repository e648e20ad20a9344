//! Real-filesystem tests for directory processing.

use logsan_redact::{ErrorKind, SanitizationConfig, SanitizationEngine};
use std::fs;
use std::path::Path;
use std::sync::Mutex;

fn engine(config: SanitizationConfig) -> SanitizationEngine {
    SanitizationEngine::new(SanitizationConfig {
        salt: "dir-tests".to_string(),
        ..config
    })
    .unwrap()
}

fn names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_only_allowed_extensions_processed() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(input.path().join("a.log"), "10.0.0.1\n").unwrap();
    fs::write(input.path().join("b.TXT"), "x@y.com\n").unwrap();
    fs::write(input.path().join("c.csv"), "10.0.0.2\n").unwrap();
    fs::write(input.path().join("d.bin"), "zz\n").unwrap();
    fs::create_dir(input.path().join("nested.log")).unwrap();

    let summary = engine(SanitizationConfig::default())
        .process_directory(input.path(), output.path())
        .unwrap();

    assert_eq!(summary.total(), 2);
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(names(output.path()), vec!["a.log", "b.TXT"]);
}

#[test]
fn test_creates_output_directory() {
    let input = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let output = root.path().join("deep").join("out");
    fs::write(input.path().join("a.log"), "hello\n").unwrap();

    let summary = engine(SanitizationConfig::default())
        .process_directory(input.path(), &output)
        .unwrap();
    assert_eq!(summary.succeeded(), 1);
    assert!(output.join("a.log").is_file());
}

#[test]
fn test_missing_input_directory_fails_whole_call() {
    let root = tempfile::tempdir().unwrap();
    let err = engine(SanitizationConfig::default())
        .process_directory(&root.path().join("missing"), &root.path().join("out"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!root.path().join("out").exists());
}

#[test]
fn test_sanitized_outputs_skipped_and_collisions_renamed() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("app.log"), "10.0.0.1\n").unwrap();
    fs::write(dir.path().join("app_sanitized.log"), "old output\n").unwrap();
    fs::write(dir.path().join("app_sanitized_1.log"), "older output\n").unwrap();

    // Input and output are the same folder: the original stays untouched.
    let summary = engine(SanitizationConfig::default())
        .process_directory(dir.path(), dir.path())
        .unwrap();

    assert_eq!(summary.total(), 1);
    assert_eq!(summary.results[0].output, dir.path().join("app_sanitized_2.log"));
    assert_eq!(fs::read_to_string(dir.path().join("app.log")).unwrap(), "10.0.0.1\n");
    assert_eq!(
        fs::read_to_string(dir.path().join("app_sanitized.log")).unwrap(),
        "old output\n"
    );
    let fresh = fs::read_to_string(dir.path().join("app_sanitized_2.log")).unwrap();
    assert!(fresh.starts_with("[IP4-"), "{}", fresh);
}

#[test]
fn test_existing_destination_not_overwritten() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(input.path().join("a.log"), "10.0.0.1\n").unwrap();
    fs::write(output.path().join("a.log"), "precious\n").unwrap();

    let summary = engine(SanitizationConfig::default())
        .process_directory(input.path(), output.path())
        .unwrap();

    assert_eq!(summary.succeeded(), 1);
    assert_eq!(fs::read_to_string(output.path().join("a.log")).unwrap(), "precious\n");
    assert!(output.path().join("a_sanitized.log").is_file());
}

#[test]
fn test_overwrite_replaces_in_place() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.log"), "mail a@b.com\n").unwrap();

    let summary = engine(SanitizationConfig {
        overwrite_output: true,
        ..Default::default()
    })
    .process_directory(dir.path(), dir.path())
    .unwrap();

    assert_eq!(summary.succeeded(), 1);
    assert_eq!(names(dir.path()), vec!["a.log"]);
    let text = fs::read_to_string(dir.path().join("a.log")).unwrap();
    assert!(text.starts_with("mail [EMAIL-"), "{}", text);
}

#[test]
fn test_tokens_shared_across_files() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    for i in 0..8 {
        fs::write(input.path().join(format!("f{}.log", i)), "peer 10.9.8.7\n").unwrap();
    }

    let engine = engine(SanitizationConfig::default());
    let summary = engine.process_directory(input.path(), output.path()).unwrap();
    assert_eq!(summary.succeeded(), 8);

    let outputs: Vec<String> = (0..8)
        .map(|i| fs::read_to_string(output.path().join(format!("f{}.log", i))).unwrap())
        .collect();
    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(engine.cached_tokens(), 1);
}

#[test]
fn test_progress_per_file_completion() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    for i in 0..5 {
        fs::write(input.path().join(format!("f{}.log", i)), "line\n").unwrap();
    }

    let reports = Mutex::new(Vec::new());
    let sink = |p: f64| reports.lock().unwrap().push(p);
    engine(SanitizationConfig::default())
        .process_directory_with_progress(input.path(), output.path(), &sink)
        .unwrap();

    let reports = reports.into_inner().unwrap();
    assert_eq!(reports, vec![20.0, 40.0, 60.0, 80.0, 100.0]);
}

#[test]
fn test_empty_extension_set_takes_every_file() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(input.path().join("README"), "hi\n").unwrap();
    fs::write(input.path().join("x.csv"), "hi\n").unwrap();

    let summary = engine(SanitizationConfig {
        allowed_extensions: Vec::new(),
        ..Default::default()
    })
    .process_directory(input.path(), output.path())
    .unwrap();
    assert_eq!(summary.total(), 2);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_isolated() {
    use std::os::unix::fs::PermissionsExt;

    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(input.path().join("good.log"), "10.0.0.1\n").unwrap();
    let bad = input.path().join("bad.log");
    fs::write(&bad, "10.0.0.2\n").unwrap();
    fs::set_permissions(&bad, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores permission bits; nothing to isolate then.
    if fs::read(&bad).is_ok() {
        return;
    }

    let summary = engine(SanitizationConfig::default())
        .process_directory(input.path(), output.path())
        .unwrap();

    assert_eq!(summary.total(), 2);
    assert_eq!(summary.succeeded(), 1);
    let failure = summary.failures().next().unwrap();
    assert_eq!(failure.input, bad);
    assert_eq!(failure.error().unwrap().kind(), ErrorKind::Io);
    assert!(output.path().join("good.log").is_file());
    assert!(!output.path().join("bad.log").exists());
}
