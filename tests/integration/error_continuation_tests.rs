use super::common::write;
use dupsweep::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupsweep::scanner::{FileEntry, HashError};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::SystemTime;
use tempfile::tempdir;

#[test]
fn test_missing_files_are_collected_not_fatal() {
    let finder = DuplicateFinder::with_defaults();
    let file1 = FileEntry::new(PathBuf::from("nonexistent_1.txt"), 100, SystemTime::now());
    let file2 = FileEntry::new(PathBuf::from("nonexistent_2.txt"), 100, SystemTime::now());

    let (groups, summary) = finder
        .find_duplicates_from_files(vec![file1, file2], None)
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.hash_errors.len(), 2);
    for err in &summary.hash_errors {
        assert!(matches!(err, HashError::NotFound(_)), "unexpected error: {err:?}");
    }
}

#[test]
fn test_unreadable_member_leaves_rest_of_bucket() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"same");
    let b = write(dir.path(), "b.txt", b"same");
    let now = SystemTime::now();
    let files = vec![
        FileEntry::new(a, 4, now),
        FileEntry::new(dir.path().join("gone.txt"), 4, now),
        FileEntry::new(b, 4, now),
    ];

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_from_files(files, None)
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert_eq!(summary.error_count(), 1);
}

#[test]
fn test_interrupted_run_exits_130_and_keeps_cache() {
    use clap::Parser;
    use dupsweep::cache::DEFAULT_CACHE_FILE;
    use dupsweep::cli::Cli;
    use dupsweep::config::Config;
    use dupsweep::error::ExitCode;
    use dupsweep::signal::ShutdownHandler;

    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"same");
    write(dir.path(), "b.txt", b"same");

    let cli = Cli::try_parse_from(["dupsweep", "-q", dir.path().to_str().unwrap()]).unwrap();
    let shutdown = ShutdownHandler::new();
    shutdown.request_shutdown();

    let mut out = Vec::new();
    let code = dupsweep::execute(&cli, &Config::default(), &shutdown, &mut out, false).unwrap();

    assert_eq!(code, ExitCode::Interrupted);
    assert!(out.is_empty());
    assert!(dir.path().join(DEFAULT_CACHE_FILE).exists());
}

#[test]
fn test_preset_shutdown_interrupts() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"z");
    write(dir.path(), "b.txt", b"z");

    let flag = Arc::new(AtomicBool::new(true));
    let finder = DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(flag));

    assert!(matches!(
        finder.find_duplicates(dir.path(), None),
        Err(FinderError::Interrupted)
    ));
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    assert!(matches!(
        DuplicateFinder::with_defaults().find_duplicates(&missing, None),
        Err(FinderError::PathNotFound(_))
    ));
}
