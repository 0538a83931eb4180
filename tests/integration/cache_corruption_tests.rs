use super::common::{group_names, run_json, write};
use dupsweep::cache::{HashCache, DEFAULT_CACHE_FILE};
use dupsweep::error::ExitCode;
use dupsweep::scanner::HashAlgorithm;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn populate(dir: &Path) {
    write(dir, "a.txt", b"payload");
    write(dir, "b.txt", b"payload");
    write(dir, "c.txt", b"another");
}

#[test]
fn test_garbage_cache_matches_no_cache_run() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let cache_path = dir.path().join(DEFAULT_CACHE_FILE);
    fs::write(&cache_path, b"\x00\x01 definitely not json").unwrap();

    let (code, with_corrupt) = run_json(dir.path(), &[]);
    let (_, without_cache) = run_json(dir.path(), &["--no-cache"]);

    assert_eq!(code, ExitCode::Success);
    assert_eq!(group_names(&with_corrupt), group_names(&without_cache));
    assert_eq!(with_corrupt["summary"]["cache_hits"], 0);
}

#[test]
fn test_corrupt_cache_is_rebuilt() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let cache_path = dir.path().join(DEFAULT_CACHE_FILE);
    fs::write(&cache_path, "[{\"path\": \"a.txt\", \"size\": ").unwrap();

    run_json(dir.path(), &[]);

    let rebuilt = HashCache::load(&cache_path, HashAlgorithm::Md5);
    assert_eq!(rebuilt.len(), 3);

    let (_, second) = run_json(dir.path(), &[]);
    assert_eq!(second["summary"]["cache_hits"], 3);
}

#[test]
fn test_wrong_shape_cache_is_ignored() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let cache_path = dir.path().join(DEFAULT_CACHE_FILE);
    fs::write(&cache_path, r#"{"a.txt:7": "deadbeef"}"#).unwrap();

    let (code, report) = run_json(dir.path(), &[]);

    assert_eq!(code, ExitCode::Success);
    assert_eq!(group_names(&report), vec![vec!["a.txt", "b.txt"]]);
    assert!(HashCache::load(&cache_path, HashAlgorithm::Md5).len() >= 3);
}

#[test]
fn test_empty_cache_file() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    fs::write(dir.path().join(DEFAULT_CACHE_FILE), b"").unwrap();

    let (code, report) = run_json(dir.path(), &[]);

    assert_eq!(code, ExitCode::Success);
    assert_eq!(group_names(&report).len(), 1);
}

#[cfg(unix)]
#[test]
fn test_unwritable_cache_location_does_not_fail_run() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    // A directory where the cache file should be makes the rename fail
    fs::create_dir(dir.path().join(DEFAULT_CACHE_FILE)).unwrap();

    let (code, report) = run_json(dir.path(), &[]);

    assert_eq!(code, ExitCode::Success);
    assert_eq!(group_names(&report).len(), 1);
}
