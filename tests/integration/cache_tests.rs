use super::common::{group_names, run_json, write};
use dupsweep::cache::{HashCache, DEFAULT_CACHE_FILE};
use dupsweep::duplicates::DuplicateFinder;
use dupsweep::scanner::HashAlgorithm;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_second_run_is_served_from_cache() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"hello");
    write(dir.path(), "b.txt", b"hello");
    write(dir.path(), "c.txt", b"world");

    let finder = DuplicateFinder::with_defaults();
    let mut cache = HashCache::new();

    let (first_groups, first) = finder.find_duplicates(dir.path(), Some(&mut cache)).unwrap();
    assert_eq!(first.cache_hits, 0);
    assert_eq!(first.cache_misses, 3);
    assert_eq!(cache.len(), 3);

    let (second_groups, second) = finder.find_duplicates(dir.path(), Some(&mut cache)).unwrap();
    assert_eq!(second.cache_hits, 3);
    assert_eq!(second.cache_misses, 0);
    assert_eq!(first_groups, second_groups);
}

#[test]
fn test_idempotent_runs_through_cache_file() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"one");
    write(dir.path(), "b.txt", b"one");
    write(dir.path(), "c.txt", b"two");

    let (_, first) = run_json(dir.path(), &[]);
    let (_, second) = run_json(dir.path(), &[]);

    assert_eq!(group_names(&first), group_names(&second));
    assert_eq!(first["summary"]["cache_misses"], 3);
    assert_eq!(second["summary"]["cache_hits"], 3);
}

#[test]
fn test_cache_file_layout() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"abc");
    write(dir.path(), "b.txt", b"abc");

    run_json(dir.path(), &[]);

    let raw = fs::read_to_string(dir.path().join(DEFAULT_CACHE_FILE)).unwrap();
    let entries: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);

    let first = &entries[0];
    assert_eq!(first["path"], a.to_str().unwrap());
    assert_eq!(first["size"], 3);
    assert_eq!(first["algorithm"], "md5");
    // MD5 of "abc"
    assert_eq!(first["digest"], "900150983cd24fb0d6963f7d28e17f72");
}

#[test]
fn test_no_cache_flag_leaves_no_file() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"abc");
    write(dir.path(), "b.txt", b"abc");

    let (_, report) = run_json(dir.path(), &["--no-cache"]);

    assert_eq!(group_names(&report).len(), 1);
    assert!(!dir.path().join(DEFAULT_CACHE_FILE).exists());
}

#[test]
fn test_size_only_mode_skips_cache() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"abc");
    write(dir.path(), "b.txt", b"xyz");

    run_json(dir.path(), &["--size-only"]);

    assert!(!dir.path().join(DEFAULT_CACHE_FILE).exists());
}

#[test]
fn test_resized_file_is_rehashed() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"abc");
    write(dir.path(), "b.txt", b"abc");
    run_json(dir.path(), &[]);

    write(dir.path(), "b.txt", b"abcd");
    write(dir.path(), "c.txt", b"abcd");
    let (_, report) = run_json(dir.path(), &[]);

    assert_eq!(group_names(&report), vec![vec!["b.txt", "c.txt"]]);
    assert_eq!(report["summary"]["cache_misses"], 2);
}

#[test]
fn test_same_size_edit_is_a_stale_hit() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"same");
    write(dir.path(), "b.txt", b"same");
    run_json(dir.path(), &[]);

    // Same length, different bytes: the cached digest is reused
    write(dir.path(), "b.txt", b"diff");
    let (_, cached) = run_json(dir.path(), &[]);
    assert_eq!(group_names(&cached), vec![vec!["a.txt", "b.txt"]]);

    let (_, fresh) = run_json(dir.path(), &["--no-cache"]);
    assert!(group_names(&fresh).is_empty());
}

#[test]
fn test_switching_algorithm_with_warm_cache() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"X");
    write(dir.path(), "c.txt", b"Y");
    run_json(dir.path(), &[]);

    write(dir.path(), "b.txt", b"X");
    let (_, blake3) = run_json(dir.path(), &["--algorithm", "blake3"]);
    let (_, fresh) = run_json(dir.path(), &["--algorithm", "blake3", "--no-cache"]);

    assert_eq!(group_names(&blake3), vec![vec!["a.txt", "b.txt"]]);
    assert_eq!(group_names(&blake3), group_names(&fresh));
    assert_eq!(blake3["summary"]["cache_hits"], 0);

    // Back to the default: the blake3 run replaced every md5 record
    let (_, md5) = run_json(dir.path(), &[]);
    assert_eq!(group_names(&md5), vec![vec!["a.txt", "b.txt"]]);
    assert_eq!(md5["summary"]["cache_hits"], 0);

    let cache_path = dir.path().join(DEFAULT_CACHE_FILE);
    assert_eq!(HashCache::load(&cache_path, HashAlgorithm::Md5).len(), 3);
    assert!(HashCache::load(&cache_path, HashAlgorithm::Blake3).is_empty());
}

#[test]
fn test_cache_without_algorithm_is_rehashed() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"abc");
    let b = write(dir.path(), "b.txt", b"abc");
    let stale = serde_json::json!([
        { "path": a, "size": 3, "digest": "0000" },
        { "path": b, "size": 3, "digest": "1111" },
    ]);
    fs::write(dir.path().join(DEFAULT_CACHE_FILE), stale.to_string()).unwrap();

    let (_, report) = run_json(dir.path(), &[]);

    assert_eq!(group_names(&report), vec![vec!["a.txt", "b.txt"]]);
    assert_eq!(report["summary"]["cache_misses"], 2);
}

#[test]
fn test_deleted_files_leave_the_cache() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"dup");
    let b = write(dir.path(), "b.txt", b"dup");
    write(dir.path(), "c.txt", b"one");

    run_json(dir.path(), &["--delete", "--keep", "first"]);

    assert!(!b.exists());
    let cache = HashCache::load(&dir.path().join(DEFAULT_CACHE_FILE), HashAlgorithm::Md5);
    assert_eq!(cache.len(), 2);
    assert!(cache.get(&b, 3).is_none());
}

#[test]
fn test_dry_run_keeps_cache_entries() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"dup");
    write(dir.path(), "b.txt", b"dup");

    run_json(dir.path(), &["--dry-run"]);

    let cache = HashCache::load(&dir.path().join(DEFAULT_CACHE_FILE), HashAlgorithm::Md5);
    assert_eq!(cache.len(), 2);
}
