use super::common::{group_names, run, run_json, write};
use dupsweep::duplicates::{CompareMode, DuplicateFinder, FinderConfig, GroupKey};
use dupsweep::error::ExitCode;
use dupsweep::scanner::WalkerConfig;
use tempfile::tempdir;

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder.find_duplicates(dir.path(), None).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_distinct_sizes_produce_no_groups() {
    let dir = tempdir().unwrap();
    write(dir.path(), "one.txt", b"a");
    write(dir.path(), "two.txt", b"ab");
    write(dir.path(), "three.txt", b"abc");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path(), None).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.eliminated_by_size, 3);
    assert_eq!(summary.hashed_files, 0);
}

#[test]
fn test_equal_pair_and_odd_one_out() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"X");
    write(dir.path(), "b.txt", b"X");
    write(dir.path(), "c.txt", b"Y");

    let (code, report) = run_json(dir.path(), &[]);

    assert_eq!(code, ExitCode::Success);
    assert_eq!(group_names(&report), vec![vec!["a.txt", "b.txt"]]);
    assert_eq!(report["summary"]["files_in_groups"], 2);
    assert_eq!(report["summary"]["reclaimable_space"], 1);
}

#[test]
fn test_same_size_different_content_hash_vs_size_only() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"AAAA");
    write(dir.path(), "b.txt", b"BBBB");

    let (_, hashed) = run_json(dir.path(), &[]);
    assert!(group_names(&hashed).is_empty());

    let (_, size_only) = run_json(dir.path(), &["--size-only"]);
    assert_eq!(group_names(&size_only), vec![vec!["a.txt", "b.txt"]]);
    assert_eq!(size_only["duplicates"][0]["key"]["size"], 4);

    let (_, no_hash) = run_json(dir.path(), &["--no-hash"]);
    assert_eq!(group_names(&no_hash), group_names(&size_only));
}

#[test]
fn test_size_only_mode_reads_no_content() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.bin", b"12345");
    write(dir.path(), "b.bin", b"54321");

    let config = FinderConfig::default().with_compare_mode(CompareMode::SizeOnly);
    let (groups, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path(), None)
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key, GroupKey::Size(5));
    assert_eq!(summary.hashed_files, 0);
}

#[test]
fn test_recursive_flag_controls_depth() {
    let dir = tempdir().unwrap();
    write(dir.path(), "top.txt", b"shared");
    write(dir.path(), "nested/deep.txt", b"shared");

    let (_, flat) = run_json(dir.path(), &[]);
    assert!(group_names(&flat).is_empty());

    let (_, deep) = run_json(dir.path(), &["--recursive"]);
    assert_eq!(group_names(&deep).len(), 1);
}

#[test]
fn test_extension_filter_is_case_insensitive() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.JPG", b"pixels");
    write(dir.path(), "b.jpg", b"pixels");
    write(dir.path(), "c.txt", b"pixels");

    let (_, report) = run_json(dir.path(), &["-e", ".jpg"]);

    assert_eq!(group_names(&report), vec![vec!["a.JPG", "b.jpg"]]);
    assert_eq!(report["summary"]["total_files"], 2);
}

#[test]
fn test_size_bounds_are_inclusive() {
    let dir = tempdir().unwrap();
    write(dir.path(), "small1", &[1; 10]);
    write(dir.path(), "small2", &[1; 10]);
    write(dir.path(), "big1", &[2; 20]);
    write(dir.path(), "big2", &[2; 20]);

    let (_, exact) = run_json(dir.path(), &["--min-size", "10", "--max-size", "10"]);
    assert_eq!(group_names(&exact), vec![vec!["small1", "small2"]]);

    let (_, above) = run_json(dir.path(), &["--min-size", "11"]);
    assert_eq!(group_names(&above), vec![vec!["big1", "big2"]]);
}

#[test]
fn test_hidden_files_need_flag() {
    let dir = tempdir().unwrap();
    write(dir.path(), ".a", b"secret");
    write(dir.path(), ".b", b"secret");

    let (_, default) = run_json(dir.path(), &[]);
    assert!(group_names(&default).is_empty());

    let (_, hidden) = run_json(dir.path(), &["-a", "--no-cache"]);
    assert_eq!(group_names(&hidden), vec![vec![".a", ".b"]]);
}

#[test]
fn test_cache_file_is_never_a_candidate() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"data");
    write(dir.path(), "b.txt", b"data");

    let (_, first) = run_json(dir.path(), &["-a"]);
    assert!(dir.path().join(".dup_cache.json").exists());

    let (_, second) = run_json(dir.path(), &["-a"]);
    assert_eq!(first["summary"]["total_files"], 2);
    assert_eq!(second["summary"]["total_files"], 2);
}

#[test]
fn test_sort_orders() {
    let dir = tempdir().unwrap();
    // Three small copies, two large copies
    for name in ["s1", "s2", "s3"] {
        write(dir.path(), name, b"x");
    }
    for name in ["l1", "l2"] {
        write(dir.path(), name, &[7; 100]);
    }

    let (_, by_size) = run_json(dir.path(), &["--sort", "size"]);
    assert_eq!(group_names(&by_size)[0], vec!["l1", "l2"]);

    let (_, by_count) = run_json(dir.path(), &["--sort", "count"]);
    assert_eq!(group_names(&by_count)[0], vec!["s1", "s2", "s3"]);
}

#[test]
fn test_text_report() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"same");
    write(dir.path(), "b.txt", b"same");

    let (code, text) = run(dir.path(), &[]);

    assert_eq!(code, ExitCode::Success);
    assert!(text.starts_with("Found 1 duplicate group(s): 2 files in groups"));
    assert!(text.contains("Group 1:"));
    assert!(text.contains("a.txt  Modified: "));
    assert!(text.contains("b.txt  Modified: "));
}

#[test]
fn test_walker_config_through_finder() {
    let dir = tempdir().unwrap();
    write(dir.path(), "keep.log", b"zz");
    write(dir.path(), "skip.log", b"zz");

    let walker = WalkerConfig::default().with_excluded_name("skip.log");
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker));
    let (groups, summary) = finder.find_duplicates(dir.path(), None).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
}
