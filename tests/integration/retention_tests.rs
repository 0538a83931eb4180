use dupsweep::actions::{plan_group, rank, select_retained, KeepPolicy};
use dupsweep::duplicates::{DuplicateGroup, GroupKey};
use dupsweep::scanner::FileEntry;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

fn file(name: &str, secs: u64) -> FileEntry {
    FileEntry::new(
        PathBuf::from(name),
        42,
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs),
    )
}

#[test]
fn test_policies_pick_expected_survivor() {
    let files = vec![file("mid", 200), file("new", 300), file("old", 100)];

    assert_eq!(select_retained(&files, KeepPolicy::Newest), Some(1));
    assert_eq!(select_retained(&files, KeepPolicy::Oldest), Some(2));
    assert_eq!(select_retained(&files, KeepPolicy::First), Some(0));
}

#[test]
fn test_ties_resolve_to_scan_order() {
    let files = vec![file("x", 5), file("y", 9), file("z", 9), file("w", 5)];

    assert_eq!(rank(&files, KeepPolicy::Newest), vec![1, 2, 0, 3]);
    assert_eq!(rank(&files, KeepPolicy::Oldest), vec![0, 3, 1, 2]);
}

#[test]
fn test_selection_is_repeatable() {
    let files: Vec<_> = (0..20).map(|i| file(&format!("f{i}"), i % 3)).collect();
    let group = DuplicateGroup::new(GroupKey::Size(42), 42, files);

    for policy in [KeepPolicy::Newest, KeepPolicy::Oldest, KeepPolicy::First] {
        let first = plan_group(&group, policy).unwrap();
        for _ in 0..5 {
            assert_eq!(plan_group(&group, policy).unwrap(), first);
        }
        assert_eq!(first.remove.len(), 19);
        assert!(!first.remove.contains(&first.keep));
    }
}
