use clap::Parser;
use dupsweep::actions::KeepPolicy;
use dupsweep::cli::{Cli, UsageError};
use dupsweep::config::Config;
use dupsweep::duplicates::SortOrder;
use dupsweep::scanner::HashAlgorithm;
use dupsweep::signal::ShutdownHandler;
use figment::providers::Serialized;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
algorithm = "blake3"
keep = "oldest"
io_threads = 8
sort = "count"
cache_file_name = ".hashes.json"
recursive = true
"#,
    )
    .unwrap();

    let config = Config::load_from(Some(&config_path));

    assert_eq!(config.algorithm, HashAlgorithm::Blake3);
    assert_eq!(config.keep, KeepPolicy::Oldest);
    assert_eq!(config.io_threads, 8);
    assert_eq!(config.sort, SortOrder::Count);
    assert_eq!(config.cache_file_name, ".hashes.json");
    assert!(config.recursive);
}

#[test]
fn test_config_env_overrides_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "sort = \"count\"\n").unwrap();

    use figment::providers::{Env, Format, Toml};
    let figment = figment::Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed("DUPSWEEP_TEST_ENV_").only(&["sort"]));

    std::env::set_var("DUPSWEEP_TEST_ENV_SORT", "size");
    let config: Config = figment.extract().unwrap();
    std::env::remove_var("DUPSWEEP_TEST_ENV_SORT");

    assert_eq!(config.sort, SortOrder::Size);
}

#[test]
fn test_missing_config_file_uses_defaults() {
    let temp_dir = tempdir().unwrap();
    let config = Config::load_from(Some(&temp_dir.path().join("absent.toml")));
    assert_eq!(config.io_threads, Config::default().io_threads);
    assert_eq!(config.keep, KeepPolicy::Newest);
}

#[test]
fn test_config_roundtrips_through_toml() {
    let config = Config {
        keep: KeepPolicy::First,
        ..Config::default()
    };
    let text = toml::to_string_pretty(&config).unwrap();
    assert!(text.contains("keep = \"first\""));

    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, text).unwrap();
    assert_eq!(Config::load_from(Some(&path)).keep, KeepPolicy::First);
}

#[test]
fn test_cli_flags_beat_config() {
    let config = Config {
        algorithm: HashAlgorithm::Sha256,
        keep: KeepPolicy::Oldest,
        ..Config::default()
    };
    let cli = Cli::try_parse_from(["dupsweep", "--algorithm", "md5", "-r"]).unwrap();

    let merged = config.merge_cli(&cli);

    assert_eq!(merged.algorithm, HashAlgorithm::Md5);
    assert_eq!(merged.keep, KeepPolicy::Oldest);
    assert!(merged.recursive);
}

#[test]
fn test_usage_validation() {
    let dir = tempdir().unwrap();
    let path = dir.path().to_str().unwrap();

    let cli = Cli::try_parse_from(["dupsweep", path, "--min-size", "2KB", "--max-size", "1KB"]).unwrap();
    assert_eq!(
        cli.validate(),
        Err(UsageError::MinExceedsMax { min: 2000, max: 1000 })
    );

    let cli = Cli::try_parse_from(["dupsweep", path, "--io-threads", "0"]).unwrap();
    assert_eq!(cli.validate(), Err(UsageError::ZeroIoThreads));

    let file = dir.path().join("plain.txt");
    fs::write(&file, b"x").unwrap();
    let cli = Cli::try_parse_from(["dupsweep", file.to_str().unwrap()]).unwrap();
    assert!(matches!(cli.validate(), Err(UsageError::NotADirectory(_))));

    assert!(Cli::try_parse_from(["dupsweep", path, "--delete", "--dry-run"]).is_err());
    assert!(Cli::try_parse_from(["dupsweep", path, "--trash"]).is_err());
}

#[test]
fn test_cache_file_name_with_separator_is_rejected() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("a.txt"), b"dup").unwrap();
    fs::write(dir.path().join("b.txt"), b"dup").unwrap();

    let cli = Cli::try_parse_from(["dupsweep", "-q", "-r", "-a", dir.path().to_str().unwrap()]).unwrap();
    let config = Config {
        cache_file_name: "sub/.c.json".to_string(),
        ..Config::default()
    }
    .merge_cli(&cli);

    let mut out = Vec::new();
    let err = dupsweep::execute(&cli, &config, &ShutdownHandler::new(), &mut out, false).unwrap_err();

    assert_eq!(
        err.downcast_ref::<UsageError>(),
        Some(&UsageError::InvalidCacheFileName("sub/.c.json".to_string()))
    );
    assert!(out.is_empty());
    assert!(!dir.path().join("sub").join(".c.json").exists());
}
