use clap::Parser;
use dupsweep::cli::Cli;
use dupsweep::config::Config;
use dupsweep::error::ExitCode;
use dupsweep::signal::ShutdownHandler;
use std::fs;
use std::path::{Path, PathBuf};

/// Run the application against `dir` with extra arguments and capture stdout.
pub fn run(dir: &Path, args: &[&str]) -> (ExitCode, String) {
    let mut argv = vec!["dupsweep", "-q", dir.to_str().unwrap()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    cli.validate().unwrap();

    let config = Config::default().merge_cli(&cli);
    let mut out = Vec::new();
    let code = dupsweep::execute(&cli, &config, &ShutdownHandler::new(), &mut out, false).unwrap();
    (code, String::from_utf8(out).unwrap())
}

/// Run with `--output json` and parse the document.
pub fn run_json(dir: &Path, args: &[&str]) -> (ExitCode, serde_json::Value) {
    let mut all = vec!["--output", "json"];
    all.extend_from_slice(args);
    let (code, out) = run(dir, &all);
    (code, serde_json::from_str(&out).unwrap())
}

/// Group member file names, group by group, in report order.
pub fn group_names(report: &serde_json::Value) -> Vec<Vec<String>> {
    report["duplicates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|group| {
            group["files"]
                .as_array()
                .unwrap()
                .iter()
                .map(|f| {
                    Path::new(f["path"].as_str().unwrap())
                        .file_name()
                        .unwrap()
                        .to_string_lossy()
                        .into_owned()
                })
                .collect()
        })
        .collect()
}

pub fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}
