//! dupsweep - duplicate file finder
//!
//! Files are bucketed by size, same-size files are confirmed by a content
//! digest, and digests are remembered in a per-directory cache keyed by
//! path and size. Redundant copies can be previewed or removed under a
//! retention policy.

pub mod actions;
pub mod cache;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::actions::{process_groups, DeleteMode};
use crate::cache::HashCache;
use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::{sort_groups, CompareMode, DuplicateFinder, FinderConfig, FinderError};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::scanner::WalkerConfig;
use crate::signal::ShutdownHandler;

/// Run the application for parsed command-line arguments.
///
/// Sets up logging, validates the arguments, loads the configuration,
/// installs the Ctrl+C handler and writes the report to stdout.
///
/// # Errors
///
/// Returns [`cli::UsageError`] for invalid arguments and other errors for
/// fatal failures such as a broken stdout.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    cli.validate()?;

    let config = Config::load().merge_cli(&cli);
    log::debug!("Effective configuration: {:?}", config);

    let shutdown = signal::install_handler().context("Failed to set up Ctrl+C handling")?;
    let color = !cli.no_color && std::io::stdout().is_terminal();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&cli, &config, &shutdown, &mut out, color)
}

/// Scan, report and optionally delete, writing the report to `out`.
///
/// The hash cache is saved whether the scan finishes or is interrupted;
/// files removed by a deletion pass are dropped from it first.
/// An interrupted scan prints `Interrupted` to stderr and returns
/// [`ExitCode::Interrupted`] without a report.
///
/// # Errors
///
/// Returns an error if the scan cannot start or the report cannot be written.
pub fn execute<W: Write>(
    cli: &Cli,
    config: &Config,
    shutdown: &ShutdownHandler,
    out: &mut W,
    color: bool,
) -> anyhow::Result<ExitCode> {
    config.validate()?;

    let walker_config = WalkerConfig {
        recursive: config.recursive,
        include_hidden: config.include_hidden,
        min_size: cli.min_size,
        max_size: cli.max_size,
        ..WalkerConfig::default()
    }
    .with_extensions(&cli.extensions)
    .with_excluded_name(config.cache_file_name.clone());

    let compare_mode = cli.compare_mode();
    let cache_path = cli.directory.join(&config.cache_file_name);
    let mut cache = (compare_mode == CompareMode::Hash && !cli.no_cache)
        .then(|| HashCache::load(&cache_path, config.algorithm));

    let progress = Arc::new(Progress::new(cli.quiet));
    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_io_threads(config.io_threads)
            .with_compare_mode(compare_mode)
            .with_algorithm(config.algorithm)
            .with_walker_config(walker_config)
            .with_shutdown_flag(shutdown.get_flag())
            .with_progress_callback(progress),
    );

    let result = finder.find_duplicates(&cli.directory, cache.as_mut());

    let (mut groups, summary) = match result {
        Ok(found) => found,
        Err(e) => {
            save_cache(cache.as_ref(), &cache_path);
            if matches!(e, FinderError::Interrupted) {
                eprintln!("Interrupted");
                return Ok(ExitCode::Interrupted);
            }
            return Err(e).context("Duplicate scan failed");
        }
    };

    sort_groups(&mut groups, config.sort);
    log::info!(
        "Scan complete: {} groups, {} reclaimable, {:.1}% of scanned bytes",
        summary.duplicate_groups,
        summary.reclaimable_display(),
        summary.wasted_percentage()
    );

    let deletion = cli.wants_deletion().then(|| {
        let mode = if cli.dry_run {
            DeleteMode::Preview
        } else {
            DeleteMode::Execute { trash: cli.trash }
        };
        if compare_mode == CompareMode::SizeOnly && !mode.is_preview() {
            log::warn!("Deleting in size-only mode: group members were not compared by content");
        }
        process_groups(&groups, config.keep, mode)
    });

    if let (Some(cache), Some(report)) = (cache.as_mut(), deletion.as_ref()) {
        let forgotten = cache.forget(report.removed_paths());
        log::debug!("Dropped {} cache entries for removed files", forgotten);
    }
    save_cache(cache.as_ref(), &cache_path);

    let skipped = deletion.as_ref().map_or(0, |report| report.skipped);
    let exit_code = if summary.error_count() > 0 || skipped > 0 {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    };

    match cli.output {
        OutputFormat::Text => {
            let text = TextOutput::new(&groups, &summary).with_color(color);
            text.write_report(out).context("Failed to write report")?;
            if let Some(report) = &deletion {
                text.write_deletion(out, report)
                    .context("Failed to write deletion summary")?;
            }
        }
        OutputFormat::Json => {
            JsonOutput::new(&groups, &summary, deletion.as_ref(), exit_code)
                .write_to(out, true)
                .context("Failed to write JSON report")?;
        }
    }

    Ok(exit_code)
}

fn save_cache(cache: Option<&HashCache>, path: &Path) {
    let Some(cache) = cache else {
        return;
    };
    match cache.save(path) {
        Ok(()) => log::debug!(
            "Saved {} cache entries ({} hits, {} misses)",
            cache.len(),
            cache.hits(),
            cache.misses()
        ),
        Err(e) => log::warn!("Failed to save hash cache: {}", e),
    }
}
