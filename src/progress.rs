//! Terminal progress reporting with indicatif.
//!
//! The finder reports through [`ProgressCallback`]; [`Progress`] renders a
//! spinner while walking and a bar with a percentage while hashing. The
//! bar's position never decreases, so callers must report a running count.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Receives progress events from the duplicate finder.
pub trait ProgressCallback: Send + Sync {
    /// A phase begins. `total` is zero when unknown (walking).
    fn on_phase_start(&self, phase: &str, total: usize);

    /// `current` items of the phase are done; `path` is the latest one.
    fn on_progress(&self, current: usize, path: &str);

    /// A phase ended.
    fn on_phase_end(&self, phase: &str);

    /// Free-form status text.
    fn on_message(&self, _message: &str) {}
}

/// indicatif-backed reporter.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a reporter. A quiet reporter draws nothing.
    ///
    /// ```
    /// use dupsweep::progress::{Progress, ProgressCallback};
    ///
    /// let progress = Progress::new(true);
    /// progress.on_phase_start("hashing", 10);
    /// progress.on_progress(3, "a.txt");
    /// progress.on_phase_end("hashing");
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bar) = guard.as_ref() {
            f(bar);
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let bar = if phase == "walking" {
            let bar = ProgressBar::new_spinner();
            bar.set_style(Self::spinner_style());
            bar.set_message("Scanning");
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(Self::bar_style());
            bar.set_message("Hashing");
            bar
        };
        bar.set_draw_target(ProgressDrawTarget::stderr());

        let mut slot = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.replace(bar) {
            previous.finish_and_clear();
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }
        self.with_bar(|bar| {
            if current as u64 > bar.position() {
                bar.set_position(current as u64);
            }
            bar.set_message(truncate_path(path, 30));
        });
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }
        let finished = self
            .bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(bar) = finished {
            bar.finish_and_clear();
            log::debug!("Phase {} finished after {} items", phase, bar.position());
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.with_bar(|bar| bar.set_message(message.to_string()));
    }
}

/// Shorten a path to its file name when it is longer than `max_len` characters.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let count = name.chars().count();
    if count + 4 > max_len {
        let tail: String = name.chars().skip(count + 3 - max_len).collect();
        return format!("...{tail}");
    }
    format!(".../{name}")
}
