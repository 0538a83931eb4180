//! Human-readable report.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::{Condition, Paint, Painted};

use crate::actions::{DeletionOutcome, DeletionReport};
use crate::duplicates::{DuplicateGroup, ScanSummary};

/// Text report writer.
///
/// Colors are applied only when `color` is set, so piped output and
/// `--no-color` runs stay plain.
#[derive(Debug, Clone, Copy)]
pub struct TextOutput<'a> {
    groups: &'a [DuplicateGroup],
    summary: &'a ScanSummary,
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a writer over the sorted groups and the scan summary.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup], summary: &'a ScanSummary) -> Self {
        Self {
            groups,
            summary,
            color: false,
        }
    }

    /// Enable or disable ANSI colors.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn paint<T>(&self, painted: Painted<T>) -> Painted<T> {
        if self.color {
            painted
        } else {
            painted.whenever(Condition::NEVER)
        }
    }

    /// Write the summary followed by every group.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_report<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let summary = self.summary;

        if self.groups.is_empty() {
            writeln!(
                w,
                "No duplicates found among {} file(s).",
                summary.total_files
            )?;
        } else {
            writeln!(
                w,
                "Found {} duplicate group(s): {} files in groups, {} reclaimable",
                self.paint(summary.duplicate_groups.bold()),
                summary.files_in_groups,
                self.paint(ByteSize(summary.reclaimable_space).to_string().green().bold()),
            )?;
        }

        let errors = summary.error_count();
        if errors > 0 {
            writeln!(
                w,
                "{}",
                self.paint(format!("{errors} file(s) could not be read and were skipped").yellow())
            )?;
        }

        for (index, group) in self.groups.iter().enumerate() {
            writeln!(w)?;
            self.write_group(w, index + 1, group)?;
        }
        Ok(())
    }

    fn write_group<W: Write>(&self, w: &mut W, number: usize, group: &DuplicateGroup) -> io::Result<()> {
        writeln!(
            w,
            "{} {} ({} each, {} files, {} reclaimable)",
            self.paint(format!("Group {number}:").cyan().bold()),
            group.key,
            ByteSize(group.size),
            group.len(),
            ByteSize(group.wasted_space()),
        )?;
        for file in &group.files {
            writeln!(
                w,
                "  {}  Modified: {}",
                file.path.display(),
                self.paint(super::format_local(file.modified).dim()),
            )?;
        }
        Ok(())
    }

    /// Write per-file deletion lines and the closing summary.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_deletion<W: Write>(&self, w: &mut W, report: &DeletionReport) -> io::Result<()> {
        writeln!(w)?;
        for record in &report.records {
            match &record.outcome {
                DeletionOutcome::WouldDelete => writeln!(
                    w,
                    "{} {} (keeping {})",
                    self.paint("Would delete:".yellow()),
                    record.path.display(),
                    record.kept.display()
                )?,
                DeletionOutcome::Deleted => writeln!(
                    w,
                    "{} {}",
                    self.paint("Deleted:".red()),
                    record.path.display()
                )?,
                DeletionOutcome::Skipped { reason } => writeln!(
                    w,
                    "{} {} ({})",
                    self.paint("Skipped:".magenta()),
                    record.path.display(),
                    reason
                )?,
            }
        }
        writeln!(w, "{}", self.paint(report.summary().bold()))
    }
}
