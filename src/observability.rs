//! Progress hooks for extraction and cleaning.
//!
//! Library functions take an optional `&dyn PipelineObserver`. Binaries pass a
//! [`StdOutObserver`], which prints the human-readable progress report; tests can
//! pass a recording observer to assert on what was reported.

use std::path::PathBuf;

use crate::cleaning::StageReport;
use crate::ingestion::{ExtractionReport, SkippedLine, SourceKind};
use crate::report::thousands;

/// Where a cleaning step sits in its pipeline.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub pipeline: &'a str,
    /// 1-based step number.
    pub step: usize,
    pub total_steps: usize,
    pub description: &'a str,
}

/// The raw source being extracted.
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    pub path: PathBuf,
    pub source: SourceKind,
}

/// Observer interface for pipeline progress.
///
/// All methods default to no-ops.
pub trait PipelineObserver: Send + Sync {
    /// Called before a cleaning step runs.
    fn on_stage_started(&self, _ctx: &StageContext<'_>) {}

    /// Called after a cleaning stage produced its output table.
    fn on_stage_finished(&self, _ctx: &StageContext<'_>, _report: &StageReport) {}

    /// Called periodically while raw lines are consumed.
    fn on_extraction_progress(&self, _ctx: &ExtractionContext, _lines_read: usize) {}

    /// Called for every raw line that was skipped.
    fn on_record_skipped(&self, _ctx: &ExtractionContext, _skipped: &SkippedLine) {}

    /// Called once a raw source has been fully consumed (or the cap was reached).
    fn on_extraction_finished(&self, _ctx: &ExtractionContext, _report: &ExtractionReport) {}
}

/// Prints the progress report to stdout.
///
/// - `[k/N] <description>...` before each step
/// - `Removed <n> <label>` after a stage that dropped rows
/// - `Warning: Failed to parse line <n>` for each malformed review line
/// - a skip note after metadata extraction
#[derive(Debug, Default)]
pub struct StdOutObserver;

impl PipelineObserver for StdOutObserver {
    fn on_stage_started(&self, ctx: &StageContext<'_>) {
        println!("[{}/{}] {}...", ctx.step, ctx.total_steps, ctx.description);
    }

    fn on_stage_finished(&self, _ctx: &StageContext<'_>, report: &StageReport) {
        if report.dropped() > 0 {
            println!("Removed {} {}", thousands(report.dropped()), report.dropped_label);
        }
    }

    fn on_record_skipped(&self, ctx: &ExtractionContext, skipped: &SkippedLine) {
        if ctx.source == SourceKind::Reviews {
            println!("Warning: Failed to parse line {}", skipped.line);
        }
    }

    fn on_extraction_finished(&self, ctx: &ExtractionContext, report: &ExtractionReport) {
        if ctx.source == SourceKind::Metadata && report.skipped > 0 {
            println!(
                "Note: Skipped {} malformed lines in metadata file",
                thousands(report.skipped)
            );
        }
    }
}
