#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use flate2::write::GzEncoder;
use flate2::Compression;
use purchase_events::cleaning::StageReport;
use purchase_events::ingestion::{ExtractionReport, SkippedLine, SourceKind};
use purchase_events::observability::{ExtractionContext, PipelineObserver, StageContext};

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// Write `lines` (joined by `\n`) as a gzip file.
pub fn write_gz(path: &Path, lines: &[&str]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut enc = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    enc.write_all(lines.join("\n").as_bytes()).unwrap();
    enc.finish().unwrap();
}

pub fn review(user: &str, item: &str, time: i64) -> String {
    format!(r#"{{"reviewerID":"{user}","asin":"{item}","overall":5.0,"unixReviewTime":{time}}}"#)
}

#[derive(Default)]
pub struct RecordingObserver {
    pub started: Mutex<Vec<(usize, usize, String)>>,
    pub finished: Mutex<Vec<StageReport>>,
    pub skipped: Mutex<Vec<(SourceKind, usize)>>,
    pub extractions: Mutex<Vec<(SourceKind, ExtractionReport)>>,
}

impl PipelineObserver for RecordingObserver {
    fn on_stage_started(&self, ctx: &StageContext<'_>) {
        self.started
            .lock()
            .unwrap()
            .push((ctx.step, ctx.total_steps, ctx.description.to_string()));
    }

    fn on_stage_finished(&self, _ctx: &StageContext<'_>, report: &StageReport) {
        self.finished.lock().unwrap().push(report.clone());
    }

    fn on_record_skipped(&self, ctx: &ExtractionContext, skipped: &SkippedLine) {
        self.skipped.lock().unwrap().push((ctx.source, skipped.line));
    }

    fn on_extraction_finished(&self, ctx: &ExtractionContext, report: &ExtractionReport) {
        self.extractions.lock().unwrap().push((ctx.source, report.clone()));
    }
}
