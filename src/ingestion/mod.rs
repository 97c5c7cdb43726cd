//! Raw extraction: gzip-compressed, line-delimited JSON into flat tables.
//!
//! - [`reviews`]: review records become purchase events (`user_id,item_id,event_type,timestamp`)
//! - [`metadata`]: product records become items (`item_id,title,price,category`)
//!
//! A line that cannot be decoded is skipped and recorded in the returned
//! [`ExtractionReport`]; extraction continues with the next line. Failing to open the
//! archive, or an I/O error while reading it, aborts extraction.

pub mod metadata;
pub mod reviews;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use serde::Deserialize;
use tracing::info;

use crate::error::{PipelineError, PipelineResult};
use crate::observability::{ExtractionContext, PipelineObserver};
use crate::report::thousands;
use crate::types::DataSet;

pub use metadata::{extract_items, extract_items_from_reader};
pub use reviews::{extract_reviews, extract_reviews_from_reader};

/// Number of skipped lines kept verbatim in [`ExtractionReport::samples`].
pub const MAX_SKIP_SAMPLES: usize = 10;

/// Which raw source a table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Reviews,
    Metadata,
}

/// Options controlling raw extraction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionOptions {
    /// Stop after this many review lines have been looked at (valid or not).
    /// `None` or `Some(0)` reads the whole archive.
    pub max_review_lines: Option<usize>,
    /// Stop once this many item rows have been produced. `None` or `Some(0)` means no cap.
    pub max_items: Option<usize>,
    /// Emit a progress callback every this many lines; `0` disables progress.
    pub progress_every: usize,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            max_review_lines: Some(500_000),
            max_items: None,
            progress_every: 100_000,
        }
    }
}

/// A raw line that was not turned into a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the decompressed source.
    pub line: usize,
    pub reason: String,
}

/// Diagnostics accumulated while extracting one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Lines consumed from the source, including blank and malformed ones.
    pub lines_read: usize,
    /// Rows produced.
    pub rows: usize,
    /// Lines skipped because they could not be decoded.
    pub skipped: usize,
    /// The first [`MAX_SKIP_SAMPLES`] skipped lines.
    pub samples: Vec<SkippedLine>,
}

/// A table produced by extraction plus its diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub table: DataSet,
    pub report: ExtractionReport,
}

/// Open a gzip archive for line-by-line reading.
pub fn open_archive(path: impl AsRef<Path>) -> PipelineResult<impl BufRead> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PipelineError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(MultiGzDecoder::new(file)))
}

/// One raw line with its 1-based number; `Err` holds the decode failure.
pub(crate) struct RawLine {
    pub number: usize,
    pub text: Result<String, String>,
}

/// Reads lines as bytes so one invalid UTF-8 line does not end the scan.
pub(crate) struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
    number: usize,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            number: 0,
        }
    }

    pub fn next_line(&mut self) -> PipelineResult<Option<RawLine>> {
        self.buf.clear();
        if self.inner.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.number += 1;
        let text = std::str::from_utf8(&self.buf)
            .map(|s| s.trim_end_matches(['\n', '\r']).to_string())
            .map_err(|e| format!("invalid utf-8: {e}"));
        Ok(Some(RawLine {
            number: self.number,
            text,
        }))
    }
}

/// Accumulates an [`ExtractionReport`] and forwards events to the observer.
pub(crate) struct Tracker<'a> {
    ctx: ExtractionContext,
    observer: Option<&'a dyn PipelineObserver>,
    progress_every: usize,
    report: ExtractionReport,
}

impl<'a> Tracker<'a> {
    pub fn new(
        ctx: ExtractionContext,
        progress_every: usize,
        observer: Option<&'a dyn PipelineObserver>,
    ) -> Self {
        info!(source = ?ctx.source, path = %ctx.path.display(), "extraction started");
        Self {
            ctx,
            observer,
            progress_every,
            report: ExtractionReport::default(),
        }
    }

    pub fn lines_read(&self) -> usize {
        self.report.lines_read
    }

    pub fn line_read(&mut self) {
        self.report.lines_read += 1;
        let n = self.report.lines_read;
        if self.progress_every > 0 && n % self.progress_every == 0 {
            info!(source = ?self.ctx.source, lines = n, "extraction progress");
            if let Some(obs) = self.observer {
                obs.on_extraction_progress(&self.ctx, n);
            }
        }
    }

    pub fn row_produced(&mut self) {
        self.report.rows += 1;
    }

    pub fn skip(&mut self, line: usize, reason: impl Into<String>) {
        let skipped = SkippedLine {
            line,
            reason: reason.into(),
        };
        if let Some(obs) = self.observer {
            obs.on_record_skipped(&self.ctx, &skipped);
        }
        self.report.skipped += 1;
        if self.report.samples.len() < MAX_SKIP_SAMPLES {
            self.report.samples.push(skipped);
        }
    }

    pub fn finish(self) -> ExtractionReport {
        info!(
            source = ?self.ctx.source,
            lines = self.report.lines_read,
            rows = %thousands(self.report.rows),
            skipped = self.report.skipped,
            "extraction finished"
        );
        if let Some(obs) = self.observer {
            obs.on_extraction_finished(&self.ctx, &self.report);
        }
        self.report
    }
}

pub(crate) fn context(path: PathBuf, source: SourceKind) -> ExtractionContext {
    ExtractionContext { path, source }
}

/// Render a JSON scalar identifier as a string. Non-scalar values count as missing.
pub(crate) fn identifier(v: Option<serde_json::Value>) -> crate::types::Value {
    use crate::types::Value;
    match v {
        Some(serde_json::Value::String(s)) => Value::Utf8(s),
        Some(serde_json::Value::Number(n)) => Value::Utf8(n.to_string()),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::LineReader;

    #[test]
    fn line_reader_numbers_lines_and_isolates_bad_utf8() {
        let input: &[u8] = b"first\r\n\xff\xfe\nthird";
        let mut rdr = LineReader::new(input);

        let l1 = rdr.next_line().unwrap().unwrap();
        assert_eq!((l1.number, l1.text.unwrap()), (1, "first".to_string()));
        let l2 = rdr.next_line().unwrap().unwrap();
        assert_eq!(l2.number, 2);
        assert!(l2.text.unwrap_err().contains("invalid utf-8"));
        let l3 = rdr.next_line().unwrap().unwrap();
        assert_eq!((l3.number, l3.text.unwrap()), (3, "third".to_string()));
        assert!(rdr.next_line().unwrap().is_none());
    }
}
