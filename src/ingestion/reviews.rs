//! Review archive to purchase events.
//!
//! Each line is one review object. A review implies a purchase, so every row gets
//! `event_type = "purchase"`. Fields used: `reviewerID`, `asin`, `unixReviewTime`.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::PipelineResult;
use crate::observability::PipelineObserver;
use crate::schema::{events_schema, PURCHASE};
use crate::timestamp::from_epoch_seconds;
use crate::types::{DataSet, Value};

use super::{context, identifier, open_archive, ExtractionOptions, Extracted, LineReader, SourceKind, Tracker};

#[derive(Debug, Deserialize)]
struct RawReview {
    #[serde(rename = "reviewerID")]
    reviewer_id: Option<serde_json::Value>,
    asin: Option<serde_json::Value>,
    #[serde(rename = "unixReviewTime")]
    unix_review_time: Option<serde_json::Value>,
}

/// Extract purchase events from a gzip-compressed review archive.
///
/// `opts.max_review_lines` bounds the number of lines looked at, counting blank and
/// malformed lines.
pub fn extract_reviews(
    path: impl AsRef<Path>,
    opts: &ExtractionOptions,
    observer: Option<&dyn PipelineObserver>,
) -> PipelineResult<Extracted> {
    let path = path.as_ref();
    let reader = open_archive(path)?;
    scan(reader, path.to_path_buf(), opts, observer)
}

/// Extract purchase events from already-decompressed NDJSON.
pub fn extract_reviews_from_reader<R: BufRead>(
    reader: R,
    opts: &ExtractionOptions,
    observer: Option<&dyn PipelineObserver>,
) -> PipelineResult<Extracted> {
    scan(reader, PathBuf::from("<reader>"), opts, observer)
}

fn scan<R: BufRead>(
    reader: R,
    path: PathBuf,
    opts: &ExtractionOptions,
    observer: Option<&dyn PipelineObserver>,
) -> PipelineResult<Extracted> {
    let mut lines = LineReader::new(reader);
    let mut tracker = Tracker::new(context(path, SourceKind::Reviews), opts.progress_every, observer);
    let mut rows = Vec::new();

    loop {
        if opts.max_review_lines.is_some_and(|cap| cap > 0 && tracker.lines_read() >= cap) {
            break;
        }
        let Some(line) = lines.next_line()? else {
            break;
        };
        tracker.line_read();

        let parsed = line
            .text
            .and_then(|text| serde_json::from_str::<RawReview>(&text).map_err(|e| e.to_string()));
        match parsed {
            Ok(review) => {
                rows.push(review_to_row(review));
                tracker.row_produced();
            }
            Err(reason) => {
                warn!(line = line.number, %reason, "failed to parse review line");
                tracker.skip(line.number, reason);
            }
        }
    }

    let report = tracker.finish();
    Ok(Extracted {
        table: DataSet::new(events_schema(), rows),
        report,
    })
}

fn review_to_row(review: RawReview) -> Vec<Value> {
    vec![
        identifier(review.reviewer_id),
        identifier(review.asin),
        Value::utf8(PURCHASE),
        review_time(review.unix_review_time),
    ]
}

/// Epoch seconds to a timestamp; a missing or non-numeric time yields null.
fn review_time(v: Option<serde_json::Value>) -> Value {
    let Some(serde_json::Value::Number(n)) = v else {
        return Value::Null;
    };
    let ts = match n.as_i64() {
        Some(secs) => from_epoch_seconds(secs),
        None => n.as_f64().and_then(|f| {
            let secs = f.floor();
            let nanos = ((f - secs) * 1e9).round() as u32;
            chrono::DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
        }),
    };
    ts.map(Value::Timestamp).unwrap_or(Value::Null)
}
