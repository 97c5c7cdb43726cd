//! Fixed-format console report blocks.
//!
//! Every renderer returns a `String` so drivers decide where it goes (stdout in the
//! binaries) and tests can compare it directly.

use std::fmt::Write;
use std::path::Path;

use crate::stats::EventStats;
use crate::timestamp::format_timestamp;
use crate::types::{DataSet, Value};

const RULE_WIDTH: usize = 60;

/// Rows shown by [`preview`] in the features report.
pub const PREVIEW_ROWS: usize = 5;

/// Format a count with `,` thousands separators, e.g. `1234567` -> `1,234,567`.
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// A title framed by two rules.
pub fn banner(title: &str) -> String {
    format!("{rule}\n{title}\n{rule}", rule = rule())
}

/// Header printed before the ingestion pipeline starts.
pub fn pipeline_header() -> String {
    banner("DATA CLEANING PIPELINE")
}

/// Confirmation printed after the cleaned table was written.
pub fn saved_block(rows: usize, path: &Path) -> String {
    format!(
        "\n{}\n\n✓ Saved {} clean events to {}",
        banner("SAVING CLEANED DATA"),
        thousands(rows),
        path.display()
    )
}

/// Summary block printed at the end of the ingestion pipeline.
pub fn summary_block(stats: &EventStats) -> String {
    let ts = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| format_timestamp(&t))
            .unwrap_or_else(|| "n/a".to_string())
    };
    let mut out = format!("\n{}\n", banner("CLEANING SUMMARY"));
    let _ = writeln!(out, "Total events: {}", thousands(stats.total_events));
    let _ = writeln!(out, "Unique users: {}", thousands(stats.unique_users));
    let _ = writeln!(out, "Unique items: {}", thousands(stats.unique_items));
    let _ = writeln!(
        out,
        "Date range: {} to {}",
        ts(stats.first_event),
        ts(stats.last_event)
    );
    match (stats.events_per_user_mean, stats.events_per_user_median) {
        (Some(mean), Some(median)) => {
            let _ = writeln!(out, "Mean events/user: {mean:.2}");
            let _ = writeln!(out, "Median events/user: {median:.0}");
        }
        _ => {
            let _ = writeln!(out, "Mean events/user: n/a");
            let _ = writeln!(out, "Median events/user: n/a");
        }
    }
    out.push_str(&rule());
    out
}

fn cell(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Int64(n) => n.to_string(),
        Value::Float64(f) => f.to_string(),
        Value::Utf8(s) => s.clone(),
        Value::Timestamp(t) => format_timestamp(t),
    }
}

/// The header and the first `n` rows of `table`, one comma-separated line each.
pub fn preview(table: &DataSet, n: usize) -> String {
    let mut out = table.schema.field_names().collect::<Vec<_>>().join(",");
    for row in table.rows.iter().take(n) {
        out.push('\n');
        out.push_str(&row.iter().map(cell).collect::<Vec<_>>().join(","));
    }
    out
}

/// Block printed at the end of the features pipeline.
pub fn complete_block(
    raw_rows: usize,
    clean: &DataSet,
    reduction_pct: f64,
    path: &Path,
    distribution: &[(Value, usize)],
) -> String {
    let mut out = format!("\n{}\n", banner("PIPELINE COMPLETE"));
    let _ = writeln!(out, "Raw events:     {}", thousands(raw_rows));
    let _ = writeln!(out, "Clean events:   {}", thousands(clean.row_count()));
    let _ = writeln!(out, "Reduction:      {reduction_pct:.1}%");
    let _ = writeln!(out, "\nSaved to: {}", path.display());
    let _ = writeln!(out, "\nFirst {PREVIEW_ROWS} clean events:");
    let _ = writeln!(out, "{}", preview(clean, PREVIEW_ROWS));
    out.push_str("\nEvent type distribution:");
    if distribution.is_empty() {
        out.push_str("\n(no events)");
    }
    for (value, count) in distribution {
        let label = match value {
            Value::Utf8(s) => s.clone(),
            other => format!("{other:?}"),
        };
        let _ = write!(out, "\n{label}: {}", thousands(*count));
    }
    out
}
