//! Product metadata archive to items.
//!
//! Fields used: `asin`, `title`, `price`, `category`. A `category` list is flattened into
//! one string joined with `" > "`.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value as Json;

use crate::error::PipelineResult;
use crate::observability::PipelineObserver;
use crate::schema::items_schema;
use crate::types::{DataSet, Value};

use super::{context, identifier, open_archive, ExtractionOptions, Extracted, LineReader, SourceKind, Tracker};

/// Separator used when flattening a category path.
pub const CATEGORY_SEPARATOR: &str = " > ";

#[derive(Debug, Deserialize)]
struct RawItem {
    asin: Option<Json>,
    title: Option<Json>,
    price: Option<Json>,
    category: Option<Json>,
}

/// Extract items from a gzip-compressed metadata archive.
///
/// `opts.max_items` bounds the number of rows produced; malformed lines do not count
/// toward it. Blank lines are ignored without being reported.
pub fn extract_items(
    path: impl AsRef<Path>,
    opts: &ExtractionOptions,
    observer: Option<&dyn PipelineObserver>,
) -> PipelineResult<Extracted> {
    let path = path.as_ref();
    let reader = open_archive(path)?;
    scan(reader, path.to_path_buf(), opts, observer)
}

/// Extract items from already-decompressed NDJSON.
pub fn extract_items_from_reader<R: BufRead>(
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
    let mut tracker = Tracker::new(context(path, SourceKind::Metadata), opts.progress_every, observer);
    let mut rows: Vec<Vec<Value>> = Vec::new();

    loop {
        if opts.max_items.is_some_and(|cap| cap > 0 && rows.len() >= cap) {
            break;
        }
        let Some(line) = lines.next_line()? else {
            break;
        };
        tracker.line_read();

        let raw = match line.text {
            Ok(raw) => raw,
            Err(reason) => {
                tracker.skip(line.number, reason);
                continue;
            }
        };
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        match serde_json::from_str::<RawItem>(raw)
            .map_err(|e| e.to_string())
            .and_then(item_to_row)
        {
            Ok(row) => {
                rows.push(row);
                tracker.row_produced();
            }
            Err(reason) => tracker.skip(line.number, reason),
        }
    }

    let report = tracker.finish();
    Ok(Extracted {
        table: DataSet::new(items_schema(), rows),
        report,
    })
}

fn item_to_row(item: RawItem) -> Result<Vec<Value>, String> {
    Ok(vec![
        identifier(item.asin),
        text(item.title),
        price(item.price),
        category(item.category)?,
    ])
}

fn text(v: Option<Json>) -> Value {
    match v {
        None | Some(Json::Null) => Value::Null,
        Some(Json::String(s)) => Value::Utf8(s),
        Some(other) => Value::Utf8(other.to_string()),
    }
}

/// Numbers pass through; strings like `"$1,299.00"` are parsed; anything else is null.
fn price(v: Option<Json>) -> Value {
    match v {
        Some(Json::Number(n)) => n.as_f64().map(Value::Float64).unwrap_or(Value::Null),
        Some(Json::String(s)) => {
            let cleaned: String = s
                .trim()
                .trim_start_matches('$')
                .chars()
                .filter(|c| *c != ',')
                .collect();
            cleaned.parse::<f64>().map(Value::Float64).unwrap_or(Value::Null)
        }
        _ => Value::Null,
    }
}

/// Flatten a category path. An empty list is null; a list with non-string entries is an
/// extraction failure for the whole line.
fn category(v: Option<Json>) -> Result<Value, String> {
    match v {
        Some(Json::Array(parts)) if parts.is_empty() => Ok(Value::Null),
        Some(Json::Array(parts)) => {
            let parts = parts
                .into_iter()
                .map(|p| match p {
                    Json::String(s) => Ok(s),
                    other => Err(format!("category entry is not a string: {other}")),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Utf8(parts.join(CATEGORY_SEPARATOR)))
        }
        other => Ok(text(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::extract_items_from_reader;
    use crate::ingestion::ExtractionOptions;
    use crate::types::Value;

    fn opts(max_items: Option<usize>) -> ExtractionOptions {
        ExtractionOptions {
            max_items,
            ..Default::default()
        }
    }

    #[test]
    fn flattens_category_and_parses_price() {
        let input = r#"{"asin":"B1","title":"Cable","price":"$1,299.50","category":["Electronics","Audio","Cables"]}
{"asin":"B2","title":null,"price":3.5,"category":[]}
"#;
        let out = extract_items_from_reader(input.as_bytes(), &opts(None), None).unwrap();

        assert_eq!(out.table.row_count(), 2);
        assert_eq!(
            out.table.rows[0],
            vec![
                Value::utf8("B1"),
                Value::utf8("Cable"),
                Value::Float64(1299.5),
                Value::utf8("Electronics > Audio > Cables"),
            ]
        );
        assert_eq!(
            out.table.rows[1],
            vec![Value::utf8("B2"), Value::Null, Value::Float64(3.5), Value::Null]
        );
    }

    #[test]
    fn blank_lines_are_ignored_and_bad_lines_counted() {
        let input = "\n   \n{'asin': 'B1'}\n{\"asin\":\"B2\",\"category\":[\"A\",1]}\n{\"asin\":\"B3\"}\n";
        let out = extract_items_from_reader(input.as_bytes(), &opts(None), None).unwrap();

        assert_eq!(out.table.row_count(), 1);
        assert_eq!(out.table.rows[0][0], Value::utf8("B3"));
        assert_eq!(out.report.skipped, 2);
        assert_eq!(out.report.lines_read, 5);
        assert!(out.report.samples[1].reason.contains("category entry"));
    }

    #[test]
    fn cap_counts_rows_produced() {
        let input = "bad\n{\"asin\":\"B1\"}\nbad\n{\"asin\":\"B2\"}\n{\"asin\":\"B3\"}\n";
        let out = extract_items_from_reader(input.as_bytes(), &opts(Some(2)), None).unwrap();

        assert_eq!(out.table.row_count(), 2);
        assert_eq!(out.report.skipped, 2);
        assert_eq!(out.report.lines_read, 4);
    }

    #[test]
    fn zero_cap_is_no_cap() {
        let input = "{\"asin\":\"B1\"}\n{\"asin\":\"B2\"}\n{\"asin\":\"B3\"}\n";
        let out = extract_items_from_reader(input.as_bytes(), &opts(Some(0)), None).unwrap();
        assert_eq!(out.table.row_count(), 3);
    }

    #[test]
    fn unparseable_price_is_null() {
        let input = r#"{"asin":"B1","price":"call for price"}"#;
        let out = extract_items_from_reader(input.as_bytes(), &opts(None), None).unwrap();
        assert_eq!(out.table.rows[0][2], Value::Null);
    }
}
