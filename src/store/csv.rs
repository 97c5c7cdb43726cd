//! CSV reading and writing for [`DataSet`]s.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::timestamp::{format_timestamp, parse_timestamp};
use crate::types::{DataSet, DataType, Schema, Value};

/// Read a CSV file into an in-memory [`DataSet`].
///
/// Rules:
///
/// - CSV must have headers.
/// - Headers must contain all schema fields (order can differ; extra columns are ignored).
/// - An empty cell is [`Value::Null`]. String cells are kept verbatim; numeric and timestamp
///   cells are trimmed and parsed according to the schema field type.
pub fn read_table(path: impl AsRef<Path>, schema: &Schema) -> PipelineResult<DataSet> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PipelineError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(file);
    read_table_from_reader(&mut rdr, schema)
}

/// Read CSV data from an existing CSV reader.
pub fn read_table_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    schema: &Schema,
) -> PipelineResult<DataSet> {
    let headers = rdr.headers()?.clone();

    // Map schema fields -> CSV column indexes (allows re-ordered CSV columns).
    let mut col_idxs = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        match headers.iter().position(|h| h == field.name) {
            Some(idx) => col_idxs.push(idx),
            None => {
                return Err(PipelineError::SchemaMismatch {
                    message: format!(
                        "missing required column '{field}'. headers={:?}",
                        headers.iter().collect::<Vec<_>>(),
                        field = field.name
                    ),
                });
            }
        }
    }

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based row number for users; +1 again because header is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;

        let mut row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for (field, &csv_idx) in schema.fields.iter().zip(col_idxs.iter()) {
            let raw = record.get(csv_idx).unwrap_or("");
            row.push(parse_typed_value(user_row, &field.name, field.data_type, raw)?);
        }
        rows.push(row);
    }

    Ok(DataSet::new(schema.clone(), rows))
}

fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: DataType,
    raw: &str,
) -> PipelineResult<Value> {
    if raw.is_empty() {
        return Ok(Value::Null);
    }
    let parse_error = |message: String| PipelineError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };

    let trimmed = raw.trim();
    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(raw.to_owned())),
        _ if trimmed.is_empty() => Ok(Value::Null),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Float64 => trimmed
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Timestamp => parse_timestamp(trimmed)
            .map(Value::Timestamp)
            .ok_or_else(|| parse_error("expected timestamp".to_string())),
    }
}

/// Write `dataset` to a CSV file with a header row of the schema field names.
///
/// Nulls are written as empty cells; there is no index column. Parent directories are
/// created as needed.
pub fn write_table(path: impl AsRef<Path>, dataset: &DataSet) -> PipelineResult<()> {
    let path = path.as_ref();
    let create_error = |source| PipelineError::Create {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(create_error)?;
    }
    let file = File::create(path).map_err(create_error)?;
    let mut wtr = csv::Writer::from_writer(file);
    write_table_to_writer(&mut wtr, dataset)?;
    wtr.flush()?;
    Ok(())
}

/// Write `dataset` through an existing CSV writer.
pub fn write_table_to_writer<W: Write>(
    wtr: &mut csv::Writer<W>,
    dataset: &DataSet,
) -> PipelineResult<()> {
    wtr.write_record(dataset.schema.field_names())?;
    for row in &dataset.rows {
        wtr.write_record(row.iter().map(render_value))?;
    }
    Ok(())
}

fn render_value(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Int64(n) => n.to_string(),
        Value::Float64(f) => f.to_string(),
        Value::Utf8(s) => s.clone(),
        Value::Timestamp(t) => format_timestamp(t),
    }
}
