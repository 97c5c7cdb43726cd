//! Reduction operations for [`crate::types::DataSet`].

use std::collections::HashSet;

use crate::types::{DataSet, DataType, Value};

/// Built-in reduction operations over a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Count distinct non-null values.
    CountDistinct,
    /// Earliest timestamp, ignoring nulls.
    Min,
    /// Latest timestamp, ignoring nulls.
    Max,
}

/// Reduce a column using a built-in [`ReduceOp`].
///
/// - Returns `None` if `column` does not exist in the schema.
/// - For `Min`/`Max`, returns `Some(Value::Null)` if there are no non-null values or the
///   column is not a [`DataType::Timestamp`] column.
pub fn reduce(dataset: &DataSet, column: &str, op: ReduceOp) -> Option<Value> {
    let idx = dataset.schema.index_of(column)?;

    match op {
        ReduceOp::CountDistinct => {
            let distinct = dataset.reduce_rows(HashSet::new(), |mut seen, row| {
                match row.get(idx) {
                    Some(Value::Null) | None => {}
                    Some(v) => {
                        seen.insert(v.key());
                    }
                }
                seen
            });
            Some(Value::Int64(distinct.len() as i64))
        }
        ReduceOp::Min | ReduceOp::Max => {
            let field = dataset.schema.fields.get(idx)?;
            if field.data_type != DataType::Timestamp {
                return Some(Value::Null);
            }
            let values = dataset.rows.iter().filter_map(|row| row.get(idx)?.as_timestamp());
            let acc = if op == ReduceOp::Min { values.min() } else { values.max() };
            Some(acc.map(Value::Timestamp).unwrap_or(Value::Null))
        }
    }
}
