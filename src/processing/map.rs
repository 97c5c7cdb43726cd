//! Row mapping for [`crate::types::DataSet`].

use crate::types::{DataSet, Value};

/// Consume `dataset`, replacing every value of `column` with `f(value)`.
///
/// Returns `None` if the column does not exist.
pub fn map_column<F>(mut dataset: DataSet, column: &str, mut f: F) -> Option<DataSet>
where
    F: FnMut(Value) -> Value,
{
    let idx = dataset.schema.index_of(column)?;
    for row in &mut dataset.rows {
        let v = std::mem::replace(&mut row[idx], Value::Null);
        row[idx] = f(v);
    }
    Some(dataset)
}
