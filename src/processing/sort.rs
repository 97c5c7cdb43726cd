//! Stable ordering of rows.

use std::cmp::Ordering;

use crate::types::{DataSet, Value};

/// Consume `dataset` and stable-sort its rows ascending by `column`.
///
/// Rows with equal keys keep their relative order. Nulls sort last. Values of different
/// variants (which a validated table never contains) compare as equal.
///
/// Returns `None` if the column does not exist.
pub fn sort_by(mut dataset: DataSet, column: &str) -> Option<DataSet> {
    let idx = dataset.schema.index_of(column)?;
    dataset.rows.sort_by(|a, b| compare_values(&a[idx], &b[idx]));
    Some(dataset)
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        (Value::Int64(x), Value::Int64(y)) => x.cmp(y),
        (Value::Float64(x), Value::Float64(y)) => x.total_cmp(y),
        (Value::Utf8(x), Value::Utf8(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::sort_by;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    #[test]
    fn sort_is_stable_and_puts_nulls_last() {
        let schema = Schema::new(vec![
            Field::new("tag", DataType::Utf8),
            Field::new("n", DataType::Int64),
        ]);
        let ds = DataSet::new(
            schema,
            vec![
                vec![Value::utf8("a"), Value::Int64(2)],
                vec![Value::utf8("b"), Value::Null],
                vec![Value::utf8("c"), Value::Int64(1)],
                vec![Value::utf8("d"), Value::Int64(2)],
            ],
        );

        let out = sort_by(ds, "n").unwrap();
        let tags: Vec<_> = out.rows.iter().map(|r| r[0].as_str().unwrap()).collect();
        assert_eq!(tags, vec!["c", "a", "d", "b"]);
    }
}
