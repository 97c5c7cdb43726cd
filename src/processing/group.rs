//! Per-value row counts.

use std::collections::HashMap;

use crate::types::{DataSet, Value, ValueKey};

/// Count rows per distinct non-null value of `column`.
///
/// Returns `None` if the column does not exist. Null values are not counted.
pub fn group_counts(dataset: &DataSet, column: &str) -> Option<HashMap<ValueKey, usize>> {
    let idx = dataset.schema.index_of(column)?;
    Some(dataset.reduce_rows(HashMap::new(), |mut counts, row| {
        if let Some(v) = row.get(idx).filter(|v| !v.is_null()) {
            *counts.entry(v.key()).or_insert(0) += 1;
        }
        counts
    }))
}

/// Distinct non-null values of `column` with their row counts.
///
/// Ordered by descending count; ties keep first-appearance order.
pub fn value_counts(dataset: &DataSet, column: &str) -> Option<Vec<(Value, usize)>> {
    let idx = dataset.schema.index_of(column)?;
    let mut positions: HashMap<ValueKey, usize> = HashMap::new();
    let mut out: Vec<(Value, usize)> = Vec::new();
    for row in &dataset.rows {
        let Some(v) = row.get(idx).filter(|v| !v.is_null()) else {
            continue;
        };
        match positions.get(&v.key()) {
            Some(&pos) => out[pos].1 += 1,
            None => {
                positions.insert(v.key(), out.len());
                out.push((v.clone(), 1));
            }
        }
    }
    out.sort_by(|a, b| b.1.cmp(&a.1));
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::{group_counts, value_counts};
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn users(ids: &[Option<&str>]) -> DataSet {
        let schema = Schema::new(vec![Field::new("user_id", DataType::Utf8)]);
        let rows = ids
            .iter()
            .map(|id| vec![id.map(Value::utf8).unwrap_or(Value::Null)])
            .collect();
        DataSet::new(schema, rows)
    }

    #[test]
    fn group_counts_skips_nulls() {
        let ds = users(&[Some("u1"), Some("u2"), Some("u1"), None]);
        let counts = group_counts(&ds, "user_id").unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[&Value::utf8("u1").key()], 2);
        assert_eq!(counts[&Value::utf8("u2").key()], 1);
    }

    #[test]
    fn value_counts_orders_by_count_then_first_seen() {
        let ds = users(&[Some("b"), Some("a"), Some("c"), Some("a"), Some("c")]);
        assert_eq!(
            value_counts(&ds, "user_id").unwrap(),
            vec![
                (Value::utf8("a"), 2),
                (Value::utf8("c"), 2),
                (Value::utf8("b"), 1),
            ]
        );
    }

    #[test]
    fn missing_column_is_none() {
        let ds = users(&[Some("u1")]);
        assert!(group_counts(&ds, "item_id").is_none());
        assert!(value_counts(&ds, "item_id").is_none());
    }
}
