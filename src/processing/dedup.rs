//! Duplicate-row removal.

use std::collections::HashSet;

use crate::types::{DataSet, ValueKey};

/// Consume `dataset`, removing rows whose values in `columns` repeat an earlier row.
///
/// The first occurrence (in current row order) is kept. Nulls compare equal to nulls.
///
/// Returns `None` if any of the columns does not exist.
pub fn dedup_by(dataset: DataSet, columns: &[&str]) -> Option<DataSet> {
    let idxs = columns
        .iter()
        .map(|c| dataset.schema.index_of(c))
        .collect::<Option<Vec<_>>>()?;

    let mut seen: HashSet<Vec<ValueKey>> = HashSet::with_capacity(dataset.row_count());
    Some(dataset.retain_rows(|row| seen.insert(idxs.iter().map(|&i| row[i].key()).collect())))
}
