//! Summary statistics over a cleaned event table.

use chrono::{DateTime, Utc};

use crate::error::{PipelineError, PipelineResult};
use crate::processing::{group_counts, reduce, ReduceOp};
use crate::schema::{ITEM_ID, TIMESTAMP, USER_ID};
use crate::types::{DataSet, Value};

/// Read-only summary of an event table.
#[derive(Debug, Clone, PartialEq)]
pub struct EventStats {
    pub total_events: usize,
    pub unique_users: usize,
    pub unique_items: usize,
    /// Earliest timestamp, `None` for an empty table.
    pub first_event: Option<DateTime<Utc>>,
    /// Latest timestamp, `None` for an empty table.
    pub last_event: Option<DateTime<Utc>>,
    /// Mean rows per user, `None` when there are no users.
    pub events_per_user_mean: Option<f64>,
    /// Median rows per user, `None` when there are no users.
    pub events_per_user_median: Option<f64>,
}

impl EventStats {
    /// Compute statistics for `events`.
    ///
    /// Errors if the table lacks the `user_id`, `item_id`, or `timestamp` column.
    pub fn compute(events: &DataSet) -> PipelineResult<Self> {
        let distinct = |column: &str| match reduce(events, column, ReduceOp::CountDistinct) {
            Some(Value::Int64(n)) => Ok(n as usize),
            _ => Err(PipelineError::missing_column(column)),
        };
        let bound = |op: ReduceOp| {
            reduce(events, TIMESTAMP, op)
                .map(|v| v.as_timestamp())
                .ok_or_else(|| PipelineError::missing_column(TIMESTAMP))
        };

        let per_user = group_counts(events, USER_ID)
            .ok_or_else(|| PipelineError::missing_column(USER_ID))?;
        let mut counts: Vec<usize> = per_user.into_values().collect();
        counts.sort_unstable();

        Ok(Self {
            total_events: events.row_count(),
            unique_users: distinct(USER_ID)?,
            unique_items: distinct(ITEM_ID)?,
            first_event: bound(ReduceOp::Min)?,
            last_event: bound(ReduceOp::Max)?,
            events_per_user_mean: mean(&counts),
            events_per_user_median: median(&counts),
        })
    }
}

fn mean(sorted: &[usize]) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    Some(sorted.iter().sum::<usize>() as f64 / sorted.len() as f64)
}

fn median(sorted: &[usize]) -> Option<f64> {
    let n = sorted.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(sorted[n / 2] as f64),
        _ => Some((sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0),
    }
}

#[cfg(test)]
mod tests {
    use super::EventStats;
    use crate::schema::events_schema;
    use crate::types::{DataSet, Value};
    use chrono::{TimeZone, Utc};

    fn event(user: &str, item: &str, day: u32) -> Vec<Value> {
        vec![
            Value::utf8(user),
            Value::utf8(item),
            Value::utf8("purchase"),
            Value::Timestamp(Utc.with_ymd_and_hms(2020, 1, day, 0, 0, 0).unwrap()),
        ]
    }

    #[test]
    fn computes_counts_range_and_per_user_distribution() {
        let ds = DataSet::new(
            events_schema(),
            vec![
                event("u1", "i1", 3),
                event("u1", "i2", 1),
                event("u1", "i3", 7),
                event("u2", "i1", 2),
                event("u3", "i1", 5),
                event("u3", "i2", 4),
            ],
        );

        let stats = EventStats::compute(&ds).unwrap();
        assert_eq!(stats.total_events, 6);
        assert_eq!(stats.unique_users, 3);
        assert_eq!(stats.unique_items, 3);
        assert_eq!(stats.first_event, Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(stats.last_event, Some(Utc.with_ymd_and_hms(2020, 1, 7, 0, 0, 0).unwrap()));
        assert_eq!(stats.events_per_user_mean, Some(2.0));
        assert_eq!(stats.events_per_user_median, Some(2.0));
    }

    #[test]
    fn median_of_even_user_count_averages_middle_pair() {
        let ds = DataSet::new(
            events_schema(),
            vec![event("u1", "i1", 1), event("u2", "i1", 2), event("u2", "i2", 3), event("u2", "i3", 4)],
        );
        let stats = EventStats::compute(&ds).unwrap();
        assert_eq!(stats.events_per_user_median, Some(2.0));
        assert_eq!(stats.events_per_user_mean, Some(2.0));
    }

    #[test]
    fn empty_table_has_no_range_or_distribution() {
        let stats = EventStats::compute(&DataSet::empty(events_schema())).unwrap();
        assert_eq!(stats.total_events, 0);
        assert_eq!(stats.unique_users, 0);
        assert_eq!(stats.first_event, None);
        assert_eq!(stats.events_per_user_mean, None);
        assert_eq!(stats.events_per_user_median, None);
    }
}
