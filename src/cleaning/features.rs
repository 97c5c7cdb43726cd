//! The features pipeline: the reusable cleaning composition used by modeling code.

use serde::Deserialize;

use crate::error::PipelineResult;
use crate::types::DataSet;

use super::{CleaningPipeline, DropNulls, MinActivity, NormalizeEventTypes, SortByTime};

pub const PIPELINE_NAME: &str = "features";

/// Thresholds for [`features_pipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureCleaning {
    /// Users with fewer rows are cold-start and removed.
    pub user_min_events: usize,
    /// Items with fewer rows (after user filtering) are removed.
    pub item_min_events: usize,
}

impl Default for FeatureCleaning {
    fn default() -> Self {
        Self {
            user_min_events: 3,
            item_min_events: 5,
        }
    }
}

/// Build the features pipeline.
///
/// Steps: normalize event types, drop rows with null identifiers or timestamp, filter
/// low-activity users, filter rare items, sort by timestamp. `event_type` values are
/// normalized but never checked against a whitelist. Each activity filter runs once, so
/// a user can end below `user_min_events` once their rare items are gone.
pub fn features_pipeline(opts: &FeatureCleaning) -> CleaningPipeline {
    CleaningPipeline::new(PIPELINE_NAME)
        .stage(NormalizeEventTypes)
        .stage(DropNulls::critical_fields())
        .stage(MinActivity::users(opts.user_min_events))
        .stage(MinActivity::items(opts.item_min_events))
        .stage(SortByTime)
}

/// Clean `events` with the default thresholds (3 events per user, 5 per item).
pub fn clean_events(events: DataSet) -> PipelineResult<DataSet> {
    clean_events_with(events, &FeatureCleaning::default())
}

/// Clean `events` with explicit thresholds.
pub fn clean_events_with(events: DataSet, opts: &FeatureCleaning) -> PipelineResult<DataSet> {
    Ok(features_pipeline(opts).run(events, None)?.events)
}

#[cfg(test)]
mod tests {
    use super::{clean_events, clean_events_with, features_pipeline, FeatureCleaning};
    use crate::schema::events_schema;
    use crate::types::{DataSet, Value};
    use chrono::{TimeZone, Utc};

    fn ts(day: u32) -> Value {
        Value::Timestamp(Utc.with_ymd_and_hms(2020, 1, day, 0, 0, 0).unwrap())
    }

    fn event(user: &str, item: &str, kind: &str, day: u32) -> Vec<Value> {
        vec![Value::utf8(user), Value::utf8(item), Value::utf8(kind), ts(day)]
    }

    #[test]
    fn stage_order_is_fixed() {
        assert_eq!(
            features_pipeline(&FeatureCleaning::default()).stage_names(),
            vec![
                "normalize_event_types",
                "remove_nulls",
                "filter_low_activity_users",
                "filter_rare_items",
                "sort_by_time",
            ]
        );
    }

    #[test]
    fn default_thresholds_drop_sparse_users_and_items() {
        let raw = DataSet::new(
            events_schema(),
            vec![
                event("user1", "item1", "Purchase", 5),
                event("user1", "item1", "purchase ", 2),
                event("user1", "item2", " PURCHASE", 1),
                event("user2", "item3", "purchase", 3),
                event("user2", "item3", "PURCHASE", 4),
                event("user3", "item4", "purchase", 6),
                event("user4", "item5", "purchase", 7),
                event("user4", "item6", "purchase", 8),
            ],
        );

        // Only user1 survives the user filter, and none of its items reach five rows.
        let out = clean_events(raw).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn item_filter_sees_counts_after_user_filter() {
        // i1 has five rows overall, but one belongs to a user with a single event.
        let mut rows = Vec::new();
        for day in 1..=4 {
            rows.push(event("heavy", "i1", "purchase", day));
        }
        rows.push(event("light", "i1", "purchase", 5));
        let raw = DataSet::new(events_schema(), rows);

        let opts = FeatureCleaning {
            user_min_events: 2,
            item_min_events: 5,
        };
        assert!(clean_events_with(raw.clone(), &opts).unwrap().is_empty());

        let opts = FeatureCleaning {
            user_min_events: 1,
            item_min_events: 5,
        };
        assert_eq!(clean_events_with(raw, &opts).unwrap().row_count(), 5);
    }

    #[test]
    fn null_event_type_survives_and_output_is_sorted() {
        let mut rows = vec![
            event("u1", "i1", "purchase", 3),
            event("u1", "i1", "purchase", 1),
        ];
        rows.push(vec![Value::utf8("u1"), Value::utf8("i1"), Value::Null, ts(2)]);
        let raw = DataSet::new(events_schema(), rows);

        let opts = FeatureCleaning {
            user_min_events: 1,
            item_min_events: 1,
        };
        let out = clean_events_with(raw, &opts).unwrap();
        let days: Vec<_> = out.rows.iter().map(|r| r[3].clone()).collect();
        assert_eq!(days, vec![ts(1), ts(2), ts(3)]);
        assert_eq!(out.rows[1][2], Value::Null);
    }

    #[test]
    fn users_are_not_refiltered_after_item_filter() {
        let mut rows = Vec::new();
        for user in ["a", "b", "c", "d", "e"] {
            rows.push(event(user, "pop", "purchase", 1));
            rows.push(event(user, "pop", "purchase", 2));
            rows.push(event(user, "pop2", "purchase", 3));
        }
        rows.push(event("x", "pop", "purchase", 4));
        rows.push(event("x", "pop2", "purchase", 5));
        rows.push(event("x", "rare", "purchase", 6));

        let out = clean_events(DataSet::new(events_schema(), rows)).unwrap();
        assert_eq!(out.row_count(), 17);
        let x_rows: Vec<_> = out.rows.iter().filter(|r| r[0] == Value::utf8("x")).collect();
        assert_eq!(x_rows.len(), 2);
        assert!(out.rows.iter().all(|r| r[1] != Value::utf8("rare")));
    }
}
