//! The ingestion pipeline: `events_raw.csv` to `events.csv`.

use serde::Deserialize;

use crate::error::PipelineResult;
use crate::observability::PipelineObserver;
use crate::schema::PURCHASE;
use crate::types::DataSet;

use super::{
    Cleaned, CleaningPipeline, DropDuplicates, DropNulls, KeepEventTypes, MinActivity,
    SortByTime, ValidateTypes,
};

pub const PIPELINE_NAME: &str = "ingestion";

/// Thresholds for [`ingestion_pipeline`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestionCleaning {
    /// Event types allowed through the whitelist stage.
    pub valid_event_types: Vec<String>,
    /// Users with fewer rows are removed. `1` keeps everyone.
    pub user_min_interactions: usize,
}

impl Default for IngestionCleaning {
    fn default() -> Self {
        Self {
            valid_event_types: vec![PURCHASE.to_string()],
            user_min_interactions: 1,
        }
    }
}

/// Build the ingestion pipeline.
///
/// Steps: remove nulls (all four fields), validate types, keep valid event types, remove
/// duplicate `(user_id, item_id, timestamp)` rows, filter low-activity users, sort by
/// timestamp, summary statistics.
pub fn ingestion_pipeline(opts: &IngestionCleaning) -> CleaningPipeline {
    CleaningPipeline::new(PIPELINE_NAME)
        .stage(DropNulls::all_fields())
        .stage(ValidateTypes)
        .stage(KeepEventTypes::new(opts.valid_event_types.iter().cloned()))
        .stage(DropDuplicates)
        .stage(MinActivity::users(opts.user_min_interactions))
        .stage(SortByTime)
        .with_summary()
}

/// Run [`ingestion_pipeline`] over `raw`.
pub fn clean_ingested_events(
    raw: DataSet,
    opts: &IngestionCleaning,
    observer: Option<&dyn PipelineObserver>,
) -> PipelineResult<Cleaned> {
    ingestion_pipeline(opts).run(raw, observer)
}

#[cfg(test)]
mod tests {
    use super::{clean_ingested_events, ingestion_pipeline, IngestionCleaning};
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
        let pipeline = ingestion_pipeline(&IngestionCleaning::default());
        assert_eq!(
            pipeline.stage_names(),
            vec![
                "remove_nulls",
                "validate_types",
                "validate_event_types",
                "remove_duplicates",
                "filter_low_activity_users",
                "sort_by_time",
            ]
        );
        assert_eq!(pipeline.total_steps(), 7);
    }

    #[test]
    fn cleans_nulls_invalid_types_and_duplicates() {
        let raw = DataSet::new(
            events_schema(),
            vec![
                event("u1", "i1", "purchase", 4),
                event("u1", "i1", "purchase", 4),
                event("u2", "i2", "view", 3),
                vec![Value::utf8("u3"), Value::Null, Value::utf8("purchase"), ts(2)],
                event("u3", "i3", "purchase", 1),
            ],
        );

        let out = clean_ingested_events(raw, &IngestionCleaning::default(), None).unwrap();
        let report = &out.report;
        assert_eq!(report.stage("remove_nulls").unwrap().dropped(), 1);
        assert_eq!(report.stage("validate_event_types").unwrap().dropped(), 1);
        assert_eq!(report.stage("remove_duplicates").unwrap().dropped(), 1);
        assert_eq!(report.stage("filter_low_activity_users").unwrap().dropped(), 0);

        assert_eq!(
            out.events.rows,
            vec![event("u3", "i3", "purchase", 1), event("u1", "i1", "purchase", 4)]
        );
        let stats = out.stats.unwrap();
        assert_eq!(stats.total_events, 2);
        assert_eq!(stats.unique_users, 2);
    }

    #[test]
    fn whitelist_does_not_normalize() {
        let raw = DataSet::new(events_schema(), vec![event("u1", "i1", " Purchase", 1)]);
        let out = clean_ingested_events(raw, &IngestionCleaning::default(), None).unwrap();
        assert!(out.events.is_empty());
    }

    #[test]
    fn user_threshold_is_evaluated_after_dedup() {
        let raw = DataSet::new(
            events_schema(),
            vec![
                event("u1", "i1", "purchase", 1),
                event("u1", "i1", "purchase", 1),
                event("u2", "i1", "purchase", 1),
                event("u2", "i2", "purchase", 2),
            ],
        );
        let opts = IngestionCleaning {
            user_min_interactions: 2,
            ..Default::default()
        };
        let out = clean_ingested_events(raw, &opts, None).unwrap();
        let users: Vec<_> = out.events.rows.iter().map(|r| r[0].clone()).collect();
        assert_eq!(users, vec![Value::utf8("u2"), Value::utf8("u2")]);
    }
}
