//! Event cleaning pipelines.
//!
//! A [`CleaningPipeline`] is an ordered list of [`Stage`]s. Each stage consumes the table
//! snapshot produced by the previous one and returns the next snapshot, so a stage never
//! observes a table another stage still holds.
//!
//! Two named definitions exist and produce different tables on purpose:
//!
//! - [`ingestion::ingestion_pipeline`]: null removal over all four fields, type validation,
//!   event-type whitelist, deduplication, user activity filter, sort, then summary statistics.
//! - [`features::features_pipeline`]: event-type normalization, null removal over the
//!   identifiers and timestamp, user filter, item filter, sort.
//!
//! ```rust
//! use purchase_events::cleaning::features::{features_pipeline, FeatureCleaning};
//! use purchase_events::schema::events_schema;
//! use purchase_events::types::DataSet;
//!
//! let pipeline = features_pipeline(&FeatureCleaning::default());
//! let cleaned = pipeline.run(DataSet::empty(events_schema()), None).unwrap();
//! assert_eq!(cleaned.events.row_count(), 0);
//! assert_eq!(cleaned.report.stages.len(), 5);
//! ```

pub mod features;
pub mod ingestion;
pub mod stages;

use std::fmt;

use serde::Deserialize;
use tracing::debug;

use crate::error::PipelineResult;
use crate::observability::{PipelineObserver, StageContext};
use crate::stats::EventStats;
use crate::types::DataSet;

pub use stages::{
    DropDuplicates, DropNulls, Entity, KeepEventTypes, MinActivity, NormalizeEventTypes,
    SortByTime, ValidateTypes,
};

/// One pure table transformation.
pub trait Stage {
    /// Stable identifier, e.g. `remove_nulls`.
    fn name(&self) -> &'static str;

    /// Progress text shown next to the step marker, e.g. `Removing null values`.
    fn description(&self) -> String;

    /// Noun phrase describing removed rows, e.g. `duplicate events`.
    fn dropped_label(&self) -> String;

    /// Transform `events` into the next snapshot. Must never add rows.
    fn apply(&self, events: DataSet) -> PipelineResult<DataSet>;
}

/// Row accounting for one executed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    /// 1-based position in the pipeline.
    pub step: usize,
    pub name: &'static str,
    pub description: String,
    pub dropped_label: String,
    pub rows_in: usize,
    pub rows_out: usize,
}

impl StageReport {
    pub fn dropped(&self) -> usize {
        self.rows_in.saturating_sub(self.rows_out)
    }
}

/// Row accounting for a whole pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleaningReport {
    pub pipeline: &'static str,
    pub rows_in: usize,
    pub rows_out: usize,
    pub stages: Vec<StageReport>,
}

impl CleaningReport {
    /// Look up a stage by its [`Stage::name`].
    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Percentage of input rows removed; `0.0` for an empty input.
    pub fn reduction_pct(&self) -> f64 {
        reduction_pct(self.rows_in, self.rows_out)
    }
}

pub(crate) fn reduction_pct(rows_in: usize, rows_out: usize) -> f64 {
    if rows_in == 0 {
        return 0.0;
    }
    100.0 * (1.0 - rows_out as f64 / rows_in as f64)
}

/// Output of [`CleaningPipeline::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct Cleaned {
    pub events: DataSet,
    pub report: CleaningReport,
    /// Present when the pipeline was built [`CleaningPipeline::with_summary`].
    pub stats: Option<EventStats>,
}

/// Which pipeline definition the `clean-events` driver runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleaningVariant {
    #[default]
    Ingestion,
    Features,
}

impl fmt::Display for CleaningVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingestion => f.write_str(ingestion::PIPELINE_NAME),
            Self::Features => f.write_str(features::PIPELINE_NAME),
        }
    }
}

/// An ordered composition of [`Stage`]s.
pub struct CleaningPipeline {
    name: &'static str,
    stages: Vec<Box<dyn Stage>>,
    summarize: bool,
}

impl fmt::Debug for CleaningPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CleaningPipeline")
            .field("name", &self.name)
            .field("stages", &self.stage_names())
            .field("summarize", &self.summarize)
            .finish()
    }
}

impl CleaningPipeline {
    /// Create an empty pipeline.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            stages: Vec::new(),
            summarize: false,
        }
    }

    /// Append a stage.
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Compute [`EventStats`] over the final table as an extra, last step.
    pub fn with_summary(mut self) -> Self {
        self.summarize = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Number of numbered steps, including the summary step when enabled.
    pub fn total_steps(&self) -> usize {
        self.stages.len() + usize::from(self.summarize)
    }

    /// Run every stage in order over `events`.
    ///
    /// Stops at the first failing stage and returns its error.
    pub fn run(
        &self,
        events: DataSet,
        observer: Option<&dyn PipelineObserver>,
    ) -> PipelineResult<Cleaned> {
        let total_steps = self.total_steps();
        let rows_in = events.row_count();
        let mut reports = Vec::with_capacity(self.stages.len());
        let mut current = events;

        for (idx0, stage) in self.stages.iter().enumerate() {
            let description = stage.description();
            let ctx = StageContext {
                pipeline: self.name,
                step: idx0 + 1,
                total_steps,
                description: &description,
            };
            if let Some(obs) = observer {
                obs.on_stage_started(&ctx);
            }

            let before = current.row_count();
            current = stage.apply(current)?;
            let report = StageReport {
                step: ctx.step,
                name: stage.name(),
                description: description.clone(),
                dropped_label: stage.dropped_label(),
                rows_in: before,
                rows_out: current.row_count(),
            };
            debug!(
                pipeline = self.name,
                stage = report.name,
                rows_in = report.rows_in,
                rows_out = report.rows_out,
                "stage finished"
            );
            if let Some(obs) = observer {
                obs.on_stage_finished(&ctx, &report);
            }
            reports.push(report);
        }

        let stats = if self.summarize {
            let ctx = StageContext {
                pipeline: self.name,
                step: total_steps,
                total_steps,
                description: "Computing summary statistics",
            };
            if let Some(obs) = observer {
                obs.on_stage_started(&ctx);
            }
            Some(EventStats::compute(&current)?)
        } else {
            None
        };

        let report = CleaningReport {
            pipeline: self.name,
            rows_in,
            rows_out: current.row_count(),
            stages: reports,
        };
        Ok(Cleaned {
            events: current,
            report,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{reduction_pct, CleaningPipeline, DropNulls, SortByTime, Stage};
    use crate::error::PipelineResult;
    use crate::schema::events_schema;
    use crate::types::{DataSet, Value};

    struct KeepFirst;

    impl Stage for KeepFirst {
        fn name(&self) -> &'static str {
            "keep_first"
        }
        fn description(&self) -> String {
            "Keeping the first row".to_string()
        }
        fn dropped_label(&self) -> String {
            "trailing events".to_string()
        }
        fn apply(&self, mut events: DataSet) -> PipelineResult<DataSet> {
            events.rows.truncate(1);
            Ok(events)
        }
    }

    fn rows(n: usize) -> DataSet {
        let rows = (0..n)
            .map(|i| {
                vec![
                    Value::utf8(format!("u{i}")),
                    Value::utf8("i1"),
                    Value::utf8("purchase"),
                    Value::Null,
                ]
            })
            .collect();
        DataSet::new(events_schema(), rows)
    }

    #[test]
    fn runs_stages_in_order_and_accounts_rows() {
        let pipeline = CleaningPipeline::new("custom").stage(KeepFirst).stage(SortByTime);
        let out = pipeline.run(rows(4), None).unwrap();

        assert_eq!(pipeline.stage_names(), vec!["keep_first", "sort_by_time"]);
        assert_eq!(out.events.row_count(), 1);
        assert_eq!(out.report.rows_in, 4);
        assert_eq!(out.report.rows_out, 1);
        assert_eq!(out.report.stage("keep_first").unwrap().dropped(), 3);
        assert_eq!(out.report.stage("sort_by_time").unwrap().step, 2);
        assert_eq!(out.report.reduction_pct(), 75.0);
        assert!(out.stats.is_none());
    }

    #[test]
    fn summary_counts_as_a_step() {
        let pipeline = CleaningPipeline::new("custom").stage(SortByTime).with_summary();
        assert_eq!(pipeline.total_steps(), 2);
        let out = pipeline.run(rows(0), None).unwrap();
        assert_eq!(out.stats.unwrap().total_events, 0);
    }

    #[test]
    fn first_failing_stage_aborts_the_run() {
        let schema = crate::types::Schema::new(vec![]);
        let pipeline = CleaningPipeline::new("custom").stage(DropNulls::all_fields());
        assert!(pipeline.run(DataSet::empty(schema), None).is_err());
    }

    #[test]
    fn reduction_of_empty_input_is_zero() {
        assert_eq!(reduction_pct(0, 0), 0.0);
        assert_eq!(reduction_pct(8, 2), 75.0);
    }
}
