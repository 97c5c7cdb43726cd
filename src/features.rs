//! Programmatic access to the event tables for modeling code.
//!
//! The cleaned table at [`DataPaths::events`] is the single source of truth for
//! downstream consumers; the raw table is kept for debugging and comparison.

use std::path::Path;

use crate::config::DataPaths;
use crate::error::{PipelineError, PipelineResult};
use crate::schema::EVENT_TYPE;
use crate::types::{DataSet, Value};

pub use crate::cleaning::features::{clean_events, clean_events_with, FeatureCleaning};

/// Load any event table written by this crate.
pub fn load_events(path: impl AsRef<Path>) -> PipelineResult<DataSet> {
    crate::store::load_events(path)
}

/// Load the cleaned event table.
pub fn load_clean_events(paths: &DataPaths) -> PipelineResult<DataSet> {
    load_events(&paths.events)
}

/// Load the raw (uncleaned) event table.
pub fn load_raw_events(paths: &DataPaths) -> PipelineResult<DataSet> {
    load_events(&paths.events_raw)
}

/// Distribution of non-null `event_type` values, most frequent first.
pub fn event_type_counts(events: &DataSet) -> PipelineResult<Vec<(Value, usize)>> {
    crate::processing::value_counts(events, EVENT_TYPE)
        .ok_or_else(|| PipelineError::missing_column(EVENT_TYPE))
}
