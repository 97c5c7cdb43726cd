//! Individual cleaning stages.
//!
//! Each stage is a pure `DataSet -> DataSet` step and can be invoked on its own via
//! [`Stage::apply`]. Stages that look up columns fail with
//! [`PipelineError::SchemaMismatch`] when the column is absent.

use crate::error::{PipelineError, PipelineResult};
use crate::processing::{dedup_by, group_counts, map_column, sort_by};
use crate::schema::{EVENT_TYPE, ITEM_ID, TIMESTAMP, USER_ID};
use crate::timestamp::{format_timestamp, from_epoch_seconds, parse_timestamp};
use crate::types::{DataSet, DataType, Value};

use super::Stage;

/// Lowercase `event_type` and strip surrounding whitespace.
///
/// Interior whitespace is left alone. Non-string values become null.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeEventTypes;

impl Stage for NormalizeEventTypes {
    fn name(&self) -> &'static str {
        "normalize_event_types"
    }

    fn description(&self) -> String {
        "Normalizing event types".to_string()
    }

    fn dropped_label(&self) -> String {
        "events".to_string()
    }

    fn apply(&self, events: DataSet) -> PipelineResult<DataSet> {
        map_column(events, EVENT_TYPE, |v| match v {
            Value::Utf8(s) => Value::Utf8(s.to_lowercase().trim().to_string()),
            _ => Value::Null,
        })
        .ok_or_else(|| PipelineError::missing_column(EVENT_TYPE))
    }
}

/// Remove rows with a null in any of the listed columns.
#[derive(Debug, Clone)]
pub struct DropNulls {
    columns: Vec<&'static str>,
}

impl DropNulls {
    pub fn new(columns: Vec<&'static str>) -> Self {
        Self { columns }
    }

    /// All four event fields are required.
    pub fn all_fields() -> Self {
        Self::new(vec![USER_ID, ITEM_ID, EVENT_TYPE, TIMESTAMP])
    }

    /// Identifiers and timestamp are required; `event_type` may still be null.
    pub fn critical_fields() -> Self {
        Self::new(vec![USER_ID, ITEM_ID, TIMESTAMP])
    }
}

impl Stage for DropNulls {
    fn name(&self) -> &'static str {
        "remove_nulls"
    }

    fn description(&self) -> String {
        "Removing null values".to_string()
    }

    fn dropped_label(&self) -> String {
        "events with null values".to_string()
    }

    fn apply(&self, events: DataSet) -> PipelineResult<DataSet> {
        let idxs = column_indexes(&events, &self.columns)?;
        Ok(events.retain_rows(|row| idxs.iter().all(|&i| !row[i].is_null())))
    }
}

/// Coerce identifiers and `event_type` to strings and `timestamp` to a UTC point in time.
///
/// Integers in the timestamp column are read as epoch seconds and strings are parsed with
/// [`parse_timestamp`]. Any value that cannot be coerced is a fatal
/// [`PipelineError::ParseError`]; nulls pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateTypes;

impl Stage for ValidateTypes {
    fn name(&self) -> &'static str {
        "validate_types"
    }

    fn description(&self) -> String {
        "Validating data types".to_string()
    }

    fn dropped_label(&self) -> String {
        "events".to_string()
    }

    fn apply(&self, mut events: DataSet) -> PipelineResult<DataSet> {
        let text_idxs = column_indexes(&events, &[USER_ID, ITEM_ID, EVENT_TYPE])?;
        let ts_idx = column_indexes(&events, &[TIMESTAMP])?[0];

        for (row_idx0, row) in events.rows.iter_mut().enumerate() {
            for &i in &text_idxs {
                let v = std::mem::replace(&mut row[i], Value::Null);
                row[i] = to_utf8(v);
            }
            let v = std::mem::replace(&mut row[ts_idx], Value::Null);
            row[ts_idx] = to_timestamp(row_idx0 + 1, v)?;
        }

        for &i in &text_idxs {
            events.schema.fields[i].data_type = DataType::Utf8;
        }
        events.schema.fields[ts_idx].data_type = DataType::Timestamp;
        Ok(events)
    }
}

fn to_utf8(v: Value) -> Value {
    match v {
        Value::Null => Value::Null,
        Value::Utf8(s) => Value::Utf8(s),
        Value::Int64(n) => Value::Utf8(n.to_string()),
        Value::Float64(f) => Value::Utf8(f.to_string()),
        Value::Timestamp(t) => Value::Utf8(format_timestamp(&t)),
    }
}

fn to_timestamp(row: usize, v: Value) -> PipelineResult<Value> {
    let parse_error = |raw: String, message: &str| PipelineError::ParseError {
        row,
        column: TIMESTAMP.to_string(),
        raw,
        message: message.to_string(),
    };
    match v {
        Value::Null | Value::Timestamp(_) => Ok(v),
        Value::Utf8(s) => match parse_timestamp(&s) {
            Some(t) => Ok(Value::Timestamp(t)),
            None => Err(parse_error(s, "expected timestamp")),
        },
        Value::Int64(n) => from_epoch_seconds(n)
            .map(Value::Timestamp)
            .ok_or_else(|| parse_error(n.to_string(), "epoch seconds out of range")),
        Value::Float64(f) => Err(parse_error(f.to_string(), "expected timestamp")),
    }
}

/// Keep only rows whose `event_type` is in the allowed set.
///
/// Comparison is exact; normalization, if wanted, must happen in an earlier stage.
#[derive(Debug, Clone)]
pub struct KeepEventTypes {
    allowed: Vec<String>,
}

impl KeepEventTypes {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl Stage for KeepEventTypes {
    fn name(&self) -> &'static str {
        "validate_event_types"
    }

    fn description(&self) -> String {
        "Validating event types".to_string()
    }

    fn dropped_label(&self) -> String {
        "events with invalid event_type".to_string()
    }

    fn apply(&self, events: DataSet) -> PipelineResult<DataSet> {
        let idx = column_indexes(&events, &[EVENT_TYPE])?[0];
        Ok(events.retain_rows(|row| {
            row[idx]
                .as_str()
                .is_some_and(|t| self.allowed.iter().any(|a| a == t))
        }))
    }
}

/// Remove rows repeating an earlier `(user_id, item_id, timestamp)` triple.
///
/// The first occurrence in the current row order is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropDuplicates;

impl Stage for DropDuplicates {
    fn name(&self) -> &'static str {
        "remove_duplicates"
    }

    fn description(&self) -> String {
        "Removing duplicates".to_string()
    }

    fn dropped_label(&self) -> String {
        "duplicate events".to_string()
    }

    fn apply(&self, events: DataSet) -> PipelineResult<DataSet> {
        let key = [USER_ID, ITEM_ID, TIMESTAMP];
        column_indexes(&events, &key)?;
        dedup_by(events, &key).ok_or_else(|| PipelineError::missing_column(USER_ID))
    }
}

/// Which entity an activity threshold applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Item,
}

impl Entity {
    pub fn column(self) -> &'static str {
        match self {
            Self::User => USER_ID,
            Self::Item => ITEM_ID,
        }
    }

    fn plural(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Item => "items",
        }
    }
}

/// Remove every row of a user (or item) with fewer than `min_events` rows.
///
/// Counts are taken over the table as it enters this stage. Rows whose key is null are
/// never counted and are removed.
#[derive(Debug, Clone, Copy)]
pub struct MinActivity {
    entity: Entity,
    min_events: usize,
}

impl MinActivity {
    pub fn users(min_events: usize) -> Self {
        Self {
            entity: Entity::User,
            min_events,
        }
    }

    pub fn items(min_events: usize) -> Self {
        Self {
            entity: Entity::Item,
            min_events,
        }
    }
}

impl Stage for MinActivity {
    fn name(&self) -> &'static str {
        match self.entity {
            Entity::User => "filter_low_activity_users",
            Entity::Item => "filter_rare_items",
        }
    }

    fn description(&self) -> String {
        match self.entity {
            Entity::User => "Filtering low-activity users".to_string(),
            Entity::Item => "Filtering rare items".to_string(),
        }
    }

    fn dropped_label(&self) -> String {
        format!(
            "events from {} with <{} interactions",
            self.entity.plural(),
            self.min_events
        )
    }

    fn apply(&self, events: DataSet) -> PipelineResult<DataSet> {
        let column = self.entity.column();
        let idx = column_indexes(&events, &[column])?[0];
        let counts =
            group_counts(&events, column).ok_or_else(|| PipelineError::missing_column(column))?;
        Ok(events.retain_rows(|row| {
            counts
                .get(&row[idx].key())
                .is_some_and(|&n| n >= self.min_events)
        }))
    }
}

/// Stable-sort ascending by `timestamp`. Row positions are renumbered implicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortByTime;

impl Stage for SortByTime {
    fn name(&self) -> &'static str {
        "sort_by_time"
    }

    fn description(&self) -> String {
        "Sorting by timestamp".to_string()
    }

    fn dropped_label(&self) -> String {
        "events".to_string()
    }

    fn apply(&self, events: DataSet) -> PipelineResult<DataSet> {
        sort_by(events, TIMESTAMP).ok_or_else(|| PipelineError::missing_column(TIMESTAMP))
    }
}

fn column_indexes(events: &DataSet, columns: &[&str]) -> PipelineResult<Vec<usize>> {
    columns
        .iter()
        .map(|c| {
            events
                .schema
                .index_of(c)
                .ok_or_else(|| PipelineError::missing_column(c))
        })
        .collect()
}
