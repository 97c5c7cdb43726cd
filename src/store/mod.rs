//! Tabular store: the canonical delimited files.
//!
//! `events_raw.csv` and `events.csv` share the header `user_id,item_id,event_type,timestamp`;
//! `items_raw.csv` has `item_id,title,price,category`. Loading parses `timestamp` into a
//! UTC point in time, so `save(load(path))` reproduces the file's data.

pub mod csv;

use std::path::Path;

use tracing::info;

use crate::error::PipelineResult;
use crate::report::thousands;
use crate::schema::{events_schema, items_schema};
use crate::types::DataSet;

pub use self::csv::{read_table, read_table_from_reader, write_table, write_table_to_writer};

/// Load an event table (`events_raw.csv` or `events.csv` layout).
pub fn load_events(path: impl AsRef<Path>) -> PipelineResult<DataSet> {
    let path = path.as_ref();
    let events = read_table(path, &events_schema())?;
    info!(path = %path.display(), rows = %thousands(events.row_count()), "loaded events");
    Ok(events)
}

/// Save an event table.
pub fn save_events(path: impl AsRef<Path>, events: &DataSet) -> PipelineResult<()> {
    save(path.as_ref(), events, "saved events")
}

/// Load an item table (`items_raw.csv` layout).
pub fn load_items(path: impl AsRef<Path>) -> PipelineResult<DataSet> {
    read_table(path, &items_schema())
}

/// Save an item table. An empty table still gets its header row.
pub fn save_items(path: impl AsRef<Path>, items: &DataSet) -> PipelineResult<()> {
    save(path.as_ref(), items, "saved items")
}

fn save(path: &Path, table: &DataSet, message: &'static str) -> PipelineResult<()> {
    write_table(path, table)?;
    info!(path = %path.display(), rows = %thousands(table.row_count()), "{message}");
    Ok(())
}
