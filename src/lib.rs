//! `purchase-events` turns the Amazon Electronics review dump into a clean, canonical
//! purchase-event log for recommendation modeling.
//!
//! Data flows one way:
//!
//! 1. [`ingestion`]: gzip-compressed NDJSON reviews and product metadata are extracted into
//!    flat tables. Malformed lines are skipped and recorded in an
//!    [`ingestion::ExtractionReport`].
//! 2. [`store`]: tables are persisted as CSV (`events_raw.csv`, `items_raw.csv`).
//! 3. [`cleaning`]: an ordered pipeline of pure stages produces `events.csv`, sorted by
//!    time, with no null fields and every user and item above its activity threshold.
//! 4. [`stats`]: summary statistics over the clean table.
//!
//! The three binaries (`download-data`, `load-data`, `clean-events`) are thin wrappers
//! over [`driver`].
//!
//! ## Event table
//!
//! Every event table has the same [`types::Schema`], see [`schema::events_schema`]:
//!
//! | column       | type                              |
//! |--------------|-----------------------------------|
//! | `user_id`    | [`types::DataType::Utf8`]         |
//! | `item_id`    | [`types::DataType::Utf8`]         |
//! | `event_type` | [`types::DataType::Utf8`]         |
//! | `timestamp`  | [`types::DataType::Timestamp`]    |
//!
//! ## Cleaning in code
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use purchase_events::features::clean_events;
//! use purchase_events::schema::events_schema;
//! use purchase_events::types::{DataSet, Value};
//!
//! let at = |day| Value::Timestamp(Utc.with_ymd_and_hms(2014, 1, day, 0, 0, 0).unwrap());
//! let rows = (1..=5)
//!     .map(|day| vec![Value::utf8("u1"), Value::utf8("i1"), Value::utf8(" Purchase"), at(6 - day)])
//!     .collect();
//!
//! let clean = clean_events(DataSet::new(events_schema(), rows)).unwrap();
//! assert_eq!(clean.row_count(), 5);
//! assert_eq!(clean.rows[0][2], Value::utf8("purchase"));
//! assert_eq!(clean.rows[0][3], at(1));
//! ```
//!
//! ## Modules
//!
//! - [`types`], [`schema`], [`timestamp`]: the in-memory table model
//! - [`processing`]: generic table transformations (dedup/sort/group/reduce)
//! - [`cleaning`]: stages and the two pipeline definitions
//! - [`config`]: TOML configuration with defaults for every path and threshold
//! - [`observability`], [`report`], [`logging`]: progress hooks, console report, tracing setup
//! - [`error`]: error types used across the crate

pub mod cleaning;
pub mod config;
pub mod download;
pub mod driver;
pub mod error;
pub mod features;
pub mod ingestion;
pub mod logging;
pub mod observability;
pub mod processing;
pub mod report;
pub mod schema;
pub mod stats;
pub mod store;
pub mod timestamp;
pub mod types;

pub use error::{PipelineError, PipelineResult};
