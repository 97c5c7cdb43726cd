//! In-memory table primitives.
//!
//! The cleaning stages in [`crate::cleaning`] are built from these. Functions that take a
//! [`crate::types::DataSet`] by value consume the snapshot and return the next one;
//! functions that borrow are read-only.
//!
//! - [`map_column()`]: rewrite every value of one column
//! - [`reduce()`]: distinct count / earliest / latest timestamp
//! - [`group_counts()`], [`value_counts()`]: rows per distinct value
//! - [`sort_by()`]: stable ascending sort
//! - [`dedup_by()`]: drop repeated keys, first occurrence wins
//!
//! ## Example
//!
//! ```rust
//! use purchase_events::processing::{dedup_by, reduce, sort_by, ReduceOp};
//! use purchase_events::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("user_id", DataType::Utf8),
//!     Field::new("n", DataType::Int64),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::utf8("u2"), Value::Int64(3)],
//!         vec![Value::utf8("u1"), Value::Int64(1)],
//!         vec![Value::utf8("u2"), Value::Int64(3)],
//!     ],
//! );
//!
//! let unique = dedup_by(ds, &["user_id", "n"]).unwrap();
//! let sorted = sort_by(unique, "n").unwrap();
//! assert_eq!(sorted.rows[0][0], Value::utf8("u1"));
//! assert_eq!(reduce(&sorted, "user_id", ReduceOp::CountDistinct), Some(Value::Int64(2)));
//! ```

pub mod dedup;
pub mod group;
pub mod map;
pub mod reduce;
pub mod sort;

pub use dedup::dedup_by;
pub use group::{group_counts, value_counts};
pub use map::map_column;
pub use reduce::{reduce, ReduceOp};
pub use sort::sort_by;
