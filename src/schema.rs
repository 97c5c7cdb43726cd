//! Canonical table layouts shared by extraction, cleaning, and storage.

use crate::types::{DataType, Field, Schema};

pub const USER_ID: &str = "user_id";
pub const ITEM_ID: &str = "item_id";
pub const EVENT_TYPE: &str = "event_type";
pub const TIMESTAMP: &str = "timestamp";

pub const TITLE: &str = "title";
pub const PRICE: &str = "price";
pub const CATEGORY: &str = "category";

/// The only event type the dataset currently produces: a review implies a purchase.
pub const PURCHASE: &str = "purchase";

/// Schema of `events_raw.csv` and `events.csv`: `user_id,item_id,event_type,timestamp`.
pub fn events_schema() -> Schema {
    Schema::new(vec![
        Field::new(USER_ID, DataType::Utf8),
        Field::new(ITEM_ID, DataType::Utf8),
        Field::new(EVENT_TYPE, DataType::Utf8),
        Field::new(TIMESTAMP, DataType::Timestamp),
    ])
}

/// Schema of `items_raw.csv`: `item_id,title,price,category`.
pub fn items_schema() -> Schema {
    Schema::new(vec![
        Field::new(ITEM_ID, DataType::Utf8),
        Field::new(TITLE, DataType::Utf8),
        Field::new(PRICE, DataType::Float64),
        Field::new(CATEGORY, DataType::Utf8),
    ])
}
