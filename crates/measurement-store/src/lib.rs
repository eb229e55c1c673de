pub mod config;
pub mod error;
pub mod kv;
pub mod preferences;
pub mod query;
pub mod saved;
pub mod store;

pub use config::StoreConfig;
pub use error::StoreError;
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use preferences::{Preferences, Setting, Settings};
pub use query::{
    filter_by_date_range, filter_by_min_threshold, group_by_category, highest, highest_for,
    summarize, StoreSummary,
};
pub use saved::{GeoLocation, SavedMeasurement};
pub use store::MeasurementStore;
