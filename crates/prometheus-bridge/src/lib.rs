//! Prometheus exposition for live measurements and the saved list.

pub mod guards;
pub mod metrics;

pub use guards::{exposure_crossed, EXPOSURE_ALERT_DB};
pub use metrics::{peak_sound_db, MonitorMetrics};
