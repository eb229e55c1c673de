use crate::metrics::peak_sound_db;
use crate::MonitorMetrics;
use measurement_store::SavedMeasurement;

/// Upper bound of the High sound band. Anything louder is Very High or worse.
pub const EXPOSURE_ALERT_DB: f64 = 95.0;

/// Updates the store gauges from `after` and reports whether the save moved
/// the loudest sound record across [`EXPOSURE_ALERT_DB`].
pub fn exposure_crossed(
    metrics: &MonitorMetrics,
    before: &[SavedMeasurement],
    after: &[SavedMeasurement],
) -> bool {
    let before_peak = peak_sound_db(before).unwrap_or(f64::NEG_INFINITY);
    let after_peak = peak_sound_db(after).unwrap_or(f64::NEG_INFINITY);
    metrics.observe_store(after);
    let crossed = before_peak <= EXPOSURE_ALERT_DB && after_peak > EXPOSURE_ALERT_DB;
    if crossed {
        metrics.exposure_alerts_total.inc();
    }
    crossed
}
