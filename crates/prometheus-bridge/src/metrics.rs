use biosignal_core::{Measurement, Reading};
use measurement_store::{highest, SavedMeasurement};
use prometheus::{
    register_gauge_vec_with_registry, register_gauge_with_registry,
    register_int_counter_vec_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, Gauge, GaugeVec, IntCounter, IntCounterVec,
    IntGauge, Registry, TextEncoder,
};

pub struct MonitorMetrics {
    registry: Registry,
    pub latest_value: GaugeVec,
    pub raw_value: GaugeVec,
    pub measurements_total: IntCounterVec,
    pub saved_measurements: IntGauge,
    pub peak_sound_db: Gauge,
    pub exposure_alerts_total: IntCounter,
}

impl MonitorMetrics {
    /// Registers every series on `registry`. Fails if any name is already taken.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let latest_value = register_gauge_vec_with_registry!(
            "biosignal_latest_value",
            "Primary scalar of the latest measurement per domain",
            &["domain"],
            registry
        )?;

        let raw_value = register_gauge_vec_with_registry!(
            "biosignal_raw_value",
            "Raw sensor value behind the latest measurement per domain",
            &["domain"],
            registry
        )?;

        let measurements_total = register_int_counter_vec_with_registry!(
            "biosignal_measurements_total",
            "Measurements produced, by domain, category and confidence",
            &["domain", "category", "confidence"],
            registry
        )?;

        let saved_measurements = register_int_gauge_with_registry!(
            "biosignal_saved_measurements",
            "Records in the persisted measurement list",
            registry
        )?;

        let peak_sound_db = register_gauge_with_registry!(
            "biosignal_peak_sound_db",
            "Loudest saved sound record in dB",
            registry
        )?;

        let exposure_alerts_total = register_int_counter_with_registry!(
            "biosignal_exposure_alerts_total",
            "Saves that pushed the sound peak into the Very High band",
            registry
        )?;

        Ok(Self {
            registry: registry.clone(),
            latest_value,
            raw_value,
            measurements_total,
            saved_measurements,
            peak_sound_db,
            exposure_alerts_total,
        })
    }

    pub fn observe(&self, m: &Measurement) {
        let domain = m.domain().as_str();
        self.latest_value
            .with_label_values(&[domain])
            .set(m.score());
        self.raw_value
            .with_label_values(&[domain])
            .set(m.raw_value);
        self.measurements_total
            .with_label_values(&[domain, &*m.category().description, m.confidence_level.as_str()])
            .inc();
    }

    pub fn observe_store(&self, list: &[SavedMeasurement]) {
        self.saved_measurements.set(list.len() as i64);
        self.peak_sound_db.set(peak_sound_db(list).unwrap_or(0.0));
    }

    /// Prometheus text exposition of everything on the registry.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

pub fn peak_sound_db(list: &[SavedMeasurement]) -> Option<f64> {
    highest(list).and_then(|m| match &m.data.reading {
        Reading::Sound(r) => Some(r.db),
        _ => None,
    })
}
