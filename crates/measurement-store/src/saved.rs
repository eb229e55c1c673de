use biosignal_core::{CoreError, Measurement, MonitoringDomain};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// A user-saved, geotagged snapshot of one measurement. Persisted as
/// `{ type, location, timestamp, data }`; the `type` tag is always derived
/// from `data`, so the two cannot disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "SavedWire", try_from = "SavedWire")]
pub struct SavedMeasurement {
    pub location: GeoLocation,
    pub timestamp: DateTime<Utc>,
    pub data: Measurement,
}

impl SavedMeasurement {
    pub fn new(data: Measurement, location: GeoLocation, timestamp: DateTime<Utc>) -> Self {
        Self {
            location,
            timestamp,
            data,
        }
    }

    pub fn now(data: Measurement, location: GeoLocation) -> Self {
        Self::new(data, location, Utc::now())
    }

    pub fn kind(&self) -> MonitoringDomain {
        self.data.domain()
    }
}

#[derive(Serialize, Deserialize)]
struct SavedWire {
    #[serde(rename = "type")]
    kind: MonitoringDomain,
    location: GeoLocation,
    timestamp: DateTime<Utc>,
    data: serde_json::Value,
}

impl From<SavedMeasurement> for SavedWire {
    fn from(saved: SavedMeasurement) -> Self {
        Self {
            kind: saved.kind(),
            location: saved.location,
            timestamp: saved.timestamp,
            data: serde_json::to_value(&saved.data).unwrap_or(serde_json::Value::Null),
        }
    }
}

impl TryFrom<SavedWire> for SavedMeasurement {
    type Error = CoreError;

    fn try_from(wire: SavedWire) -> Result<Self, Self::Error> {
        Ok(Self {
            location: wire.location,
            timestamp: wire.timestamp,
            data: Measurement::from_json(wire.kind, wire.data)?,
        })
    }
}
