use crate::domain::MonitoringDomain;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown monitoring domain: {0}")]
    UnknownDomain(String),
    #[error("malformed {domain} measurement: {source}")]
    MalformedMeasurement {
        domain: MonitoringDomain,
        #[source]
        source: serde_json::Error,
    },
}
