use crate::permission::SensorResource;
use biosignal_core::MonitoringDomain;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0} permission not granted")]
    PermissionDenied(SensorResource),
    #[error("sample source for {domain} unavailable: {reason}")]
    Source {
        domain: MonitoringDomain,
        reason: String,
    },
}
