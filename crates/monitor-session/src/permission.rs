use async_trait::async_trait;
use biosignal_core::MonitoringDomain;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The OS resource a session holds while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorResource {
    Microphone,
    Camera,
    Motion,
}

impl SensorResource {
    pub fn for_domain(domain: MonitoringDomain) -> Self {
        match domain {
            MonitoringDomain::Sound | MonitoringDomain::Respiratory | MonitoringDomain::Speech => {
                SensorResource::Microphone
            }
            MonitoringDomain::Cardiac => SensorResource::Camera,
            MonitoringDomain::Tremor | MonitoringDomain::Gait => SensorResource::Motion,
        }
    }

    pub fn requires_permission(self) -> bool {
        !matches!(self, SensorResource::Motion)
    }
}

impl fmt::Display for SensorResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SensorResource::Microphone => "microphone",
            SensorResource::Camera => "camera",
            SensorResource::Motion => "motion",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Asks the platform for access to a sensor. May suspend on a user prompt.
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    async fn request(&self, resource: SensorResource) -> PermissionStatus;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysGrant;

#[async_trait]
impl PermissionProvider for AlwaysGrant {
    async fn request(&self, _resource: SensorResource) -> PermissionStatus {
        PermissionStatus::Granted
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

#[async_trait]
impl PermissionProvider for DenyAll {
    async fn request(&self, _resource: SensorResource) -> PermissionStatus {
        PermissionStatus::Denied
    }
}
