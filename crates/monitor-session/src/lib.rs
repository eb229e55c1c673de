//! Acquisition sessions: a sample source polled on a fixed cadence, each
//! sample classified and scored for confidence, delivered in order on a
//! channel until cancelled.

pub mod error;
pub mod manager;
pub mod permission;
pub mod session;
pub mod simulated;
pub mod source;
#[cfg(test)]
mod tests;

pub use error::SessionError;
pub use manager::SessionManager;
pub use permission::{AlwaysGrant, DenyAll, PermissionProvider, PermissionStatus, SensorResource};
pub use session::{CancelHandle, MeasurementStream, MonitorSession, SessionConfig, SessionId};
pub use simulated::SimulatedSources;
pub use source::{RawSample, Sample, SampleSource, SourceProvider};
