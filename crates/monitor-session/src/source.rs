use crate::error::SessionError;
use crate::permission::SensorResource;
use biosignal_core::{MonitoringDomain, RawInput};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub input: RawInput,
    pub raw_value: f64,
}

/// One poll of a source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    /// The source is still buffering; the raw value still feeds the
    /// confidence window.
    Warming(f64),
    Ready(RawSample),
}

pub trait SampleSource: Send {
    fn domain(&self) -> MonitoringDomain;

    /// `now_ms` is the session clock in epoch millis.
    fn next_sample(&mut self, now_ms: i64) -> Sample;

    /// Releases the underlying sensor handle. Called once when the session ends.
    fn close(&mut self) {}

    fn resource(&self) -> SensorResource {
        SensorResource::for_domain(self.domain())
    }
}

pub trait SourceProvider: Send + Sync {
    fn open(&self, domain: MonitoringDomain) -> Result<Box<dyn SampleSource>, SessionError>;
}
