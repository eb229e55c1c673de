use crate::category::{self, ThresholdTable};
use crate::confidence::ConfidencePolicy;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The six measurement domains a monitor can run in. The lowercase name is
/// also the `type` tag of a persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitoringDomain {
    Sound,
    Cardiac,
    Respiratory,
    Tremor,
    Gait,
    Speech,
}

impl MonitoringDomain {
    pub const ALL: [MonitoringDomain; 6] = [
        MonitoringDomain::Sound,
        MonitoringDomain::Cardiac,
        MonitoringDomain::Respiratory,
        MonitoringDomain::Tremor,
        MonitoringDomain::Gait,
        MonitoringDomain::Speech,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MonitoringDomain::Sound => "sound",
            MonitoringDomain::Cardiac => "cardiac",
            MonitoringDomain::Respiratory => "respiratory",
            MonitoringDomain::Tremor => "tremor",
            MonitoringDomain::Gait => "gait",
            MonitoringDomain::Speech => "speech",
        }
    }

    pub fn table(self) -> &'static ThresholdTable {
        match self {
            MonitoringDomain::Sound => &category::SOUND_TABLE,
            MonitoringDomain::Cardiac => &category::CARDIAC_TABLE,
            MonitoringDomain::Respiratory => &category::RESPIRATORY_TABLE,
            MonitoringDomain::Tremor => &category::TREMOR_TABLE,
            MonitoringDomain::Gait => &category::GAIT_TABLE,
            MonitoringDomain::Speech => &category::SPEECH_TABLE,
        }
    }

    /// Sound judges spread in absolute dB; every other domain judges it
    /// relative to the window mean.
    pub fn confidence_policy(self) -> ConfidencePolicy {
        match self {
            MonitoringDomain::Sound => ConfidencePolicy::AbsoluteStdDev,
            _ => ConfidencePolicy::RelativeStdDev,
        }
    }

    pub fn default_window(self) -> usize {
        10
    }

    pub fn default_interval_ms(self) -> u64 {
        match self {
            MonitoringDomain::Sound => 100,
            MonitoringDomain::Cardiac => 1000,
            MonitoringDomain::Respiratory => 1000,
            MonitoringDomain::Tremor => 100,
            MonitoringDomain::Gait => 100,
            MonitoringDomain::Speech => 500,
        }
    }
}

impl fmt::Display for MonitoringDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MonitoringDomain {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        MonitoringDomain::ALL
            .into_iter()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| CoreError::UnknownDomain(s.to_string()))
    }
}
