pub mod category;
pub mod confidence;
pub mod domain;
pub mod error;
pub mod measurement;

pub use category::{amplitude_to_decibels, BoundRule, Category, ThresholdTable};
pub use confidence::{estimate_confidence, ConfidenceLevel, ConfidencePolicy, RecentWindow};
pub use domain::MonitoringDomain;
pub use error::CoreError;
pub use measurement::{
    classify, gait_score, speech_score, CardiacReading, GaitReading, Measurement, RawInput,
    Reading, RespiratoryReading, SoundReading, SpeechReading, TremorReading,
};
