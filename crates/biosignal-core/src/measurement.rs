use crate::category::Category;
use crate::confidence::ConfidenceLevel;
use crate::domain::MonitoringDomain;
use crate::error::CoreError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// Readings keep `category` private so the only way to build one is through
// `classify`, which always picks the table entry for the score.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoundReading {
    #[serde(rename = "dB")]
    pub db: f64,
    category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardiacReading {
    pub heart_rate: i32,
    category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RespiratoryReading {
    pub breaths_per_minute: f64,
    category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TremorReading {
    pub intensity: f64,
    pub frequency: f64,
    category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GaitReading {
    pub steps_per_minute: f64,
    pub symmetry: f64,
    pub stability: f64,
    category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechReading {
    pub clarity: f64,
    pub volume: f64,
    pub rhythm: f64,
    category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reading {
    Sound(SoundReading),
    Cardiac(CardiacReading),
    Respiratory(RespiratoryReading),
    Tremor(TremorReading),
    Gait(GaitReading),
    Speech(SpeechReading),
}

impl Reading {
    pub fn domain(&self) -> MonitoringDomain {
        match self {
            Reading::Sound(_) => MonitoringDomain::Sound,
            Reading::Cardiac(_) => MonitoringDomain::Cardiac,
            Reading::Respiratory(_) => MonitoringDomain::Respiratory,
            Reading::Tremor(_) => MonitoringDomain::Tremor,
            Reading::Gait(_) => MonitoringDomain::Gait,
            Reading::Speech(_) => MonitoringDomain::Speech,
        }
    }

    pub fn category(&self) -> &Category {
        match self {
            Reading::Sound(r) => &r.category,
            Reading::Cardiac(r) => &r.category,
            Reading::Respiratory(r) => &r.category,
            Reading::Tremor(r) => &r.category,
            Reading::Gait(r) => &r.category,
            Reading::Speech(r) => &r.category,
        }
    }

    pub fn to_input(&self) -> RawInput {
        match self {
            Reading::Sound(r) => RawInput::Sound { db: r.db },
            Reading::Cardiac(r) => RawInput::Cardiac {
                heart_rate: r.heart_rate,
            },
            Reading::Respiratory(r) => RawInput::Respiratory {
                breaths_per_minute: r.breaths_per_minute,
            },
            Reading::Tremor(r) => RawInput::Tremor {
                intensity: r.intensity,
                frequency: r.frequency,
            },
            Reading::Gait(r) => RawInput::Gait {
                steps_per_minute: r.steps_per_minute,
                symmetry: r.symmetry,
                stability: r.stability,
            },
            Reading::Speech(r) => RawInput::Speech {
                clarity: r.clarity,
                volume: r.volume,
                rhythm: r.rhythm,
            },
        }
    }

    /// The scalar the category was looked up with.
    pub fn score(&self) -> f64 {
        self.to_input().score()
    }
}

/// Raw scalars for one sample, tagged by domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    Sound {
        db: f64,
    },
    Cardiac {
        heart_rate: i32,
    },
    Respiratory {
        breaths_per_minute: f64,
    },
    Tremor {
        intensity: f64,
        frequency: f64,
    },
    Gait {
        steps_per_minute: f64,
        symmetry: f64,
        stability: f64,
    },
    Speech {
        clarity: f64,
        volume: f64,
        rhythm: f64,
    },
}

pub fn gait_score(symmetry: f64, stability: f64) -> f64 {
    (symmetry + stability) / 2.0
}

pub fn speech_score(clarity: f64, volume: f64, rhythm: f64) -> f64 {
    clarity * 0.5 + volume * 0.2 + rhythm * 0.3
}

impl RawInput {
    pub fn domain(&self) -> MonitoringDomain {
        match self {
            RawInput::Sound { .. } => MonitoringDomain::Sound,
            RawInput::Cardiac { .. } => MonitoringDomain::Cardiac,
            RawInput::Respiratory { .. } => MonitoringDomain::Respiratory,
            RawInput::Tremor { .. } => MonitoringDomain::Tremor,
            RawInput::Gait { .. } => MonitoringDomain::Gait,
            RawInput::Speech { .. } => MonitoringDomain::Speech,
        }
    }

    pub fn score(&self) -> f64 {
        match *self {
            RawInput::Sound { db } => db,
            RawInput::Cardiac { heart_rate } => f64::from(heart_rate),
            RawInput::Respiratory { breaths_per_minute } => breaths_per_minute,
            RawInput::Tremor { intensity, .. } => intensity,
            RawInput::Gait {
                symmetry,
                stability,
                ..
            } => gait_score(symmetry, stability),
            RawInput::Speech {
                clarity,
                volume,
                rhythm,
            } => speech_score(clarity, volume, rhythm),
        }
    }
}

/// Total over all inputs: out-of-range values are classified, never rejected.
pub fn classify(input: &RawInput) -> Reading {
    let category = input.domain().table().lookup(input.score()).clone();
    match *input {
        RawInput::Sound { db } => Reading::Sound(SoundReading { db, category }),
        RawInput::Cardiac { heart_rate } => Reading::Cardiac(CardiacReading {
            heart_rate,
            category,
        }),
        RawInput::Respiratory { breaths_per_minute } => {
            Reading::Respiratory(RespiratoryReading {
                breaths_per_minute,
                category,
            })
        }
        RawInput::Tremor {
            intensity,
            frequency,
        } => Reading::Tremor(TremorReading {
            intensity,
            frequency,
            category,
        }),
        RawInput::Gait {
            steps_per_minute,
            symmetry,
            stability,
        } => Reading::Gait(GaitReading {
            steps_per_minute,
            symmetry,
            stability,
            category,
        }),
        RawInput::Speech {
            clarity,
            volume,
            rhythm,
        } => Reading::Speech(SpeechReading {
            clarity,
            volume,
            rhythm,
            category,
        }),
    }
}

/// A classified sample as produced by a monitor session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    /// Epoch millis at acquisition.
    pub timestamp: i64,
    pub confidence_level: ConfidenceLevel,
    pub raw_value: f64,
    #[serde(flatten)]
    pub reading: Reading,
}

impl Measurement {
    pub fn new(
        input: RawInput,
        raw_value: f64,
        confidence_level: ConfidenceLevel,
        timestamp: i64,
    ) -> Self {
        Self {
            timestamp,
            confidence_level,
            raw_value,
            reading: classify(&input),
        }
    }

    pub fn domain(&self) -> MonitoringDomain {
        self.reading.domain()
    }

    pub fn category(&self) -> &Category {
        self.reading.category()
    }

    pub fn score(&self) -> f64 {
        self.reading.score()
    }

    /// Decodes a stored payload for `domain`. Any stored category is ignored
    /// and re-derived from the scalars; missing base fields take defaults and
    /// `rawValue` falls back to the score.
    pub fn from_json(domain: MonitoringDomain, value: serde_json::Value) -> Result<Self, CoreError> {
        let malformed = |source| CoreError::MalformedMeasurement { domain, source };
        let input = match domain {
            MonitoringDomain::Sound => {
                let w: Wire<SoundFields> = serde_json::from_value(value).map_err(malformed)?;
                w.map(|f| RawInput::Sound { db: f.db })
            }
            MonitoringDomain::Cardiac => {
                let w: Wire<CardiacFields> = serde_json::from_value(value).map_err(malformed)?;
                w.map(|f| RawInput::Cardiac {
                    heart_rate: f.heart_rate,
                })
            }
            MonitoringDomain::Respiratory => {
                let w: Wire<RespiratoryFields> =
                    serde_json::from_value(value).map_err(malformed)?;
                w.map(|f| RawInput::Respiratory {
                    breaths_per_minute: f.breaths_per_minute,
                })
            }
            MonitoringDomain::Tremor => {
                let w: Wire<TremorFields> = serde_json::from_value(value).map_err(malformed)?;
                w.map(|f| RawInput::Tremor {
                    intensity: f.intensity,
                    frequency: f.frequency,
                })
            }
            MonitoringDomain::Gait => {
                let w: Wire<GaitFields> = serde_json::from_value(value).map_err(malformed)?;
                w.map(|f| RawInput::Gait {
                    steps_per_minute: f.steps_per_minute,
                    symmetry: f.symmetry,
                    stability: f.stability,
                })
            }
            MonitoringDomain::Speech => {
                let w: Wire<SpeechFields> = serde_json::from_value(value).map_err(malformed)?;
                w.map(|f| RawInput::Speech {
                    clarity: f.clarity,
                    volume: f.volume,
                    rhythm: f.rhythm,
                })
            }
        };
        Ok(input)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Wire<T> {
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    confidence_level: ConfidenceLevel,
    #[serde(default)]
    raw_value: Option<f64>,
    #[serde(flatten)]
    fields: T,
}

impl<T: DeserializeOwned> Wire<T> {
    fn map(self, to_input: impl FnOnce(T) -> RawInput) -> Measurement {
        let input = to_input(self.fields);
        let raw_value = self.raw_value.unwrap_or_else(|| input.score());
        Measurement::new(input, raw_value, self.confidence_level, self.timestamp)
    }
}

#[derive(Deserialize)]
struct SoundFields {
    #[serde(rename = "dB")]
    db: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardiacFields {
    heart_rate: i32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RespiratoryFields {
    breaths_per_minute: f64,
}

#[derive(Deserialize)]
struct TremorFields {
    intensity: f64,
    frequency: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GaitFields {
    steps_per_minute: f64,
    symmetry: f64,
    stability: f64,
}

#[derive(Deserialize)]
struct SpeechFields {
    clarity: f64,
    volume: f64,
    rhythm: f64,
}
