use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        }
    }
}

/// How spread in the recent window maps to a confidence level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidencePolicy {
    /// Standard deviation in the raw unit: `<2` high, `<5` medium.
    AbsoluteStdDev,
    /// Standard deviation over `max(|mean|, 0.1)`: `<0.05` high, `<0.15` medium.
    RelativeStdDev,
}

pub const MIN_HISTORY: usize = 3;

/// Confidence from the recent window. Fewer than three values is always
/// `Low`. `_current` does not enter the computation.
pub fn estimate_confidence(policy: ConfidencePolicy, _current: f64, recent: &[f64]) -> ConfidenceLevel {
    estimate_from(policy, recent.iter())
}

fn estimate_from<'a, I>(policy: ConfidencePolicy, values: I) -> ConfidenceLevel
where
    I: Iterator<Item = &'a f64> + Clone,
{
    let Some((mean, std_dev)) = mean_and_std_dev(values) else {
        return ConfidenceLevel::Low;
    };

    let (spread, high, medium) = match policy {
        ConfidencePolicy::AbsoluteStdDev => (std_dev, 2.0, 5.0),
        ConfidencePolicy::RelativeStdDev => (std_dev / mean.abs().max(0.1), 0.05, 0.15),
    };

    if spread < high {
        ConfidenceLevel::High
    } else if spread < medium {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

/// Mean and population standard deviation, or `None` below `MIN_HISTORY`.
fn mean_and_std_dev<'a, I>(values: I) -> Option<(f64, f64)>
where
    I: Iterator<Item = &'a f64> + Clone,
{
    let n = values.clone().count();
    if n < MIN_HISTORY {
        return None;
    }
    let n = n as f64;
    let mean = values.clone().sum::<f64>() / n;
    let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

/// Bounded FIFO of the most recent raw values of one session.
#[derive(Debug, Clone)]
pub struct RecentWindow {
    capacity: usize,
    values: VecDeque<f64>,
}

impl RecentWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &f64> + Clone {
        self.values.iter()
    }

    pub fn estimate(&self, policy: ConfidencePolicy, _current: f64) -> ConfidenceLevel {
        estimate_from(policy, self.values.iter())
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
