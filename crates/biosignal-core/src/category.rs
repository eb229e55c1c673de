use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A labelled severity bucket. Table entries borrow static strings; values
/// read back from storage own theirs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub description: Cow<'static, str>,
    pub color: Cow<'static, str>,
    pub action: Cow<'static, str>,
}

impl Category {
    pub const fn new(description: &'static str, color: &'static str, action: &'static str) -> Self {
        Self {
            description: Cow::Borrowed(description),
            color: Cow::Borrowed(color),
            action: Cow::Borrowed(action),
        }
    }

    /// Description up to the first `" - "`, e.g. `"Normal"` for
    /// `"Normal - Safe for hearing"`.
    pub fn label(&self) -> &str {
        self.description
            .split(" - ")
            .next()
            .unwrap_or(&self.description)
    }
}

/// How a score is compared against a tier bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundRule {
    /// `score <= bound`
    AtMost,
    /// `score < bound`
    Below,
    /// `score > bound`
    Above,
}

impl BoundRule {
    pub fn admits(self, score: f64, bound: f64) -> bool {
        match self {
            BoundRule::AtMost => score <= bound,
            BoundRule::Below => score < bound,
            BoundRule::Above => score > bound,
        }
    }
}

#[derive(Debug)]
pub struct ThresholdTable {
    pub rule: BoundRule,
    pub tiers: &'static [(f64, Category)],
    pub fallback: Category,
}

impl ThresholdTable {
    /// First tier whose bound admits `score`, else the catch-all. NaN admits
    /// nothing and lands on the catch-all.
    pub fn lookup(&self, score: f64) -> &Category {
        self.tiers
            .iter()
            .find(|(bound, _)| self.rule.admits(score, *bound))
            .map(|(_, category)| category)
            .unwrap_or(&self.fallback)
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.tiers
            .iter()
            .map(|(_, category)| category)
            .chain(std::iter::once(&self.fallback))
    }

    pub fn contains(&self, category: &Category) -> bool {
        self.categories().any(|c| c == category)
    }
}

/// Approximate dB from a normalized recording amplitude. Uncalibrated:
/// 0 maps to silence, 1 to 120 dB.
pub fn amplitude_to_decibels(amplitude: f64) -> f64 {
    amplitude.clamp(0.0, 1.0) * 120.0
}

pub mod sound {
    use super::Category;

    pub const NORMAL: Category = Category::new(
        "Normal - Safe for hearing",
        "#4CAF50",
        "No action needed.",
    );
    pub const MODERATE: Category = Category::new(
        "Moderate - Extended exposure may cause damage",
        "#FFC107",
        "Consider limiting exposure to less than 8 hours.",
    );
    pub const HIGH: Category = Category::new(
        "High - Damage possible with extended exposure",
        "#FF9800",
        "Limit exposure to less than 1 hour. Consider ear protection.",
    );
    pub const VERY_HIGH: Category = Category::new(
        "Very High - Hearing damage likely",
        "#F44336",
        "Limit exposure to less than 15 minutes. Wear ear protection.",
    );
    pub const DANGEROUS: Category = Category::new(
        "Dangerous - Immediate hearing damage risk",
        "#9C27B0",
        "Avoid exposure or use strong ear protection immediately.",
    );
}

pub mod cardiac {
    use super::Category;

    pub const RESTING: Category = Category::new(
        "Resting Heart Rate",
        "#4CAF50",
        "Normal resting heart rate.",
    );
    pub const LIGHT_ACTIVITY: Category = Category::new(
        "Light Activity Heart Rate",
        "#8BC34A",
        "Heart rate indicates light physical activity.",
    );
    pub const MODERATE: Category = Category::new(
        "Moderate Activity Heart Rate",
        "#FFC107",
        "Heart rate indicates moderate exertion.",
    );
    pub const VIGOROUS: Category = Category::new(
        "Vigorous Activity Heart Rate",
        "#FF9800",
        "Heart rate indicates vigorous exercise.",
    );
    pub const ELEVATED: Category = Category::new(
        "Elevated Heart Rate",
        "#F44336",
        "Heart rate is elevated. Consider resting if not exercising.",
    );
}

pub mod respiratory {
    use super::Category;

    pub const NORMAL: Category = Category::new(
        "Normal Breathing Rate",
        "#4CAF50",
        "Breathing rate is within normal range.",
    );
    pub const ELEVATED: Category = Category::new(
        "Elevated Breathing Rate",
        "#FFC107",
        "Breathing rate is slightly elevated.",
    );
    pub const HIGH: Category = Category::new(
        "High Breathing Rate",
        "#FF9800",
        "Breathing rate is high. Consider resting or breathing exercises.",
    );
    pub const RAPID: Category = Category::new(
        "Rapid Breathing",
        "#F44336",
        "Breathing is rapid. If not exercising, consider medical attention.",
    );
}

pub mod tremor {
    use super::Category;

    pub const MINIMAL: Category = Category::new(
        "Minimal Tremor",
        "#4CAF50",
        "Tremor levels are minimal.",
    );
    pub const MILD: Category = Category::new(
        "Mild Tremor",
        "#FFC107",
        "Mild tremor detected. Consider tracking over time.",
    );
    pub const MODERATE: Category = Category::new(
        "Moderate Tremor",
        "#FF9800",
        "Moderate tremor detected. Consider consulting a healthcare provider.",
    );
    pub const SEVERE: Category = Category::new(
        "Severe Tremor",
        "#F44336",
        "Severe tremor detected. Recommend healthcare consultation.",
    );
}

pub mod gait {
    use super::Category;

    pub const NORMAL: Category = Category::new(
        "Normal Gait Pattern",
        "#4CAF50",
        "Walking pattern appears normal.",
    );
    pub const MILD_ASYMMETRY: Category = Category::new(
        "Mild Gait Asymmetry",
        "#8BC34A",
        "Minor asymmetry in walking pattern detected.",
    );
    pub const MODERATE_ASYMMETRY: Category = Category::new(
        "Moderate Gait Asymmetry",
        "#FFC107",
        "Moderate asymmetry in walking pattern. Consider physical therapy consultation.",
    );
    pub const UNSTABLE: Category = Category::new(
        "Unstable Gait",
        "#F44336",
        "Walking pattern shows significant instability. Consider medical evaluation.",
    );
}

pub mod speech {
    use super::Category;

    pub const CLEAR: Category = Category::new(
        "Clear Speech",
        "#4CAF50",
        "Speech pattern is clear and well-articulated.",
    );
    pub const MINOR_ISSUES: Category = Category::new(
        "Minor Speech Issues",
        "#8BC34A",
        "Minor issues in speech clarity or rhythm detected.",
    );
    pub const MODERATE_ISSUES: Category = Category::new(
        "Moderate Speech Issues",
        "#FFC107",
        "Moderate issues in speech pattern. Consider speech exercises.",
    );
    pub const SIGNIFICANT_ISSUES: Category = Category::new(
        "Significant Speech Issues",
        "#F44336",
        "Significant speech pattern issues detected. Consider speech therapy evaluation.",
    );
}

pub static SOUND_TABLE: ThresholdTable = ThresholdTable {
    rule: BoundRule::AtMost,
    tiers: &[
        (70.0, sound::NORMAL),
        (85.0, sound::MODERATE),
        (95.0, sound::HIGH),
        (110.0, sound::VERY_HIGH),
    ],
    fallback: sound::DANGEROUS,
};

pub static CARDIAC_TABLE: ThresholdTable = ThresholdTable {
    rule: BoundRule::Below,
    tiers: &[
        (60.0, cardiac::RESTING),
        (100.0, cardiac::LIGHT_ACTIVITY),
        (140.0, cardiac::MODERATE),
        (170.0, cardiac::VIGOROUS),
    ],
    fallback: cardiac::ELEVATED,
};

// Both of the first two tiers map to NORMAL; kept that way on purpose until
// the low-rate band gets its own category.
pub static RESPIRATORY_TABLE: ThresholdTable = ThresholdTable {
    rule: BoundRule::Below,
    tiers: &[
        (12.0, respiratory::NORMAL),
        (20.0, respiratory::NORMAL),
        (30.0, respiratory::ELEVATED),
        (40.0, respiratory::HIGH),
    ],
    fallback: respiratory::RAPID,
};

pub static TREMOR_TABLE: ThresholdTable = ThresholdTable {
    rule: BoundRule::Below,
    tiers: &[
        (0.02, tremor::MINIMAL),
        (0.05, tremor::MILD),
        (0.1, tremor::MODERATE),
    ],
    fallback: tremor::SEVERE,
};

pub static GAIT_TABLE: ThresholdTable = ThresholdTable {
    rule: BoundRule::Above,
    tiers: &[
        (0.85, gait::NORMAL),
        (0.7, gait::MILD_ASYMMETRY),
        (0.5, gait::MODERATE_ASYMMETRY),
    ],
    fallback: gait::UNSTABLE,
};

pub static SPEECH_TABLE: ThresholdTable = ThresholdTable {
    rule: BoundRule::Above,
    tiers: &[
        (0.8, speech::CLEAR),
        (0.65, speech::MINOR_ISSUES),
        (0.5, speech::MODERATE_ISSUES),
    ],
    fallback: speech::SIGNIFICANT_ISSUES,
};
