//! Read-side helpers over an in-memory list. All linear scans; the list is
//! bounded by manual save actions.

use crate::saved::SavedMeasurement;
use biosignal_core::MonitoringDomain;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Records of `domain` whose primary scalar is at least `min`. For sound the
/// scalar is dB; gait and speech use their combined score.
pub fn filter_by_min_threshold(
    list: &[SavedMeasurement],
    domain: MonitoringDomain,
    min: f64,
) -> Vec<SavedMeasurement> {
    list.iter()
        .filter(|m| m.kind() == domain && m.data.score() >= min)
        .cloned()
        .collect()
}

/// Inclusive on both ends.
pub fn filter_by_date_range(
    list: &[SavedMeasurement],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<SavedMeasurement> {
    list.iter()
        .filter(|m| m.timestamp >= start && m.timestamp <= end)
        .cloned()
        .collect()
}

/// Groups by category name: the short label for sound (`"Normal"`), the full
/// description elsewhere.
pub fn group_by_category(list: &[SavedMeasurement]) -> BTreeMap<String, Vec<SavedMeasurement>> {
    let mut grouped: BTreeMap<String, Vec<SavedMeasurement>> = BTreeMap::new();
    for m in list {
        let category = m.data.category();
        let name = match m.kind() {
            MonitoringDomain::Sound => category.label().to_string(),
            _ => category.description.to_string(),
        };
        grouped.entry(name).or_default().push(m.clone());
    }
    grouped
}

/// Loudest sound record; the earliest one wins a tie.
pub fn highest(list: &[SavedMeasurement]) -> Option<&SavedMeasurement> {
    highest_for(list, MonitoringDomain::Sound)
}

pub fn highest_for(list: &[SavedMeasurement], domain: MonitoringDomain) -> Option<&SavedMeasurement> {
    list.iter()
        .filter(|m| m.kind() == domain)
        .fold(None, |best: Option<&SavedMeasurement>, m| match best {
            Some(b) if m.data.score() > b.data.score() => Some(m),
            Some(b) => Some(b),
            None => Some(m),
        })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreSummary {
    pub total: usize,
    pub per_domain: BTreeMap<MonitoringDomain, usize>,
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
}

pub fn summarize(list: &[SavedMeasurement]) -> StoreSummary {
    let mut summary = StoreSummary {
        total: list.len(),
        ..StoreSummary::default()
    };
    for m in list {
        *summary.per_domain.entry(m.kind()).or_insert(0) += 1;
        summary.first = Some(summary.first.map_or(m.timestamp, |t| t.min(m.timestamp)));
        summary.last = Some(summary.last.map_or(m.timestamp, |t| t.max(m.timestamp)));
    }
    summary
}
