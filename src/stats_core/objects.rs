//! Detected-object type and confidence breakdown

use super::event::{CollisionEvent, DetectedObject};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const HIGH_CONFIDENCE: f64 = 0.85;
pub const MEDIUM_CONFIDENCE: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// Scores are not range-checked; NaN and negatives fall to `Low`, values above 1 to `High`
    pub fn from_score(confidence: f64) -> Self {
        if confidence >= HIGH_CONFIDENCE {
            ConfidenceTier::High
        } else if confidence >= MEDIUM_CONFIDENCE {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl ConfidenceCounts {
    pub fn record(&mut self, tier: ConfidenceTier) {
        match tier {
            ConfidenceTier::High => self.high += 1,
            ConfidenceTier::Medium => self.medium += 1,
            ConfidenceTier::Low => self.low += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStats {
    pub total_objects: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_confidence: ConfidenceCounts,
}

impl ObjectStats {
    /// Share of all detected objects, in percent
    pub fn percentage(&self, count: usize) -> f64 {
        if self.total_objects == 0 {
            return 0.0;
        }
        count as f64 / self.total_objects as f64 * 100.0
    }

    /// `percentage` rounded to one decimal for display
    pub fn format_percentage(&self, count: usize) -> String {
        format!("{:.1}", self.percentage(count))
    }

    /// Types ordered by descending count, ties by name
    pub fn ranked_types(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .by_type
            .iter()
            .map(|(t, count)| (t.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

/// Per-type object counts across all events
pub fn count_object_types(events: &[CollisionEvent]) -> BTreeMap<String, usize> {
    let mut by_type = BTreeMap::new();
    for object in flatten_objects(events) {
        *by_type.entry(object.type_key().to_string()).or_insert(0) += 1;
    }
    by_type
}

/// Type and confidence tier breakdown of every object in every event
pub fn aggregate_objects(events: &[CollisionEvent]) -> ObjectStats {
    let mut stats = ObjectStats::default();

    for object in flatten_objects(events) {
        stats.total_objects += 1;
        *stats.by_type.entry(object.type_key().to_string()).or_insert(0) += 1;
        stats
            .by_confidence
            .record(ConfidenceTier::from_score(object.confidence_or_default()));
    }

    log::debug!(
        "Aggregated {} objects across {} events ({} types)",
        stats.total_objects,
        events.len(),
        stats.by_type.len()
    );

    stats
}

fn flatten_objects(events: &[CollisionEvent]) -> impl Iterator<Item = &DetectedObject> {
    events.iter().flat_map(|e| e.objects.iter())
}
