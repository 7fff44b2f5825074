//! Severity and time-of-day bucketing

use super::event::{warn_malformed, CollisionEvent, Severity};
use chrono::{TimeZone, Timelike};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// 06:00 - 12:00
    Morning,
    /// 12:00 - 18:00
    Afternoon,
    /// 18:00 - 22:00
    Evening,
    /// 22:00 - 06:00
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            18..=21 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
        }
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDayCounts {
    pub morning: usize,
    pub afternoon: usize,
    pub evening: usize,
    pub night: usize,
}

impl TimeOfDayCounts {
    pub fn record(&mut self, bucket: TimeOfDay) {
        match bucket {
            TimeOfDay::Morning => self.morning += 1,
            TimeOfDay::Afternoon => self.afternoon += 1,
            TimeOfDay::Evening => self.evening += 1,
            TimeOfDay::Night => self.night += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.morning + self.afternoon + self.evening + self.night
    }
}

/// Severity and time-of-day summary of an event list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total: usize,
    pub by_severity: SeverityCounts,
    pub by_time_of_day: TimeOfDayCounts,
}

/// Overview restricted to accidents (critical and high severity)
///
/// `medium` and `low` are always zero; they stay in the shape consumers read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentStats {
    pub total_accidents: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub by_time_of_day: TimeOfDayCounts,
}

impl AccidentStats {
    /// Share of accidents in `count`, as a percentage string with two decimals
    pub fn share_of(&self, count: usize) -> String {
        if self.total_accidents == 0 {
            return "0.00%".to_string();
        }
        format!("{:.2}%", count as f64 / self.total_accidents as f64 * 100.0)
    }
}

/// Count events by severity and by local hour of their timestamp in `tz`
///
/// Events without a usable timestamp are skipped entirely, so
/// `total == by_time_of_day.total()`. Unknown severities still count toward
/// `total` but land in no severity bucket.
pub fn aggregate_overview<Tz: TimeZone>(events: &[CollisionEvent], tz: &Tz) -> Overview {
    let mut overview = Overview::default();

    for event in events {
        let Some(instant) = event.instant_in(tz) else {
            warn_malformed(event, "overview");
            continue;
        };

        overview.total += 1;
        if let Some(severity) = event.severity() {
            overview.by_severity.record(severity);
        }
        overview
            .by_time_of_day
            .record(TimeOfDay::from_hour(instant.hour()));
    }

    overview
}

/// Recompute the overview over the accident subset only
pub fn aggregate_accidents<Tz: TimeZone>(events: &[CollisionEvent], tz: &Tz) -> AccidentStats {
    let accidents: Vec<CollisionEvent> = events
        .iter()
        .filter(|e| e.is_accident())
        .cloned()
        .collect();

    let overview = aggregate_overview(&accidents, tz);

    AccidentStats {
        total_accidents: overview.total,
        critical: overview.by_severity.critical,
        high: overview.by_severity.high,
        medium: 0,
        low: 0,
        by_time_of_day: overview.by_time_of_day,
    }
}
