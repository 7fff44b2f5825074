//! Statistics facade over an event repository
//!
//! Each call takes one snapshot from the repository and runs the pure
//! aggregators on it. Nothing is cached between calls.

use super::event::{CollisionEvent, Location};
use super::objects::{aggregate_objects, count_object_types, ObjectStats};
use super::overview::{
    aggregate_accidents, aggregate_overview, AccidentStats, SeverityCounts, TimeOfDayCounts,
};
use super::trend::{generate_trend, TrendPoint, DEFAULT_TREND_DAYS};
use super::window::{filter_by_range, TimeRange};
use crate::store::{EventRepository, StoreError};
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::collections::BTreeMap;

/// Combined dashboard statistics for one range
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStatistics {
    pub total: usize,
    pub by_severity: SeverityCounts,
    pub by_time_of_day: TimeOfDayCounts,
    pub object_types: BTreeMap<String, usize>,
    /// Always empty; no location clustering is computed
    pub location_clusters: Vec<Location>,
    pub recent_trend: Vec<TrendPoint>,
}

/// Everything the statistics panels render, computed from one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub range: TimeRange,
    pub generated_at: String,
    pub statistics: EventStatistics,
    pub objects: ObjectStats,
    pub accidents: AccidentStats,
}

pub struct StatsEngine<R: EventRepository> {
    repository: R,
    trend_days: usize,
}

impl<R: EventRepository> StatsEngine<R> {
    pub fn new(repository: R) -> Self {
        Self::with_trend_days(repository, DEFAULT_TREND_DAYS)
    }

    pub fn with_trend_days(repository: R, trend_days: usize) -> Self {
        Self {
            repository,
            trend_days,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn trend_days(&self) -> usize {
        self.trend_days
    }

    /// Events inside `range`, newest first
    pub async fn latest_events<Tz: TimeZone>(
        &self,
        range: TimeRange,
        now: &DateTime<Tz>,
    ) -> Result<Vec<CollisionEvent>, StoreError> {
        let events = self.repository.get_all().await?;
        Ok(filter_by_range(&events, range, now))
    }

    pub async fn event_by_id(&self, id: &str) -> Result<CollisionEvent, StoreError> {
        self.repository
            .get_all()
            .await?
            .into_iter()
            .find(|e| e.id() == Some(id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    pub async fn event_statistics<Tz: TimeZone>(
        &self,
        range: TimeRange,
        now: &DateTime<Tz>,
    ) -> Result<EventStatistics, StoreError> {
        let events = self.latest_events(range, now).await?;
        Ok(self.statistics_for(&events, now))
    }

    pub async fn object_detection_stats<Tz: TimeZone>(
        &self,
        range: TimeRange,
        now: &DateTime<Tz>,
    ) -> Result<ObjectStats, StoreError> {
        let events = self.latest_events(range, now).await?;
        Ok(aggregate_objects(&events))
    }

    pub async fn accident_stats<Tz: TimeZone>(
        &self,
        range: TimeRange,
        now: &DateTime<Tz>,
    ) -> Result<AccidentStats, StoreError> {
        let events = self.latest_events(range, now).await?;
        Ok(aggregate_accidents(&events, &now.timezone()))
    }

    /// All panel views from a single repository read
    pub async fn report<Tz: TimeZone>(
        &self,
        range: TimeRange,
        now: &DateTime<Tz>,
    ) -> Result<StatsReport, StoreError> {
        let events = self.latest_events(range, now).await?;

        let report = StatsReport {
            range,
            generated_at: now.fixed_offset().to_rfc3339(),
            statistics: self.statistics_for(&events, now),
            objects: aggregate_objects(&events),
            accidents: aggregate_accidents(&events, &now.timezone()),
        };

        log::info!(
            "📊 Report [{}]: {} events, {} objects, {} accidents",
            range,
            report.statistics.total,
            report.objects.total_objects,
            report.accidents.total_accidents
        );

        Ok(report)
    }

    pub async fn add_event(&self, event: CollisionEvent) -> Result<CollisionEvent, StoreError> {
        let stored = self.repository.append(event).await?;
        log::info!(
            "➕ Added event {} via {}",
            stored.id().unwrap_or_default(),
            self.repository.backend_type()
        );
        Ok(stored)
    }

    fn statistics_for<Tz: TimeZone>(
        &self,
        events: &[CollisionEvent],
        now: &DateTime<Tz>,
    ) -> EventStatistics {
        let overview = aggregate_overview(events, &now.timezone());

        EventStatistics {
            total: overview.total,
            by_severity: overview.by_severity,
            by_time_of_day: overview.by_time_of_day,
            object_types: count_object_types(events),
            location_clusters: Vec::new(),
            recent_trend: generate_trend(events, self.trend_days, now),
        }
    }
}
