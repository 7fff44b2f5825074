//! Relative time windows for event filtering

use super::event::{resolve_local, warn_malformed, CollisionEvent};
use chrono::{DateTime, Duration, Months, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
    /// Unbounded; selected by any unrecognized token
    All,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
            TimeRange::All => "all",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "day" => Some(TimeRange::Day),
            "week" => Some(TimeRange::Week),
            "month" => Some(TimeRange::Month),
            "year" => Some(TimeRange::Year),
            _ => None,
        }
    }

    /// Resolve a range token, treating anything unrecognized as unbounded
    pub fn from_token(token: &str) -> Self {
        Self::from_str(token).unwrap_or_else(|| {
            log::warn!("Unknown range token '{}', no time filtering applied", token);
            TimeRange::All
        })
    }

    pub fn all() -> [TimeRange; 4] {
        [
            TimeRange::Day,
            TimeRange::Week,
            TimeRange::Month,
            TimeRange::Year,
        ]
    }

    /// Earliest instant retained by this window, `None` when unbounded
    ///
    /// - `Day`: start of `now`'s calendar day in `now`'s zone
    /// - `Week`: exactly 7 × 24h before `now`
    /// - `Month`/`Year`: same wall-clock time 1/12 calendar months earlier,
    ///   clamped to the last day of a shorter target month (Mar 31 → Feb 29)
    pub fn cutoff<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = now.timezone();
        match self {
            TimeRange::Day => {
                let midnight = now.date_naive().and_time(NaiveTime::MIN);
                Some(resolve_local(&tz, &midnight))
            }
            TimeRange::Week => Some(now.clone() - Duration::days(7)),
            TimeRange::Month => months_before(now, 1),
            TimeRange::Year => months_before(now, 12),
            TimeRange::All => None,
        }
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::Day
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn months_before<Tz: TimeZone>(now: &DateTime<Tz>, months: u32) -> Option<DateTime<Tz>> {
    let shifted = now.naive_local().checked_sub_months(Months::new(months))?;
    Some(resolve_local(&now.timezone(), &shifted))
}

/// Events at or after the range cutoff, most recent first
///
/// Events without a usable timestamp are skipped. Equal timestamps keep their
/// input order.
pub fn filter_by_range<Tz: TimeZone>(
    events: &[CollisionEvent],
    range: TimeRange,
    now: &DateTime<Tz>,
) -> Vec<CollisionEvent> {
    let tz = now.timezone();
    let cutoff = range.cutoff(now);

    let mut kept: Vec<(DateTime<Tz>, &CollisionEvent)> = Vec::with_capacity(events.len());
    for event in events {
        let Some(instant) = event.instant_in(&tz) else {
            warn_malformed(event, "range filter");
            continue;
        };

        if cutoff.as_ref().map_or(true, |c| instant >= *c) {
            kept.push((instant, event));
        }
    }

    kept.sort_by(|a, b| b.0.cmp(&a.0));

    log::debug!(
        "Range '{}' kept {} of {} events",
        range,
        kept.len(),
        events.len()
    );

    kept.into_iter().map(|(_, event)| event.clone()).collect()
}
