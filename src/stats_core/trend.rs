//! Fixed-length daily event counts

use super::event::{warn_malformed, CollisionEvent};
use chrono::{DateTime, Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TREND_DAYS: usize = 10;

/// Longest series `generate_trend` will build (about ten years)
pub const MAX_TREND_DAYS: usize = 3660;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Calendar day in the caller's zone, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,
    pub count: usize,
}

/// One entry per calendar day, oldest first, ending with `today`'s day
///
/// Days are local to `today`'s zone. Events outside the span are ignored.
/// `days` above [`MAX_TREND_DAYS`] is clamped; a span reaching past the
/// earliest representable date yields an empty series.
pub fn generate_trend<Tz: TimeZone>(
    events: &[CollisionEvent],
    days: usize,
    today: &DateTime<Tz>,
) -> Vec<TrendPoint> {
    if days == 0 {
        return Vec::new();
    }

    let days = if days > MAX_TREND_DAYS {
        log::warn!(
            "⚠️  Trend length {} exceeds {} days, clamping",
            days,
            MAX_TREND_DAYS
        );
        MAX_TREND_DAYS
    } else {
        days
    };

    let tz = today.timezone();
    let last = today.date_naive();
    let Some(first) = last.checked_sub_days(Days::new(days as u64 - 1)) else {
        log::warn!("⚠️  Trend span of {} days ending {} is out of range", days, last);
        return Vec::new();
    };

    let mut series: Vec<TrendPoint> = first
        .iter_days()
        .take(days)
        .map(|date| TrendPoint { date, count: 0 })
        .collect();

    for event in events {
        let Some(instant) = event.instant_in(&tz) else {
            warn_malformed(event, "trend");
            continue;
        };

        let date = instant.date_naive();
        if date < first || date > last {
            continue;
        }

        let index = (date - first).num_days() as usize;
        series[index].count += 1;
    }

    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc};

    fn event_at(timestamp: &str) -> CollisionEvent {
        CollisionEvent {
            timestamp: Some(timestamp.to_string()),
            ..Default::default()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_shape_and_dates() {
        let today = Utc.with_ymd_and_hms(2024, 3, 10, 16, 45, 0).unwrap();
        let series = generate_trend(&[], DEFAULT_TREND_DAYS, &today);

        assert_eq!(series.len(), 10);
        assert_eq!(series[9].date, date(2024, 3, 10));
        assert_eq!(series[0].date, date(2024, 3, 1));
        assert!(series.windows(2).all(|w| w[1].date - w[0].date == Duration::days(1)));
        assert!(series.iter().all(|p| p.count == 0));
    }

    #[test]
    fn test_single_day_bucket() {
        let today = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let events = vec![
            event_at("2024-03-07T00:00:00Z"),
            event_at("2024-03-07T12:30:00Z"),
            event_at("2024-03-07T23:59:59Z"),
        ];

        let series = generate_trend(&events, 10, &today);
        let non_zero: Vec<&TrendPoint> = series.iter().filter(|p| p.count > 0).collect();
        assert_eq!(non_zero.len(), 1);
        assert_eq!(non_zero[0].date, date(2024, 3, 7));
        assert_eq!(non_zero[0].count, 3);
    }

    #[test]
    fn test_out_of_span_events_ignored() {
        let today = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let events = vec![
            event_at("2024-02-29T23:59:59Z"),
            event_at("2024-03-01T00:00:00Z"),
            event_at("2024-03-10T23:59:59Z"),
            event_at("2024-03-11T00:00:00Z"),
            event_at("unparseable"),
        ];

        let series = generate_trend(&events, 10, &today);
        assert_eq!(series[0].count, 1);
        assert_eq!(series[9].count, 1);
        assert_eq!(series.iter().map(|p| p.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_days_follow_local_zone() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let today = tz.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        // 03:00 UTC on the 10th is still the 9th at -05:00
        let series = generate_trend(&[event_at("2024-03-10T03:00:00Z")], 3, &today);
        assert_eq!(series[1].date, date(2024, 3, 9));
        assert_eq!(series[1].count, 1);
        assert_eq!(series[2].count, 0);
    }

    #[test]
    fn test_zero_days() {
        let today = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        assert!(generate_trend(&[event_at("2024-03-10T01:00:00Z")], 0, &today).is_empty());
    }

    #[test]
    fn test_oversized_length_is_clamped() {
        let today = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let events = vec![event_at("2024-03-10T01:00:00Z")];

        for days in [MAX_TREND_DAYS + 1, 200_000_000, usize::MAX] {
            let series = generate_trend(&events, days, &today);
            assert_eq!(series.len(), MAX_TREND_DAYS);
            assert_eq!(series[MAX_TREND_DAYS - 1].date, date(2024, 3, 10));
            assert_eq!(series[MAX_TREND_DAYS - 1].count, 1);
        }
    }

    #[test]
    fn test_span_before_earliest_date_is_empty() {
        let earliest = Utc.from_utc_datetime(&NaiveDate::MIN.and_hms_opt(12, 0, 0).unwrap());
        assert!(generate_trend(&[], 5, &earliest).is_empty());
        assert_eq!(generate_trend(&[], 1, &earliest).len(), 1);
    }

    #[test]
    fn test_date_serializes_as_calendar_day() {
        let point = TrendPoint {
            date: date(2024, 3, 9),
            count: 4,
        };
        assert_eq!(
            serde_json::to_string(&point).unwrap(),
            r#"{"date":"2024-03-09","count":4}"#
        );
    }
}
