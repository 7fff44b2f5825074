//! Collision event records as produced by the ingestion path
//!
//! Every optional field resolves through one tagged default so that all
//! aggregators agree on what "absent" means:
//! - severity: absent, unrecognized or not a string → `None` (not counted in severity buckets)
//! - object type: absent or empty → [`UNKNOWN_OBJECT_TYPE`]
//! - confidence: absent or not a number → [`DEFAULT_CONFIDENCE`]
//! - timestamp: absent or unparseable → `None` (record cannot be bucketed)
//!
//! A field of the wrong JSON type degrades to its default instead of
//! rejecting the whole record.

use chrono::{DateTime, NaiveDateTime, TimeZone};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Bucket key for objects without a usable type
pub const UNKNOWN_OBJECT_TYPE: &str = "unknown";

/// Confidence assumed when a detector omitted the score
pub const DEFAULT_CONFIDENCE: f64 = 0.0;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    /// Exact, case-sensitive match against the four known tiers
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            _ => None,
        }
    }

    /// Critical and high severity events count as accidents
    pub fn is_accident(&self) -> bool {
        matches!(self, Severity::Critical | Severity::High)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceStatus {
    Critical,
    Warning,
    Ok,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub object_type: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl DetectedObject {
    /// Type used as a bucket key
    pub fn type_key(&self) -> &str {
        match self.object_type.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => UNKNOWN_OBJECT_TYPE,
        }
    }

    pub fn confidence_or_default(&self) -> f64 {
        self.confidence.unwrap_or(DEFAULT_CONFIDENCE)
    }
}

/// Pairwise distance between two detected objects of the same event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceMeasurement {
    pub object_id1: String,
    pub object_id2: String,
    pub distance: f64,
    pub status: DistanceStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionEvent {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: Location,
    #[serde(default, deserialize_with = "null_as_default")]
    pub objects: Vec<DetectedObject>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub distances: Vec<DistanceMeasurement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<serde_json::Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any value that does not fit `T` reads as `None`
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

impl CollisionEvent {
    /// Parse a single event from one JSON document (one JSONL line)
    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Known severity tier, `None` when absent or unrecognized
    pub fn severity(&self) -> Option<Severity> {
        self.severity.as_deref().and_then(Severity::from_str)
    }

    pub fn is_accident(&self) -> bool {
        self.severity().map_or(false, |s| s.is_accident())
    }

    /// Event instant expressed in `tz`
    ///
    /// Timestamps without an offset are read as wall-clock time in `tz`.
    pub fn instant_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        parse_timestamp(self.timestamp.as_deref()?, tz)
    }

    pub fn object_by_id(&self, id: &str) -> Option<&DetectedObject> {
        self.objects.iter().find(|o| o.id.as_deref() == Some(id))
    }

    /// Human readable row for a distance measurement, e.g. `vehicle to pedestrian: 3.2m`
    pub fn describe_distance(&self, distance: &DistanceMeasurement) -> String {
        let first = self
            .object_by_id(&distance.object_id1)
            .and_then(|o| o.object_type.as_deref())
            .unwrap_or("Object 1");
        let second = self
            .object_by_id(&distance.object_id2)
            .and_then(|o| o.object_type.as_deref())
            .unwrap_or("Object 2");

        format!("{} to {}: {:.1}m", first, second, distance.distance)
    }
}

/// Parse an RFC 3339 instant, falling back to offset-less wall-clock formats in `tz`
pub fn parse_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(tz));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| resolve_local(tz, &naive))
}

/// Warn about a record that cannot be placed on the time axis
pub(crate) fn warn_malformed(event: &CollisionEvent, stage: &str) {
    log::warn!(
        "⚠️  Skipping event {} in {}: missing or unparseable timestamp {:?}",
        event.id().unwrap_or("<no id>"),
        stage,
        event.timestamp
    );
}

/// Map a wall-clock time onto `tz`
///
/// Ambiguous times take the earlier instant; times inside a DST gap are read as UTC.
pub(crate) fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: &NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(naive))
}
