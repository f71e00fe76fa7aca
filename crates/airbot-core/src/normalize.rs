//! Converts raw readings into the canonical per-room view model.
//!
//! Two input shapes exist: the previous reading plus a random drift (the
//! self-contained variant) and a raw record from the upstream sensor
//! service (the proxying variant). Both end up in the same [`RoomReading`].

use chrono::{DateTime, NaiveDateTime};
use rand::Rng;
use serde::Deserialize;

use crate::model::{AirQuality, RoomReading};

/// Round to one decimal place, the dashboard's display precision.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Map a raw air-quality score (0..100, higher is worse) onto the three
/// dashboard categories.
pub fn categorize(score: f64) -> AirQuality {
    if score >= 70.0 {
        AirQuality::Bad
    } else if score >= 40.0 {
        AirQuality::Normal
    } else {
        AirQuality::Good
    }
}

/// Parse an upstream `last_updated` string into epoch seconds.
///
/// Accepts RFC 3339 as well as a naive `YYYY-MM-DDTHH:MM:SS` (taken as
/// UTC). Anything unparsable yields 0 so one bad record never fails a
/// whole batch.
pub fn parse_last_updated(raw: &str) -> i64 {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.and_utc().timestamp();
    }
    tracing::debug!(raw, "unparsable last_updated, defaulting to 0");
    0
}

/// Display name for a room id. Ids outside the table pass through as
/// their own name.
pub fn room_name(id: &str) -> String {
    match id {
        "ROOM1" => "방 1",
        "ROOM2" => "방 2",
        "ROOM3" => "방 3",
        "LIVING" => "거실",
        other => other,
    }
    .to_string()
}

/// Synthetic score matching a seeded category, used to initialize the
/// mock drift so the first poll does not jump categories.
pub fn initial_score(air: AirQuality) -> f64 {
    match air {
        AirQuality::Good => 20.0,
        AirQuality::Normal => 55.0,
        AirQuality::Bad => 85.0,
    }
}

/// Per-poll drift amplitudes for the mock variant.
#[derive(Debug, Clone, Copy)]
pub struct Drift {
    pub temp: f64,
    pub humidity: f64,
    pub score: f64,
}

impl Default for Drift {
    fn default() -> Self {
        Self {
            temp: 0.3,
            humidity: 1.0,
            score: 6.0,
        }
    }
}

fn delta<R: Rng + ?Sized>(rng: &mut R, magnitude: f64) -> f64 {
    if magnitude == 0.0 {
        0.0
    } else {
        rng.gen_range(-magnitude..=magnitude)
    }
}

/// Mock-perturbation mode: nudge the previous reading by a uniform random
/// delta per field and stamp it with `now`.
///
/// The air category is derived from a synthetic score that drifts within
/// 0..100 and goes through [`categorize`], so the label tracks an actual
/// signal instead of flipping independently of the numbers. Returns the
/// new reading together with the new score.
pub fn perturb<R: Rng + ?Sized>(
    reading: &RoomReading,
    score: f64,
    rng: &mut R,
    drift: &Drift,
    now: i64,
) -> (RoomReading, f64) {
    let score = (score + delta(rng, drift.score)).clamp(0.0, 100.0);
    let next = RoomReading {
        name: reading.name.clone(),
        temp: round1(reading.temp + delta(rng, drift.temp)),
        humidity: round1(reading.humidity + delta(rng, drift.humidity)),
        air: categorize(score),
        updated_at: now,
    };
    (next, score)
}

/// One record of the upstream `GET /api/sensors` payload. Every field
/// beyond the id is optional; missing pieces fall back to defaults during
/// normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorRecord {
    pub sensor_id: String,
    #[serde(default)]
    pub last_data: Option<SensorData>,
    #[serde(default)]
    pub air_quality_score: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SensorData {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
}

/// Upstream-normalization mode: turn a raw sensor record into the room id
/// and its canonical reading. Never fails; missing fields default.
pub fn normalize_sensor(record: SensorRecord) -> (String, RoomReading) {
    let data = record.last_data.unwrap_or_default();
    let reading = RoomReading {
        name: room_name(&record.sensor_id),
        temp: round1(data.temperature.unwrap_or(0.0)),
        humidity: round1(data.humidity.unwrap_or(0.0)),
        air: categorize(record.air_quality_score.unwrap_or(0.0)),
        updated_at: record
            .last_updated
            .as_deref()
            .map_or(0, parse_last_updated),
    };
    (record.sensor_id, reading)
}
