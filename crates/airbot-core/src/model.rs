use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Air-quality category shown on the dashboard. The wire labels are the
/// Korean strings the page renders and matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AirQuality {
    #[serde(rename = "좋음")]
    Good,
    #[serde(rename = "보통")]
    Normal,
    #[serde(rename = "나쁨")]
    Bad,
}

/// Latest known reading for a single room. The room id is the key of the
/// surrounding [`RoomMap`], so serializing the map yields the `/api/rooms`
/// response as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomReading {
    pub name: String,
    pub temp: f64,
    pub humidity: f64,
    pub air: AirQuality,
    /// Unix timestamp in seconds; 0 means never updated.
    pub updated_at: i64,
}

pub type RoomMap = HashMap<String, RoomReading>;

/// Placeholder readings the self-contained variant starts from.
pub fn seed_rooms() -> RoomMap {
    fn reading(name: &str, temp: f64, humidity: f64, air: AirQuality) -> RoomReading {
        RoomReading {
            name: name.to_string(),
            temp,
            humidity,
            air,
            updated_at: 0,
        }
    }

    RoomMap::from([
        ("ROOM1".to_string(), reading("방 1", 24.0, 40.0, AirQuality::Good)),
        ("ROOM2".to_string(), reading("방 2", 25.0, 42.0, AirQuality::Normal)),
        ("ROOM3".to_string(), reading("방 3", 23.5, 38.0, AirQuality::Good)),
        ("LIVING".to_string(), reading("거실", 26.0, 45.0, AirQuality::Bad)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_quality_uses_dashboard_labels() {
        assert_eq!(serde_json::to_string(&AirQuality::Good).unwrap(), "\"좋음\"");
        assert_eq!(serde_json::to_string(&AirQuality::Normal).unwrap(), "\"보통\"");
        assert_eq!(serde_json::to_string(&AirQuality::Bad).unwrap(), "\"나쁨\"");

        let parsed: AirQuality = serde_json::from_str("\"나쁨\"").unwrap();
        assert_eq!(parsed, AirQuality::Bad);
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert!(serde_json::from_str::<AirQuality>("\"fine\"").is_err());
    }

    #[test]
    fn seed_rooms_start_never_updated() {
        let rooms = seed_rooms();
        assert_eq!(rooms.len(), 4);
        assert!(rooms.values().all(|r| r.updated_at == 0));
        assert_eq!(rooms["LIVING"].name, "거실");
    }
}
