use airbot_core::normalize::SensorRecord;
use serde::Deserialize;

/// Envelope of the upstream `GET /api/sensors` response.
#[derive(Debug, Deserialize)]
pub struct SensorsEnvelope {
    #[serde(default)]
    pub sensors: Vec<SensorRecord>,
}
