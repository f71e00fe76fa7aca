use std::time::Duration;

use airbot_core::normalize::SensorRecord;
use anyhow::{Context, Result};
use reqwest::Client;

use crate::types::SensorsEnvelope;

/// HTTP client for the upstream sensor service. One bounded-timeout
/// request per poll, no retry; the caller decides how a failure degrades.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    base: String,
}

impl UpstreamClient {
    pub fn new(base: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build upstream http client")?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    pub fn sensors_url(&self) -> String {
        format!("{}/api/sensors", self.base)
    }

    pub async fn fetch_sensors(&self) -> Result<Vec<SensorRecord>> {
        let response = self
            .client
            .get(self.sensors_url())
            .send()
            .await
            .context("upstream request failed")?
            .error_for_status()
            .context("upstream returned error status")?;
        let envelope: SensorsEnvelope = response
            .json()
            .await
            .context("decode upstream sensors payload")?;
        Ok(envelope.sensors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensors_url_tolerates_trailing_slash() {
        let client = UpstreamClient::new("http://pi:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.sensors_url(), "http://pi:5000/api/sensors");
    }
}
