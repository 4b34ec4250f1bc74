//! Airflow probe: the control plane's health endpoint reports scheduler and
//! metadatabase status. Both must be `healthy` for UP, and the message is
//! always a multi-line summary so the dashboard sees the latest heartbeat
//! on every tick.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use healthwatch_common::httpx::{self, HttpClient};
use healthwatch_common::timeutil;
use healthwatch_common::Result;

use crate::core::{PingStatus, Probe, ProbeCore, ProbeKind};

const REQUEST_TIMEOUT_SECS: u64 = 5;
const HEALTHY: &str = "healthy";

pub struct AirflowProbe {
    core: ProbeCore,
    client: Option<HttpClient>,
    scheduler_status: String,
    metadatabase_status: String,
}

impl AirflowProbe {
    pub fn new() -> Self {
        Self {
            core: ProbeCore::new(),
            client: None,
            scheduler_status: String::new(),
            metadatabase_status: String::new(),
        }
    }

    /// Pull scheduler/metadatabase status out of the health payload and
    /// build the per-tick summary. Errors describe the missing field.
    fn summarize(&mut self, body: &Value) -> std::result::Result<String, String> {
        let scheduler = body
            .get("scheduler")
            .ok_or("cannot read scheduler status")?;
        let scheduler_status = scheduler
            .get("status")
            .and_then(Value::as_str)
            .ok_or("cannot read scheduler status")?;
        let heartbeat = scheduler
            .get("latest_scheduler_heartbeat")
            .and_then(Value::as_str)
            .ok_or("cannot read latest scheduler heartbeat")?;
        let metadatabase_status = body
            .get("metadatabase")
            .and_then(|m| m.get("status"))
            .and_then(Value::as_str)
            .ok_or("cannot read metadatabase status")?;

        self.scheduler_status = scheduler_status.to_string();
        self.metadatabase_status = metadatabase_status.to_string();

        let tz = timeutil::parse_tz(self.config().get_str("timezone"));
        let rendered_heartbeat = timeutil::render_in_tz(heartbeat, tz);

        Ok(format!(
            "scheduler status: {scheduler_status}\nmetadatabase status: {metadatabase_status}\nlatest scheduler heartbeat: {rendered_heartbeat}"
        ))
    }
}

impl Default for AirflowProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for AirflowProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Airflow
    }

    fn core(&self) -> &ProbeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ProbeCore {
        &mut self.core
    }

    async fn connect(&mut self) -> Result<()> {
        debug!("connecting to airflow server");
        self.client = Some(HttpClient::new(REQUEST_TIMEOUT_SECS)?);
        Ok(())
    }

    async fn ping(&mut self) -> PingStatus {
        let Some(client) = self.client.clone() else {
            return PingStatus::NotOk;
        };
        let url = self.url().to_string();

        let resp = match client.get(&url, &[]).await {
            Ok(resp) => resp,
            Err(e) => {
                self.set_message(&e.to_string());
                return PingStatus::NotOk;
            }
        };

        if !httpx::status_ok(&resp) {
            let detail = format!("airflow ping status: {}", resp.status().as_u16());
            debug!("{detail}");
            self.set_message(&detail);
            return PingStatus::NotOk;
        }

        let body: Value = match resp.json().await {
            Ok(body) => body,
            Err(e) => {
                self.set_message(&format!("cannot parse health response: {e}"));
                return PingStatus::NotOk;
            }
        };

        let summary = match self.summarize(&body) {
            Ok(summary) => summary,
            Err(e) => {
                self.set_message(&e);
                return PingStatus::NotOk;
            }
        };
        self.set_message(&summary);

        if self.scheduler_status != HEALTHY || self.metadatabase_status != HEALTHY {
            debug!(
                "airflow is unhealthy: scheduler ({}), metadatabase ({})",
                self.scheduler_status, self.metadatabase_status
            );
            return PingStatus::NotOk;
        }

        debug!(
            "airflow: scheduler ({}), metadatabase ({})",
            self.scheduler_status, self.metadatabase_status
        );
        PingStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthwatch_config::Config;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn health_body(scheduler: &str, metadatabase: &str) -> Value {
        serde_json::json!({
            "scheduler": {
                "status": scheduler,
                "latest_scheduler_heartbeat": "2026-03-01T10:00:00.000000+00:00"
            },
            "metadatabase": {"status": metadatabase}
        })
    }

    async fn probe_against(body: Value, tz: Option<&str>) -> (AirflowProbe, MockServer) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let mut probe = AirflowProbe::new();
        probe.set_url(&server.uri());
        if let Some(tz) = tz {
            let raw = format!(r#"{{"timezone": "{tz}"}}"#);
            probe.set_config(Config::from_reader(raw.as_bytes()).unwrap());
        }
        probe.connect().await.unwrap();
        (probe, server)
    }

    #[tokio::test]
    async fn test_healthy_cluster_is_ok_and_message_is_summary() {
        let (mut probe, _server) = probe_against(health_body("healthy", "healthy"), None).await;
        assert_eq!(probe.ping().await, PingStatus::Ok);

        let msg = probe.message().to_string();
        assert!(msg.contains("scheduler status: healthy"));
        assert!(msg.contains("metadatabase status: healthy"));
        assert!(msg.contains("latest scheduler heartbeat: 2026-03-01 10:00:00 UTC"));
    }

    #[tokio::test]
    async fn test_heartbeat_rendered_in_configured_timezone() {
        let (mut probe, _server) =
            probe_against(health_body("healthy", "healthy"), Some("Asia/Jakarta")).await;
        probe.ping().await;
        assert!(probe.message().contains("2026-03-01 17:00:00 WIB"));
    }

    #[tokio::test]
    async fn test_unhealthy_scheduler_is_down_with_summary() {
        let (mut probe, _server) = probe_against(health_body("unhealthy", "healthy"), None).await;
        assert_eq!(probe.ping().await, PingStatus::NotOk);
        assert!(probe.message().contains("scheduler status: unhealthy"));
    }

    #[tokio::test]
    async fn test_missing_field_is_down() {
        let (mut probe, _server) =
            probe_against(serde_json::json!({"scheduler": {"status": "healthy"}}), None).await;
        assert_eq!(probe.ping().await, PingStatus::NotOk);
        assert_eq!(probe.message(), "cannot read latest scheduler heartbeat");
    }
}
