//! Disk-status probe: asks the remote disk agent for the usage of a
//! filesystem and compares it against the configured threshold.
//!
//! The scan timeout is generous (the agent may be probing slow volumes) and
//! the message always names the agent host's IPv4 so an alert identifies
//! the machine, not just the service name.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use healthwatch_common::httpx::{self, HttpClient};
use healthwatch_common::urlutil;
use healthwatch_common::Result;
use healthwatch_config::value_as_f64;

use crate::core::{PingStatus, Probe, ProbeCore, ProbeKind};

const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Deserialize)]
struct AgentResponse {
    #[allow(dead_code)]
    success: bool,
    #[allow(dead_code)]
    message: String,
    #[serde(default)]
    data: Value,
}

pub struct DiskStatusProbe {
    core: ProbeCore,
    client: Option<HttpClient>,
}

impl DiskStatusProbe {
    pub fn new() -> Self {
        Self {
            core: ProbeCore::new(),
            client: None,
        }
    }

    /// Resolve the agent URL's hostname to an IPv4 for the alert message.
    async fn resolve_ipv4(&self) -> String {
        let Ok(authority) = urlutil::parse_authority(self.url()) else {
            return "unresolved".to_string();
        };

        let host = authority
            .host_list()
            .first()
            .map(|h| h.split(':').next().unwrap_or(h).to_string())
            .unwrap_or_default();

        match tokio::net::lookup_host((host.as_str(), 0)).await {
            Ok(addrs) => addrs
                .filter(|a| a.is_ipv4())
                .map(|a| a.ip().to_string())
                .next()
                .unwrap_or_else(|| "unresolved".to_string()),
            Err(_) => "unresolved".to_string(),
        }
    }
}

/// Exceeding (or reaching) the threshold trips the alert.
pub fn threshold_exceeded(disk_used: f64, threshold: f64) -> bool {
    disk_used >= threshold
}

impl Default for DiskStatusProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for DiskStatusProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::DiskStatus
    }

    fn core(&self) -> &ProbeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ProbeCore {
        &mut self.core
    }

    async fn connect(&mut self) -> Result<()> {
        debug!("connecting to disk agent");
        self.client = Some(HttpClient::new(REQUEST_TIMEOUT_SECS)?);
        Ok(())
    }

    async fn ping(&mut self) -> PingStatus {
        let Some(client) = self.client.clone() else {
            return PingStatus::NotOk;
        };

        let file_system = self
            .config()
            .get_str("fileSystem")
            .unwrap_or("/")
            .to_string();
        let threshold = self.config().get_f64("thresholdDiskUsage").unwrap_or(0.0);
        let url = format!("{}/check-disk", self.url());

        let body = serde_json::json!({"path": file_system});
        let resp = match client
            .post_json(&url, &body, &[("Content-Type", "application/json")])
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                self.set_message(&e.to_string());
                return PingStatus::NotOk;
            }
        };

        if !httpx::status_ok(&resp) {
            let detail = format!("disk agent status: {}", resp.status().as_u16());
            debug!("{detail}");
            self.set_message(&detail);
            return PingStatus::NotOk;
        }

        let parsed: AgentResponse = match resp.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                self.set_message(&format!("cannot parse disk agent response: {e}"));
                return PingStatus::NotOk;
            }
        };

        let disk_used = parsed
            .data
            .get("diskUsed")
            .map(value_as_f64)
            .unwrap_or(0.0);
        let filesystem = parsed
            .data
            .get("filesystem")
            .and_then(Value::as_str)
            .unwrap_or(&file_system)
            .to_string();

        debug!("threshold disk usage: {threshold}, disk used: {disk_used}, file system: {filesystem}");

        let ip = self.resolve_ipv4().await;

        if threshold_exceeded(disk_used, threshold) {
            self.set_message(&format!(
                "disk used exceeds the threshold\nip: {ip}\nthreshold: {}%\ndisk used: {}%\nfile system: {filesystem}",
                threshold as i64, disk_used as i64
            ));
            return PingStatus::NotOk;
        }

        self.set_message(&format!(
            "disk usage is below the threshold\nip: {ip}\nthreshold: {}%\ndisk used: {}%\nfile system: {filesystem}",
            threshold as i64, disk_used as i64
        ));
        PingStatus::Ok
    }
}
