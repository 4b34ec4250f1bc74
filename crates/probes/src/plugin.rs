//! Plugin probe: an out-of-process check.
//!
//! Instead of loading native code into the monitor, a plugin is any sidecar
//! process that speaks the agent envelope: `GET <url>/ping` returning
//! `{"success": bool, "message": string, ...}`. The sidecar decides what
//! healthy means; this probe only relays its verdict. The legacy
//! `pluginPath` config key is accepted and ignored.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use healthwatch_common::httpx::{self, HttpClient};
use healthwatch_common::Result;

use crate::core::{PingStatus, Probe, ProbeCore, ProbeKind};

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct PluginVerdict {
    success: bool,
    #[serde(default)]
    message: String,
}

pub struct PluginProbe {
    core: ProbeCore,
    client: Option<HttpClient>,
}

impl PluginProbe {
    pub fn new() -> Self {
        Self {
            core: ProbeCore::new(),
            client: None,
        }
    }
}

impl Default for PluginProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for PluginProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Plugin
    }

    fn core(&self) -> &ProbeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ProbeCore {
        &mut self.core
    }

    async fn connect(&mut self) -> Result<()> {
        debug!("connecting to plugin sidecar");
        self.client = Some(HttpClient::new(REQUEST_TIMEOUT_SECS)?);
        Ok(())
    }

    async fn ping(&mut self) -> PingStatus {
        let Some(client) = self.client.clone() else {
            return PingStatus::NotOk;
        };
        let url = format!("{}/ping", self.url());

        let resp = match client.get(&url, &[]).await {
            Ok(resp) => resp,
            Err(e) => {
                self.set_message(&e.to_string());
                return PingStatus::NotOk;
            }
        };

        if !httpx::status_ok(&resp) {
            self.set_message(&format!("plugin ping status: {}", resp.status().as_u16()));
            return PingStatus::NotOk;
        }

        let verdict: PluginVerdict = match resp.json().await {
            Ok(verdict) => verdict,
            Err(e) => {
                self.set_message(&format!("cannot parse plugin response: {e}"));
                return PingStatus::NotOk;
            }
        };

        if !verdict.message.is_empty() {
            self.set_message(&verdict.message);
        }

        if verdict.success {
            PingStatus::Ok
        } else {
            PingStatus::NotOk
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn probe_against(body: serde_json::Value) -> (PluginProbe, MockServer) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let mut probe = PluginProbe::new();
        probe.set_url(&server.uri());
        probe.connect().await.unwrap();
        (probe, server)
    }

    #[tokio::test]
    async fn test_successful_verdict_is_ok() {
        let (mut probe, _server) =
            probe_against(serde_json::json!({"success": true, "message": "all good"})).await;
        assert_eq!(probe.ping().await, PingStatus::Ok);
        assert_eq!(probe.message(), "all good");
    }

    #[tokio::test]
    async fn test_failed_verdict_is_not_ok() {
        let (mut probe, _server) =
            probe_against(serde_json::json!({"success": false, "message": "queue is stuck"}))
                .await;
        assert_eq!(probe.ping().await, PingStatus::NotOk);
        assert_eq!(probe.message(), "queue is stuck");
    }

    #[tokio::test]
    async fn test_sidecar_down_is_not_ok() {
        let mut probe = PluginProbe::new();
        probe.set_url("http://127.0.0.1:1");
        probe.connect().await.unwrap();
        assert_eq!(probe.ping().await, PingStatus::NotOk);
    }
}
