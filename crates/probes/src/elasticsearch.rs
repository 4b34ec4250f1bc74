//! Elasticsearch probe: the cluster health endpoint reports a `status`
//! color; `green` and `yellow` count as UP.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use healthwatch_common::httpx::{self, HttpClient};
use healthwatch_common::Result;

use crate::core::{PingStatus, Probe, ProbeCore, ProbeKind};

const REQUEST_TIMEOUT_SECS: u64 = 5;

pub struct ElasticsearchProbe {
    core: ProbeCore,
    client: Option<HttpClient>,
}

impl ElasticsearchProbe {
    pub fn new() -> Self {
        Self {
            core: ProbeCore::new(),
            client: None,
        }
    }
}

impl Default for ElasticsearchProbe {
    fn default() -> Self {
        Self::new()
    }
}

/// `green` and `yellow` clusters serve traffic; anything else is unhealthy.
fn cluster_healthy(status: &str) -> bool {
    status == "green" || status == "yellow"
}

#[async_trait]
impl Probe for ElasticsearchProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Elasticsearch
    }

    fn core(&self) -> &ProbeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ProbeCore {
        &mut self.core
    }

    async fn connect(&mut self) -> Result<()> {
        debug!("connecting to elasticsearch server");
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
            let detail = format!("elasticsearch ping status: {}", resp.status().as_u16());
            debug!("{detail}");
            self.set_message(&detail);
            return PingStatus::NotOk;
        }

        let body: Value = match resp.json().await {
            Ok(body) => body,
            Err(e) => {
                self.set_message(&format!("cannot parse cluster status: {e}"));
                return PingStatus::NotOk;
            }
        };

        let Some(status) = body.get("status").and_then(Value::as_str) else {
            self.set_message("cluster status missing from response");
            return PingStatus::NotOk;
        };

        if !cluster_healthy(status) {
            let detail = format!("elasticsearch cluster is unhealthy: {status}");
            debug!("{detail}");
            self.set_message(&detail);
            return PingStatus::NotOk;
        }

        debug!("elasticsearch cluster status: {status}");
        PingStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn probe_against(body: serde_json::Value) -> (ElasticsearchProbe, MockServer) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let mut probe = ElasticsearchProbe::new();
        probe.set_url(&server.uri());
        probe.connect().await.unwrap();
        (probe, server)
    }

    #[test]
    fn test_cluster_health_colors() {
        assert!(cluster_healthy("green"));
        assert!(cluster_healthy("yellow"));
        assert!(!cluster_healthy("red"));
        assert!(!cluster_healthy(""));
    }

    #[tokio::test]
    async fn test_yellow_cluster_is_ok() {
        let (mut probe, _server) =
            probe_against(serde_json::json!({"status": "yellow", "number_of_nodes": 3})).await;
        assert_eq!(probe.ping().await, PingStatus::Ok);
    }

    #[tokio::test]
    async fn test_red_cluster_is_not_ok() {
        let (mut probe, _server) = probe_against(serde_json::json!({"status": "red"})).await;
        assert_eq!(probe.ping().await, PingStatus::NotOk);
        assert_eq!(probe.message(), "elasticsearch cluster is unhealthy: red");
    }

    #[tokio::test]
    async fn test_missing_status_is_not_ok() {
        let (mut probe, _server) = probe_against(serde_json::json!({"ok": true})).await;
        assert_eq!(probe.ping().await, PingStatus::NotOk);
    }
}
