//! Airflow Flower probe: the worker dashboard's JSON listing. One online
//! worker is enough to call the worker pool UP.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use healthwatch_common::httpx::{self, HttpClient};
use healthwatch_common::Result;

use crate::core::{PingStatus, Probe, ProbeCore, ProbeKind};

const REQUEST_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Deserialize)]
struct Worker {
    status: bool,
    hostname: String,
}

#[derive(Debug, Deserialize)]
struct FlowerResponse {
    #[serde(default)]
    data: Vec<Worker>,
}

pub struct AirflowFlowerProbe {
    core: ProbeCore,
    client: Option<HttpClient>,
    workers: Vec<String>,
}

impl AirflowFlowerProbe {
    pub fn new() -> Self {
        Self {
            core: ProbeCore::new(),
            client: None,
            workers: Vec::new(),
        }
    }
}

impl Default for AirflowFlowerProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for AirflowFlowerProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::AirflowFlower
    }

    fn core(&self) -> &ProbeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ProbeCore {
        &mut self.core
    }

    async fn connect(&mut self) -> Result<()> {
        debug!("connecting to airflow-flower server");
        self.client = Some(HttpClient::new(REQUEST_TIMEOUT_SECS)?);
        Ok(())
    }

    async fn ping(&mut self) -> PingStatus {
        let Some(client) = self.client.clone() else {
            return PingStatus::NotOk;
        };
        let url = format!("{}?json=1", self.url());

        let resp = match client.get(&url, &[]).await {
            Ok(resp) => resp,
            Err(e) => {
                self.set_message(&e.to_string());
                return PingStatus::NotOk;
            }
        };

        if !httpx::status_ok(&resp) {
            let detail = format!("airflow-flower ping status: {}", resp.status().as_u16());
            debug!("{detail}");
            self.set_message(&detail);
            return PingStatus::NotOk;
        }

        let body: FlowerResponse = match resp.json().await {
            Ok(body) => body,
            Err(e) => {
                self.set_message(&format!("cannot parse worker listing: {e}"));
                return PingStatus::NotOk;
            }
        };

        self.workers = body.data.iter().map(|w| w.hostname.clone()).collect();

        let mut any_online = false;
        for worker in &body.data {
            if worker.status {
                // one live worker means the pool can take tasks, offline
                // peers still get logged below
                any_online = true;
            } else {
                debug!("airflow worker {} is offline", worker.hostname);
            }
        }

        if !any_online {
            debug!("no available online worker");
            self.set_message("no available online worker");
            return PingStatus::NotOk;
        }

        PingStatus::Ok
    }
}
