//! Web probe: HTTP GET with a 5s timeout; any 2xx response is UP.

use async_trait::async_trait;
use tracing::debug;

use healthwatch_common::httpx::{self, HttpClient};
use healthwatch_common::Result;

use crate::core::{PingStatus, Probe, ProbeCore, ProbeKind};

const REQUEST_TIMEOUT_SECS: u64 = 5;

pub struct WebProbe {
    core: ProbeCore,
    client: Option<HttpClient>,
}

impl WebProbe {
    pub fn new() -> Self {
        Self {
            core: ProbeCore::new(),
            client: None,
        }
    }
}

impl Default for WebProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for WebProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Web
    }

    fn core(&self) -> &ProbeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ProbeCore {
        &mut self.core
    }

    async fn connect(&mut self) -> Result<()> {
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
                let detail = e.to_string();
                debug!("web ping error: {detail}");
                self.set_message(&detail);
                return PingStatus::NotOk;
            }
        };

        if !httpx::status_ok(&resp) {
            let detail = format!("web ping status: {}", resp.status().as_u16());
            debug!("{detail}");
            self.set_message(&detail);
            return PingStatus::NotOk;
        }

        debug!("web ping status: {}", resp.status().as_u16());
        PingStatus::Ok
    }
}
