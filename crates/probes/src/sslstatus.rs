//! SSL status probe: scans the configured `domains` list and reports a
//! per-domain expiry line. Any Warning/Danger/Critical line makes the tick
//! `NOT_OK`; the full report is always the probe message, so the dashboard
//! shows it on every tick.

use async_trait::async_trait;
use tracing::debug;

use crate::core::{PingStatus, Probe, ProbeCore, ProbeKind};
use crate::sslcheck;

pub struct SslStatusProbe {
    core: ProbeCore,
}

impl SslStatusProbe {
    pub fn new() -> Self {
        Self {
            core: ProbeCore::new(),
        }
    }

    fn configured_domains(&self) -> Option<Vec<String>> {
        let domains = self
            .config()
            .get_list("domains")?
            .iter()
            .filter_map(|d| d.as_str().map(str::to_string))
            .collect();
        Some(domains)
    }
}

impl Default for SslStatusProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for SslStatusProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::SslStatus
    }

    fn core(&self) -> &ProbeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ProbeCore {
        &mut self.core
    }

    async fn ping(&mut self) -> PingStatus {
        let Some(domains) = self.configured_domains() else {
            debug!("domains is not in the sslstatus config");
            self.set_message("domains is not in the sslstatus config");
            return PingStatus::NotOk;
        };

        let report = sslcheck::check_ssl_expiry_multi(&domains).await;
        self.set_message(&report);

        if sslcheck::contains_severity(&report) {
            return PingStatus::NotOk;
        }

        PingStatus::Ok
    }
}
