//! Kafka probe.
//!
//! Dials the first broker of the comma-separated host list, with SASL PLAIN
//! derived from the URL userinfo when present. Each tick fetches cluster
//! metadata; the cluster is DOWN when the fetch fails or when it reports
//! fewer brokers than the configured list names.
//!
//! `broker_size` counts the URL's host tokens, not the replication factor:
//! pointing a single bootstrap URL at a multi-broker cluster disables the
//! shrunken-cluster detection. librdkafka re-establishes broken connections
//! on its own, so there is no explicit redial path here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rdkafka::ClientConfig;
use rdkafka::consumer::BaseConsumer;
use tracing::debug;

use healthwatch_common::error::Error;
use healthwatch_common::urlutil;
use healthwatch_common::Result;

use crate::core::{PingStatus, Probe, ProbeCore, ProbeKind};

const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

pub struct KafkaProbe {
    core: ProbeCore,
    broker_size: usize,
    consumer: Option<Arc<BaseConsumer>>,
}

impl KafkaProbe {
    pub fn new() -> Self {
        Self {
            core: ProbeCore::new(),
            broker_size: 0,
            consumer: None,
        }
    }

    /// Expected broker count for a broker URL: one per host token.
    pub fn broker_size_of(url: &str) -> Result<usize> {
        let authority = urlutil::parse_authority(url)?;
        Ok(authority.host_list().len())
    }
}

impl Default for KafkaProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for KafkaProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Kafka
    }

    fn core(&self) -> &ProbeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ProbeCore {
        &mut self.core
    }

    async fn connect(&mut self) -> Result<()> {
        debug!("connecting to kafka server");

        let authority = urlutil::parse_authority(self.url())?;
        let hosts = authority.host_list();
        let bootstrap = hosts
            .first()
            .map(|h| h.to_string())
            .ok_or_else(|| Error::Url(format!("kafka url has no broker host: {}", self.url())))?;

        self.broker_size = hosts.len();

        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &bootstrap)
            .set("client.id", "healthwatch")
            .set("socket.timeout.ms", "10000");

        if let (Some(username), Some(password)) = (&authority.username, &authority.password) {
            config
                .set("security.protocol", "sasl_plaintext")
                .set("sasl.mechanisms", "PLAIN")
                .set("sasl.username", username)
                .set("sasl.password", password);
        }

        let consumer: BaseConsumer = config
            .create()
            .map_err(|e| Error::Connect(format!("kafka: {e}")))?;
        self.consumer = Some(Arc::new(consumer));

        debug!("connecting to kafka server succeed");
        Ok(())
    }

    async fn ping(&mut self) -> PingStatus {
        let Some(consumer) = self.consumer.clone() else {
            return PingStatus::NotOk;
        };

        // metadata fetch is blocking in librdkafka
        let fetched = tokio::task::spawn_blocking(move || {
            use rdkafka::consumer::Consumer;
            consumer
                .fetch_metadata(None, METADATA_TIMEOUT)
                .map(|metadata| metadata.brokers().len())
        })
        .await;

        let broker_count = match fetched {
            Ok(Ok(count)) => count,
            Ok(Err(e)) => {
                debug!("kafka error read available brokers: {e}");
                self.set_message(&e.to_string());
                return PingStatus::NotOk;
            }
            Err(e) => {
                self.set_message(&format!("kafka metadata task failed: {e}"));
                return PingStatus::NotOk;
            }
        };

        debug!(
            "kafka brokers: {broker_count}, expected at least {}",
            self.broker_size
        );

        // fewer live brokers than configured means the cluster is degraded
        if broker_count < self.broker_size {
            self.set_message(&format!(
                "kafka cluster reports {broker_count} of {} brokers",
                self.broker_size
            ));
            return PingStatus::NotOk;
        }

        PingStatus::Ok
    }

    async fn close(&mut self) -> Result<()> {
        debug!("closing kafka connection");
        self.consumer = None;
        Ok(())
    }
}
