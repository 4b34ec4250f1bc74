//! MongoDB probe: official driver with 4s connect and server-selection
//! timeouts; each tick runs the `ping` admin command.

use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::Client;
use tracing::debug;

use healthwatch_common::error::Error;
use healthwatch_common::Result;

use crate::core::{PingStatus, Probe, ProbeCore, ProbeKind};

const DRIVER_TIMEOUT: Duration = Duration::from_secs(4);

pub struct MongoProbe {
    core: ProbeCore,
    client: Option<Client>,
}

impl MongoProbe {
    pub fn new() -> Self {
        Self {
            core: ProbeCore::new(),
            client: None,
        }
    }
}

impl Default for MongoProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for MongoProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Mongodb
    }

    fn core(&self) -> &ProbeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ProbeCore {
        &mut self.core
    }

    async fn connect(&mut self) -> Result<()> {
        debug!("connecting to mongodb server");

        let mut options = ClientOptions::parse(self.url())
            .await
            .map_err(|e| Error::Connect(format!("mongodb: {e}")))?;
        options.connect_timeout = Some(DRIVER_TIMEOUT);
        options.server_selection_timeout = Some(DRIVER_TIMEOUT);

        let client =
            Client::with_options(options).map_err(|e| Error::Connect(format!("mongodb: {e}")))?;
        self.client = Some(client);

        debug!("connecting to mongodb server succeed");
        Ok(())
    }

    async fn ping(&mut self) -> PingStatus {
        let Some(client) = self.client.clone() else {
            return PingStatus::NotOk;
        };

        match client
            .database("admin")
            .run_command(doc! {"ping": 1}, None)
            .await
        {
            Ok(_) => PingStatus::Ok,
            Err(e) => {
                debug!("mongodb ping error: {e}");
                self.set_message(&e.to_string());
                PingStatus::NotOk
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        debug!("closing mongodb connection");

        if let Some(client) = self.client.take() {
            client.shutdown().await;
        }

        Ok(())
    }
}
