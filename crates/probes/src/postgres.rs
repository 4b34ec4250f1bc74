//! PostgreSQL probe: lazy driver pool opened at connect, driver-level ping
//! on every tick.

use async_trait::async_trait;
use sqlx::Connection;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::debug;

use healthwatch_common::error::Error;
use healthwatch_common::Result;

use crate::core::{PingStatus, Probe, ProbeCore, ProbeKind};

pub struct PostgresProbe {
    core: ProbeCore,
    pool: Option<PgPool>,
}

impl PostgresProbe {
    pub fn new() -> Self {
        Self {
            core: ProbeCore::new(),
            pool: None,
        }
    }
}

impl Default for PostgresProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for PostgresProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Postgres
    }

    fn core(&self) -> &ProbeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ProbeCore {
        &mut self.core
    }

    async fn connect(&mut self) -> Result<()> {
        debug!("connecting to postgres server");

        // lazy: the URL is validated here, the first dial happens on ping
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(5))
            .connect_lazy(self.url())
            .map_err(|e| Error::Connect(format!("postgres: {e}")))?;

        self.pool = Some(pool);
        Ok(())
    }

    async fn ping(&mut self) -> PingStatus {
        let Some(pool) = self.pool.clone() else {
            return PingStatus::NotOk;
        };

        let mut conn = match pool.acquire().await {
            Ok(conn) => conn,
            Err(e) => {
                self.set_message(&e.to_string());
                return PingStatus::NotOk;
            }
        };

        if let Err(e) = conn.ping().await {
            self.set_message(&e.to_string());
            return PingStatus::NotOk;
        }

        PingStatus::Ok
    }

    async fn close(&mut self) -> Result<()> {
        debug!("closing postgres connection");

        if let Some(pool) = self.pool.take() {
            pool.close().await;
        }

        Ok(())
    }
}
