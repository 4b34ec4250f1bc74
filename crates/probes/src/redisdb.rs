//! Redis probe: URL is parsed for host and password (DB index is always 0);
//! each tick issues a PING and any reply error is DOWN.

use std::time::Duration;

use async_trait::async_trait;
use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use tracing::debug;

use healthwatch_common::error::Error;
use healthwatch_common::urlutil;
use healthwatch_common::Result;

use crate::core::{PingStatus, Probe, ProbeCore, ProbeKind};

const PING_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_PORT: u16 = 6379;

pub struct RedisProbe {
    core: ProbeCore,
    client: Option<redis::Client>,
}

impl RedisProbe {
    pub fn new() -> Self {
        Self {
            core: ProbeCore::new(),
            client: None,
        }
    }

    async fn ping_inner(client: &redis::Client) -> redis::RedisResult<String> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async(&mut conn).await
    }
}

impl Default for RedisProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for RedisProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Redis
    }

    fn core(&self) -> &ProbeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ProbeCore {
        &mut self.core
    }

    async fn connect(&mut self) -> Result<()> {
        debug!("connecting to redis server");

        let authority = urlutil::parse_authority(self.url())?;
        let (host, port) = match authority.hosts.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse()
                    .map_err(|_| Error::Url(format!("invalid redis port in {}", self.url())))?;
                (host.to_string(), port)
            }
            None => (authority.hosts.clone(), DEFAULT_PORT),
        };

        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(host, port),
            redis: RedisConnectionInfo {
                // always the default DB
                db: 0,
                username: None,
                password: authority.password,
                ..Default::default()
            },
        };

        let client =
            redis::Client::open(info).map_err(|e| Error::Connect(format!("redis: {e}")))?;
        self.client = Some(client);

        debug!("connecting to redis server succeed");
        Ok(())
    }

    async fn ping(&mut self) -> PingStatus {
        let Some(client) = self.client.clone() else {
            return PingStatus::NotOk;
        };

        match tokio::time::timeout(PING_TIMEOUT, Self::ping_inner(&client)).await {
            Ok(Ok(reply)) => {
                debug!("redis reply: {reply}");
                PingStatus::Ok
            }
            Ok(Err(e)) => {
                debug!("redis ping error: {e}");
                self.set_message(&e.to_string());
                PingStatus::NotOk
            }
            Err(_) => {
                self.set_message("redis ping timed out");
                PingStatus::NotOk
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        debug!("closing redis connection");
        self.client = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_parses_password_and_forces_db_zero() {
        let mut probe = RedisProbe::new();
        probe.set_url("redis://:sekrit@localhost:7001/3");
        probe.connect().await.unwrap();

        let info = probe.client.as_ref().unwrap().get_connection_info();
        assert_eq!(info.redis.db, 0);
        assert_eq!(info.redis.password.as_deref(), Some("sekrit"));
        assert_eq!(
            info.addr,
            ConnectionAddr::Tcp("localhost".to_string(), 7001)
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_not_ok() {
        let mut probe = RedisProbe::new();
        probe.set_url("redis://127.0.0.1:1");
        probe.connect().await.unwrap();
        assert_eq!(probe.ping().await, PingStatus::NotOk);
        assert!(!probe.message().is_empty());
    }
}
