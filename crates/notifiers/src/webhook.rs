//! Webhook notifier
//!
//! POSTs `{"message": ...}` to each configured endpoint with the
//! `x-tob-token` header. Dispatch is fire-and-forget per endpoint: a slow or
//! failing receiver never blocks the probe loop.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use healthwatch_common::error::Error;
use healthwatch_common::httpx::{self, HttpClient};
use healthwatch_common::Result;
use healthwatch_config::Config;

use crate::{Notifier, notificator_list};

const REQUEST_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Serialize)]
struct WebhookMessage {
    message: String,
}

#[derive(Debug, Clone)]
struct WebhookTarget {
    url: String,
    token: String,
    enabled: bool,
}

/// Webhook notificator; one instance covers every configured endpoint.
pub struct WebhookNotifier {
    targets: Vec<WebhookTarget>,
    client: HttpClient,
}

impl WebhookNotifier {
    pub fn from_config(configs: &Config) -> Result<Self> {
        let list = notificator_list(configs, "webhook")?;

        let mut targets = Vec::new();
        for entry in &list {
            let conf = Config::from_value(entry).ok_or_else(|| {
                Error::Config("webhook config entry is not an object".into())
            })?;

            let url = conf
                .get_str("url")
                .ok_or_else(|| {
                    Error::Config("cannot find webhook url field in the config file".into())
                })?
                .to_string();
            let token = conf
                .get_str("tobToken")
                .ok_or_else(|| {
                    Error::Config("cannot find webhook tobToken field in the config file".into())
                })?
                .trim()
                .to_string();
            let enabled = conf.get_bool("enable").ok_or_else(|| {
                Error::Config("cannot find webhook enable field in the config file".into())
            })?;

            targets.push(WebhookTarget {
                url,
                token,
                enabled,
            });
        }

        Ok(Self {
            targets,
            client: HttpClient::new(REQUEST_TIMEOUT_SECS)?,
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn provider(&self) -> &'static str {
        "webhook"
    }

    fn is_enabled(&self) -> bool {
        self.targets.iter().any(|t| t.enabled)
    }

    async fn send(&self, msg: &str) -> Result<()> {
        for target in self.targets.iter().filter(|t| t.enabled) {
            let client = self.client.clone();
            let target = target.clone();
            let payload = WebhookMessage {
                message: msg.to_string(),
            };

            tokio::spawn(async move {
                let headers = [
                    ("Content-Type", "application/json"),
                    ("x-tob-token", target.token.as_str()),
                ];

                match client.post_json(&target.url, &payload, &headers).await {
                    Ok(resp) if httpx::status_ok(&resp) => {
                        debug!("webhook notification delivered to {}", target.url);
                    }
                    Ok(resp) => {
                        warn!(
                            "webhook notifier error: {} returned status {}",
                            target.url,
                            resp.status()
                        );
                    }
                    Err(e) => {
                        warn!("webhook notifier error: {}: {e}", target.url);
                    }
                }
            });
        }

        Ok(())
    }
}
