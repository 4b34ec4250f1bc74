//! Discord notifier
//!
//! One instance covers every configured thread webhook. Messages are
//! prefixed with the configured mentions (`here`-style mentions pass
//! through as-is, everything else is wrapped in `<>`), then dispatched
//! fire-and-forget per thread.

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
struct DiscordMessage {
    content: String,
    username: String,
    avatar_url: String,
}

#[derive(Debug, Clone)]
struct DiscordTarget {
    thread_url: String,
    name: String,
    avatar_url: String,
    mentions: Vec<String>,
    enabled: bool,
}

/// Discord notificator.
pub struct DiscordNotifier {
    targets: Vec<DiscordTarget>,
    client: HttpClient,
}

impl DiscordNotifier {
    pub fn from_config(configs: &Config) -> Result<Self> {
        let list = notificator_list(configs, "discord")?;

        let mut targets = Vec::new();
        for entry in &list {
            let conf = Config::from_value(entry).ok_or_else(|| {
                Error::Config("discord config entry is not an object".into())
            })?;

            let name = conf
                .get_str("name")
                .ok_or_else(|| {
                    Error::Config("cannot find discord name field in the config file".into())
                })?
                .to_string();
            let thread_url = conf
                .get_str("url")
                .ok_or_else(|| {
                    Error::Config("cannot find discord url field in the config file".into())
                })?
                .to_string();
            let avatar_url = conf
                .get_str("avatarUrl")
                .ok_or_else(|| {
                    Error::Config("cannot find discord avatarUrl field in the config file".into())
                })?
                .to_string();
            let enabled = conf.get_bool("enable").ok_or_else(|| {
                Error::Config("cannot find discord enable field in the config file".into())
            })?;

            // mentions are optional per thread
            let mentions = conf
                .get_list("mentions")
                .map(|list| {
                    list.iter()
                        .filter_map(|m| m.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();

            targets.push(DiscordTarget {
                thread_url,
                name,
                avatar_url,
                mentions,
                enabled,
            });
        }

        Ok(Self {
            targets,
            client: HttpClient::new(REQUEST_TIMEOUT_SECS)?,
        })
    }
}

/// `"Hey <@ops>, @here, <msg>"` — `here` mentions are already in Discord's
/// own syntax and pass through unwrapped.
fn with_mentions(mentions: &[String], msg: &str) -> String {
    if mentions.is_empty() {
        return msg.to_string();
    }

    let rendered: Vec<String> = mentions
        .iter()
        .map(|m| {
            if m.contains("here") {
                m.clone()
            } else {
                format!("<{m}>")
            }
        })
        .collect();

    format!("Hey {}, {}", rendered.join(", "), msg)
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn provider(&self) -> &'static str {
        "discord"
    }

    fn is_enabled(&self) -> bool {
        self.targets.iter().any(|t| t.enabled)
    }

    async fn send(&self, msg: &str) -> Result<()> {
        for target in self.targets.iter().filter(|t| t.enabled) {
            let client = self.client.clone();
            let target = target.clone();
            let payload = DiscordMessage {
                content: with_mentions(&target.mentions, msg),
                username: target.name.clone(),
                avatar_url: target.avatar_url.clone(),
            };

            tokio::spawn(async move {
                let headers = [("Content-Type", "application/json")];
                match client.post_json(&target.thread_url, &payload, &headers).await {
                    Ok(resp) if httpx::status_ok(&resp) => {
                        debug!("discord notification delivered to {}", target.name);
                    }
                    Ok(resp) => {
                        warn!(
                            "discord notifier error: {} returned status {}",
                            target.name,
                            resp.status()
                        );
                    }
                    Err(e) => {
                        warn!("discord notifier error: {}: {e}", target.name);
                    }
                }
            });
        }

        Ok(())
    }
}
