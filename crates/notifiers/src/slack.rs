//! Slack notifier
//!
//! Single incoming-webhook endpoint, synchronous `{"text": ...}` POST with a
//! 5s timeout. Mentions are wrapped in `<>` so Slack resolves them.
//!
//! <https://api.slack.com/messaging/sending>

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use healthwatch_common::error::Error;
use healthwatch_common::httpx::HttpClient;
use healthwatch_common::Result;
use healthwatch_config::Config;

use crate::{Notifier, notificator_section};

const REQUEST_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Serialize)]
struct SlackMessage {
    text: String,
}

/// Slack notificator.
pub struct SlackNotifier {
    webhook_url: String,
    mentions: Vec<String>,
    enabled: bool,
    client: HttpClient,
}

impl SlackNotifier {
    pub fn from_config(configs: &Config) -> Result<Self> {
        let conf = notificator_section(configs, "slack")?;

        let webhook_url = conf
            .get_str("webhookUrl")
            .ok_or_else(|| {
                Error::Config("cannot find slack webhookUrl field in the config file".into())
            })?
            .to_string();

        let mentions = conf
            .get_list("mentions")
            .ok_or_else(|| {
                Error::Config("cannot find slack mentions field in the config file".into())
            })?
            .iter()
            .filter_map(|m| m.as_str().map(str::to_string))
            .collect();

        let enabled = conf.get_bool("enable").ok_or_else(|| {
            Error::Config("cannot find slack enable field in the config file".into())
        })?;

        Ok(Self {
            webhook_url,
            mentions,
            enabled,
            client: HttpClient::new(REQUEST_TIMEOUT_SECS)?,
        })
    }

    fn with_mentions(&self, msg: &str) -> String {
        if self.mentions.is_empty() {
            return msg.to_string();
        }

        let rendered: Vec<String> = self.mentions.iter().map(|m| format!("<{m}>")).collect();
        format!("Hey {}, {}", rendered.join(", "), msg)
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    fn provider(&self) -> &'static str {
        "slack"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn send(&self, msg: &str) -> Result<()> {
        let payload = SlackMessage {
            text: self.with_mentions(msg),
        };

        let headers = [("Content-Type", "application/json")];
        self.client
            .post_json(&self.webhook_url, &payload, &headers)
            .await?;

        debug!("slack notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier(mentions: &str) -> SlackNotifier {
        let raw = format!(
            r#"{{
                "notificator": {{
                    "slack": {{"webhookUrl": "http://hooks", "mentions": {mentions}, "enable": true}}
                }}
            }}"#
        );
        let cfg = Config::from_reader(raw.as_bytes()).unwrap();
        SlackNotifier::from_config(&cfg).unwrap()
    }

    #[test]
    fn test_mentions_are_wrapped() {
        let n = notifier(r#"["!here", "@ops"]"#);
        assert_eq!(
            n.with_mentions("db is DOWN"),
            "Hey <!here>, <@ops>, db is DOWN"
        );
    }

    #[test]
    fn test_no_mentions_passthrough() {
        let n = notifier("[]");
        assert_eq!(n.with_mentions("db is DOWN"), "db is DOWN");
    }
}
