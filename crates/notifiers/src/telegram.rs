//! Telegram notifier
//!
//! Delivers through the Bot API `sendMessage` endpoint; the message, chat id
//! and preview flag travel url-encoded in the query string.

use async_trait::async_trait;
use tracing::debug;
use url::form_urlencoded;

use healthwatch_common::error::Error;
use healthwatch_common::httpx::HttpClient;
use healthwatch_common::Result;
use healthwatch_config::Config;

use crate::{Notifier, notificator_section};

const REQUEST_TIMEOUT_SECS: u64 = 5;

/// Telegram notificator.
pub struct TelegramNotifier {
    bot_token: String,
    group_id: String,
    enabled: bool,
    client: HttpClient,
}

impl TelegramNotifier {
    pub fn from_config(configs: &Config) -> Result<Self> {
        let conf = notificator_section(configs, "telegram")?;

        let bot_token = conf
            .get_str("botToken")
            .ok_or_else(|| {
                Error::Config("cannot find telegram botToken field in the config file".into())
            })?
            .to_string();
        let group_id = conf
            .get_str("groupId")
            .ok_or_else(|| {
                Error::Config("cannot find telegram groupId field in the config file".into())
            })?
            .to_string();
        let enabled = conf.get_bool("enable").ok_or_else(|| {
            Error::Config("cannot find telegram enable field in the config file".into())
        })?;

        Ok(Self {
            bot_token,
            group_id,
            enabled,
            client: HttpClient::new(REQUEST_TIMEOUT_SECS)?,
        })
    }

    fn send_message_url(&self, msg: &str) -> String {
        let params: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("text", msg)
            .append_pair("chat_id", &self.group_id)
            .append_pair("disable_web_page_preview", "true")
            .finish();

        format!(
            "https://api.telegram.org/bot{}/sendMessage?{}",
            self.bot_token, params
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn provider(&self) -> &'static str {
        "telegram"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn send(&self, msg: &str) -> Result<()> {
        let url = self.send_message_url(msg);
        self.client.get(&url, &[]).await?;

        debug!("telegram notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_url_is_encoded() {
        let cfg = Config::from_reader(
            r#"{
                "notificator": {
                    "telegram": {"botToken": "123:abc", "groupId": "-100", "enable": true}
                }
            }"#
            .as_bytes(),
        )
        .unwrap();
        let n = TelegramNotifier::from_config(&cfg).unwrap();

        let url = n.send_message_url("db is DOWN | timeout");
        assert!(url.starts_with("https://api.telegram.org/bot123:abc/sendMessage?"));
        assert!(url.contains("text=db+is+DOWN+%7C+timeout"));
        assert!(url.contains("chat_id=-100"));
        assert!(url.contains("disable_web_page_preview=true"));
    }
}
