//! # Healthwatch Notifiers
//!
//! Delivery channels for monitor alerts. Each notifier is constructed once
//! at startup from its section of the `notificator` config map and is
//! stateless between sends; probe loops share the constructed set through
//! read-only references.
//!
//! ## Dispatch model
//!
//! ```text
//! Transition detector
//!     │  (sequential fan-out, one failure never stops the rest)
//!     ├──> Email     - synchronous SMTP delivery
//!     ├──> Discord   - fire-and-forget task per configured thread
//!     ├──> Slack     - synchronous POST, 5s timeout
//!     ├──> Telegram  - synchronous GET, 5s timeout
//!     └──> Webhook   - fire-and-forget task per configured endpoint
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use healthwatch_common::Result;
use healthwatch_common::error::Error;
use healthwatch_config::Config;

mod discord;
mod email;
mod slack;
mod telegram;
mod webhook;

pub use discord::DiscordNotifier;
pub use email::EmailNotifier;
pub use slack::SlackNotifier;
pub use telegram::TelegramNotifier;
pub use webhook::WebhookNotifier;

/// A notification delivery channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel tag: one of `email`, `discord`, `slack`, `telegram`,
    /// `webhook`.
    fn provider(&self) -> &'static str;

    /// Whether this channel should receive messages. For channels
    /// configured as a list (discord, webhook) this is the OR across the
    /// configured targets.
    fn is_enabled(&self) -> bool;

    /// Dispatch one message. Fire-and-forget channels spawn their requests
    /// and return immediately; errors inside those tasks are logged, never
    /// surfaced.
    async fn send(&self, msg: &str) -> Result<()>;
}

/// Shared, read-only notifier set handed to every probe.
pub type NotifierSet = Arc<[Arc<dyn Notifier>]>;

/// Build the full notifier set from config.
///
/// A kind whose construction fails (missing fields, bad SMTP address) is
/// logged and omitted; only a missing `notificator` section entirely is an
/// error.
pub fn build_notifiers(configs: &Config) -> Result<NotifierSet> {
    if configs.section("notificator").is_none() {
        return Err(Error::Config(
            "notificator field not found in config file".to_string(),
        ));
    }

    let mut notifiers: Vec<Arc<dyn Notifier>> = Vec::new();

    match EmailNotifier::from_config(configs) {
        Ok(n) => notifiers.push(Arc::new(n)),
        Err(e) => warn!("email notifier not configured: {e}"),
    }

    match DiscordNotifier::from_config(configs) {
        Ok(n) => notifiers.push(Arc::new(n)),
        Err(e) => warn!("discord notifier not configured: {e}"),
    }

    match SlackNotifier::from_config(configs) {
        Ok(n) => notifiers.push(Arc::new(n)),
        Err(e) => warn!("slack notifier not configured: {e}"),
    }

    match TelegramNotifier::from_config(configs) {
        Ok(n) => notifiers.push(Arc::new(n)),
        Err(e) => warn!("telegram notifier not configured: {e}"),
    }

    match WebhookNotifier::from_config(configs) {
        Ok(n) => notifiers.push(Arc::new(n)),
        Err(e) => warn!("webhook notifier not configured: {e}"),
    }

    Ok(Arc::from(notifiers))
}

pub(crate) fn notificator_section(configs: &Config, kind: &str) -> Result<Config> {
    configs
        .section("notificator")
        .ok_or_else(|| Error::Config("cannot find notificator field in the config file".into()))?
        .section(kind)
        .ok_or_else(|| Error::Config(format!("cannot find {kind} field in the config file")))
}

/// For the kinds configured as a list of targets (discord, webhook).
pub(crate) fn notificator_list(configs: &Config, kind: &str) -> Result<Vec<serde_json::Value>> {
    configs
        .section("notificator")
        .ok_or_else(|| Error::Config("cannot find notificator field in the config file".into()))?
        .get_list(kind)
        .cloned()
        .ok_or_else(|| Error::Config(format!("cannot find {kind} field in the config file")))
}
