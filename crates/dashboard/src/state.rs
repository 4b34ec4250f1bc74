//! Dashboard state: the per-service status map fed by webhook ingest.
//!
//! Seeded from the same config file the monitor reads, so the dashboard
//! knows every service before the first webhook arrives. Mutated only
//! through [`DashboardState::apply_webhook_message`]; a `RwLock` serializes
//! the writes against concurrent readers.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::{Map, Value, json};

use healthwatch_common::error::Error;
use healthwatch_common::Result;
use healthwatch_config::Config;

pub const DEFAULT_HTTP_PORT: u16 = 9115;
const DEFAULT_TITLE: &str = "Healthwatch Dashboard";

/// Service status vocabulary shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Up,
    Down,
    Checking,
    Monitored,
}

impl ServiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceStatus::Up => "UP",
            ServiceStatus::Down => "DOWN",
            ServiceStatus::Checking => "CHECKING",
            ServiceStatus::Monitored => "MONITORED",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "UP" => Some(ServiceStatus::Up),
            "DOWN" => Some(ServiceStatus::Down),
            "CHECKING" => Some(ServiceStatus::Checking),
            "MONITORED" => Some(ServiceStatus::Monitored),
            _ => None,
        }
    }
}

/// One parsed webhook notification.
#[derive(Debug, PartialEq, Eq)]
pub struct WebhookUpdate {
    pub service: String,
    pub status: ServiceStatus,
    pub details: String,
}

/// Parse `"<serviceName> is <STATUS> [| <details>]"`.
///
/// Token 0 is the service name, token 2 the status (punctuation stripped,
/// so `"UP."` from a recovery message parses), tokens 4.. joined are the
/// details.
pub fn parse_webhook_message(msg: &str) -> Option<WebhookUpdate> {
    let tokens: Vec<&str> = msg.split(' ').collect();

    let service = tokens.first()?.trim();
    if service.is_empty() {
        return None;
    }

    let raw_status: String = tokens
        .get(2)?
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    let status = ServiceStatus::parse(&raw_status)?;

    let details = if tokens.len() > 4 {
        tokens[4..].join(" ")
    } else {
        String::new()
    };

    Some(WebhookUpdate {
        service: service.to_string(),
        status,
        details,
    })
}

pub struct DashboardState {
    pub title: String,
    pub http_port: u16,
    pub assets_dir: String,
    pub jwt_key: String,
    pub username: String,
    password_sha256: String,
    webhook_tokens: Vec<String>,
    services: RwLock<HashMap<String, Map<String, Value>>>,
}

impl DashboardState {
    pub fn from_config(configs: &Config) -> Result<Self> {
        let webhook_list = configs
            .section("notificator")
            .and_then(|n| n.get_list("webhook").cloned())
            .ok_or_else(|| {
                Error::Config("webhook notificator key is not in config".to_string())
            })?;

        let mut webhook_tokens = Vec::new();
        for entry in &webhook_list {
            let token = entry
                .get("tobToken")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    Error::Config("cannot read tobToken from webhook config".to_string())
                })?;
            webhook_tokens.push(token.trim().to_string());
        }

        let service_section = configs
            .section("service")
            .ok_or_else(|| Error::Config("service key is not in config".to_string()))?;

        // seed every configured service as UP; webhooks take it from there
        let mut services = HashMap::new();
        for (name, value) in service_section.entries() {
            let mut attrs = value
                .as_object()
                .cloned()
                .ok_or_else(|| Error::Config(format!("service {name} is not an object")))?;
            attrs.insert("status".to_string(), json!(ServiceStatus::Up.as_str()));
            services.insert(name.clone(), attrs);
        }

        let jwt_key = configs
            .get_str("dashboardJwtKey")
            .ok_or_else(|| Error::Config("dashboardJwtKey is not in config".to_string()))?
            .to_string();
        let username = configs
            .get_str("dashboardUsername")
            .ok_or_else(|| Error::Config("dashboardUsername is not in config".to_string()))?
            .to_string();
        let password_sha256 = configs
            .get_str("dashboardPassword")
            .ok_or_else(|| Error::Config("dashboardPassword is not in config".to_string()))?
            .to_lowercase();

        Ok(Self {
            title: configs
                .get_str("dashboardTitle")
                .unwrap_or(DEFAULT_TITLE)
                .to_string(),
            http_port: configs
                .get_i64("dashboardHttpPort")
                .map(|p| p as u16)
                .unwrap_or(DEFAULT_HTTP_PORT),
            assets_dir: configs
                .get_str("dashboardAssetsDir")
                .unwrap_or("dashboard-ui")
                .to_string(),
            jwt_key,
            username,
            password_sha256,
            webhook_tokens,
            services: RwLock::new(services),
        })
    }

    /// Constant-shape check used by the login handler.
    pub fn credentials_match(&self, username: &str, password: &str) -> bool {
        username == self.username
            && healthwatch_common::sha256_hex(password.as_bytes()) == self.password_sha256
    }

    /// `true` when the `X-Tob-Token` header value matches a configured
    /// webhook token.
    pub fn token_valid(&self, token: &str) -> bool {
        self.webhook_tokens.iter().any(|t| t == token)
    }

    /// Snapshot of the service map for `GET /api/services`.
    pub fn services_snapshot(&self) -> HashMap<String, Map<String, Value>> {
        self.services.read().expect("state lock poisoned").clone()
    }

    /// Ingest one webhook notification. Unknown services and unparseable
    /// messages are ignored; the endpoint stays idempotent.
    pub fn apply_webhook_message(&self, msg: &str) {
        let Some(update) = parse_webhook_message(msg) else {
            return;
        };

        let mut services = self.services.write().expect("state lock poisoned");
        let Some(service) = services.get_mut(&update.service) else {
            return;
        };

        service.insert("status".to_string(), json!(update.status.as_str()));
        if update.status == ServiceStatus::Up {
            service.insert("messageDetails".to_string(), json!(""));
        } else {
            service.insert("messageDetails".to_string(), json!(update.details));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_config() -> Config {
        Config::from_reader(
            r#"{
                "notificator": {
                    "webhook": [
                        {"url": "http://localhost:9115/api/tob/webhook", "tobToken": " t1 ", "enable": true},
                        {"url": "http://alt:9115/api/tob/webhook", "tobToken": "t2", "enable": false}
                    ]
                },
                "service": {
                    "billing": {"kind": "postgresql", "url": "postgres://x", "checkInterval": 5, "enable": true},
                    "shop-ssl": {"kind": "sslstatus", "url": "https://x", "checkInterval": 60, "enable": true}
                },
                "dashboardTitle": "Ops Status",
                "dashboardHttpPort": 9200,
                "dashboardJwtKey": "k3y",
                "dashboardUsername": "admin",
                "dashboardPassword": "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
            }"#
            .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_plain_up() {
        let update = parse_webhook_message("billing is UP").unwrap();
        assert_eq!(update.service, "billing");
        assert_eq!(update.status, ServiceStatus::Up);
        assert_eq!(update.details, "");
    }

    #[test]
    fn test_parse_down_with_details() {
        let update = parse_webhook_message("billing is DOWN | timeout waiting for pool").unwrap();
        assert_eq!(update.status, ServiceStatus::Down);
        assert_eq!(update.details, "timeout waiting for pool");
    }

    #[test]
    fn test_parse_recovery_message_strips_punctuation() {
        let update = parse_webhook_message("billing is UP. It was down for 7 minutes").unwrap();
        assert_eq!(update.status, ServiceStatus::Up);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_webhook_message("").is_none());
        assert!(parse_webhook_message("billing").is_none());
        assert!(parse_webhook_message("billing is SHRUGGING").is_none());
    }

    #[test]
    fn test_state_seeds_services_up() {
        let state = DashboardState::from_config(&sample_config()).unwrap();
        let services = state.services_snapshot();
        assert_eq!(services["billing"]["status"], "UP");
        assert_eq!(services["shop-ssl"]["status"], "UP");
        assert_eq!(state.title, "Ops Status");
        assert_eq!(state.http_port, 9200);
    }

    #[test]
    fn test_tokens_are_trimmed_and_matched() {
        let state = DashboardState::from_config(&sample_config()).unwrap();
        assert!(state.token_valid("t1"));
        assert!(state.token_valid("t2"));
        assert!(!state.token_valid("t3"));
    }

    #[test]
    fn test_ingest_down_then_up() {
        let state = DashboardState::from_config(&sample_config()).unwrap();

        state.apply_webhook_message("billing is DOWN | timeout");
        let services = state.services_snapshot();
        assert_eq!(services["billing"]["status"], "DOWN");
        assert_eq!(services["billing"]["messageDetails"], "timeout");

        state.apply_webhook_message("billing is UP");
        let services = state.services_snapshot();
        assert_eq!(services["billing"]["status"], "UP");
        assert_eq!(services["billing"]["messageDetails"], "");
    }

    #[test]
    fn test_ingest_unknown_service_is_ignored() {
        let state = DashboardState::from_config(&sample_config()).unwrap();
        state.apply_webhook_message("mystery is DOWN");
        assert!(!state.services_snapshot().contains_key("mystery"));
    }

    #[test]
    fn test_credentials() {
        let state = DashboardState::from_config(&sample_config()).unwrap();
        assert!(state.credentials_match("admin", "password"));
        assert!(!state.credentials_match("admin", "wrong"));
        assert!(!state.credentials_match("root", "password"));
    }
}
