//! Email notifier
//!
//! SMTP with PLAIN auth via lettre. Messages go out as `text/html` to every
//! configured recipient.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use healthwatch_common::error::Error;
use healthwatch_common::Result;
use healthwatch_config::Config;

use crate::{Notifier, notificator_section};

/// Email notificator.
pub struct EmailNotifier {
    from: String,
    to: Vec<String>,
    subject: String,
    enabled: bool,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailNotifier {
    pub fn from_config(configs: &Config) -> Result<Self> {
        let conf = notificator_section(configs, "email")?;

        let auth_email = required_str(&conf, "authEmail")?;
        let auth_password = required_str(&conf, "authPassword")?;
        // smtpAddress carries the provider port, e.g. "smtp.gmail.com:587"
        let smtp_address = required_str(&conf, "smtpAddress")?;
        let from = required_str(&conf, "from")?;
        let subject = required_str(&conf, "subject")?;

        let to: Vec<String> = conf
            .get_list("to")
            .ok_or_else(|| Error::Config("cannot find email to field in the config file".into()))?
            .iter()
            .filter_map(|t| t.as_str().map(str::to_string))
            .collect();

        let enabled = conf.get_bool("enable").ok_or_else(|| {
            Error::Config("cannot find email enable field in the config file".into())
        })?;

        let (host, port) = match smtp_address.rsplit_once(':') {
            Some((host, port)) => {
                let port: u16 = port.parse().map_err(|_| {
                    Error::Config(format!("invalid smtpAddress port: {smtp_address}"))
                })?;
                (host.to_string(), port)
            }
            None => (smtp_address.clone(), lettre::transport::smtp::SUBMISSION_PORT),
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
            .map_err(|e| Error::Config(format!("invalid smtpAddress {smtp_address}: {e}")))?
            .port(port)
            .credentials(Credentials::new(auth_email, auth_password))
            .build();

        Ok(Self {
            from,
            to,
            subject,
            enabled,
            transport,
        })
    }
}

fn required_str(conf: &Config, key: &str) -> Result<String> {
    conf.get_str(key)
        .map(str::to_string)
        .ok_or_else(|| Error::Config(format!("cannot find email {key} field in the config file")))
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn provider(&self) -> &'static str {
        "email"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn send(&self, msg: &str) -> Result<()> {
        let mut builder = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| Error::Notify(format!("invalid from address: {e}")))?,
            )
            .subject(format!("{}!", self.subject))
            .header(ContentType::TEXT_HTML);

        for to in &self.to {
            builder = builder.to(to
                .parse()
                .map_err(|e| Error::Notify(format!("invalid to address {to}: {e}")))?);
        }

        let email = builder
            .body(msg.to_string())
            .map_err(|e| Error::Notify(format!("cannot build email: {e}")))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| Error::Notify(format!("smtp send failed: {e}")))?;

        debug!("email notification delivered to {} recipients", self.to.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email_config(smtp: &str) -> Config {
        let raw = format!(
            r#"{{
                "notificator": {{
                    "email": {{
                        "authEmail": "bot@example.com",
                        "authPassword": "secret",
                        "authHost": "smtp.example.com",
                        "smtpAddress": "{smtp}",
                        "from": "bot@example.com",
                        "to": ["ops@example.com", "oncall@example.com"],
                        "subject": "healthwatch alert",
                        "enable": true
                    }}
                }}
            }}"#
        );
        Config::from_reader(raw.as_bytes()).unwrap()
    }

    #[test]
    fn test_from_config() {
        let n = EmailNotifier::from_config(&email_config("smtp.example.com:587")).unwrap();
        assert!(n.is_enabled());
        assert_eq!(n.to.len(), 2);
        assert_eq!(n.subject, "healthwatch alert");
    }

    #[test]
    fn test_bad_port_is_config_error() {
        assert!(EmailNotifier::from_config(&email_config("smtp.example.com:nan")).is_err());
    }

    #[test]
    fn test_missing_recipients_is_config_error() {
        let cfg = Config::from_reader(
            r#"{"notificator": {"email": {"authEmail": "a@b.c", "enable": true}}}"#.as_bytes(),
        )
        .unwrap();
        assert!(EmailNotifier::from_config(&cfg).is_err());
    }
}
