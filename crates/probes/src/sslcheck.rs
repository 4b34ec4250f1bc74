//! TLS certificate inspection for the sslstatus probe.
//!
//! Certificates are fetched with verification disabled at the socket (an
//! expired or mismatched certificate must still produce a report line, not
//! a handshake error) and then checked manually against the `*.`-stripped
//! domain.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rustls::DigitallySignedStruct;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::debug;
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::GeneralName;
use x509_parser::prelude::FromDer;

const DIAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Report lines carrying one of these severities make the probe report
/// `NOT_OK`.
pub const SEVERITIES: [&str; 3] = ["Warning", "Danger", "Critical"];

/// `true` when the aggregated report carries any alerting severity.
pub fn contains_severity(report: &str) -> bool {
    SEVERITIES.iter().any(|sev| report.contains(sev))
}

/// Severity for a certificate that is valid and matches its hostname.
pub fn classify_days_left(days_left: i64) -> &'static str {
    if days_left <= 7 {
        "Critical"
    } else if days_left <= 15 {
        "Danger"
    } else if days_left <= 30 {
        "Warning"
    } else {
        "Info"
    }
}

/// Check every domain and join the per-domain report lines.
pub async fn check_ssl_expiry_multi(domains: &[String]) -> String {
    let mut report = String::new();
    for domain in domains {
        report.push_str(&check_ssl_expiry(domain).await);
    }
    report
}

/// Check a single domain on the standard TLS port.
pub async fn check_ssl_expiry(domain: &str) -> String {
    let clean = domain.trim_start_matches("*.");
    check_ssl_expiry_at(domain, &format!("{clean}:443")).await
}

/// Check a single domain against an explicit address. One line, newline
/// terminated.
pub async fn check_ssl_expiry_at(domain: &str, addr: &str) -> String {
    let clean = domain.trim_start_matches("*.");

    let der = match peer_certificate(clean, addr).await {
        Ok(der) => der,
        Err(e) => return format!("error: {clean} - {e}\n"),
    };

    let (_, cert) = match X509Certificate::from_der(&der) {
        Ok(parsed) => parsed,
        Err(e) => return format!("error: {clean} - cannot parse certificate: {e}\n"),
    };

    let not_after = cert.validity().not_after.timestamp();
    let days_left = (not_after - Utc::now().timestamp()) / 86_400;
    let expires = DateTime::<Utc>::from_timestamp(not_after, 0)
        .map(|ts| ts.to_rfc2822())
        .unwrap_or_else(|| "unknown".to_string());

    if not_after <= Utc::now().timestamp() {
        return format!("Danger: {clean} certificate has expired ({expires})\n");
    }

    if !hostname_matches(&cert_dns_names(&cert), clean) {
        return format!("Danger: {clean} certificate does not match the hostname\n");
    }

    let status = classify_days_left(days_left);
    format!("{status}: {clean} will expire in {days_left} days ({expires})\n")
}

/// Dial `addr` and return the peer's leaf certificate, skipping chain and
/// hostname verification.
async fn peer_certificate(server_name: &str, addr: &str) -> anyhow::Result<Vec<u8>> {
    let stream = tokio::time::timeout(DIAL_TIMEOUT, TcpStream::connect(addr))
        .await
        .map_err(|_| anyhow::anyhow!("dial timed out"))??;

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = rustls::ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(NoVerification { provider }))
        .with_no_client_auth();

    let connector = TlsConnector::from(Arc::new(config));
    let name = ServerName::try_from(server_name.to_string())?;
    let tls = connector.connect(name, stream).await?;

    let (_io, conn) = tls.get_ref();
    let certs = conn
        .peer_certificates()
        .ok_or_else(|| anyhow::anyhow!("no peer certificates presented"))?;
    let leaf = certs
        .first()
        .ok_or_else(|| anyhow::anyhow!("empty certificate chain"))?;

    debug!("fetched certificate for {server_name}");
    Ok(leaf.to_vec())
}

/// DNS names the certificate is valid for: SAN entries plus the subject CN.
fn cert_dns_names(cert: &X509Certificate<'_>) -> Vec<String> {
    let mut names = Vec::new();

    if let Ok(Some(san)) = cert.subject_alternative_name() {
        for general_name in &san.value.general_names {
            if let GeneralName::DNSName(dns) = general_name {
                names.push(dns.to_string());
            }
        }
    }

    if let Some(cn) = cert
        .subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
    {
        names.push(cn.to_string());
    }

    names
}

/// Certificate-name matching: exact, or a single-label wildcard.
fn hostname_matches(names: &[String], host: &str) -> bool {
    names.iter().any(|name| {
        if let Some(suffix) = name.strip_prefix("*.") {
            match host.split_once('.') {
                Some((label, rest)) => !label.is_empty() && rest.eq_ignore_ascii_case(suffix),
                None => false,
            }
        } else {
            name.eq_ignore_ascii_case(host)
        }
    })
}

/// Accept-anything verifier: the manual checks above are the real
/// verification.
#[derive(Debug)]
struct NoVerification {
    provider: Arc<rustls::crypto::CryptoProvider>,
}

impl ServerCertVerifier for NoVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustls::pki_types::PrivateKeyDer;
    use tokio_rustls::TlsAcceptor;

    #[test]
    fn test_severity_mapping() {
        assert_eq!(classify_days_left(60), "Info");
        assert_eq!(classify_days_left(31), "Info");
        assert_eq!(classify_days_left(30), "Warning");
        assert_eq!(classify_days_left(16), "Warning");
        assert_eq!(classify_days_left(15), "Danger");
        assert_eq!(classify_days_left(8), "Danger");
        assert_eq!(classify_days_left(7), "Critical");
        assert_eq!(classify_days_left(0), "Critical");
    }

    #[test]
    fn test_contains_severity() {
        assert!(contains_severity("Warning: a.example.com will expire in 20 days\n"));
        assert!(contains_severity(
            "Info: ok.example.com will expire in 300 days\nCritical: b.example.com will expire in 3 days\n"
        ));
        assert!(!contains_severity("Info: ok.example.com will expire in 300 days\n"));
        assert!(!contains_severity(""));
    }

    #[test]
    fn test_hostname_matching() {
        let names = vec!["*.example.com".to_string(), "example.com".to_string()];
        assert!(hostname_matches(&names, "a.example.com"));
        assert!(hostname_matches(&names, "example.com"));
        assert!(!hostname_matches(&names, "a.b.example.com"));
        assert!(!hostname_matches(&names, "example.org"));
        assert!(!hostname_matches(&[], "example.com"));
    }

    /// Spin a TLS listener presenting a certificate for `cert_domain` that
    /// expires `valid_days` from now; return its address.
    async fn tls_server(cert_domain: &str, valid_days: i64) -> std::net::SocketAddr {
        let mut params = rcgen::CertificateParams::new(vec![cert_domain.to_string()]).unwrap();
        params.not_before = time::OffsetDateTime::now_utc() - time::Duration::days(1);
        params.not_after = time::OffsetDateTime::now_utc() + time::Duration::days(valid_days);
        let key_pair = rcgen::KeyPair::generate().unwrap();
        let cert = params.self_signed(&key_pair).unwrap();

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let server_config = rustls::ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_no_client_auth()
            .with_single_cert(
                vec![cert.der().clone()],
                PrivateKeyDer::Pkcs8(key_pair.serialize_der().into()),
            )
            .unwrap();

        let acceptor = TlsAcceptor::from(Arc::new(server_config));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let acceptor = acceptor.clone();
                tokio::spawn(async move {
                    let _ = acceptor.accept(stream).await;
                });
            }
        });

        addr
    }

    #[tokio::test]
    async fn test_certificate_expiring_soon_is_critical() {
        let addr = tls_server("localhost", 5).await;
        let line = check_ssl_expiry_at("localhost", &addr.to_string()).await;
        assert!(line.starts_with("Critical: localhost will expire in"), "got: {line}");
        assert!(contains_severity(&line));
    }

    #[tokio::test]
    async fn test_long_lived_certificate_is_info() {
        let addr = tls_server("localhost", 300).await;
        let line = check_ssl_expiry_at("localhost", &addr.to_string()).await;
        assert!(line.starts_with("Info: localhost will expire in"), "got: {line}");
        assert!(!contains_severity(&line));
    }

    #[tokio::test]
    async fn test_hostname_mismatch_is_danger() {
        let addr = tls_server("otherhost.internal", 300).await;
        let line = check_ssl_expiry_at("localhost", &addr.to_string()).await;
        assert_eq!(
            line,
            "Danger: localhost certificate does not match the hostname\n"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_error_line() {
        let line = check_ssl_expiry_at("localhost", "127.0.0.1:1").await;
        assert!(line.starts_with("error: localhost - "), "got: {line}");
    }

    #[tokio::test]
    async fn test_wildcard_domain_is_stripped() {
        let addr = tls_server("localhost", 300).await;
        let line = check_ssl_expiry_at("*.localhost", &addr.to_string()).await;
        // the *.-stripped domain is what gets dialed and reported
        assert!(line.contains("localhost"), "got: {line}");
    }
}
