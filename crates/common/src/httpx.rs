//! Timeout-bounded HTTP client facade
//!
//! Thin wrapper over reqwest used by the HTTP-flavored probes and by the
//! notifier backends. Every request carries a client-side deadline; there is
//! no retry at this layer.

use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::Result;

/// HTTP helper with a fixed per-request timeout.
///
/// Construct one per probe/notifier with the timeout that component needs
/// (5s for liveness checks, 120s for multi-domain scans).
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new client with the given request timeout in seconds.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client })
    }

    /// Execute an HTTP GET.
    pub async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Response> {
        let mut req = self.client.get(url);
        for (key, value) in headers {
            req = req.header(*key, *value);
        }

        Ok(req.send().await?)
    }

    /// Execute an HTTP POST with a JSON payload.
    pub async fn post_json<T: serde::Serialize>(
        &self,
        url: &str,
        body: &T,
        headers: &[(&str, &str)],
    ) -> Result<Response> {
        let mut req = self.client.post(url).json(body);
        for (key, value) in headers {
            req = req.header(*key, *value);
        }

        Ok(req.send().await?)
    }
}

/// `true` for any 2xx response status.
pub fn status_ok(resp: &Response) -> bool {
    let code = resp.status().as_u16();
    (200..300).contains(&code)
}
