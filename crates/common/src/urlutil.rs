//! Lenient URL handling for service endpoints.
//!
//! Broker URLs may carry a comma-separated host list in the authority
//! (`kafka://h1:9092,h2:9092,h3:9092`), which a strict WHATWG parser
//! rejects. The runner only needs a syntactic sanity check, and the broker
//! probes need the userinfo and the raw host list, so both are implemented
//! here over the `scheme://[user[:pass]@]hosts[/path]` shape.

use crate::error::{Error, Result};

/// The authority part of a service URL, split into credentials and the raw
/// host list (possibly comma-separated, ports included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authority {
    pub username: Option<String>,
    pub password: Option<String>,
    pub hosts: String,
}

impl Authority {
    /// Hosts as individual `host:port` tokens.
    pub fn host_list(&self) -> Vec<&str> {
        self.hosts.split(',').filter(|h| !h.is_empty()).collect()
    }
}

/// Syntactic URL validation used by the runner at init time: a scheme, a
/// non-empty authority, and no embedded whitespace.
pub fn validate(raw: &str) -> Result<()> {
    parse_authority(raw).map(|_| ())
}

/// Split a service URL into its [`Authority`].
pub fn parse_authority(raw: &str) -> Result<Authority> {
    if raw.contains(char::is_whitespace) {
        return Err(Error::Url(format!("url contains whitespace: {raw}")));
    }

    let rest = raw
        .split_once("://")
        .map(|(_, rest)| rest)
        .ok_or_else(|| Error::Url(format!("missing scheme: {raw}")))?;

    // authority ends at the first path separator
    let authority = rest.split(['/', '?']).next().unwrap_or("");
    if authority.is_empty() {
        return Err(Error::Url(format!("empty host: {raw}")));
    }

    let (userinfo, hosts) = match authority.rsplit_once('@') {
        Some((userinfo, hosts)) => (Some(userinfo), hosts),
        None => (None, authority),
    };

    if hosts.is_empty() {
        return Err(Error::Url(format!("empty host: {raw}")));
    }

    let (username, password) = match userinfo {
        Some(info) => match info.split_once(':') {
            Some((user, pass)) => (some_nonempty(user), some_nonempty(pass)),
            None => (some_nonempty(info), None),
        },
        None => (None, None),
    };

    Ok(Authority {
        username,
        password,
        hosts: hosts.to_string(),
    })
}

fn some_nonempty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
