//! The probe capability: shared state record, liveness vocabulary and the
//! `Probe` trait every concrete kind implements.
//!
//! Probes carry heterogeneous backend state (driver pools, broker counts,
//! TLS scan reports), so the capability is a trait over a shared
//! [`ProbeCore`] record rather than a closed enum: concrete kinds implement
//! `kind`/`core`/`core_mut`/`ping` (plus `connect`/`close` where a backend
//! handle exists) and inherit the common surface.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use healthwatch_common::timeutil;
use healthwatch_common::Result;
use healthwatch_config::Config;
use healthwatch_notifiers::{Notifier, NotifierSet};

/// Result of a single liveness check.
///
/// `ping` never fails: any fault is folded into `NotOk` plus a detail
/// message on the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingStatus {
    Ok,
    NotOk,
}

impl PingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PingStatus::Ok => "OK",
            PingStatus::NotOk => "NOT_OK",
        }
    }

    pub fn is_ok(self) -> bool {
        self == PingStatus::Ok
    }
}

impl std::fmt::Display for PingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of backend a probe speaks to. Identifies which constructor the
/// registry invokes for a `service` config entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeKind {
    Postgres,
    Mysql,
    Oracle,
    Mongodb,
    Redis,
    Kafka,
    Elasticsearch,
    Airflow,
    AirflowFlower,
    DiskStatus,
    SslStatus,
    Web,
    Dummy,
    Plugin,
}

impl ProbeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProbeKind::Postgres => "postgresql",
            ProbeKind::Mysql => "mysql",
            ProbeKind::Oracle => "oracle",
            ProbeKind::Mongodb => "mongodb",
            ProbeKind::Redis => "redis",
            ProbeKind::Kafka => "kafka",
            ProbeKind::Elasticsearch => "elasticsearch",
            ProbeKind::Airflow => "airflow",
            ProbeKind::AirflowFlower => "airflowflower",
            ProbeKind::DiskStatus => "diskstatus",
            ProbeKind::SslStatus => "sslstatus",
            ProbeKind::Web => "web",
            ProbeKind::Dummy => "dummy",
            ProbeKind::Plugin => "plugin",
        }
    }
}

impl std::str::FromStr for ProbeKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "postgresql" => Ok(ProbeKind::Postgres),
            "mysql" => Ok(ProbeKind::Mysql),
            "oracle" => Ok(ProbeKind::Oracle),
            "mongodb" => Ok(ProbeKind::Mongodb),
            "redis" => Ok(ProbeKind::Redis),
            "kafka" => Ok(ProbeKind::Kafka),
            "elasticsearch" => Ok(ProbeKind::Elasticsearch),
            "airflow" => Ok(ProbeKind::Airflow),
            "airflowflower" => Ok(ProbeKind::AirflowFlower),
            "diskstatus" => Ok(ProbeKind::DiskStatus),
            "sslstatus" => Ok(ProbeKind::SslStatus),
            "web" => Ok(ProbeKind::Web),
            "dummy" => Ok(ProbeKind::Dummy),
            "plugin" => Ok(ProbeKind::Plugin),
            other => Err(format!("unknown service kind: {other}")),
        }
    }
}

impl std::fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State every probe carries regardless of kind: identity, schedule,
/// transition-detection bookkeeping and the shared notifier set.
pub struct ProbeCore {
    name: String,
    url: String,
    enabled: bool,
    recovered: bool,
    check_interval: u64,
    last_down_at: Option<DateTime<Utc>>,
    message: String,
    config: Config,
    notifiers: NotifierSet,
}

impl ProbeCore {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            url: String::new(),
            enabled: false,
            // by default the service is recovered
            recovered: true,
            check_interval: 0,
            last_down_at: None,
            message: String::new(),
            config: Config::default(),
            notifiers: Arc::from(Vec::new()),
        }
    }
}

impl Default for ProbeCore {
    fn default() -> Self {
        Self::new()
    }
}

/// The capability surface the runner schedules against.
#[async_trait]
pub trait Probe: Send {
    /// Which backend family this probe speaks to.
    fn kind(&self) -> ProbeKind;

    fn core(&self) -> &ProbeCore;
    fn core_mut(&mut self) -> &mut ProbeCore;

    /// Open any persistent backend connection. An error here aborts startup.
    async fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    /// One liveness check. Must not fail: faults become [`PingStatus::NotOk`]
    /// plus a detail message via `set_message`.
    async fn ping(&mut self) -> PingStatus;

    /// Release whatever `connect` opened. Idempotent.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }

    // --- common surface, backed by ProbeCore ---

    /// Stable identifier: the key of this probe's `service` config entry.
    fn name(&self) -> &str {
        &self.core().name
    }

    fn set_name(&mut self, name: &str) {
        self.core_mut().name = name.to_string();
    }

    fn url(&self) -> &str {
        &self.core().url
    }

    fn set_url(&mut self, url: &str) {
        self.core_mut().url = url.to_string();
    }

    /// Check interval in seconds.
    fn check_interval(&self) -> u64 {
        self.core().check_interval
    }

    fn set_check_interval(&mut self, interval: u64) {
        self.core_mut().check_interval = interval;
    }

    fn is_enabled(&self) -> bool {
        self.core().enabled
    }

    fn enable(&mut self, enabled: bool) {
        self.core_mut().enabled = enabled;
    }

    /// Probe-specific configuration (this probe's `service` entry).
    fn config(&self) -> &Config {
        &self.core().config
    }

    fn set_config(&mut self, config: Config) {
        self.core_mut().config = config;
    }

    /// The shared notifier set, constructed once at startup.
    fn notifiers(&self) -> &[Arc<dyn Notifier>] {
        &self.core().notifiers
    }

    fn set_notifiers(&mut self, notifiers: NotifierSet) {
        self.core_mut().notifiers = notifiers;
    }

    /// `true` while the service is UP as far as the engine knows.
    fn is_recover(&self) -> bool {
        self.core().recovered
    }

    fn set_recover(&mut self, recovered: bool) {
        self.core_mut().recovered = recovered;
    }

    /// Record the start of an outage. Only the first DOWN observation after
    /// a recovery sticks; later DOWN ticks must not move the timestamp.
    fn set_last_down_time_now(&mut self) {
        if self.core().recovered {
            self.core_mut().last_down_at = Some(Utc::now());
        }
    }

    /// Whole minutes since the current outage began, as `"<N> minutes"`.
    fn down_time_diff(&self) -> String {
        timeutil::downtime_since(self.core().last_down_at)
    }

    fn message(&self) -> &str {
        &self.core().message
    }

    fn set_message(&mut self, message: &str) {
        self.core_mut().message = message.to_string();
    }
}
