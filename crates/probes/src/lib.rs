//! # Healthwatch Probes
//!
//! One probe per monitored dependency kind. Every probe implements the
//! [`Probe`] capability in `core`; the runner schedules against that
//! surface only and never sees backend types.
//!
//! ```text
//! service config entry ──> ProbeKind ──> build_probe() ──> Box<dyn Probe>
//!                                                                │
//!                                        connect() ── ping() ── close()
//! ```

pub mod core;
mod sslcheck;

mod airflow;
mod diskstatus;
mod dummy;
mod elasticsearch;
mod flower;
mod kafka;
mod mongodb;
mod mysql;
mod oracle;
mod plugin;
mod postgres;
mod redisdb;
mod sslstatus;
mod web;

pub use crate::core::{PingStatus, Probe, ProbeCore, ProbeKind};
pub use airflow::AirflowProbe;
pub use diskstatus::DiskStatusProbe;
pub use dummy::DummyProbe;
pub use elasticsearch::ElasticsearchProbe;
pub use flower::AirflowFlowerProbe;
pub use kafka::KafkaProbe;
pub use mongodb::MongoProbe;
pub use mysql::MysqlProbe;
pub use oracle::OracleProbe;
pub use plugin::PluginProbe;
pub use postgres::PostgresProbe;
pub use redisdb::RedisProbe;
pub use sslcheck::{check_ssl_expiry, check_ssl_expiry_multi, classify_days_left};
pub use sslstatus::SslStatusProbe;
pub use web::WebProbe;

/// The kind → constructor mapping the runner instantiates probes through.
pub fn build_probe(kind: ProbeKind) -> Box<dyn Probe> {
    match kind {
        ProbeKind::Postgres => Box::new(PostgresProbe::new()),
        ProbeKind::Mysql => Box::new(MysqlProbe::new()),
        ProbeKind::Oracle => Box::new(OracleProbe::new()),
        ProbeKind::Mongodb => Box::new(MongoProbe::new()),
        ProbeKind::Redis => Box::new(RedisProbe::new()),
        ProbeKind::Kafka => Box::new(KafkaProbe::new()),
        ProbeKind::Elasticsearch => Box::new(ElasticsearchProbe::new()),
        ProbeKind::Airflow => Box::new(AirflowProbe::new()),
        ProbeKind::AirflowFlower => Box::new(AirflowFlowerProbe::new()),
        ProbeKind::DiskStatus => Box::new(DiskStatusProbe::new()),
        ProbeKind::SslStatus => Box::new(SslStatusProbe::new()),
        ProbeKind::Web => Box::new(WebProbe::new()),
        ProbeKind::Dummy => Box::new(DummyProbe::new()),
        ProbeKind::Plugin => Box::new(PluginProbe::new()),
    }
}
