//! Runner: owns the probe set, spawns one periodic loop per enabled probe,
//! and coordinates graceful shutdown.
//!
//! ```text
//! Runner::init_services()            Runner::run(ctx)
//!     │ build + connect probes           │ spawn probe loops
//!     │ size the waiter                  │
//!     └──────────────────────────────────┤
//!                                        │  loop per probe:
//!                                        │    tick -> clear msg -> ping -> dispatch
//!                                        │    shutdown -> close -> waiter.done
//!                                        │
//!         ctx cancel / stop() ──────────>│ broadcast shutdown
//!                                        │ waiter.wait()
//!                                        └─ return
//! ```
//!
//! Probe loops own their probes exclusively; once `run` starts there is no
//! shared probe state to lock. Each loop closes its own probe on the way
//! out, so `close` runs exactly once per enabled probe.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use healthwatch_common::error::Error;
use healthwatch_common::{urlutil, Result};
use healthwatch_config::Config;
use healthwatch_notifiers::NotifierSet;
use healthwatch_probes::{build_probe, Probe, ProbeKind};

use crate::dispatch;
use crate::waiter::{Waiter, WaiterHandle};

/// Fallback when `checkInterval` is missing or non-positive. The unit is
/// seconds; the value is historical and deliberately preserved.
pub const DEFAULT_CHECK_INTERVAL: i64 = 5000;

pub struct Runner {
    configs: Config,
    notifiers: NotifierSet,
    probes: HashMap<String, Box<dyn Probe>>,
    verbose: bool,
    initialized: bool,
    waiter: Option<Waiter>,
    stop_tx: mpsc::Sender<bool>,
    stop_rx: mpsc::Receiver<bool>,
}

impl Runner {
    pub fn new(configs: Config, notifiers: NotifierSet, verbose: bool) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel(1);

        Self {
            configs,
            notifiers,
            probes: HashMap::new(),
            verbose,
            initialized: false,
            waiter: None,
            stop_tx,
            stop_rx,
        }
    }

    /// Register a probe directly, ahead of `init_services`. Used by custom
    /// deployments and tests; config-declared probes take the same path.
    pub fn add(&mut self, name: &str, probe: Box<dyn Probe>) {
        self.probes.insert(name.to_string(), probe);
    }

    /// Handle for requesting shutdown: send a value to stop the runner.
    pub fn stop(&self) -> mpsc::Sender<bool> {
        self.stop_tx.clone()
    }

    /// Build, configure and connect every enabled probe from the `service`
    /// config section, then size the completion waiter.
    pub async fn init_services(&mut self) -> Result<()> {
        let service_configs = self.configs.section("service").ok_or_else(|| {
            Error::Config("field service not found in config file".to_string())
        })?;

        for (name, conf_value) in service_configs.entries() {
            let conf = Config::from_value(conf_value)
                .ok_or_else(|| Error::Config(format!("service {name} is not an object")))?;

            debug!("configuring service {name}");

            let url = conf
                .get_str("url")
                .ok_or_else(|| Error::Config(format!("service {name} has no url")))?
                .to_string();
            let kind_str = conf
                .get_str("kind")
                .ok_or_else(|| Error::Config(format!("service {name} has no kind")))?;
            let mut check_interval = conf
                .get_i64("checkInterval")
                .ok_or_else(|| Error::Config(format!("service {name} has no checkInterval")))?;
            let enabled = conf
                .get_bool("enable")
                .ok_or_else(|| Error::Config(format!("service {name} has no enable flag")))?;

            // disabled services are not constructed and do not count
            // toward the waiter
            if !enabled {
                continue;
            }

            if check_interval <= 0 {
                check_interval = DEFAULT_CHECK_INTERVAL;
            }

            let kind: ProbeKind = match kind_str.parse() {
                Ok(kind) => kind,
                Err(e) => {
                    warn!("skipping service {name}: {e}");
                    continue;
                }
            };

            urlutil::validate(&url)?;

            let mut probe = build_probe(kind);
            probe.set_name(name);
            probe.set_url(&url);
            probe.set_check_interval(check_interval as u64);
            probe.enable(true);
            probe.set_config(conf);
            probe.set_notifiers(self.notifiers.clone());

            // by default the service is recovered
            probe.set_recover(true);

            probe.connect().await?;

            self.probes.insert(name.clone(), probe);
        }

        let enabled_count = self.probes.values().filter(|p| p.is_enabled()).count();
        self.waiter = Some(Waiter::new(enabled_count));
        self.initialized = true;

        if self.verbose {
            info!("total services to be executed: {enabled_count}");
        }

        Ok(())
    }

    /// Number of probes that will be scheduled. Meaningful after
    /// `init_services`.
    pub fn enabled_count(&self) -> usize {
        self.probes.values().filter(|p| p.is_enabled()).count()
    }

    /// Spawn the probe loops and block until cancellation (context token or
    /// the stop handle), then wait for every loop to finish its cleanup.
    ///
    /// Panics when called before `init_services`.
    pub async fn run(&mut self, ctx: CancellationToken) {
        if !self.initialized {
            panic!("services not initialized yet");
        }

        let mut waiter = self.waiter.take().expect("waiter exists after init");
        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        for (name, probe) in self.probes.drain() {
            if !probe.is_enabled() {
                continue;
            }

            let shutdown_rx = shutdown_tx.subscribe();
            let handle = waiter.participant();
            let verbose = self.verbose;
            tokio::spawn(probe_loop(name, probe, shutdown_rx, handle, verbose));
        }

        tokio::select! {
            _ = ctx.cancelled() => {
                info!("runner context canceled");
            }
            _ = self.stop_rx.recv() => {
                info!("runner received stop signal, cleaning up resources now");
            }
        }

        // fan the shutdown out to every loop, then wait for them all
        let _ = shutdown_tx.send(());
        waiter.wait().await;
    }
}

/// One probe's periodic loop: tick, ping, dispatch; on shutdown close the
/// probe and report completion.
async fn probe_loop(
    name: String,
    mut probe: Box<dyn Probe>,
    mut shutdown: broadcast::Receiver<()>,
    done: WaiterHandle,
    verbose: bool,
) {
    let period = Duration::from_secs(probe.check_interval().max(1));
    // first tick fires one full period after startup
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                info!("service {name} received stop signal, cleaning up resources");

                if let Err(e) = probe.close().await {
                    warn!("closing service {name} failed: {e}");
                }

                done.done();
                return;
            }
            _ = ticker.tick() => {
                probe.set_message("");
                let status = probe.ping().await;
                dispatch::dispatch_tick(&name, probe.as_mut(), status).await;

                if verbose {
                    info!("{name} => {status}");
                } else {
                    debug!("{name} => {status}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    fn config(raw: &str) -> Config {
        Config::from_reader(raw.as_bytes()).unwrap()
    }

    fn empty_notifiers() -> NotifierSet {
        Arc::from(Vec::new())
    }

    #[tokio::test]
    async fn test_init_requires_service_section() {
        let mut runner = Runner::new(config("{}"), empty_notifiers(), false);
        assert!(runner.init_services().await.is_err());
    }

    #[tokio::test]
    async fn test_disabled_services_are_skipped() {
        let mut runner = Runner::new(
            config(
                r#"{
                    "service": {
                        "on": {"kind": "dummy", "url": "http://x", "checkInterval": 1, "enable": true},
                        "off": {"kind": "dummy", "url": "http://x", "checkInterval": 1, "enable": false}
                    }
                }"#,
            ),
            empty_notifiers(),
            false,
        );

        runner.init_services().await.unwrap();
        assert_eq!(runner.enabled_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_kind_is_skipped_not_fatal() {
        let mut runner = Runner::new(
            config(
                r#"{
                    "service": {
                        "mystery": {"kind": "carrier-pigeon", "url": "http://x", "checkInterval": 1, "enable": true}
                    }
                }"#,
            ),
            empty_notifiers(),
            false,
        );

        runner.init_services().await.unwrap();
        assert_eq!(runner.enabled_count(), 0);
    }

    #[tokio::test]
    async fn test_check_interval_clamped_to_default() {
        let mut runner = Runner::new(
            config(
                r#"{
                    "service": {
                        "svc": {"kind": "dummy", "url": "http://x", "checkInterval": 0, "enable": true}
                    }
                }"#,
            ),
            empty_notifiers(),
            false,
        );

        runner.init_services().await.unwrap();
        let probe = runner.probes.get("svc").unwrap();
        assert_eq!(probe.check_interval(), DEFAULT_CHECK_INTERVAL as u64);
    }

    #[tokio::test]
    async fn test_invalid_url_aborts_init() {
        let mut runner = Runner::new(
            config(
                r#"{
                    "service": {
                        "svc": {"kind": "dummy", "url": "no-scheme", "checkInterval": 1, "enable": true}
                    }
                }"#,
            ),
            empty_notifiers(),
            false,
        );

        assert!(runner.init_services().await.is_err());
    }

    #[tokio::test]
    #[should_panic(expected = "services not initialized yet")]
    async fn test_run_panics_without_init() {
        let mut runner = Runner::new(config("{}"), empty_notifiers(), false);
        runner.run(CancellationToken::new()).await;
    }

    #[tokio::test]
    async fn test_run_stops_on_cancellation() {
        let mut runner = Runner::new(
            config(
                r#"{
                    "service": {
                        "a": {"kind": "dummy", "url": "http://x", "checkInterval": 1, "enable": true},
                        "b": {"kind": "dummy", "url": "http://x", "checkInterval": 1, "enable": true},
                        "c": {"kind": "dummy", "url": "http://x", "checkInterval": 1, "enable": true}
                    }
                }"#,
            ),
            empty_notifiers(),
            false,
        );
        runner.init_services().await.unwrap();

        let ctx = CancellationToken::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        runner.run(ctx).await;
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_run_stops_on_stop_handle() {
        let mut runner = Runner::new(
            config(
                r#"{
                    "service": {
                        "a": {"kind": "dummy", "url": "http://x", "checkInterval": 1, "enable": true}
                    }
                }"#,
            ),
            empty_notifiers(),
            false,
        );
        runner.init_services().await.unwrap();

        let stop = runner.stop();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = stop.send(true).await;
        });

        tokio::time::timeout(Duration::from_secs(5), runner.run(CancellationToken::new()))
            .await
            .expect("runner should stop on the stop handle");
    }
}
