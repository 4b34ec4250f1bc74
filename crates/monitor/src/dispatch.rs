//! Transition detection and notification dispatch for one probe tick.
//!
//! Notifications are edge-triggered: a probe that stays DOWN alerts once,
//! and again once it recovers. Two kinds are the exception — airflow and
//! sslstatus push an informational line to the webhook notifiers on every
//! tick so the dashboard always has a fresh summary, and sslstatus is
//! excluded from the edge-triggered fan-out entirely (its report is the
//! informational line).

use tracing::warn;

use healthwatch_probes::{PingStatus, Probe, ProbeKind};

/// Apply the dispatch rules for one completed tick, in order:
/// informational push, DOWN edge, UP edge.
pub async fn dispatch_tick(name: &str, probe: &mut dyn Probe, status: PingStatus) {
    informational_dispatch(name, probe, status).await;

    // DOWN edge: first NOT_OK after a recovery
    if status == PingStatus::NotOk && probe.is_recover() {
        probe.set_last_down_time_now();
        probe.set_recover(false);

        let message = if probe.message().is_empty() {
            format!("{name} is DOWN")
        } else {
            format!("{name} is DOWN | {}", probe.message())
        };

        if probe.kind() != ProbeKind::SslStatus {
            broadcast(probe, &message).await;
        }
    }

    // UP edge: first OK after an outage
    if status == PingStatus::Ok && !probe.is_recover() {
        probe.set_recover(true);

        let message = if probe.message().is_empty() {
            format!("{name} is UP. It was down for {}", probe.down_time_diff())
        } else {
            format!("{name} is UP | {}", probe.message())
        };

        if probe.kind() != ProbeKind::SslStatus {
            broadcast(probe, &message).await;
        }
    }
}

/// Per-tick push for the reporting kinds, webhook notifiers only.
async fn informational_dispatch(name: &str, probe: &dyn Probe, status: PingStatus) {
    let message = match probe.kind() {
        ProbeKind::Airflow => {
            if probe.message().is_empty() {
                format!("{name} is DOWN")
            } else if status == PingStatus::NotOk {
                format!("{name} is DOWN | {}", probe.message())
            } else {
                format!("{name} is CHECKING | {}", probe.message())
            }
        }
        ProbeKind::SslStatus => {
            if probe.message().is_empty() {
                format!("{name} is DOWN")
            } else {
                format!("{name} is MONITORED | {}", probe.message())
            }
        }
        _ => return,
    };

    for notifier in probe.notifiers() {
        if notifier.is_enabled() && notifier.provider() == "webhook" {
            if let Err(e) = notifier.send(&message).await {
                warn!("notificator {} error: {e}", notifier.provider());
            }
        }
    }
}

/// Sequential fan-out to every enabled notifier. A failing send is logged
/// and never stops the remaining notifiers.
async fn broadcast(probe: &dyn Probe, message: &str) {
    for notifier in probe.notifiers() {
        if notifier.is_enabled() {
            if let Err(e) = notifier.send(message).await {
                warn!("notificator {} error: {e}", notifier.provider());
            }
        }
    }
}
