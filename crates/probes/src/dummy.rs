//! Dummy probe: a coin-flip liveness check, used as a test oracle for the
//! transition detector and as a smoke-test service in configs.

use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

use crate::core::{PingStatus, Probe, ProbeCore, ProbeKind};

pub struct DummyProbe {
    core: ProbeCore,
}

impl DummyProbe {
    pub fn new() -> Self {
        Self {
            core: ProbeCore::new(),
        }
    }
}

impl Default for DummyProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for DummyProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Dummy
    }

    fn core(&self) -> &ProbeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ProbeCore {
        &mut self.core
    }

    async fn ping(&mut self) -> PingStatus {
        let n: u32 = rand::thread_rng().gen_range(0..100);
        debug!("dummy rolled {n}");

        if n < 50 {
            return PingStatus::NotOk;
        }

        PingStatus::Ok
    }
}
