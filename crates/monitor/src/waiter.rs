//! Completion barrier for probe loops.
//!
//! Sized to the number of enabled probes at init. Each loop consumes its
//! [`WaiterHandle`] exactly once on exit; [`Waiter::wait`] returns once
//! every participant has either signalled or vanished (a panicked task
//! drops its handle, which must not wedge shutdown).

use tokio::sync::mpsc;

pub struct Waiter {
    capacity: usize,
    tx: Option<mpsc::Sender<()>>,
    rx: mpsc::Receiver<()>,
}

pub struct WaiterHandle {
    tx: mpsc::Sender<()>,
}

impl Waiter {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            capacity,
            tx: Some(tx),
            rx,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// A handle for one participant. Must be taken before `wait`.
    pub fn participant(&self) -> WaiterHandle {
        WaiterHandle {
            tx: self
                .tx
                .as_ref()
                .expect("participant taken after wait")
                .clone(),
        }
    }

    /// Block until `capacity` participants have signalled, or until every
    /// outstanding handle has been dropped.
    pub async fn wait(&mut self) {
        // drop our own sender so channel closure tracks the participants
        self.tx = None;

        let mut completed = 0;
        while completed < self.capacity {
            match self.rx.recv().await {
                Some(()) => completed += 1,
                // a participant exited without signalling (panic); there is
                // nothing left to wait for once all senders are gone
                None => break,
            }
        }
    }
}

impl WaiterHandle {
    /// Signal completion. Consumes the handle, so a loop can only signal
    /// once.
    pub fn done(self) {
        let _ = self.tx.try_send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_returns_after_all_done() {
        let mut waiter = Waiter::new(3);
        let handles: Vec<_> = (0..3).map(|_| waiter.participant()).collect();

        for handle in handles {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                handle.done();
            });
        }

        tokio::time::timeout(Duration::from_secs(1), waiter.wait())
            .await
            .expect("waiter should complete");
    }

    #[tokio::test]
    async fn test_wait_survives_dropped_participant() {
        let mut waiter = Waiter::new(2);
        let signalling = waiter.participant();
        let dropped = waiter.participant();

        tokio::spawn(async move {
            signalling.done();
            // simulates a panicked loop: handle dropped without done()
            drop(dropped);
        });

        tokio::time::timeout(Duration::from_secs(1), waiter.wait())
            .await
            .expect("waiter should not wedge on a dropped participant");
    }

    #[tokio::test]
    async fn test_zero_capacity_wait_is_immediate() {
        let mut waiter = Waiter::new(0);
        tokio::time::timeout(Duration::from_millis(100), waiter.wait())
            .await
            .expect("empty waiter returns immediately");
    }
}
