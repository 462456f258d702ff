//! Per-request readiness signal.
//!
//! A rendezvous is created when a request is accepted and fired once its
//! result is stored. Waiting on a fired rendezvous returns immediately, so a
//! late waiter never misses the signal.

use tokio::sync::watch;

/// Single-shot readiness signal for one correlation id.
#[derive(Debug)]
pub struct Rendezvous {
    signal: watch::Sender<bool>,
}

impl Rendezvous {
    /// Creates an unfired rendezvous.
    #[must_use]
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);
        Self { signal }
    }

    /// Fires the rendezvous, waking every waiter. Firing twice is a no-op.
    pub fn fire(&self) {
        self.signal.send_replace(true);
    }

    /// Returns true once fired.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        *self.signal.borrow()
    }

    /// Returns a waiter that can be awaited without holding the rendezvous.
    #[must_use]
    pub fn waiter(&self) -> RendezvousWaiter {
        RendezvousWaiter {
            receiver: self.signal.subscribe(),
        }
    }
}

impl Default for Rendezvous {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for a [`Rendezvous`] to fire.
#[derive(Debug)]
pub struct RendezvousWaiter {
    receiver: watch::Receiver<bool>,
}

impl RendezvousWaiter {
    /// Suspends until the rendezvous fires.
    ///
    /// Also returns if the rendezvous is dropped unfired; callers re-check the
    /// stored result either way.
    pub async fn wait(mut self) {
        let _ = self.receiver.wait_for(|fired| *fired).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready, task};

    #[test]
    fn waiter_wakes_on_fire() {
        let rendezvous = Rendezvous::new();
        let mut wait = task::spawn(rendezvous.waiter().wait());

        assert_pending!(wait.poll());
        rendezvous.fire();
        assert!(wait.is_woken());
        assert_ready!(wait.poll());
        assert!(rendezvous.is_fired());
    }

    #[test]
    fn late_waiter_returns_immediately() {
        let rendezvous = Rendezvous::new();
        rendezvous.fire();
        let mut wait = task::spawn(rendezvous.waiter().wait());
        assert_ready!(wait.poll());
    }

    #[test]
    fn dropped_rendezvous_releases_waiter() {
        let rendezvous = Rendezvous::new();
        let mut wait = task::spawn(rendezvous.waiter().wait());
        assert_pending!(wait.poll());

        drop(rendezvous);
        assert_ready!(wait.poll());
    }
}
