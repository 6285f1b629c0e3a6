//! Per-provider concurrency gate
//!
//! Every external provider gets one gate instance, constructed at startup
//! and injected into the client that owns the calls. The gate bounds the
//! number of in-flight requests to that provider; it is the only shared
//! mutable resource the enrichment fan-out touches.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Caps concurrent in-flight calls to a single upstream provider.
///
/// `acquire` suspends until a slot frees. The returned permit releases its
/// slot when dropped, so every exit path of a fetch (success, HTTP error,
/// timeout, malformed payload) releases.
#[derive(Debug, Clone)]
pub struct ProviderGate {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl ProviderGate {
    /// Create a gate admitting at most `capacity` concurrent calls.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "gate capacity must be at least 1");
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a free slot.
    pub async fn acquire(&self) -> GatePermit {
        // The semaphore is never closed while a client holds the gate, so
        // acquisition cannot fail.
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .expect("provider gate semaphore closed");
        GatePermit { _permit: permit }
    }

    /// Configured slot count.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Currently free slots. Used by tests to observe the bound.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

/// RAII slot handle; dropping it frees the slot.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_holders_never_exceed_capacity() {
        let gate = ProviderGate::new(3);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let gate = gate.clone();
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                tokio::spawn(async move {
                    let _slot = gate.acquire().await;
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 3, "gate limit exceeded");
        assert_eq!(gate.available(), 3, "all slots released");
    }

    #[tokio::test]
    async fn permit_drop_releases_slot() {
        let gate = ProviderGate::new(2);
        let slot = gate.acquire().await;
        assert_eq!(gate.available(), 1);
        drop(slot);
        assert_eq!(gate.available(), 2);
    }

    #[tokio::test]
    async fn slot_released_on_early_return_path() {
        async fn failing_fetch(gate: &ProviderGate) -> Result<(), &'static str> {
            let _slot = gate.acquire().await;
            Err("simulated provider failure")
        }

        let gate = ProviderGate::new(1);
        assert!(failing_fetch(&gate).await.is_err());
        assert_eq!(gate.available(), 1, "failure path must release the slot");
    }

    #[tokio::test]
    async fn acquire_suspends_until_slot_frees() {
        let gate = ProviderGate::new(1);
        let held = gate.acquire().await;

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move {
                let _slot = gate.acquire().await;
            })
        };

        // The waiter cannot make progress while the slot is held.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        drop(held);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should complete once the slot frees")
            .unwrap();
    }
}
