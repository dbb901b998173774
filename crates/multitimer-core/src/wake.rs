//! Processor wake retention.
//!
//! Keeps the host device awake long enough to finish handling a just-fired
//! alarm. The retention is bounded: [`WakeGuard::acquire`] schedules its own
//! release, so a handler that returns early or panics cannot leak the
//! retention and drain power indefinitely.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::error::WakeError;

/// The OS wake primitive. `retain` keeps the processor awake until the
/// matching `release`.
pub trait WakeRetention: Send + Sync {
    fn retain(&self) -> Result<(), WakeError>;
    fn release(&self) -> Result<(), WakeError>;
}

#[derive(Debug, Default)]
struct GuardState {
    held: bool,
    /// Bumped on every acquire; a deferred release only fires if the
    /// generation it captured is still current.
    generation: u64,
}

/// Scoped wrapper around a [`WakeRetention`] primitive.
///
/// Acquiring while already held refreshes the release window instead of
/// stacking retains. One guard per lifecycle, not a process-wide singleton.
pub struct WakeGuard {
    source: Arc<dyn WakeRetention>,
    state: Arc<Mutex<GuardState>>,
}

impl WakeGuard {
    pub fn new(source: Arc<dyn WakeRetention>) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(GuardState::default())),
        }
    }

    /// Retain the processor for at most `timeout`.
    ///
    /// Must run within a tokio runtime; the deferred release is a spawned
    /// task sleeping out the window.
    pub fn acquire(&self, timeout: Duration) -> Result<(), WakeError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| WakeError::RuntimeUnavailable)?;

        let generation = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if !state.held {
                self.source.retain()?;
                state.held = true;
            }
            state.generation += 1;
            state.generation
        };

        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.state);
        runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
            // A later acquire refreshed the window; this release is stale.
            if state.held && state.generation == generation {
                state.held = false;
                if let Err(err) = source.release() {
                    tracing::warn!("wake retention release failed: {err}");
                }
            }
        });

        Ok(())
    }

    /// Release immediately. Safe to call when not held.
    ///
    /// On failure the guard stays held and the deferred release retries when
    /// the window elapses.
    pub fn release(&self) -> Result<(), WakeError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.held {
            self.source.release()?;
            state.held = false;
            state.generation += 1;
        }
        Ok(())
    }

    pub fn is_held(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .held
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::time;

    use super::*;

    #[derive(Default)]
    struct CountingSource {
        retains: AtomicU32,
        releases: AtomicU32,
    }

    impl WakeRetention for CountingSource {
        fn retain(&self) -> Result<(), WakeError> {
            self.retains.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn release(&self) -> Result<(), WakeError> {
            self.releases.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn releases_on_timeout_without_explicit_release() {
        let source = Arc::new(CountingSource::default());
        let guard = WakeGuard::new(source.clone());

        guard.acquire(Duration::from_millis(15_000)).unwrap();
        assert!(guard.is_held());

        // Let the spawned deferred-release task arm its sleep timer before the
        // mock clock advances past it.
        tokio::task::yield_now().await;
        time::advance(Duration::from_millis(15_001)).await;
        tokio::task::yield_now().await;

        assert!(!guard.is_held());
        assert_eq!(source.retains.load(Ordering::SeqCst), 1);
        assert_eq!(source.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reacquire_refreshes_instead_of_stacking() {
        let source = Arc::new(CountingSource::default());
        let guard = WakeGuard::new(source.clone());

        guard.acquire(Duration::from_millis(15_000)).unwrap();
        tokio::task::yield_now().await;
        time::advance(Duration::from_millis(10_000)).await;
        guard.acquire(Duration::from_millis(15_000)).unwrap();
        tokio::task::yield_now().await;

        // Past the first window but within the refreshed one.
        time::advance(Duration::from_millis(10_000)).await;
        tokio::task::yield_now().await;
        assert!(guard.is_held());
        assert_eq!(source.retains.load(Ordering::SeqCst), 1);
        assert_eq!(source.releases.load(Ordering::SeqCst), 0);

        time::advance(Duration::from_millis(5_001)).await;
        tokio::task::yield_now().await;
        assert!(!guard.is_held());
        assert_eq!(source.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_release_disarms_the_timeout() {
        let source = Arc::new(CountingSource::default());
        let guard = WakeGuard::new(source.clone());

        guard.acquire(Duration::from_millis(15_000)).unwrap();
        guard.release().unwrap();
        assert!(!guard.is_held());
        assert_eq!(source.releases.load(Ordering::SeqCst), 1);

        time::advance(Duration::from_millis(20_000)).await;
        tokio::task::yield_now().await;
        assert_eq!(source.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn release_when_not_held_is_noop() {
        let source = Arc::new(CountingSource::default());
        let guard = WakeGuard::new(source.clone());

        guard.release().unwrap();
        assert_eq!(source.releases.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_after_expiry_retains_again() {
        let source = Arc::new(CountingSource::default());
        let guard = WakeGuard::new(source.clone());

        guard.acquire(Duration::from_millis(15_000)).unwrap();
        tokio::task::yield_now().await;
        time::advance(Duration::from_millis(15_001)).await;
        tokio::task::yield_now().await;
        assert!(!guard.is_held());

        guard.acquire(Duration::from_millis(15_000)).unwrap();
        assert!(guard.is_held());
        assert_eq!(source.retains.load(Ordering::SeqCst), 2);
    }
}
