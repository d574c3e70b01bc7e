use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::time::{sleep, Instant};

/// Shared handle for retargeting the minimum spacing between dispatches at
/// runtime. Cloning hands out another view of the same interval.
#[derive(Debug, Clone)]
pub struct IntervalHandle {
    millis: Arc<AtomicU64>,
}

impl IntervalHandle {
    pub fn new(interval: Duration) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(interval.as_millis() as u64)),
        }
    }

    pub fn set(&self, interval: Duration) {
        self.millis
            .store(interval.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn get(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::Relaxed))
    }
}

/// Enforces the minimum spacing between consecutive remote calls.
///
/// Owned by the dispatch queue's worker: only one call site ever waits, so
/// the check-then-record sequence needs no further synchronization.
#[derive(Debug)]
pub struct Throttle {
    last_dispatch: Option<Instant>,
    interval: IntervalHandle,
}

impl Throttle {
    pub fn new(interval: IntervalHandle) -> Self {
        Self {
            last_dispatch: None,
            interval,
        }
    }

    /// Sleeps until the configured interval has passed since the previous
    /// dispatch, then records the new dispatch time. The interval is read
    /// once when the wait starts; retargeting it mid-wait only affects the
    /// next turn.
    pub async fn wait_turn(&mut self) {
        let interval = self.interval.get();
        if let Some(last) = self.last_dispatch {
            let elapsed = last.elapsed();
            if elapsed < interval {
                let wait = interval - elapsed;
                debug!("throttling next request for {}ms", wait.as_millis());
                sleep(wait).await;
            }
        }
        self.last_dispatch = Some(Instant::now());
    }
}
