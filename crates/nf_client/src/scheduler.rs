use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use nf_core::NewsSource;

use crate::presenter::{FeedPresenter, RefreshOutcome};
use crate::sink::FeedSink;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Held for the duration of a cycle; released on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    /// `None` when another cycle holds the flag.
    pub fn try_acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Runs a refresh immediately, then once per interval. A tick that lands
/// while the previous cycle is still running is skipped.
pub struct FeedScheduler<S, K> {
    presenter: Arc<Mutex<FeedPresenter<S, K>>>,
    interval: Duration,
    in_flight: Arc<AtomicBool>,
}

impl<S, K> FeedScheduler<S, K>
where
    S: NewsSource + 'static,
    K: FeedSink + 'static,
{
    pub fn new(presenter: FeedPresenter<S, K>, interval: Duration) -> Self {
        Self {
            presenter: Arc::new(Mutex::new(presenter)),
            interval,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn presenter(&self) -> Arc<Mutex<FeedPresenter<S, K>>> {
        self.presenter.clone()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Starts a cycle in the background unless one is already running.
    pub fn trigger(&self) -> Option<JoinHandle<RefreshOutcome>> {
        let guard = InFlightGuard::try_acquire(&self.in_flight)?;
        let presenter = self.presenter.clone();
        Some(tokio::spawn(async move {
            let _guard = guard;
            presenter.lock().await.refresh().await
        }))
    }

    /// Ticks until `shutdown` resolves, then waits for the running cycle.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(interval_secs = self.interval.as_secs(), "⏱️ Feed scheduler started");
        let mut current: Option<JoinHandle<RefreshOutcome>> = None;
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => match self.trigger() {
                    Some(handle) => current = Some(handle),
                    None => warn!("⏭️ Previous refresh still in flight, skipping this tick"),
                },
            }
        }

        if let Some(handle) = current {
            if let Err(e) = handle.await {
                warn!(error = %e, "refresh task ended abnormally");
            }
        }
        info!("Feed scheduler stopped");
    }

    /// Ticks until Ctrl-C.
    pub async fn run(&self) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await
    }
}
