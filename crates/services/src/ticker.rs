use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Owned drive source for the section countdown: one message per period.
///
/// The countdown itself is pure (`SectionTimer::tick`); this handle only
/// supplies the once-per-second heartbeat. Dropping the handle aborts the
/// underlying task unconditionally, so a ticker can never outlive the
/// screen that acquired it and keep accruing time against a stale section.
#[derive(Debug)]
pub struct Ticker {
    rx: mpsc::Receiver<()>,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Starts a one-second ticker. Must be called within a tokio runtime.
    #[must_use]
    pub fn every_second() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    /// Starts a ticker with an arbitrary period.
    #[must_use]
    pub fn with_period(period: Duration) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first interval tick completes immediately; the heartbeat
            // starts one full period in.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
        Self { rx, handle }
    }

    /// Waits for the next heartbeat. Returns `false` once the ticker task
    /// has stopped.
    pub async fn next(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
