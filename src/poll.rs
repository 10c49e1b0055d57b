//! Background feed polling.
//!
//! Runs on a dedicated thread that owns the [`PollCoordinator`]: one poll
//! immediately, then one per interval, with results sent to the UI thread
//! over an [`mpsc`] channel.
//!
//! ## For contributors
//!
//! Polls never overlap. The thread finishes a poll before it looks at the
//! clock again, and any tick whose deadline passed during a slow poll is
//! skipped rather than queued, so a hung endpoint cannot cause a burst of
//! catch-up requests.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::coordinator::{PollCoordinator, PollOutcome};
use crate::source::FeedFetcher;

/// Messages sent from the poller thread to the UI thread.
#[derive(Debug)]
pub enum PollMsg {
    /// A successful poll, records in feed order.
    Rendered(PollOutcome),
    /// A failed poll; `banner` is the outage message to show.
    Failed { banner: String },
}

/// Owner side of the poller thread.
///
/// Dropping the handle stops the thread: its pending wait ends at once and
/// no further poll is started.
pub struct PollHandle {
    pub rx: mpsc::Receiver<PollMsg>,
    stop: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Stop the thread and wait for it. A poll already in flight finishes
    /// first; requests are bounded by the client timeout.
    pub fn shutdown(mut self) {
        self.stop.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop.take();
    }
}

/// Next deadline after `prev` that is still in the future at `now`, and how
/// many ticks were skipped to get there.
pub fn next_deadline(prev: Instant, interval: Duration, now: Instant) -> (Instant, u32) {
    let mut deadline = prev + interval;
    let mut skipped = 0;
    while deadline <= now {
        deadline += interval;
        skipped += 1;
    }
    (deadline, skipped)
}

/// Spawn the background polling thread.
pub fn spawn<F>(mut coordinator: PollCoordinator<F>, interval: Duration) -> PollHandle
where
    F: FeedFetcher + 'static,
{
    let (tx, rx) = mpsc::channel();
    let (stop_tx, stop_rx) = mpsc::channel::<()>();

    let thread = thread::spawn(move || {
        let mut deadline = Instant::now();
        loop {
            let msg = match coordinator.poll() {
                Ok(outcome) => PollMsg::Rendered(outcome),
                Err(_) => PollMsg::Failed {
                    banner: coordinator.status().banner().unwrap_or_default(),
                },
            };
            // If the receiver is gone the UI has exited; stop polling.
            if tx.send(msg).is_err() {
                return;
            }

            let (next, skipped) = next_deadline(deadline, interval, Instant::now());
            if skipped > 0 {
                tracing::debug!(skipped, "poll overran its interval, skipping ticks");
            }
            deadline = next;

            match stop_rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("poller stopped");
                    return;
                }
            }
        }
    });

    PollHandle {
        rx,
        stop: Some(stop_tx),
        thread: Some(thread),
    }
}
