//! Single-flight FIFO request queue.
//!
//! Every outbound CMS call is wrapped in a future and handed to [`RateLimiter::enqueue`]. One
//! drain loop at a time pops the oldest task, runs it to completion on its own tokio task, then
//! sleeps for `1s / requests_per_second` before taking the next one. When the queue runs dry the
//! loop exits; the next enqueue starts a fresh one.
//!
//! Tasks never overlap and start in submission order. A failing task only fails its own
//! [`Pending`]; a panicking task is contained by its tokio task and surfaces to its caller as
//! [`GatewayError::TaskAborted`].

use crate::GatewayError;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

const QUOTA_WINDOW: Duration = Duration::from_secs(1);

#[derive(Default)]
struct QueueState {
    queue: VecDeque<Job>,
    draining: bool,
}

/// Serialises tasks at a fixed maximum rate.
///
/// Construct once per process and share it by `Arc` with every client that talks to the CMS.
pub struct RateLimiter {
    interval: Duration,
    requests_per_second: u32,
    state: Mutex<QueueState>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("interval", &self.interval)
            .field("pending", &self.pending())
            .field("draining", &self.is_draining())
            .finish()
    }
}

impl RateLimiter {
    /// Creates a limiter allowing `requests_per_second` task starts per second (minimum 1).
    pub fn new(requests_per_second: u32) -> Self {
        let requests_per_second = requests_per_second.max(1);
        Self {
            interval: Duration::from_secs(1) / requests_per_second,
            requests_per_second,
            state: Mutex::new(QueueState::default()),
        }
    }

    /// The pause between the end of one task and the start of the next.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of tasks waiting to start.
    pub fn pending(&self) -> usize {
        self.lock_state().queue.len()
    }

    /// Returns true while a drain loop is running.
    pub fn is_draining(&self) -> bool {
        self.lock_state().draining
    }

    /// Queues `task` and returns immediately.
    ///
    /// The returned [`Pending`] resolves with exactly the task's output once it has run. Must be
    /// called from within a tokio runtime.
    pub fn enqueue<F, T>(self: &Arc<Self>, task: F) -> Pending<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            let output = task.await;
            // The caller may have stopped waiting; the task still counted against the rate.
            let _ = tx.send(output);
        });

        let start_drain = {
            let mut state = self.lock_state();
            state.queue.push_back(job);
            !std::mem::replace(&mut state.draining, true)
        };

        if start_drain {
            tokio::spawn(Arc::clone(self).drain());
        }

        Pending { rx }
    }

    async fn drain(self: Arc<Self>) {
        let mut starts: VecDeque<Instant> = VecDeque::new();
        let mut quota_warned = false;

        loop {
            let job = {
                let mut state = self.lock_state();
                match state.queue.pop_front() {
                    Some(job) => job,
                    None => {
                        state.draining = false;
                        return;
                    }
                }
            };

            let now = Instant::now();
            while starts
                .front()
                .is_some_and(|t| now.duration_since(*t) >= QUOTA_WINDOW)
            {
                starts.pop_front();
            }
            starts.push_back(now);
            if !quota_warned && starts.len() >= self.requests_per_second as usize {
                quota_warned = true;
                tracing::warn!(
                    requests_per_second = self.requests_per_second,
                    pending = self.pending(),
                    "CMS request rate has reached the configured ceiling"
                );
            }

            if let Err(err) = tokio::spawn(job).await {
                tracing::error!(error = %err, "rate-limited task did not complete");
            }

            tokio::time::sleep(self.interval).await;
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The eventual output of a task queued on a [`RateLimiter`].
#[must_use = "a queued task's result is lost unless the Pending is awaited"]
pub struct Pending<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Future for Pending<T> {
    type Output = Result<T, GatewayError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.map_err(|_| GatewayError::TaskAborted))
    }
}
