use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use log::debug;
use tokio::sync::{mpsc, oneshot};

use crate::error::{AppError, Result};

use super::throttle::{IntervalHandle, Throttle};

type Job<T> = Box<dyn FnOnce() -> BoxFuture<'static, Result<T>> + Send>;

struct QueueEntry<T> {
    job: Job<T>,
    reply: oneshot::Sender<Result<T>>,
}

/// Process-wide serialization of remote calls.
///
/// Every call is appended to one channel drained by a single worker task, so
/// at most one request is ever in flight and calls reach the network in
/// enqueue order. Each entry's outcome travels back over its own oneshot
/// channel: a failing job settles only the caller that enqueued it, and the
/// worker moves on to the next entry regardless.
pub struct SerialQueue<T> {
    tx: mpsc::UnboundedSender<QueueEntry<T>>,
    interval: IntervalHandle,
}

impl<T: Send + 'static> SerialQueue<T> {
    /// Spawns the worker loop. The throttle lives inside the worker, which is
    /// the only place that ever waits on it.
    pub fn new(min_interval: Duration) -> Self {
        let interval = IntervalHandle::new(min_interval);
        let (tx, mut rx) = mpsc::unbounded_channel::<QueueEntry<T>>();
        let mut throttle = Throttle::new(interval.clone());

        tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                throttle.wait_turn().await;
                let outcome = (entry.job)().await;
                // The caller may have gone away; the queue itself never stops.
                let _ = entry.reply.send(outcome);
            }
            debug!("dispatch queue closed, worker exiting");
        });

        Self { tx, interval }
    }

    /// Retargets the minimum spacing between calls. Takes effect for the next
    /// scheduled call; a wait already in progress keeps its old deadline.
    pub fn set_interval(&self, interval: Duration) {
        self.interval.set(interval);
    }

    pub fn interval(&self) -> Duration {
        self.interval.get()
    }

    /// Appends a call to the queue and waits for its own outcome. The task
    /// runs once all earlier entries have completed, successfully or not.
    pub async fn dispatch<F, Fut>(&self, make_job: F) -> Result<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        let entry = QueueEntry {
            job: Box::new(move || Box::pin(make_job())),
            reply,
        };

        self.tx
            .send(entry)
            .map_err(|_| AppError::message("dispatch queue is no longer running"))?;

        response
            .await
            .map_err(|_| AppError::message("dispatch queue dropped the call"))?
    }
}
