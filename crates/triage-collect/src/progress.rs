//! Progress reporting and cancellation for collectors

use tokio::sync::{mpsc, watch};
use tracing::trace;

/// Events emitted while collectors run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    CollectorStarted { collector: String },
    ImageCollected {
        collector: String,
        image: String,
        completed: usize,
        total: usize,
    },
    CollectorFinished { collector: String },
    CollectorFailed { collector: String, message: String },
}

/// Non-blocking sender for [`ProgressEvent`]s.
///
/// A full or closed channel drops the event; collectors never wait on a slow
/// consumer.
#[derive(Debug, Clone, Default)]
pub struct ProgressSender {
    tx: Option<mpsc::Sender<ProgressEvent>>,
}

impl ProgressSender {
    pub fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Discard every event
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn send(&self, event: ProgressEvent) {
        let Some(tx) = &self.tx else { return };
        if let Err(e) = tx.try_send(event) {
            trace!(error = %e, "dropped progress event");
        }
    }
}

/// Trips every [`CancelToken`] cloned from it
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observes cancellation
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that is never cancelled
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled; pends forever if the handle is dropped first
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// A linked handle and token
pub fn cancellation() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}
