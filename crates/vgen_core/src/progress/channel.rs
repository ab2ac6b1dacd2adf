//! Bounded progress fan-out for consumers that cannot run on the reader task.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::models::{ProgressEvent, ProgressListener};

/// Create a bounded progress channel.
///
/// The returned listener can be installed on a pipeline; it never blocks.
/// When the receiver falls behind by more than `capacity` events the oldest
/// ones are dropped.
pub fn channel(capacity: usize) -> (ProgressListener, ProgressReceiver) {
    let (tx, rx) = broadcast::channel(capacity.max(1));
    let listener: ProgressListener = Arc::new(move |event: &ProgressEvent| {
        // No receiver left means nobody is watching; nothing to do.
        let _ = tx.send(event.clone());
    });
    (listener, ProgressReceiver { rx })
}

/// Receiving half of [`channel`].
#[derive(Debug)]
pub struct ProgressReceiver {
    rx: broadcast::Receiver<ProgressEvent>,
}

impl ProgressReceiver {
    /// Wait for the next event.
    ///
    /// Returns `None` once every listener clone has been dropped and the
    /// buffer is drained.
    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("Progress receiver lagged, dropped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
