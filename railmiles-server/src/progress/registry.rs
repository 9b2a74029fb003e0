//! Registry of in-flight background tasks and their progress channels.

use std::collections::HashMap;

use futures::Stream;
use tokio::sync::{Mutex, mpsc};
use tracing::debug;
use uuid::Uuid;

use super::ProgressSink;
use super::event::ProgressEvent;

/// Events buffered per task before the producer waits for the consumer.
pub const CHANNEL_CAPACITY: usize = 16;

/// Tracking token handed to the client for a background task.
pub type ProcessorId = Uuid;

/// Errors from the processor registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Unknown, already attached, or finished
    #[error("no processor with id {0}")]
    NotFound(ProcessorId),
}

/// Maps tracking tokens to the receiving end of each task's channel.
///
/// Each receiver can be taken exactly once. The lock only guards the map
/// and is never held across a channel operation.
#[derive(Debug, Default)]
pub struct ProcessorRegistry {
    processors: Mutex<HashMap<ProcessorId, mpsc::Receiver<ProgressEvent>>>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new task, returning its token and the producing end.
    pub async fn register(&self) -> (ProcessorId, ProgressSender) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        self.processors.lock().await.insert(id, rx);
        debug!(processor = %id, "registered processor");
        (id, ProgressSender { id, tx })
    }

    /// Take the event stream for `id`.
    pub async fn attach(&self, id: ProcessorId) -> Result<ProgressStream, RegistryError> {
        let rx = self
            .processors
            .lock()
            .await
            .remove(&id)
            .ok_or(RegistryError::NotFound(id))?;
        debug!(processor = %id, "attached to processor");
        Ok(ProgressStream { rx })
    }

    /// Forget `id`. Returns whether it was still registered.
    pub async fn remove(&self, id: ProcessorId) -> bool {
        self.processors.lock().await.remove(&id).is_some()
    }

    /// Number of tasks whose stream has not been attached or removed.
    pub async fn len(&self) -> usize {
        self.processors.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.processors.lock().await.is_empty()
    }
}

/// Producing end of a task's progress channel.
///
/// Terminal events consume the sender, so a task can end its stream only
/// once; the channel closes when the sender is dropped.
#[derive(Debug)]
pub struct ProgressSender {
    id: ProcessorId,
    tx: mpsc::Sender<ProgressEvent>,
}

impl ProgressSender {
    pub fn id(&self) -> ProcessorId {
        self.id
    }

    /// Report intermediate progress, waiting for buffer space if needed.
    pub async fn status(&self, message: impl Into<String>) {
        self.send(ProgressEvent::status(message)).await;
    }

    /// End the stream successfully.
    pub async fn finish(self, message: impl Into<String>) {
        self.send(ProgressEvent::finished(message)).await;
    }

    /// End the stream with an error.
    pub async fn fail(self, message: impl Into<String>) {
        self.send(ProgressEvent::error(message)).await;
    }

    async fn send(&self, event: ProgressEvent) {
        if self.tx.send(event).await.is_err() {
            debug!(processor = %self.id, "progress consumer has gone away");
        }
    }
}

impl ProgressSink for ProgressSender {
    async fn status(&self, message: String) {
        ProgressSender::status(self, message).await;
    }
}

/// Consuming end of a task's progress channel.
#[derive(Debug)]
pub struct ProgressStream {
    rx: mpsc::Receiver<ProgressEvent>,
}

impl ProgressStream {
    /// The next event, or `None` once the task has finished.
    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        self.rx.recv().await
    }

    /// The events as a stream, ending after the terminal event.
    pub fn into_stream(self) -> impl Stream<Item = ProgressEvent> + Send {
        futures::stream::unfold(self.rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        })
    }
}
