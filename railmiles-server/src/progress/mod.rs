//! Background tasks and progress streaming.
//!
//! Resolving a journey's distance takes several round trips to RTT, so
//! it runs in a background task. The client gets a token straight away
//! and follows the task's progress as a stream of events.

mod event;
mod registry;
mod task;

use std::future::Future;

pub use event::{EventKind, ProgressEvent};
pub use registry::{
    CHANNEL_CAPACITY, ProcessorId, ProcessorRegistry, ProgressSender, ProgressStream,
    RegistryError,
};
pub use task::{CreationError, spawn_journey_creation};

/// Somewhere to report intermediate progress.
pub trait ProgressSink: Send + Sync {
    fn status(&self, message: String) -> impl Future<Output = ()> + Send;
}
