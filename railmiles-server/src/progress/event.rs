//! Progress events and their server-sent-event framing.

use std::fmt;

/// What a progress event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Intermediate progress; more events follow.
    Status,
    /// The task succeeded. The message carries its result.
    Finished,
    /// The task failed. The message is shown to the user.
    Error,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Status => "status",
            EventKind::Finished => "finished",
            EventKind::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event in a task's progress stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub kind: EventKind,
    pub message: String,
}

impl ProgressEvent {
    pub fn status(message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Status,
            message: message.into(),
        }
    }

    pub fn finished(message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Finished,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Error,
            message: message.into(),
        }
    }

    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        self.kind != EventKind::Status
    }

    /// Render as a `text/event-stream` frame.
    ///
    /// Each line of the message becomes its own `data:` field, so
    /// multi-line messages survive the trip intact.
    pub fn to_sse_frame(&self) -> String {
        let mut frame = format!("event: {}\n", self.kind);
        if !self.message.is_empty() {
            for line in self.message.split('\n') {
                frame.push_str("data: ");
                frame.push_str(line);
                frame.push('\n');
            }
        }
        frame.push('\n');
        frame
    }
}
