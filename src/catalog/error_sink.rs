//! Collector for per-item failure messages

/// Accumulates human-readable failure messages for the whole run
///
/// Messages are logged as they arrive and kept for the final summary.
#[derive(Debug, Default)]
pub struct ErrorSink {
    messages: Vec<String>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a failure message
    pub fn record(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.messages.push(message);
    }

    /// Appends every message from another collection, in order
    pub fn extend<I>(&mut self, messages: I)
    where
        I: IntoIterator<Item = String>,
    {
        for message in messages {
            self.record(message);
        }
    }

    /// Returns all recorded messages
    ///
    /// The sink is not cleared; it stays readable for the rest of the run.
    pub fn drain(&self) -> &[String] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
