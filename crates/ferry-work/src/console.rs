// console.rs — Progress and warning sink.
//
// Transformations report what they are doing and anything suspicious
// through a Console supplied by the caller. The console never influences
// control flow; nothing it returns is consumed.

use std::sync::Mutex;

/// Where transformations send progress and warnings.
pub trait Console {
    /// Short status line for the step being run.
    fn progress(&self, message: &str);

    /// Something looks wrong but the migration continues.
    fn warn(&self, message: &str);

    /// Informational output.
    fn info(&self, message: &str);
}

/// Console that forwards everything to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogConsole;

impl Console for LogConsole {
    fn progress(&self, message: &str) {
        tracing::info!(target: "ferry::progress", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

/// A message recorded by [`CapturingConsole`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleMessage {
    Progress(String),
    Warn(String),
    Info(String),
}

/// Console that records messages in memory.
///
/// Useful in tests and for callers that want to show the output later.
#[derive(Debug, Default)]
pub struct CapturingConsole {
    messages: Mutex<Vec<ConsoleMessage>>,
}

impl CapturingConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<ConsoleMessage> {
        self.lock().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|m| match m {
                ConsoleMessage::Warn(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn progress_messages(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|m| match m {
                ConsoleMessage::Progress(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ConsoleMessage>> {
        // A poisoned lock still holds valid messages.
        self.messages.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, message: ConsoleMessage) {
        self.lock().push(message);
    }
}

impl Console for CapturingConsole {
    fn progress(&self, message: &str) {
        tracing::debug!(target: "ferry::progress", "{}", message);
        self.record(ConsoleMessage::Progress(message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.record(ConsoleMessage::Warn(message.to_string()));
    }

    fn info(&self, message: &str) {
        self.record(ConsoleMessage::Info(message.to_string()));
    }
}
