//! Human-readable log sinks for parse passes
//!
//! The parser reports notices and per-category summaries through a
//! [`LogSink`] supplied by the caller, so a front end can route them to its
//! own log view.

/// Receiver for human-readable pass messages
pub trait LogSink {
    fn log(&mut self, message: &str);
}

impl<F: FnMut(&str)> LogSink for F {
    fn log(&mut self, message: &str) {
        self(message)
    }
}

/// Forwards messages to `tracing` at INFO level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&mut self, message: &str) {
        tracing::info!("{}", message);
    }
}

/// Discards every message
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&mut self, _message: &str) {}
}

/// Collects messages in memory
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    pub messages: Vec<String>,
}

impl LogSink for VecSink {
    fn log(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
