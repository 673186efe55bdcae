//! Where the parser reports errors, warnings and progress messages.

use std::{cell::RefCell, fmt};

/// A write-only, three-channel log.
///
/// Messages arrive pre-formatted, call sites use `format_args!`.
pub trait LogSink {
    fn error(&self, args: fmt::Arguments<'_>);
    fn warn(&self, args: fmt::Arguments<'_>);
    fn message(&self, args: fmt::Arguments<'_>);
}

/// Prints to stdout with a `[ERROR]`/`[WARN]`/`[MSG]` prefix. Used when no sink is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;
impl LogSink for StdoutSink {
    fn error(&self, args: fmt::Arguments<'_>) {
        println!("[ERROR] {}", args);
    }
    fn warn(&self, args: fmt::Arguments<'_>) {
        println!("[WARN] {}", args);
    }
    fn message(&self, args: fmt::Arguments<'_>) {
        println!("[MSG] {}", args);
    }
}

/// Forwards to the `tracing` macros, messages at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;
impl LogSink for TracingSink {
    fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!("{}", args);
    }
    fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!("{}", args);
    }
    fn message(&self, args: fmt::Arguments<'_>) {
        tracing::info!("{}", args);
    }
}

/// Keeps every line, prefixed like [StdoutSink] does.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: RefCell<Vec<String>>,
}
impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.with_prefix("[ERROR] ")
    }

    pub fn warnings(&self) -> Vec<String> {
        self.with_prefix("[WARN] ")
    }

    fn with_prefix(&self, prefix: &str) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter_map(|l| l.strip_prefix(prefix))
            .map(str::to_owned)
            .collect()
    }

    fn push(&self, prefix: &str, args: fmt::Arguments<'_>) {
        self.lines.borrow_mut().push(format!("{}{}", prefix, args));
    }
}
impl LogSink for MemorySink {
    fn error(&self, args: fmt::Arguments<'_>) {
        self.push("[ERROR] ", args);
    }
    fn warn(&self, args: fmt::Arguments<'_>) {
        self.push("[WARN] ", args);
    }
    fn message(&self, args: fmt::Arguments<'_>) {
        self.push("[MSG] ", args);
    }
}
