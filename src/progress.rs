//! Progress reporting and cooperative cancellation.
//!
//! Long stages poll [`ProgressSink::is_cancelled`] between units of
//! work; nothing is ever interrupted mid-operation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::info;

/// Shared cancellation flag, flipped once and polled cooperatively.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Surface the run reports progress through.
///
/// Implementations must tolerate being driven from a single thread in
/// strict sequence; `set_max` precedes any `set_value` or `add`.
pub trait ProgressSink {
    fn set_max(&self, max: usize);
    fn set_value(&self, value: usize);
    fn add(&self, delta: usize);
    fn set_message(&self, message: &str);
    fn is_cancelled(&self) -> bool;
    fn show(&self, message: &str);
    fn hide(&self);
    /// Ask whether to continue into the post-processing stages.
    fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Log-backed progress surface for headless runs.
#[derive(Debug)]
pub struct LogProgress {
    max: AtomicUsize,
    value: AtomicUsize,
    cancel: CancelFlag,
    auto_continue: bool,
}

impl LogProgress {
    pub fn new(cancel: CancelFlag, auto_continue: bool) -> Self {
        Self {
            max: AtomicUsize::new(0),
            value: AtomicUsize::new(0),
            cancel,
            auto_continue,
        }
    }
}

impl ProgressSink for LogProgress {
    fn set_max(&self, max: usize) {
        self.max.store(max, Ordering::Relaxed);
    }

    fn set_value(&self, value: usize) {
        self.value.store(value, Ordering::Relaxed);
    }

    fn add(&self, delta: usize) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }

    fn set_message(&self, message: &str) {
        info!(
            "{} [{}/{}]",
            message,
            self.value.load(Ordering::Relaxed),
            self.max.load(Ordering::Relaxed)
        );
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn show(&self, message: &str) {
        info!("{message}");
    }

    fn hide(&self) {}

    fn confirm(&self, title: &str, message: &str) -> bool {
        info!("{title}: {message} (auto answer: {})", self.auto_continue);
        self.auto_continue
    }
}
