use std::sync::{Arc, Mutex};
use vulngate::prelude::*;

/// Mock ProgressReporter that records status lines and progress ticks.
///
/// Clones share the same buffers, so a test can keep one handle while the
/// use case owns another.
#[derive(Default, Clone)]
pub struct MockProgressReporter {
    messages: Arc<Mutex<Vec<String>>>,
    ticks: Arc<Mutex<Vec<(usize, usize)>>>,
}

impl MockProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    /// `(current, total)` pairs in the order they were reported.
    pub fn ticks(&self) -> Vec<(usize, usize)> {
        self.ticks.lock().unwrap().clone()
    }
}

impl ProgressReporter for MockProgressReporter {
    fn report(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn report_progress(&self, current: usize, total: usize, _message: Option<&str>) {
        self.ticks.lock().unwrap().push((current, total));
    }

    fn report_error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(format!("Error: {}", message));
    }

    fn report_completion(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(format!("Completed: {}", message));
    }
}
