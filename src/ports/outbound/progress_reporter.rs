/// ProgressReporter port for user-facing progress during a scan or sync
///
/// Kept separate from logging: progress goes to the terminal for people,
/// logs go to the configured tracing subscriber.
pub trait ProgressReporter: Send + Sync {
    /// Reports a status message
    fn report(&self, message: &str);

    /// Reports progress of a counted operation
    ///
    /// # Arguments
    /// * `current` - Items processed so far
    /// * `total` - Total items
    /// * `message` - Optional message to include
    fn report_progress(&self, current: usize, total: usize, message: Option<&str>);

    /// Reports a warning that does not stop the operation
    fn report_error(&self, message: &str);

    /// Reports completion of an operation
    fn report_completion(&self, message: &str);
}

/// Callback receiving `(completed, total)` while a batch of lookups runs.
pub type ProgressCallback<'a> = Box<dyn Fn(usize, usize) + Send + Sync + 'a>;
