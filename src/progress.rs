//! Progress reporting and cancellation for update runs.
//!
//! The engine reports byte totals and completion through the update callback;
//! the bridge forwards them to a [`ProgressReporter`]. A reporter can stop
//! the run by returning `false` from [`ProgressReporter::on_progress`] or by
//! answering `true` from [`ProgressReporter::should_cancel`].
//!
//! # Example
//!
//! ```rust
//! use arcweave::progress::{AtomicProgress, ProgressReporter};
//! use arcweave::UpdateOptions;
//!
//! let progress = AtomicProgress::shared();
//! let options = UpdateOptions::new().progress(progress.clone());
//!
//! // Another thread may call `progress.cancel()` to stop the run.
//! assert!(!progress.is_cancelled());
//! # let _ = options;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Progress reporting trait for update runs.
///
/// Every method has a no-op default so implementors override only what they
/// need.
pub trait ProgressReporter: Send {
    /// Called when the engine announces the total number of bytes to process.
    fn on_total(&mut self, total_bytes: u64) {
        let _ = total_bytes;
    }

    /// Called as the engine makes progress.
    ///
    /// Returns `true` to continue or `false` to request cancellation.
    fn on_progress(&mut self, bytes_processed: u64, total_bytes: u64) -> bool {
        let _ = (bytes_processed, total_bytes);
        true
    }

    /// Called when the engine reports input and packed sizes.
    fn on_ratio(&mut self, input_bytes: u64, output_bytes: u64) {
        let _ = (input_bytes, output_bytes);
    }

    /// Called when the engine requests the data of an item.
    fn on_entry_start(&mut self, entry_name: &str, size: u64) {
        let _ = (entry_name, size);
    }

    /// Called when the engine reports the outcome of an item.
    fn on_entry_complete(&mut self, entry_name: &str, success: bool) {
        let _ = (entry_name, success);
    }

    /// Called for every item whose data could not be opened.
    fn on_warning(&mut self, message: &str) {
        let _ = message;
    }

    /// Checks if cancellation has been requested.
    ///
    /// Consulted before an item's data is handed to the engine.
    fn should_cancel(&self) -> bool {
        false
    }
}

impl<P: ProgressReporter + ?Sized> ProgressReporter for Box<P> {
    fn on_total(&mut self, total_bytes: u64) {
        (**self).on_total(total_bytes);
    }

    fn on_progress(&mut self, bytes_processed: u64, total_bytes: u64) -> bool {
        (**self).on_progress(bytes_processed, total_bytes)
    }

    fn on_ratio(&mut self, input_bytes: u64, output_bytes: u64) {
        (**self).on_ratio(input_bytes, output_bytes);
    }

    fn on_entry_start(&mut self, entry_name: &str, size: u64) {
        (**self).on_entry_start(entry_name, size);
    }

    fn on_entry_complete(&mut self, entry_name: &str, success: bool) {
        (**self).on_entry_complete(entry_name, success);
    }

    fn on_warning(&mut self, message: &str) {
        (**self).on_warning(message);
    }

    fn should_cancel(&self) -> bool {
        (**self).should_cancel()
    }
}

/// Progress state collected over a run.
#[derive(Debug, Clone)]
pub struct ProgressState {
    /// Total bytes to process.
    pub total_bytes: u64,
    /// Bytes processed so far.
    pub processed_bytes: u64,
    /// Packed bytes written by the engine.
    pub packed_bytes: u64,
    /// Item whose data was most recently requested.
    pub current_entry: Option<String>,
    /// Number of items the engine reported as done.
    pub entries_processed: usize,
    /// Number of those items the engine reported as failed.
    pub entries_failed: usize,
    /// Processing start time.
    pub start_time: Instant,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            total_bytes: 0,
            processed_bytes: 0,
            packed_bytes: 0,
            current_entry: None,
            entries_processed: 0,
            entries_failed: 0,
            start_time: Instant::now(),
        }
    }
}

impl ProgressState {
    /// Creates a new progress state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the completion percentage (0.0 - 100.0).
    pub fn percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            (self.processed_bytes as f64 / self.total_bytes as f64) * 100.0
        }
    }

    /// Returns the compression ratio (packed / unpacked).
    pub fn compression_ratio(&self) -> f64 {
        if self.processed_bytes == 0 {
            1.0
        } else {
            self.packed_bytes as f64 / self.processed_bytes as f64
        }
    }

    /// Returns elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// A progress reporter that does nothing.
#[derive(Debug, Default, Clone)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}

/// A progress reporter that collects statistics and warnings.
#[derive(Debug, Default, Clone)]
pub struct StatisticsProgress {
    /// The progress state.
    pub state: ProgressState,
    /// Whether cancellation was requested.
    pub cancelled: bool,
    /// Warnings collected.
    pub warnings: Vec<String>,
}

impl StatisticsProgress {
    /// Creates a new statistics progress reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected state.
    pub fn state(&self) -> &ProgressState {
        &self.state
    }
}

impl ProgressReporter for StatisticsProgress {
    fn on_total(&mut self, total_bytes: u64) {
        self.state.total_bytes = total_bytes;
    }

    fn on_progress(&mut self, bytes_processed: u64, _total_bytes: u64) -> bool {
        self.state.processed_bytes = bytes_processed;
        !self.cancelled
    }

    fn on_ratio(&mut self, _input_bytes: u64, output_bytes: u64) {
        self.state.packed_bytes = output_bytes;
    }

    fn on_entry_start(&mut self, entry_name: &str, _size: u64) {
        self.state.current_entry = Some(entry_name.to_string());
    }

    fn on_entry_complete(&mut self, _entry_name: &str, success: bool) {
        self.state.entries_processed += 1;
        if !success {
            self.state.entries_failed += 1;
        }
        self.state.current_entry = None;
    }

    fn on_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn should_cancel(&self) -> bool {
        self.cancelled
    }
}

/// A thread-safe progress reporter using atomics.
///
/// Share it through [`AtomicProgress::shared`] to watch a run, or cancel it,
/// from another thread.
#[derive(Debug)]
pub struct AtomicProgress {
    total_bytes: AtomicU64,
    processed_bytes: AtomicU64,
    entries_processed: AtomicU64,
    cancelled: AtomicBool,
}

impl Default for AtomicProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomicProgress {
    /// Creates a new atomic progress reporter.
    pub fn new() -> Self {
        Self {
            total_bytes: AtomicU64::new(0),
            processed_bytes: AtomicU64::new(0),
            entries_processed: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Creates a shared atomic progress reporter.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns total bytes to process.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes.load(Ordering::Relaxed)
    }

    /// Returns processed bytes.
    pub fn processed_bytes(&self) -> u64 {
        self.processed_bytes.load(Ordering::Relaxed)
    }

    /// Returns the number of items the engine finished.
    pub fn entries_processed(&self) -> u64 {
        self.entries_processed.load(Ordering::Relaxed)
    }

    /// Returns whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns completion percentage (0.0 - 100.0).
    pub fn percentage(&self) -> f64 {
        let total = self.total_bytes();
        if total == 0 {
            0.0
        } else {
            (self.processed_bytes() as f64 / total as f64) * 100.0
        }
    }

    fn record_total(&self, total_bytes: u64) {
        self.total_bytes.store(total_bytes, Ordering::Relaxed);
    }

    fn record_progress(&self, bytes_processed: u64) -> bool {
        self.processed_bytes
            .store(bytes_processed, Ordering::Relaxed);
        !self.is_cancelled()
    }

    fn record_entry(&self) {
        self.entries_processed.fetch_add(1, Ordering::Relaxed);
    }
}

impl ProgressReporter for AtomicProgress {
    fn on_total(&mut self, total_bytes: u64) {
        self.record_total(total_bytes);
    }

    fn on_progress(&mut self, bytes_processed: u64, _total_bytes: u64) -> bool {
        self.record_progress(bytes_processed)
    }

    fn on_entry_complete(&mut self, _entry_name: &str, _success: bool) {
        self.record_entry();
    }

    fn should_cancel(&self) -> bool {
        self.is_cancelled()
    }
}

/// Progress reporter for shared `Arc<AtomicProgress>`.
impl ProgressReporter for Arc<AtomicProgress> {
    fn on_total(&mut self, total_bytes: u64) {
        self.record_total(total_bytes);
    }

    fn on_progress(&mut self, bytes_processed: u64, _total_bytes: u64) -> bool {
        self.record_progress(bytes_processed)
    }

    fn on_entry_complete(&mut self, _entry_name: &str, _success: bool) {
        self.record_entry();
    }

    fn should_cancel(&self) -> bool {
        self.is_cancelled()
    }
}

/// A progress reporter that calls a closure.
pub struct ClosureProgress<F> {
    callback: F,
}

impl<F> ClosureProgress<F>
where
    F: FnMut(u64, u64) -> bool + Send,
{
    /// Creates a progress reporter from a closure.
    ///
    /// The closure receives (bytes_processed, total_bytes) and returns
    /// `true` to continue or `false` to cancel.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgress<F>
where
    F: FnMut(u64, u64) -> bool + Send,
{
    fn on_progress(&mut self, bytes_processed: u64, total_bytes: u64) -> bool {
        (self.callback)(bytes_processed, total_bytes)
    }
}

/// Creates a closure-based progress reporter.
pub fn progress_fn<F>(f: F) -> ClosureProgress<F>
where
    F: FnMut(u64, u64) -> bool + Send,
{
    ClosureProgress::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_state_percentage() {
        let mut state = ProgressState::new();
        state.total_bytes = 100;
        state.processed_bytes = 25;
        assert!((state.percentage() - 25.0).abs() < 0.001);
    }

    #[test]
    fn test_progress_state_empty() {
        let state = ProgressState::new();
        assert_eq!(state.percentage(), 0.0);
        assert_eq!(state.compression_ratio(), 1.0);
    }

    #[test]
    fn test_no_progress() {
        let mut progress = NoProgress;
        assert!(progress.on_progress(50, 100));
        assert!(!progress.should_cancel());
    }

    #[test]
    fn test_statistics_progress() {
        let mut progress = StatisticsProgress::new();
        progress.on_total(1000);
        progress.on_entry_start("a.txt", 500);
        assert_eq!(progress.state().current_entry.as_deref(), Some("a.txt"));
        progress.on_progress(250, 1000);
        progress.on_entry_complete("a.txt", true);
        progress.on_entry_complete("b.txt", false);
        progress.on_warning("b.txt: missing");

        assert_eq!(progress.state().total_bytes, 1000);
        assert_eq!(progress.state().processed_bytes, 250);
        assert_eq!(progress.state().entries_processed, 2);
        assert_eq!(progress.state().entries_failed, 1);
        assert!(progress.state().current_entry.is_none());
        assert_eq!(progress.warnings, vec!["b.txt: missing".to_string()]);
    }

    #[test]
    fn test_statistics_cancellation() {
        let mut progress = StatisticsProgress::new();
        assert!(progress.on_progress(50, 100));

        progress.cancelled = true;
        assert!(!progress.on_progress(75, 100));
        assert!(progress.should_cancel());
    }

    #[test]
    fn test_atomic_progress() {
        let progress = AtomicProgress::shared();
        let mut reporter: Arc<AtomicProgress> = Arc::clone(&progress);

        reporter.on_total(1000);
        reporter.on_progress(500, 1000);
        reporter.on_entry_complete("x", true);

        assert_eq!(progress.total_bytes(), 1000);
        assert_eq!(progress.processed_bytes(), 500);
        assert_eq!(progress.entries_processed(), 1);
        assert!((progress.percentage() - 50.0).abs() < 0.001);

        progress.cancel();
        assert!(!reporter.on_progress(600, 1000));
        assert!(reporter.should_cancel());
    }

    #[test]
    fn test_boxed_reporter_forwards() {
        let mut boxed: Box<dyn ProgressReporter> = Box::new(StatisticsProgress {
            cancelled: true,
            ..Default::default()
        });
        assert!(boxed.should_cancel());
        assert!(!boxed.on_progress(1, 2));
    }

    #[test]
    fn test_closure_progress() {
        let mut count = 0;
        let mut progress = progress_fn(|bytes, total| {
            count += 1;
            bytes < total
        });

        assert!(progress.on_progress(50, 100));
        assert!(progress.on_progress(99, 100));
        assert!(!progress.on_progress(100, 100));
        assert_eq!(count, 3);
    }
}
