//! Progress reporting for batches of pack operations

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

/// A trait for reporting progress while packing several paths
pub trait ProgressReporter {
    /// Called when a batch starts
    fn on_start(&self, total_paths: Option<u64>);

    /// Called after each path, with the number of paths handled so far
    fn on_progress(&self, paths_done: u64);

    /// Called when the batch finishes
    fn on_finish(&self, message: &str);
}

/// A no-op progress reporter
#[derive(Default)]
pub struct NoProgressReporter;

impl ProgressReporter for NoProgressReporter {
    fn on_start(&self, _total_paths: Option<u64>) {}
    fn on_progress(&self, _paths_done: u64) {}
    fn on_finish(&self, _message: &str) {}
}

/// Progress reporter using indicatif
#[cfg(feature = "progress")]
pub struct IndicatifProgressReporter {
    progress_bar: ProgressBar,
}

#[cfg(feature = "progress")]
impl IndicatifProgressReporter {
    /// Create a new indicatif progress reporter
    pub fn new(progress_bar: ProgressBar) -> Self {
        Self { progress_bar }
    }

    /// Create a new indicatif progress reporter with default styling
    pub fn with_default_style() -> Self {
        let progress_bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
        {
            progress_bar.set_style(style.progress_chars("#>-"));
        }
        Self::new(progress_bar)
    }
}

#[cfg(feature = "progress")]
impl ProgressReporter for IndicatifProgressReporter {
    fn on_start(&self, total_paths: Option<u64>) {
        if let Some(total) = total_paths {
            self.progress_bar.set_length(total);
        }
    }

    fn on_progress(&self, paths_done: u64) {
        self.progress_bar.set_position(paths_done);
    }

    fn on_finish(&self, message: &str) {
        self.progress_bar.finish_with_message(message.to_string());
    }
}

#[cfg(all(test, feature = "progress"))]
mod tests {
    use super::*;

    #[test]
    fn test_indicatif_reporter_tracks_paths() {
        let progress_bar = ProgressBar::hidden();
        let reporter = IndicatifProgressReporter::new(progress_bar.clone());

        reporter.on_start(Some(3));
        reporter.on_progress(2);
        assert_eq!(progress_bar.length(), Some(3));
        assert_eq!(progress_bar.position(), 2);

        reporter.on_finish("Packed 2 of 3 paths");
        assert!(progress_bar.is_finished());
        assert_eq!(progress_bar.message(), "Packed 2 of 3 paths");
    }
}
