use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Coordinate;
use crate::extractor::ProgressSink;
use crate::result::TileOutcome;

/// Terminal progress bar for tile extraction
pub struct ProgressTracker {
    bar: ProgressBar,
}

impl ProgressTracker {
    pub fn new(total: u64, description: &str) -> Self {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        bar.set_message(description.to_string());

        ProgressTracker { bar }
    }

    /// Tracker that draws nothing
    pub fn hidden() -> Self {
        ProgressTracker {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn increment(&self, amount: u64) {
        self.bar.inc(amount);
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Completed");
    }

    pub fn set_message(&self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ProgressSink for ProgressTracker {
    fn tile_started(&self, _index: usize, coordinate: Coordinate) {
        self.set_message(&format!("tile ({}, {})", coordinate.x, coordinate.y));
    }

    fn tile_finished(&self, _index: usize, _outcome: &TileOutcome) {
        self.increment(1);
    }
}
