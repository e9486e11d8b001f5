//! Terminal rendering of scan progress.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;
use tmclust::engine::progress::{Placement, ScanObserver};
use tracing::warn;

/// Draws the clustering scan as a progress bar on stderr and prints a
/// summary line once the partition is final. The bar slot is created by
/// `scan_started` and cleared by `scan_finished`; events outside that
/// window are ignored.
pub struct CliProgressHandler {
    multi: MultiProgress,
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr_with_hz(12))
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let multi = MultiProgress::new();
        multi.set_draw_target(target);
        Self {
            multi,
            bar: Mutex::new(None),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<12} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸ ")
    }
}

impl ScanObserver for CliProgressHandler {
    fn scan_started(&self, pending: u64) {
        let bar = self.multi.add(ProgressBar::new(pending));
        bar.set_style(Self::bar_style());
        bar.set_message("clustering");

        match self.bar.lock() {
            Ok(mut slot) => *slot = Some(bar),
            Err(_) => warn!("progress state poisoned; bar disabled"),
        }
    }

    fn chain_placed(&self, _placement: Placement) {
        if let Ok(slot) = self.bar.lock() {
            if let Some(bar) = slot.as_ref() {
                bar.inc(1);
            }
        }
    }

    fn scan_finished(&self, clusters: usize) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
        self.multi.println(format!("✓ {clusters} clusters")).ok();
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
