//! Terminal progress for relaxation runs and transitions

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static STAGE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    let template = format!(
        "{{prefix:>10}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
    );
    ProgressStyle::default_bar()
        .template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// One progress bar per stage (density layer or transition)
pub struct ProgressManager {
    multi_progress: MultiProgress,
    bars: Vec<ProgressBar>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create a progress manager with no stages
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            bars: Vec::new(),
        }
    }

    /// Add a bar for a stage of `length` steps and return its index
    pub fn start_stage(&mut self, label: &str, length: usize) -> usize {
        let bar = ProgressBar::new(length as u64);
        bar.set_style(STAGE_STYLE.clone());
        bar.set_prefix(label.to_string());
        self.bars.push(self.multi_progress.add(bar));
        self.bars.len() - 1
    }

    /// Report the current step of a stage
    pub fn update(&self, stage: usize, position: usize, stipple_count: usize) {
        if let Some(bar) = self.bars.get(stage) {
            bar.set_position(position as u64);
            bar.set_message(format!("{stipple_count} stipples"));
        }
    }

    /// Mark a stage as done
    pub fn complete(&self, stage: usize, message: &str) {
        if let Some(bar) = self.bars.get(stage) {
            bar.finish_with_message(format!("✓ {message}"));
        }
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        let _ = self.multi_progress.clear();
    }

    /// Number of stages started
    pub fn stage_count(&self) -> usize {
        self.bars.len()
    }
}
