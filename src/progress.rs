//! Terminal progress bar for reprojection operations.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::operation::{OperationState, ProgressSink};

const TICKS: u64 = 1000;

/// Renders operation progress as a bar on stderr.
pub struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    /// A bar labelled with `message`. Hidden entirely when `hidden` is set.
    pub fn new(message: impl Into<String>, hidden: bool) -> Self {
        let bar = ProgressBar::new(TICKS);
        if hidden {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        if let Ok(style) =
            ProgressStyle::with_template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent:>3}%")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_message(message.into());
        Self { bar }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ProgressSink for TerminalProgress {
    fn update_progress(&mut self, fraction: f64) {
        self.bar
            .set_position((fraction.clamp(0.0, 1.0) * TICKS as f64).round() as u64);
    }

    fn finished(&mut self, state: OperationState) {
        match state {
            OperationState::Completed => self.bar.finish(),
            _ => self.bar.abandon_with_message(format!("{}", state)),
        }
    }
}
