//! Terminal progress and confirmation for plan execution

use colored::Colorize;
use declarative::{ConfirmCallback, Error, Outcome, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};

use crate::ui;

const TEMPLATE: &str = "{spinner:.green} {prefix} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Progress bar over the resources of one pass
///
/// With `preview` set, the changes found by a dry-run pass are printed when
/// the pass completes, ahead of the confirmation prompt.
pub struct BarProgress {
    bar: Option<ProgressBar>,
    hidden: bool,
    preview: bool,
    pending: Vec<Outcome>,
    waiting: Vec<String>,
}

impl BarProgress {
    /// A reporter; `hidden` suppresses all drawing (quiet or JSON output).
    pub fn new(hidden: bool, preview: bool) -> Self {
        Self {
            bar: None,
            hidden,
            preview: preview && !hidden,
            pending: Vec::new(),
            waiting: Vec::new(),
        }
    }
}

impl ProgressCallback for BarProgress {
    fn on_batch_start(&mut self, count: usize, dry_run: bool) {
        let bar = if self.hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(count as u64)
        };
        let style = ProgressStyle::default_bar()
            .template(TEMPLATE)
            .map(|s| s.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_prefix(if dry_run { "Checking" } else { "Applying" });
        self.bar = Some(bar);
        self.pending.clear();
        self.waiting.clear();
    }

    fn on_resource_start(&mut self, id: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(id.to_string());
        }
    }

    fn on_resource_complete(&mut self, outcome: &Outcome) {
        log::debug!("{}: {}", outcome.id(), outcome.action);
        if self.preview && outcome.dry_run && outcome.changed {
            self.pending.push(outcome.clone());
        }
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn on_resource_failed(&mut self, id: &str, error: &Error) {
        match &self.bar {
            Some(bar) => {
                bar.suspend(|| log::warn!("{id}: {error}"));
                bar.inc(1);
            }
            None => log::warn!("{id}: {error}"),
        }
    }

    fn on_resource_deferred(&mut self, id: &str, error: &Error) {
        log::info!("{id}: waiting on earlier changes ({error})");
        if self.preview {
            self.waiting.push(id.to_string());
        }
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn on_batch_complete(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        if !self.pending.is_empty() || !self.waiting.is_empty() {
            ui::header("Planned changes");
            for outcome in self.pending.drain(..) {
                ui::print_outcome(&outcome);
            }
            for id in self.waiting.drain(..) {
                ui::print_deferred(&id);
            }
        }
    }
}

/// Interactive confirmation, or a fixed answer with `--yes`
pub struct Prompt {
    pub assume_yes: bool,
}

impl ConfirmCallback for Prompt {
    fn confirm(&mut self, prompt: &str) -> std::io::Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }

        println!();
        dialoguer::Confirm::new()
            .with_prompt(format!("{} {prompt}", "?".cyan()))
            .default(false)
            .interact()
            .map_err(|e| std::io::Error::other(e.to_string()))
    }

    fn needs_prompt(&self) -> bool {
        !self.assume_yes
    }
}
