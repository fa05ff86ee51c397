//! Progress reporting utilities for long-running batch passes,
//! using the indicatif crate.

use indicatif::{ProgressBar, ProgressStyle};

/// Default style for a batch progress bar
pub const DEFAULT_BATCH_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({per_sec}) {msg}";

/// Create a progress bar for a batch pass with a standardized style
///
/// # Arguments
/// * `length` - Total number of units in the pass
/// * `description` - Optional description to display as the initial message
#[must_use]
pub fn create_batch_progress_bar(length: u64, description: Option<&str>) -> ProgressBar {
    let pb = ProgressBar::new(length);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(DEFAULT_BATCH_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    if let Some(desc) = description {
        pb.set_message(desc.to_string());
    }

    pb
}

/// Create a hidden progress bar for runs that do not report to a terminal
#[must_use]
pub fn create_hidden_progress_bar() -> ProgressBar {
    ProgressBar::hidden()
}
