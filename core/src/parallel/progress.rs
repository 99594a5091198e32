//! Progress Reporting

use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar for a long running loop. Returns a hidden bar when
/// progress output is disabled so callers can update it unconditionally.
///
/// * `total` - Total number of work units.
/// * `show`  - Whether to draw the bar.
pub fn create_progress_bar(total: u64, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new(total);
    match ProgressStyle::with_template(
        "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
    ) {
        Ok(style) => progress.set_style(style.progress_chars("=>-")),
        Err(e) => warn!("Invalid progress bar template. {}", e),
    }
    progress
}
