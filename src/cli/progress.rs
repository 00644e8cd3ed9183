//! Terminal progress helpers.
//!
//! Spinners are drawn on stderr by `indicatif` and hidden automatically when
//! stderr is not a terminal, so piped output stays clean.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Braille dots.
const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create an animated spinner with the given message.
///
/// Call one of the helpers (`finish_success`, `finish_error`) when done.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars(TICK_CHARS)
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn finish_with(pb: &ProgressBar, icon: &str, msg: &str) {
    if let Ok(style) = ProgressStyle::default_spinner().template("  {msg}") {
        pb.set_style(style);
    }
    pb.finish_with_message(format!("{icon} {msg}"));
}

/// Finish a spinner with a check-mark.
pub fn finish_success(pb: &ProgressBar, msg: &str) {
    finish_with(pb, "✓", msg);
}

/// Finish a spinner with a cross.
pub fn finish_error(pb: &ProgressBar, msg: &str) {
    finish_with(pb, "✗", msg);
}

/// Icon for a payment review status.
pub fn status_icon(status: &str) -> &'static str {
    match status {
        "APPROVED" => "✓",
        "REJECTED" => "✗",
        "PENDING" => "◷",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_icon_mapping() {
        assert_eq!(status_icon("APPROVED"), "✓");
        assert_eq!(status_icon("REJECTED"), "✗");
        assert_eq!(status_icon("PENDING"), "◷");
        assert_eq!(status_icon("unknown_status"), "?");
    }
}
