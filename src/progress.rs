//! Progress bars for long sequential loops

use indicatif::{ProgressBar, ProgressStyle};

/// Create a bar of `len` steps labelled `message`, or a hidden bar when
/// progress display is disabled.
pub fn bar(len: u64, message: &str, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb.set_message(message.to_string());
    pb
}

/// Spinner for loops whose length is not known up front.
pub fn spinner(message: &str, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} {pos} rows [{elapsed_precise}]") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb
}
