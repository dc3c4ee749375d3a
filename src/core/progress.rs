//! Progress bars for export phases

use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

const BAR_TEMPLATE: &str =
    "{spinner:.cyan} {prefix:>10} [{bar:40.cyan/blue}] {pos}/{len} ({percent:>3}%) {elapsed_precise}";

/// Bar for one phase, counting settled items
///
/// Hidden when disabled or when stderr is not a terminal, so redirected
/// output stays clean. A hidden bar still tracks its position.
pub fn phase_bar(label: &str, total: u64, enabled: bool) -> ProgressBar {
    if !enabled || !std::io::stderr().is_terminal() {
        let pb = ProgressBar::hidden();
        pb.set_length(total);
        return pb;
    }

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_prefix(label.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
