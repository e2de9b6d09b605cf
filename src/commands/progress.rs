use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;
use std::time::Duration;

/// Spinner style used while a request is in flight.
/// - Yellow spinner with animated braille-style frames.
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[33m{spinner}\x1b[0m {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"])
}

pub fn ok_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[32m✔\x1b[0m {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

pub fn err_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[31m✘\x1b[0m {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Run `op` behind a stderr spinner labelled `message`.
///
/// The spinner is hidden when stderr is not a terminal.
pub fn with_spinner<T, E: Display>(
    message: impl Into<String>,
    op: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    let message = message.into();
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style());
    pb.set_message(message.clone());
    pb.enable_steady_tick(Duration::from_millis(80));

    let res = op();
    match &res {
        Ok(_) => {
            pb.set_style(ok_style());
            pb.finish_with_message(message);
        }
        Err(e) => {
            pb.set_style(err_style());
            pb.finish_with_message(format!("{}: {}", message, e));
        }
    }
    res
}
