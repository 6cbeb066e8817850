use indicatif::ProgressStyle;

/// Spinner shown while a server or remote operation is in flight.
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.yellow} {wide_msg}")
        .unwrap()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}

/// Final style for an operation that completed: green check mark.
///
/// The mark is the spinner's final frame, so it replaces the animation when
/// the bar is finished.
pub fn ok_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {wide_msg}")
        .unwrap()
        .tick_strings(&["✔", "✔"])
}

/// Final style for an operation that failed: red cross.
pub fn err_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.red} {wide_msg}")
        .unwrap()
        .tick_strings(&["✘", "✘"])
}
