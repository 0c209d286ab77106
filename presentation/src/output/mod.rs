//! Answer formatting for the console and for scripted callers.

pub mod console;
pub mod formatter;

pub use console::ConsoleFormatter;
pub use formatter::AnswerFormatter;

/// Strips ANSI colors from all subsequent output.
pub fn disable_colors() {
    colored::control::set_override(false);
}
