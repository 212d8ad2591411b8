use colored::*;
use std::fmt::Display;

/// Console output helpers with a consistent color scheme.
/// Never instantiated; just a namespace for printing functions.
/// Sky blue (79, 170, 230) for info and highlights, amber for warnings.
pub struct Logger;

impl Logger {
    /// General information with a blue bullet.
    pub fn info<T: Display>(msg: T) {
        println!("{} {}", "•".truecolor(79, 170, 230).bold(), msg);
    }

    /// Operation completed.
    pub fn success<T: Display>(msg: T) {
        println!("{} {}", "✔".green().bold(), msg);
    }

    /// Something went wrong and the user needs to know.
    pub fn error<T: Display>(msg: T) {
        println!("{} {}", "✖".red().bold(), msg);
    }

    /// Non-fatal problem. Used sparingly so it keeps meaning something.
    pub fn warn<T: Display>(msg: T) {
        println!("{} {}", "⚠".yellow().bold(), msg);
    }

    /// Section header, underlined, with a leading blank line so it doesn't
    /// run into previous output.
    pub fn header<T: Display>(msg: T) {
        println!(
            "\n{}",
            msg.to_string().truecolor(79, 170, 230).bold().underline()
        );
    }

    /// Inline highlight for formatted strings.
    pub fn highlight<T: Display>(msg: T) -> String {
        msg.to_string().truecolor(79, 170, 230).bold().to_string()
    }

    /// Secondary information, dimmed.
    pub fn dim<T: Display>(msg: T) -> String {
        msg.to_string().dimmed().to_string()
    }
}
