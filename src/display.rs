use colored::Colorize;
use serde::Serialize;
use st2_core::ExecutionStatus;

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> crate::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Colour a status by outcome
pub fn format_status(status: &ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Succeeded => status.as_str().green().to_string(),
        ExecutionStatus::Failed => status.as_str().red().to_string(),
        ExecutionStatus::Missing => status.as_str().dimmed().to_string(),
        ExecutionStatus::Other(s) => s.yellow().to_string(),
    }
}
