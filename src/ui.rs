use colored::Colorize;
use lifecycle::{Diagnostic, Severity};

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a diagnostic: summary on the first line, detail dimmed below
pub fn diagnostic(diag: &Diagnostic) {
    match diag.severity {
        Severity::Error => {
            error(&diag.summary);
            eprintln!("  {}", diag.detail.dimmed());
        }
        Severity::Warning => {
            warn(&diag.summary);
            dim(&diag.detail);
        }
    }
}
