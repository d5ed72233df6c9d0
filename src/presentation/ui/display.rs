use colored::Colorize;
use console::Term;
use std::time::Duration;

/// Display utilities for the CLI interface
pub struct DisplayHelper {
    pub use_color: bool,
    pub terminal: Term,
}

impl DisplayHelper {
    /// Create a new DisplayHelper
    pub fn new(use_color: bool) -> Self {
        Self {
            use_color,
            terminal: Term::stdout(),
        }
    }

    /// Create a display helper with color detection
    pub fn auto() -> Self {
        let use_color = atty::is(atty::Stream::Stdout) && std::env::var("NO_COLOR").is_err();
        Self::new(use_color)
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "✓".green().bold(), message);
        } else {
            println!("[SUCCESS] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "✗".red().bold(), message);
        } else {
            eprintln!("[ERROR] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "⚠".yellow().bold(), message);
        } else {
            println!("[WARNING] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "::".blue().bold(), message);
        } else {
            println!("[INFO] {}", message);
        }
    }

    /// Format a repository name with appropriate styling
    pub fn format_repo(&self, repo: &str) -> String {
        if self.use_color {
            repo.cyan().bold().to_string()
        } else {
            repo.to_string()
        }
    }

    /// Print a table-like structure
    pub fn print_table(&self, headers: &[&str], rows: &[Vec<String>]) {
        if rows.is_empty() {
            return;
        }

        // Calculate column widths
        let mut col_widths = headers.iter().map(|h| h.len()).collect::<Vec<_>>();
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                if i < col_widths.len() {
                    col_widths[i] = col_widths[i].max(cell.len());
                }
            }
        }

        // Print headers
        for (i, header) in headers.iter().enumerate() {
            if i > 0 {
                print!("  ");
            }
            if self.use_color {
                print!("{:<width$}", header.bold(), width = col_widths[i]);
            } else {
                print!("{:<width$}", header, width = col_widths[i]);
            }
        }
        println!();

        // Print separator
        let dash = if self.use_color { "─" } else { "-" };
        for (i, &width) in col_widths.iter().enumerate() {
            if i > 0 {
                print!("  ");
            }
            print!("{}", dash.repeat(width));
        }
        println!();

        // Print rows
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    print!("  ");
                }
                let width = col_widths.get(i).unwrap_or(&0);
                print!("{:<width$}", cell, width = width);
            }
            println!();
        }
    }
}

/// Format a duration in human-readable format
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs > 60 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}m {}s", mins, remaining_secs)
    } else if secs > 0 {
        format!("{}.{}s", secs, millis / 100)
    } else {
        format!("{}ms", millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(95)), "1m 35s");
    }

    #[test]
    fn test_plain_helper_has_no_color() {
        let display = DisplayHelper::new(false);
        assert!(!display.use_color);
        assert_eq!(display.format_repo("frontend"), "frontend");
    }
}
