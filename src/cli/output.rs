//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the HatchUp CLI.

use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the HatchUp banner
    pub fn banner(&self) {
        if self.colored {
            println!(
                "\n   {} {}\n",
                "HatchUp".bright_yellow().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
            println!("   {}\n", "VC research assistant".bright_white());
        } else {
            println!("\n   HatchUp v{}\n", env!("CARGO_PKG_VERSION"));
            println!("   VC research assistant\n");
        }
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        if self.colored {
            println!("\n{}", title.bright_cyan().bold());
        } else {
            println!("\n{}", title);
        }
    }

    /// Print an informational line
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("{} {}", "·".dimmed(), message);
        } else {
            println!("- {}", message);
        }
    }

    /// Print a success line
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("{} {}", "✓".green().bold(), message);
        } else {
            println!("OK {}", message);
        }
    }

    /// Print an error line to stderr
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("{} {}", "✗".red().bold(), message);
        } else {
            eprintln!("ERROR {}", message);
        }
    }

    /// Print the chat prompt marker without a trailing newline
    pub fn prompt(&self) {
        if self.colored {
            print!("{} ", ">".bright_yellow().bold());
        } else {
            print!("> ");
        }
        let _ = io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert!(Output::new().colored);
        assert!(!Output::no_color().colored);
    }
}
