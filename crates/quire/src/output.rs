//! Terminal output.
//!
//! Status messages go to stderr so that stdout carries only the command's
//! result and can be piped.

use std::io::Write;
use std::path::Path;

use console::{Style, Term};

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    green: Style,
    red: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            red: Style::new().red(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Write a command result to `path`, or to stdout when no path is given.
    pub(crate) fn emit(&self, path: Option<&Path>, content: &str) -> std::io::Result<()> {
        match path {
            Some(path) => {
                std::fs::write(path, content)?;
                self.success(&format!("Wrote {}", path.display()));
                Ok(())
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(content.as_bytes())?;
                if !content.ends_with('\n') {
                    stdout.write_all(b"\n")?;
                }
                stdout.flush()
            }
        }
    }
}
