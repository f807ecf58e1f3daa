use console::style;
use serde::Serialize;

use crate::types::{ErrorReport, Result};

/// Terminal output; `json` switches every result to pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn success(&self, message: &str) {
        if !self.json {
            println!("{} {}", style("✓").green(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.json {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.json {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    pub fn header(&self, message: &str) {
        if !self.json {
            println!("\n{}", style(message).bold().underlined());
        }
    }

    /// Print `value` as JSON, or hand it to `render` for text output.
    pub fn emit<T, F>(&self, value: &T, render: F) -> Result<()>
    where
        T: Serialize,
        F: FnOnce(&T),
    {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            render(value);
        }
        Ok(())
    }

    /// Structured failure: JSON on stdout in JSON mode, a styled line on stderr otherwise.
    pub fn report(&self, report: &ErrorReport) {
        if self.json {
            match serde_json::to_string_pretty(report) {
                Ok(json) => println!("{}", json),
                Err(_) => self.error(&report.message),
            }
        } else {
            eprintln!(
                "{} {} {}",
                style("✗").red(),
                style(format!("[{}]", report.kind)).dim(),
                report.message
            );
        }
    }
}
