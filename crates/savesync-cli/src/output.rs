//! CLI output rendering
//!
//! One [`Reporter`] renders command output either as human-readable lines
//! with status markers or as JSON objects for scripting. Commands report
//! events through it and never branch on the format themselves. Status
//! lines go to stdout, problems to stderr, so piping JSON stays clean.

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Renders command output in the selected format.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// True when the reporter emits JSON.
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// A completed operation.
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("\u{2713} {message}"),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"success": true, "message": message}));
            }
        }
    }

    /// A fatal problem.
    pub fn error(&self, message: &str) {
        match self.format {
            OutputFormat::Human => eprintln!("\u{2717} Error: {message}"),
            OutputFormat::Json => {
                eprintln!("{}", serde_json::json!({"success": false, "error": message}));
            }
        }
    }

    /// A non-fatal problem worth the operator's attention.
    pub fn warn(&self, message: &str) {
        match self.format {
            OutputFormat::Human => eprintln!("\u{26a0} Warning: {message}"),
            OutputFormat::Json => {
                eprintln!("{}", serde_json::json!({"level": "warning", "message": message}));
            }
        }
    }

    /// Supporting detail. Suppressed in JSON mode; structured payloads go
    /// through [`Reporter::json`] instead.
    pub fn detail(&self, message: &str) {
        if self.format == OutputFormat::Human {
            println!("  {message}");
        }
    }

    /// A structured payload. Suppressed in human mode.
    pub fn json(&self, value: &serde_json::Value) {
        if self.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
        }
    }
}
