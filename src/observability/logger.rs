//! Structured JSON logger for docpipe
//!
//! - One line per event, written synchronously
//! - `event` first, `severity` second, remaining fields sorted by key
//! - Events below the configured threshold are dropped before formatting

use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Per-stage and per-document detail
    Trace = 0,
    /// Pipeline lifecycle
    Info = 1,
    /// Rejected input, invalid patterns
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// Unrecoverable
    Fatal = 4,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    /// Case-insensitive parse of a severity name.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "TRACE" => Some(Severity::Trace),
            "INFO" => Some(Severity::Info),
            "WARN" => Some(Severity::Warn),
            "ERROR" => Some(Severity::Error),
            "FATAL" => Some(Severity::Fatal),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Threshold-gated JSON line logger.
///
/// ERROR and FATAL lines go to stderr, everything else to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Logger {
    threshold: Severity,
}

impl Logger {
    pub fn new(threshold: Severity) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Severity {
        self.threshold
    }

    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.threshold
    }

    /// Log an event with the given severity and fields
    pub fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if !self.enabled(severity) {
            return;
        }
        let line = render(severity, event, fields);
        // a failed log write never affects evaluation
        let _ = if severity >= Severity::Error {
            write_line(&mut io::stderr(), &line)
        } else {
            write_line(&mut io::stdout(), &line)
        };
    }

    pub fn trace(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Trace, event, fields);
    }

    pub fn info(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Info, event, fields);
    }

    pub fn warn(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Warn, event, fields);
    }

    pub fn error(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Error, event, fields);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(Severity::Warn)
    }
}

fn write_line<W: Write>(writer: &mut W, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.flush()
}

/// Formats one log line, newline included.
pub(crate) fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(128);

    output.push_str("{\"event\":\"");
    escape_json_string(&mut output, event);
    output.push_str("\",\"severity\":\"");
    output.push_str(severity.as_str());
    output.push('"');

    let mut sorted: Vec<_> = fields.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    for (key, value) in sorted {
        output.push_str(",\"");
        escape_json_string(&mut output, key);
        output.push_str("\":\"");
        escape_json_string(&mut output, value);
        output.push('"');
    }

    output.push_str("}\n");
    output
}

fn escape_json_string(output: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if c.is_control() => output.push_str(&format!("\\u{:04x}", c as u32)),
            c => output.push(c),
        }
    }
}
