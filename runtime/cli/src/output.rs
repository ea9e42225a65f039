//! CLI output formatting for JSON mode.
//!
//! One JSON object is written to stdout after evaluation finishes, so editors
//! and scripts can consume results without scraping text.

use serde::Serialize;
use shablang::ShabError;
use shablang::vm::Value;

/// Output mode for CLI execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable output (default)
    Text,
    /// Single JSON object after execution completes
    Json,
}

/// A line written by `print` or `debug_print`.
#[derive(Debug, Clone, Serialize)]
pub struct ConsoleEntry {
    pub timestamp_ms: u64,
    pub message: String,
}

/// Error location with 1-indexed line and column.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorLocation {
    pub line: u32,
    pub column: u32,
}

/// A call that was active when the fault happened.
#[derive(Debug, Clone, Serialize)]
pub struct StackFrame {
    pub call: String,
    pub line: u32,
    pub column: u32,
}

/// JSON output for a completed evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct JsonResultOutput {
    #[serde(rename = "type")]
    pub output_type: &'static str,
    pub status: &'static str,
    pub stack: Vec<String>,
    pub duration_ms: u64,
    pub console: Vec<ConsoleEntry>,
}

/// JSON output for errors.
#[derive(Debug, Clone, Serialize)]
pub struct JsonErrorOutput {
    #[serde(rename = "type")]
    pub output_type: &'static str,
    pub kind: &'static str,
    pub message: String,
    pub location: ErrorLocation,
    pub trace: Vec<StackFrame>,
    pub console: Vec<ConsoleEntry>,
}

/// Format a ShabError as JSON error output.
pub fn format_error_json(error: &ShabError, console: Vec<ConsoleEntry>) -> String {
    let trace = match error {
        ShabError::Lex(_) => vec![],
        ShabError::Runtime(err) => err
            .stack_trace
            .iter()
            .map(|frame| StackFrame {
                call: frame.call.clone(),
                line: frame.line,
                column: frame.column,
            })
            .collect(),
    };

    let output = JsonErrorOutput {
        output_type: "error",
        kind: error.kind_name(),
        message: error.message(),
        location: ErrorLocation {
            line: error.line(),
            column: error.column(),
        },
        trace,
        console,
    };
    to_json(&output)
}

/// Format the final stack (bottom to top) as JSON.
pub fn format_result_json(stack: &[Value], duration_ms: u64, console: Vec<ConsoleEntry>) -> String {
    let output = JsonResultOutput {
        output_type: "result",
        status: "complete",
        stack: stack.iter().map(|value| value.to_string()).collect(),
        duration_ms,
        console,
    };
    to_json(&output)
}

/// Render the final stack for text mode, `None` when there is nothing to show.
pub fn format_stack_text(stack: &[Value]) -> Option<String> {
    if stack.is_empty() {
        return None;
    }
    let values: Vec<String> = stack.iter().map(|value| value.to_string()).collect();
    Some(format!("[{}]", values.join(", ")))
}

fn to_json<T: Serialize>(output: &T) -> String {
    // Every field is a string, integer or list of those
    serde_json::to_string(output).unwrap_or_else(|err| {
        format!(r#"{{"type":"error","kind":"internal","message":"{err}"}}"#)
    })
}
