use crate::lexer::{LexError, LexErrorKind};
use crate::vm::runtime::RuntimeError;
use std::fmt;

// Re-export StackFrame from runtime module
pub use crate::vm::runtime::StackFrame;

/// Frames shown by `format_with_source` before the rest are summarised.
const MAX_SHOWN_FRAMES: usize = 10;

/// Unified error type for all shablang faults
#[derive(Debug, Clone, PartialEq)]
pub enum ShabError {
    Lex(LexError),
    Runtime(RuntimeError),
}

impl From<LexError> for ShabError {
    fn from(err: LexError) -> Self {
        ShabError::Lex(err)
    }
}

impl From<RuntimeError> for ShabError {
    fn from(err: RuntimeError) -> Self {
        ShabError::Runtime(err)
    }
}

impl fmt::Display for ShabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShabError::Lex(err) => write!(f, "{err}"),
            ShabError::Runtime(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ShabError {}

impl ShabError {
    /// Stable identifier of the fault kind, e.g. `parse` or `empty_stack`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ShabError::Lex(err) if err.kind == LexErrorKind::NestingTooDeep => "recursion_limit",
            ShabError::Lex(_) => "parse",
            ShabError::Runtime(err) => err.kind.name(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            ShabError::Lex(err) => err.message.clone(),
            ShabError::Runtime(err) => err.message(),
        }
    }

    pub fn line(&self) -> u32 {
        match self {
            ShabError::Lex(err) => err.line,
            ShabError::Runtime(err) => err.line,
        }
    }

    pub fn column(&self) -> u32 {
        match self {
            ShabError::Lex(err) => err.column,
            ShabError::Runtime(err) => err.column,
        }
    }

    /// Format error with source context
    pub fn format_with_source(&self, source: &str) -> String {
        let kind = match self {
            ShabError::Lex(_) => "Parse error",
            ShabError::Runtime(_) => "Runtime error",
        };
        let (line, column, message) = (self.line(), self.column(), self.message());

        let mut output = String::new();

        // Error header
        output.push_str(&format!("\n{} at line {}, column {}", kind, line, column));
        if let ShabError::Runtime(err) = self {
            output.push_str(&format!(" ('{}')", err.token));
        }
        output.push_str(&format!(": {}\n\n", message));

        // Source context (5 lines around error)
        let lines: Vec<&str> = source.lines().collect();
        let error_line_idx = (line as usize).saturating_sub(1);

        let start = error_line_idx.saturating_sub(2);
        let end = (error_line_idx + 3).min(lines.len());

        for (idx, line_content) in lines.iter().enumerate().take(end).skip(start) {
            let line_num = idx + 1;

            if idx == error_line_idx {
                output.push_str(&format!(" → {:4} | {}\n", line_num, line_content));

                // Add caret pointing to error position
                if column > 0 {
                    output.push_str("        | ");
                    output.push_str(&" ".repeat(column as usize - 1));
                    output.push_str("^\n");
                }
            } else {
                output.push_str(&format!("   {:4} | {}\n", line_num, line_content));
            }
        }

        // Enclosing calls for runtime errors
        if let ShabError::Runtime(err) = self {
            if !err.stack_trace.is_empty() {
                output.push_str("\nCall trace:\n");
                for (i, frame) in err.stack_trace.iter().take(MAX_SHOWN_FRAMES).enumerate() {
                    output.push_str(&format!(
                        "  {} at '{}' (line {}, column {})\n",
                        i, frame.call, frame.line, frame.column
                    ));
                }
                if err.stack_trace.len() > MAX_SHOWN_FRAMES {
                    output.push_str(&format!(
                        "  ... {} more\n",
                        err.stack_trace.len() - MAX_SHOWN_FRAMES
                    ));
                }
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::vm::{CapturedOutput, RuntimeErrorKind, VM};

    fn run(source: &str) -> Result<(), ShabError> {
        let tokens = Lexer::new(source).tokenize()?;
        let mut vm = VM::new().with_output(Box::new(CapturedOutput::new()));
        vm.run(&tokens)?;
        Ok(())
    }

    #[test]
    fn lex_error_display() {
        let err = ShabError::Lex(LexError {
            kind: LexErrorKind::UnclosedBracket,
            message: "Unclosed '[' (missing matching ']')".to_string(),
            line: 5,
            column: 10,
        });

        let display = err.to_string();
        assert!(display.contains("Parse error"));
        assert!(display.contains("line 5"));
        assert!(display.contains("column 10"));
        assert!(display.contains("Unclosed '['"));
        assert_eq!(err.kind_name(), "parse");
    }

    #[test]
    fn runtime_error_display() {
        let err = run("1 0 /").unwrap_err();

        let display = err.to_string();
        assert!(display.contains("Runtime error"));
        assert!(display.contains("line 1, column 5"));
        assert!(display.contains("('/')"));
        assert!(display.contains("Division by zero"));
        assert_eq!(err.kind_name(), "division_by_zero");
    }

    #[test]
    fn error_with_source_context() {
        let source = "1 =a\n2 =b\na b +\n1 0 /\n3 =c\n4 =d";

        let err = run(source).unwrap_err();
        let formatted = err.format_with_source(source);

        // 2 lines before, the error line, 2 lines after
        assert!(formatted.contains("line 4"));
        assert!(formatted.contains("Division by zero"));
        assert!(formatted.contains("2 =b"));
        assert!(formatted.contains("a b +"));
        assert!(formatted.contains("1 0 /"));
        assert!(formatted.contains("3 =c"));
        assert!(formatted.contains("4 =d"));
        assert!(!formatted.contains("1 =a"));
    }

    #[test]
    fn error_with_caret_position() {
        let source = "1 2 + true +";

        let err = run(source).unwrap_err();
        let formatted = err.format_with_source(source);

        // Caret under column 12 (11 spaces + ^)
        assert!(formatted.contains("        |            ^"));
    }

    #[test]
    fn error_beyond_last_line_does_not_panic() {
        let err = ShabError::Lex(LexError {
            kind: LexErrorKind::UnexpectedCloseBracket,
            message: "Unexpected ']' without matching '['".to_string(),
            line: 100,
            column: 1,
        });
        let formatted = err.format_with_source("1 2 +");
        assert!(formatted.contains("Parse error at line 100"));
    }

    #[test]
    fn runtime_error_with_call_trace() {
        let source = "[ 1 0 / ] =boom\n[ @boom ] =outer\n@outer";

        let err = run(source).unwrap_err();
        let ShabError::Runtime(runtime) = &err else {
            panic!("expected runtime error, got {err:?}");
        };
        assert_eq!(runtime.kind, RuntimeErrorKind::DivisionByZero);
        assert_eq!(
            runtime
                .stack_trace
                .iter()
                .map(|frame| frame.call.as_str())
                .collect::<Vec<_>>(),
            vec!["@boom", "@outer"]
        );

        let formatted = err.format_with_source(source);
        assert!(formatted.contains("Call trace:"));
        assert!(formatted.contains("0 at '@boom' (line 2, column 3)"));
        assert!(formatted.contains("1 at '@outer' (line 3, column 1)"));
    }

    #[test]
    fn long_call_traces_are_summarised() {
        let source = "[ =n n 0 == [ 1 0 / ] [ n 1 - @down ] ifelse ] =down 20 @down";

        let err = run(source).unwrap_err();
        let formatted = err.format_with_source(source);
        assert!(formatted.contains("more"));
    }
}
