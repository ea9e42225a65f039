pub mod builtins;
pub mod output;
pub mod runtime;
pub mod stack_guard;
pub mod state;
pub mod trace;
pub mod value;

// Re-export commonly used types
pub use output::{CapturedOutput, Output, Stdout};
pub use runtime::{DEFAULT_MAX_CALL_DEPTH, RuntimeError, RuntimeErrorKind, StackFrame, VM};
pub use state::{Environment, Stack};
pub use trace::{TraceEvent, TraceLog, Tracer, WriterTracer};
pub use value::Value;
