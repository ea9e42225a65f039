use std::io;

use tracing::debug;

use crate::error::ShabError;
use crate::lexer::{DEFAULT_MAX_NESTING, Lexer};
use crate::vm::runtime::{DEFAULT_MAX_CALL_DEPTH, VM};
use crate::vm::{Environment, Output, Tracer, Value, WriterTracer};


/// Evaluation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Report every step to the tracer
    pub trace: bool,
    /// Deepest allowed nesting of calls and control-flow bodies
    pub max_call_depth: usize,
    /// Deepest `[ ... ]` nesting the tokenizer accepts
    pub max_nesting: usize,
    /// Keep globals from one `Session::evaluate` call to the next
    pub persist_environment: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trace: false,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_nesting: DEFAULT_MAX_NESTING,
            persist_environment: true,
        }
    }
}

impl Config {
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    pub fn with_persist_environment(mut self, persist_environment: bool) -> Self {
        self.persist_environment = persist_environment;
        self
    }
}

/// Evaluate `source` against a fresh stack and fresh globals, returning the
/// final stack bottom to top. `print` writes to stdout; trace lines go to
/// stderr.
pub fn evaluate(source: &str, trace_enabled: bool) -> Result<Vec<Value>, ShabError> {
    Session::new(Config::default().with_trace(trace_enabled)).evaluate(source)
}

/// A reusable evaluator.
///
/// Each `evaluate` call starts from an empty stack. Globals carry over
/// between calls when `persist_environment` is set; bindings made by a call
/// that faults are rolled back.
pub struct Session {
    vm: VM,
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let mut vm = VM::new().with_max_call_depth(config.max_call_depth);
        if config.trace {
            vm = vm.with_tracer(Box::new(WriterTracer::new(io::stderr())));
        }
        Self { vm, config }
    }

    pub fn with_output(mut self, output: Box<dyn Output>) -> Self {
        self.vm = self.vm.with_output(output);
        self
    }

    /// Install a tracer. Only consulted when `Config::trace` is set.
    pub fn with_tracer(mut self, tracer: Box<dyn Tracer>) -> Self {
        if self.config.trace {
            self.vm = self.vm.with_tracer(tracer);
        }
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn globals(&self) -> &Environment {
        self.vm.globals()
    }

    pub fn evaluate(&mut self, source: &str) -> Result<Vec<Value>, ShabError> {
        let tokens = Lexer::new(source)
            .with_max_nesting(self.config.max_nesting)
            .tokenize()?;
        debug!(tokens = tokens.len(), "evaluating");

        if !self.config.persist_environment {
            self.vm.set_globals(Environment::new());
        }
        let snapshot = self.vm.globals().clone();

        match self.vm.run(&tokens) {
            Ok(()) => Ok(self.vm.take_stack()),
            Err(err) => {
                self.vm.take_stack();
                self.vm.set_globals(snapshot);
                Err(err.into())
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
