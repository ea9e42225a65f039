use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::builtins;
use super::output::{Output, Stdout};
use super::stack_guard::ensure_sufficient_stack;
use super::state::{Environment, Stack};
use super::trace::Tracer;
use super::value::Value;
use crate::lexer::{Token, TokenKind};

pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// What went wrong, independent of where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    UnknownToken(String),
    EmptyStack,
    Type {
        expected: &'static str,
        found: &'static str,
    },
    UndefinedVariable(String),
    DivisionByZero,
    Overflow(&'static str),
    RecursionLimit(usize),
}

impl RuntimeErrorKind {
    pub fn type_mismatch(expected: &'static str, found: &Value) -> Self {
        RuntimeErrorKind::Type {
            expected,
            found: found.type_name(),
        }
    }

    /// Stable identifier used by machine-readable output.
    pub fn name(&self) -> &'static str {
        match self {
            RuntimeErrorKind::UnknownToken(_) => "unknown_token",
            RuntimeErrorKind::EmptyStack => "empty_stack",
            RuntimeErrorKind::Type { .. } => "type",
            RuntimeErrorKind::UndefinedVariable(_) => "undefined_variable",
            RuntimeErrorKind::DivisionByZero => "division_by_zero",
            RuntimeErrorKind::Overflow(_) => "overflow",
            RuntimeErrorKind::RecursionLimit(_) => "recursion_limit",
        }
    }
}

impl fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeErrorKind::UnknownToken(lexeme) => write!(f, "Unknown token '{lexeme}'"),
            RuntimeErrorKind::EmptyStack => write!(f, "Cannot pop from an empty stack"),
            RuntimeErrorKind::Type { expected, found } => {
                write!(f, "Type mismatch: expected {expected}, found {found}")
            }
            RuntimeErrorKind::UndefinedVariable(name) => write!(f, "Undefined variable '{name}'"),
            RuntimeErrorKind::DivisionByZero => write!(f, "Division by zero"),
            RuntimeErrorKind::Overflow(op) => write!(f, "Integer overflow in '{op}'"),
            RuntimeErrorKind::RecursionLimit(limit) => {
                write!(f, "Recursion limit of {limit} nested calls exceeded")
            }
        }
    }
}

/// A call that was in progress when a fault unwound through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub call: String,
    pub line: u32,
    pub column: u32,
}

/// Runtime fault, located at the token that raised it.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub token: String,
    pub line: u32,
    pub column: u32,
    /// Enclosing calls, innermost first
    pub stack_trace: Vec<StackFrame>,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, token: &Token) -> Self {
        Self {
            kind,
            token: token.kind.to_string(),
            line: token.span.line,
            column: token.span.column,
            stack_trace: Vec::new(),
        }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn add_frame(&mut self, token: &Token) {
        self.stack_trace.push(StackFrame {
            call: token.kind.to_string(),
            line: token.span.line,
            column: token.span.column,
        });
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Runtime error at line {}, column {} ('{}'): {}",
            self.line, self.column, self.token, self.kind
        )
    }
}

impl std::error::Error for RuntimeError {}

/// The shablang evaluator.
///
/// Every nested call (`@`, `@name`, `if`/`ifelse` bodies, `while` condition
/// and body) is a direct recursive `execute` over the same stack and the
/// same globals.
pub struct VM {
    /// Operand stack, shared by all nested calls
    stack: Stack,
    /// Global variables
    globals: Environment,
    /// Current nesting depth of `execute`
    depth: usize,
    max_call_depth: usize,
    output: Box<dyn Output>,
    tracer: Option<Box<dyn Tracer>>,
}

impl VM {
    /// Create a new VM printing to stdout, without tracing
    pub fn new() -> Self {
        Self {
            stack: Stack::new(),
            globals: Environment::new(),
            depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            output: Box::new(Stdout),
            tracer: None,
        }
    }

    pub fn with_output(mut self, output: Box<dyn Output>) -> Self {
        self.output = output;
        self
    }

    pub fn with_tracer(mut self, tracer: Box<dyn Tracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    /// Run a top-level token sequence. The stack and globals keep whatever
    /// state they already hold.
    pub fn run(&mut self, tokens: &[Token]) -> Result<(), RuntimeError> {
        self.depth = 0;
        self.execute(tokens)
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Hand the stack to the caller, leaving an empty one behind.
    pub fn take_stack(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.stack).into_vec()
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    pub fn set_globals(&mut self, globals: Environment) {
        self.globals = globals;
    }

    pub fn define_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.define(name, value);
    }

    fn execute(&mut self, tokens: &[Token]) -> Result<(), RuntimeError> {
        for token in tokens {
            if let Some(tracer) = self.tracer.as_mut() {
                tracer.step(self.depth, &self.stack, token);
            }
            trace!(depth = self.depth, token = %token.kind, "execute");
            self.execute_token(token)?;
        }
        Ok(())
    }

    fn execute_token(&mut self, token: &Token) -> Result<(), RuntimeError> {
        match &token.kind {
            TokenKind::Block(body) => self.stack.push(Value::Function(Rc::clone(body))),
            TokenKind::Integer(n) => self.stack.push(Value::Integer(*n)),
            TokenKind::True => self.stack.push(Value::Boolean(true)),
            TokenKind::False => self.stack.push(Value::Boolean(false)),

            TokenKind::Assign(name) => {
                let value = self.pop(token)?;
                self.globals.define(name.as_str(), value);
            }
            TokenKind::Call(name) => {
                let body = self
                    .globals
                    .get(name)
                    .and_then(Value::into_function)
                    .map_err(|kind| RuntimeError::new(kind, token))?;
                debug!(function = %name, depth = self.depth, "call");
                self.call(&body, token)?;
            }
            TokenKind::CallTop => {
                let body = self.pop_function(token)?;
                self.call(&body, token)?;
            }
            TokenKind::Identifier(name) => {
                let value = self
                    .globals
                    .get(name)
                    .map_err(|kind| RuntimeError::new(kind, token))?;
                self.stack.push(value);
            }

            TokenKind::Binary(op) => {
                let rhs = self.pop(token)?;
                let lhs = self.pop(token)?;
                let result =
                    builtins::binary(*op, lhs, rhs).map_err(|kind| RuntimeError::new(kind, token))?;
                self.stack.push(result);
            }
            TokenKind::Unary(op) => {
                let operand = self.pop(token)?;
                let result =
                    builtins::unary(*op, operand).map_err(|kind| RuntimeError::new(kind, token))?;
                self.stack.push(result);
            }

            TokenKind::Print => {
                let value = self.pop(token)?;
                self.output.write_line(&value.to_string());
            }
            TokenKind::DebugPrint => {
                let stack = format!("stack: {}", self.stack);
                let globals = format!("globals: {}", self.globals);
                self.output.write_line(&stack);
                self.output.write_line(&globals);
            }

            TokenKind::If => {
                let body = self.pop_function(token)?;
                if self.pop_boolean(token)? {
                    self.call(&body, token)?;
                }
            }
            TokenKind::IfElse => {
                let else_body = self.pop_function(token)?;
                let then_body = self.pop_function(token)?;
                let chosen = if self.pop_boolean(token)? {
                    then_body
                } else {
                    else_body
                };
                self.call(&chosen, token)?;
            }
            TokenKind::While => {
                let body = self.pop_function(token)?;
                let condition = self.pop_function(token)?;
                debug!(depth = self.depth, "while loop");
                loop {
                    self.call(&condition, token)?;
                    if !self.pop_boolean(token)? {
                        break;
                    }
                    self.call(&body, token)?;
                }
            }

            TokenKind::Unknown(lexeme) => {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::UnknownToken(lexeme.clone()),
                    token,
                ));
            }
        }
        Ok(())
    }

    /// Run `body` one level deeper against the shared stack and globals.
    fn call(&mut self, body: &Rc<[Token]>, token: &Token) -> Result<(), RuntimeError> {
        if self.depth >= self.max_call_depth {
            warn!(limit = self.max_call_depth, "recursion limit reached");
            return Err(RuntimeError::new(
                RuntimeErrorKind::RecursionLimit(self.max_call_depth),
                token,
            ));
        }

        self.depth += 1;
        let result = ensure_sufficient_stack(|| self.execute(body));
        if let (Ok(()), Some(tracer)) = (&result, self.tracer.as_mut()) {
            tracer.returning(self.depth);
        }
        self.depth -= 1;
        result.map_err(|mut err| {
            err.add_frame(token);
            err
        })
    }

    fn pop(&mut self, token: &Token) -> Result<Value, RuntimeError> {
        self.stack
            .pop()
            .map_err(|kind| RuntimeError::new(kind, token))
    }

    fn pop_function(&mut self, token: &Token) -> Result<Rc<[Token]>, RuntimeError> {
        self.pop(token)?
            .into_function()
            .map_err(|kind| RuntimeError::new(kind, token))
    }

    fn pop_boolean(&mut self, token: &Token) -> Result<bool, RuntimeError> {
        self.pop(token)?
            .as_boolean()
            .map_err(|kind| RuntimeError::new(kind, token))
    }
}

impl Default for VM {
    fn default() -> Self {
        Self::new()
    }
}
