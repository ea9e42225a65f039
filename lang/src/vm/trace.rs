//! Step-by-step observation of an evaluation.
//!
//! Before every token the VM reports the stack (bottom to top) and the token
//! about to run; after a nested call finishes it reports a return marker.
//! Tracing is a pure side channel: it never touches VM state.

use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use super::state::Stack;
use crate::lexer::Token;

pub trait Tracer {
    fn step(&mut self, depth: usize, stack: &Stack, token: &Token);
    fn returning(&mut self, depth: usize);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    Step {
        depth: usize,
        stack: Vec<String>,
        token: String,
    },
    Return {
        depth: usize,
    },
}

impl TraceEvent {
    pub fn step(depth: usize, stack: &Stack, token: &Token) -> Self {
        TraceEvent::Step {
            depth,
            stack: stack.iter().map(|value| value.to_string()).collect(),
            // Blocks render as `[...]`, never their body
            token: token.kind.to_string(),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            TraceEvent::Step { depth, .. } | TraceEvent::Return { depth } => *depth,
        }
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = "  ".repeat(self.depth());
        match self {
            TraceEvent::Step { stack, token, .. } => {
                write!(f, "{indent}[{}] {token}", stack.join(", "))
            }
            TraceEvent::Return { .. } => write!(f, "{indent}<returning>"),
        }
    }
}

/// In-memory trace. Clones share the same event list.
#[derive(Debug, Default, Clone)]
pub struct TraceLog {
    events: Rc<RefCell<Vec<TraceEvent>>>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.borrow().clone()
    }

    /// Rendered events, one line each.
    pub fn lines(&self) -> Vec<String> {
        self.events.borrow().iter().map(|event| event.to_string()).collect()
    }
}

impl Tracer for TraceLog {
    fn step(&mut self, depth: usize, stack: &Stack, token: &Token) {
        self.events
            .borrow_mut()
            .push(TraceEvent::step(depth, stack, token));
    }

    fn returning(&mut self, depth: usize) {
        self.events.borrow_mut().push(TraceEvent::Return { depth });
    }
}

/// Writes each event as a line to any writer (stderr for the CLI).
pub struct WriterTracer<W: Write> {
    writer: W,
}

impl<W: Write> WriterTracer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> Tracer for WriterTracer<W> {
    fn step(&mut self, depth: usize, stack: &Stack, token: &Token) {
        writeln!(self.writer, "{}", TraceEvent::step(depth, stack, token)).ok();
    }

    fn returning(&mut self, depth: usize) {
        writeln!(self.writer, "{}", TraceEvent::Return { depth }).ok();
    }
}
