use std::cell::RefCell;
use std::rc::Rc;

/// Receives the lines written by `print` and `debug_print`.
pub trait Output {
    fn write_line(&mut self, line: &str);
}

/// Writes each line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stdout;

impl Output for Stdout {
    fn write_line(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Collects lines in memory. Clones share the same buffer, so a caller can
/// keep one handle and give the other to the VM.
#[derive(Debug, Default, Clone)]
pub struct CapturedOutput {
    lines: Rc<RefCell<Vec<String>>>,
}

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Drain everything collected so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.borrow_mut())
    }
}

impl Output for CapturedOutput {
    fn write_line(&mut self, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}
