//! Where a program's `print` output goes when it runs under the CLI.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use shablang::vm::Output;

use crate::output::ConsoleEntry;

/// Records printed lines with the time since evaluation started, for JSON
/// mode. Clones share the same buffer.
#[derive(Debug, Clone)]
pub struct ConsoleRecorder {
    started: Instant,
    entries: Rc<RefCell<Vec<ConsoleEntry>>>,
}

impl ConsoleRecorder {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            entries: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn take(&self) -> Vec<ConsoleEntry> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }
}

impl Output for ConsoleRecorder {
    fn write_line(&mut self, line: &str) {
        self.entries.borrow_mut().push(ConsoleEntry {
            timestamp_ms: self.started.elapsed().as_millis() as u64,
            message: line.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_lines_in_order() {
        let recorder = ConsoleRecorder::new();
        let mut sink = recorder.clone();
        sink.write_line("3");
        sink.write_line("true");

        let messages: Vec<_> = recorder.take().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["3", "true"]);
        assert!(recorder.take().is_empty());
    }
}
