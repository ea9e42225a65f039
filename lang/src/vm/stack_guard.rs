//! Keeps nested calls off the end of the host stack.
//!
//! Every `@`, `@name`, `if`/`ifelse` body and `while` step is one more level
//! of `VM::execute` on the host stack, and `max_call_depth` can be set high.
//! `VM::call` runs each level through [`ensure_sufficient_stack`], so a deep
//! program reaches its `RecursionLimit` fault with stack to spare.

/// Headroom below which a fresh segment is allocated before recursing.
const MIN_HEADROOM: usize = 128 * 1024;

/// Size of each extra segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(body: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(MIN_HEADROOM, SEGMENT_SIZE, body)
}

// No stack switching on wasm; the depth limit is the only guard there
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(body: impl FnOnce() -> R) -> R {
    body()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_recursion_does_not_overflow() {
        fn depth(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
        }

        assert_eq!(depth(100_000), 100_000);
    }

    #[test]
    fn passes_results_through() {
        let result: Result<i32, &str> = ensure_sufficient_stack(|| Ok(7));
        assert_eq!(result, Ok(7));
    }
}
