//! Programs shared by the criterion benches.

use shablang::vm::Output;

pub const ARITHMETIC: &str = "1 2 + 3 * 4 - 2 / 7 min 9 max ~ abs";

pub const FIBONACCI: &str = "
    [ =x
      x 1 <=
      [ 1 ]
      [ x 1 - @fib x 2 - @fib + ]
      ifelse
    ] =fib
    20 @fib
";

pub const SHARED_STACK: &str = "[ =b =a b a ] =swap 1 2 @swap @swap + 1 [ 2 + ] @ +";

/// Sum 1..=n with a `while` loop.
pub fn counting_loop(n: u32) -> String {
    format!("0 =sum {n} =i [ i 0 > ] [ sum i + =sum i 1 - =i ] while sum")
}

/// `n` copies of a small nested block, for the lexer.
pub fn nested_blocks(n: usize) -> String {
    "[ 1 [ 2 [ 3 + ] @ ] @ + ] @ print # comment\n".repeat(n)
}

/// Discards everything a program prints.
pub struct Discard;

impl Output for Discard {
    fn write_line(&mut self, _line: &str) {}
}
