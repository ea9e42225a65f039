//! shablang: a small stack language.
//!
//! Source text is split into tokens (with `[ ... ]` groups folded into
//! function literals) and executed left to right against one operand stack
//! and one global environment.
//!
//! ```
//! use shablang::{evaluate, Value};
//!
//! let stack = evaluate("[ =x x 1 <= [ 1 ] [ x 1 - @fib x 2 - @fib + ] ifelse ] =fib 6 @fib", false)?;
//! assert_eq!(stack, vec![Value::Integer(13)]);
//! # Ok::<(), shablang::ShabError>(())
//! ```

pub mod error;
pub mod lexer;
pub mod runner;
pub mod vm;

pub use error::ShabError;
pub use runner::{Config, Session, evaluate};
pub use vm::Value;
