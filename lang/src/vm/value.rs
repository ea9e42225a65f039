use std::fmt;
use std::rc::Rc;

use super::runtime::RuntimeErrorKind;
use crate::lexer::Token;

/// Runtime value type for shablang.
///
/// The variant is fixed at construction; nothing coerces between integers
/// and booleans.
#[derive(Clone, Debug)]
pub enum Value {
    /// 64-bit signed integer
    Integer(i64),

    /// true/false
    Boolean(bool),

    /// Unexecuted body of a `[ ... ]` group. The token sequence is shared,
    /// so copying the value never copies (or re-tokenizes) the body.
    Function(Rc<[Token]>),
}

impl Value {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Boolean(_) => "Boolean",
            Value::Function(_) => "Function",
        }
    }

    pub fn as_integer(&self) -> Result<i64, RuntimeErrorKind> {
        match self {
            Value::Integer(n) => Ok(*n),
            other => Err(RuntimeErrorKind::type_mismatch("Integer", other)),
        }
    }

    pub fn as_boolean(&self) -> Result<bool, RuntimeErrorKind> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(RuntimeErrorKind::type_mismatch("Boolean", other)),
        }
    }

    pub fn into_function(self) -> Result<Rc<[Token]>, RuntimeErrorKind> {
        match self {
            Value::Function(body) => Ok(body),
            other => Err(RuntimeErrorKind::type_mismatch("Function", &other)),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// Structural equality for integers and booleans; functions compare by
/// identity of their shared body.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Function(_) => write!(f, "<function>"),
        }
    }
}
