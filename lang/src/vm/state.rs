use im_rc::OrdMap;
use std::fmt;

use super::runtime::RuntimeErrorKind;
use super::value::Value;

/// The operand stack shared by a whole evaluation, nested calls included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stack(Vec<Value>);

impl Stack {
    pub fn new() -> Self {
        Self(Vec::with_capacity(64))
    }

    #[inline]
    pub fn push(&mut self, value: Value) {
        self.0.push(value)
    }

    #[inline]
    pub fn pop(&mut self) -> Result<Value, RuntimeErrorKind> {
        self.0.pop().ok_or(RuntimeErrorKind::EmptyStack)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values from bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}

/// Global name to value bindings. There is exactly one scope.
///
/// Backed by a persistent map so a snapshot (`clone`) is O(1); sessions use
/// that to roll back bindings made by a faulting evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment(OrdMap<String, Value>);

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, name: &str) -> Result<Value, RuntimeErrorKind> {
        self.0
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeErrorKind::UndefinedVariable(name.to_string()))
    }

    /// Binds `name`, returning the value it replaced.
    #[inline]
    pub fn define(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(name.into(), value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}
