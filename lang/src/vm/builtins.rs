//! Operator semantics. Operands arrive already popped; the caller pushes the
//! result and attaches the token position to any error.

use super::runtime::RuntimeErrorKind;
use super::value::Value;
use crate::lexer::{BinaryOp, UnaryOp};

pub fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeErrorKind> {
    match op {
        BinaryOp::Add => arithmetic(op, &lhs, &rhs, i64::checked_add),
        BinaryOp::Sub => arithmetic(op, &lhs, &rhs, i64::checked_sub),
        BinaryOp::Mul => arithmetic(op, &lhs, &rhs, i64::checked_mul),
        BinaryOp::Div => {
            let (a, b) = integers(&lhs, &rhs)?;
            if b == 0 {
                return Err(RuntimeErrorKind::DivisionByZero);
            }
            // i64::MIN / -1 is the only overflowing case
            a.checked_div(b)
                .map(Value::Integer)
                .ok_or(RuntimeErrorKind::Overflow(op.symbol()))
        }
        BinaryOp::Min => arithmetic(op, &lhs, &rhs, |a, b| Some(a.min(b))),
        BinaryOp::Max => arithmetic(op, &lhs, &rhs, |a, b| Some(a.max(b))),

        BinaryOp::Less => comparison(&lhs, &rhs, |a, b| a < b),
        BinaryOp::LessEqual => comparison(&lhs, &rhs, |a, b| a <= b),
        BinaryOp::Greater => comparison(&lhs, &rhs, |a, b| a > b),
        BinaryOp::GreaterEqual => comparison(&lhs, &rhs, |a, b| a >= b),

        BinaryOp::Equal => equals(&lhs, &rhs).map(Value::Boolean),
        BinaryOp::NotEqual => equals(&lhs, &rhs).map(|eq| Value::Boolean(!eq)),

        BinaryOp::And => Ok(Value::Boolean(lhs.as_boolean()? & rhs.as_boolean()?)),
        BinaryOp::Or => Ok(Value::Boolean(lhs.as_boolean()? | rhs.as_boolean()?)),
    }
}

pub fn unary(op: UnaryOp, operand: Value) -> Result<Value, RuntimeErrorKind> {
    match op {
        UnaryOp::Negate => operand
            .as_integer()?
            .checked_neg()
            .map(Value::Integer)
            .ok_or(RuntimeErrorKind::Overflow(op.symbol())),
        UnaryOp::Abs => operand
            .as_integer()?
            .checked_abs()
            .map(Value::Integer)
            .ok_or(RuntimeErrorKind::Overflow(op.symbol())),
        UnaryOp::Not => Ok(Value::Boolean(!operand.as_boolean()?)),
    }
}

fn integers(lhs: &Value, rhs: &Value) -> Result<(i64, i64), RuntimeErrorKind> {
    Ok((lhs.as_integer()?, rhs.as_integer()?))
}

fn arithmetic(
    op: BinaryOp,
    lhs: &Value,
    rhs: &Value,
    apply: impl Fn(i64, i64) -> Option<i64>,
) -> Result<Value, RuntimeErrorKind> {
    let (a, b) = integers(lhs, rhs)?;
    apply(a, b)
        .map(Value::Integer)
        .ok_or(RuntimeErrorKind::Overflow(op.symbol()))
}

fn comparison(
    lhs: &Value,
    rhs: &Value,
    apply: impl Fn(i64, i64) -> bool,
) -> Result<Value, RuntimeErrorKind> {
    let (a, b) = integers(lhs, rhs)?;
    Ok(Value::Boolean(apply(a, b)))
}

/// `==`/`!=` accept two integers or two booleans. Functions have no
/// language-level equality.
fn equals(lhs: &Value, rhs: &Value) -> Result<bool, RuntimeErrorKind> {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => Ok(a == b),
        (Value::Boolean(a), Value::Boolean(b)) => Ok(a == b),
        (Value::Function(_), _) => Err(RuntimeErrorKind::type_mismatch(
            "Integer or Boolean",
            lhs,
        )),
        _ => Err(RuntimeErrorKind::type_mismatch(lhs.type_name(), rhs)),
    }
}
