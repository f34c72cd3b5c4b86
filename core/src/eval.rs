//! Evaluation of restriction expressions against an individual's state map.
//! A small recursive walk over the onticql AST; no host-code evaluation.

use std::collections::BTreeMap;

use onticql::ast::{ComparisonOperator, Expr, InfixOperator, Literal};

use crate::error::EvalError;
use crate::value::Value;

/// Everything an expression can read: the local state map plus the specials
/// (`$Value`, `$CurrentActor`, `$CurrentIndividual`).
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub state: &'a BTreeMap<String, Value>,
    pub input_value: Option<&'a Value>,
    pub actor: Option<&'a str>,
    pub individual: Option<&'a str>,
}

impl<'a> EvalContext<'a> {
    pub fn of(state: &'a BTreeMap<String, Value>) -> Self { Self { state, input_value: None, actor: None, individual: None } }
}

pub fn evaluate(expr: &Expr, cx: &EvalContext) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(lit) => Ok(literal_value(lit)),
        Expr::Field(name) => Ok(cx.state.get(name).cloned().unwrap_or(Value::Null)),
        Expr::InputValue => Ok(cx.input_value.cloned().unwrap_or(Value::Null)),
        Expr::CurrentActor => Ok(cx.actor.map(|a| Value::String(a.to_string())).unwrap_or(Value::Null)),
        Expr::CurrentIndividual => Ok(cx.individual.map(|i| Value::String(i.to_string())).unwrap_or(Value::Null)),
        Expr::Not(inner) => Ok(Value::Bool(!evaluate(inner, cx)?.is_truthy())),
        Expr::And(left, right) => {
            if !evaluate(left, cx)?.is_truthy() {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(evaluate(right, cx)?.is_truthy()))
        }
        Expr::Or(left, right) => {
            if evaluate(left, cx)?.is_truthy() {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(evaluate(right, cx)?.is_truthy()))
        }
        Expr::Compare { left, operator, right } => {
            let l = evaluate(left, cx)?;
            let r = evaluate(right, cx)?;
            compare(&l, *operator, &r)
        }
        Expr::Infix { left, operator, right } => {
            let l = evaluate(left, cx)?;
            let r = evaluate(right, cx)?;
            arithmetic(&l, *operator, &r)
        }
        Expr::Ternary { condition, then_branch, else_branch } => {
            if evaluate(condition, cx)?.is_truthy() {
                evaluate(then_branch, cx)
            } else {
                evaluate(else_branch, cx)
            }
        }
        Expr::IsNan(inner) => Ok(Value::Bool(evaluate(inner, cx)?.as_f64().is_none())),
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::String(s) => Value::String(s.clone()),
        Literal::Integer(i) => Value::Int(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::Boolean(b) => Value::Bool(*b),
        Literal::Null => Value::Null,
    }
}

fn compare(left: &Value, operator: ComparisonOperator, right: &Value) -> Result<Value, EvalError> {
    let result = match operator {
        ComparisonOperator::Equal => left.eq_value(right),
        ComparisonOperator::NotEqual => !left.eq_value(right),
        _ => {
            let ordering = left
                .compare(right)
                .ok_or_else(|| EvalError::NotComparable(format!("{} <> {}", left.canonical(), right.canonical())))?;
            match operator {
                ComparisonOperator::GreaterThan => ordering.is_gt(),
                ComparisonOperator::GreaterThanOrEqual => ordering.is_ge(),
                ComparisonOperator::LessThan => ordering.is_lt(),
                ComparisonOperator::LessThanOrEqual => ordering.is_le(),
                ComparisonOperator::Equal | ComparisonOperator::NotEqual => unreachable!(),
            }
        }
    };
    Ok(Value::Bool(result))
}

fn arithmetic(left: &Value, operator: InfixOperator, right: &Value) -> Result<Value, EvalError> {
    // + concatenates when either side is non-numeric
    if operator == InfixOperator::Add && (left.as_f64().is_none() || right.as_f64().is_none()) {
        return Ok(Value::String(format!("{}{}", left.canonical(), right.canonical())));
    }

    let l = left.as_f64().ok_or_else(|| EvalError::NotNumeric(left.canonical()))?;
    let r = right.as_f64().ok_or_else(|| EvalError::NotNumeric(right.canonical()))?;

    // integer arithmetic stays integral while it fits
    if let (Value::Int(li), Value::Int(ri)) = (left, right) {
        let int_result = match operator {
            InfixOperator::Add => li.checked_add(*ri),
            InfixOperator::Subtract => li.checked_sub(*ri),
            InfixOperator::Multiply => li.checked_mul(*ri),
            InfixOperator::Divide => None,
        };
        if let Some(i) = int_result {
            return Ok(Value::Int(i));
        }
    }

    let result = match operator {
        InfixOperator::Add => l + r,
        InfixOperator::Subtract => l - r,
        InfixOperator::Multiply => l * r,
        InfixOperator::Divide => {
            if r == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            l / r
        }
    };
    Ok(Value::Float(result))
}
