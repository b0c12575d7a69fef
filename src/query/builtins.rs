use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Object, Value};
use crate::core::utils::compare;
use crate::query::ast::{Builtin, Comparison, Term};
use crate::query::evaluator::Evaluator;
use crate::query::validator::validate_arity;

/// Evaluate a builtin call.
///
/// Arguments are evaluated once each, left to right, before the operator
/// runs. OR and AND do not short-circuit: both operands are always
/// evaluated.
pub fn dispatch(evaluator: &mut Evaluator, builtin: &Builtin, args: &[Term]) -> Result<Value> {
    validate_arity(builtin, args.len())?;

    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        match evaluator.evaluate(arg)? {
            Value::Error(message) => return Err(Error::runtime(message)),
            value => values.push(value),
        }
    }

    match builtin {
        Builtin::Not => match &values[0] {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            _ => Err(Error::type_mismatch("Not can only be called on a boolean")),
        },

        Builtin::Add => match (&values[0], &values[1]) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::Array(a), Value::Array(b)) => {
                Ok(Value::Array(a.iter().chain(b.iter()).cloned().collect()))
            }
            _ => Err(Error::type_mismatch(
                "Can only ADD numbers with number and arrays with arrays",
            )),
        },

        Builtin::Sub => arithmetic(builtin, &values, |a, b| Ok(a - b)),
        Builtin::Mul => arithmetic(builtin, &values, |a, b| Ok(a * b)),
        Builtin::Div => arithmetic(builtin, &values, |a, b| {
            non_zero(b)?;
            Ok(round_to_six_places(a / b))
        }),
        Builtin::Mod => arithmetic(builtin, &values, |a, b| {
            non_zero(b)?;
            Ok(a % b)
        }),

        Builtin::Compare(comparison) => {
            let holds = match compare(&values[0], &values[1])? {
                Some(ordering) => comparison.matches(ordering),
                None => *comparison == Comparison::Ne,
            };
            Ok(Value::Bool(holds))
        }

        Builtin::Or => Ok(Value::Bool(values[0].is_truthy() || values[1].is_truthy())),
        Builtin::And => Ok(Value::Bool(values[0].is_truthy() && values[1].is_truthy())),

        Builtin::Filter(predicate) => {
            let row = values.swap_remove(0);
            evaluator.evaluate_with_row(&predicate.arg, row, &predicate.body)
        }

        Builtin::GetAttr => {
            let (obj, field) = attr_operands(builtin, &values)?;
            obj.get(field).cloned().ok_or_else(|| {
                Error::runtime(format!("Object {} has no attribute `{}`", values[0], field))
            })
        }

        Builtin::HasAttr => {
            let (obj, field) = attr_operands(builtin, &values)?;
            Ok(Value::Bool(obj.contains_key(field)))
        }
    }
}

fn arithmetic(
    builtin: &Builtin,
    values: &[Value],
    op: impl FnOnce(f64, f64) -> Result<f64>,
) -> Result<Value> {
    match (&values[0], &values[1]) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(op(*a, *b)?)),
        _ => Err(Error::type_mismatch(format!(
            "Can only {} numbers with numbers",
            builtin.name()
        ))),
    }
}

fn non_zero(divisor: f64) -> Result<()> {
    if divisor == 0.0 {
        return Err(Error::new(ErrorKind::Arithmetic, "Cannot divide by zero".to_string()));
    }
    Ok(())
}

// Quotients are reported with at most six decimal places
fn round_to_six_places(x: f64) -> f64 {
    let scaled = x * 1e6;
    if scaled.is_finite() {
        scaled.round() / 1e6
    } else {
        x
    }
}

fn attr_operands<'v>(
    builtin: &Builtin,
    values: &'v [Value],
) -> Result<(&'v Object, &'v str)> {
    match (&values[0], &values[1]) {
        (Value::Object(obj), Value::String(field)) => Ok((obj, field.as_str())),
        (other, Value::String(_)) => Err(Error::type_mismatch(format!(
            "{} can only be called on an object, got {}",
            builtin.name(),
            other.type_name()
        ))),
        _ => Err(Error::type_mismatch(format!(
            "{} expects a string attribute name",
            builtin.name()
        ))),
    }
}
