//! Starter operator set. Operators receive their operands in stack order,
//! so for `a b -` operand 0 is `a`.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;

use super::operators::{Operands, Operator, Operators};
use super::value::{Value, Word};
use crate::error::OperatorError;

type OpResult = Result<Vec<Word>, OperatorError>;

const TRUNCATE_WORDS: usize = 25;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<.*?>").expect("Error compiling regex."));

pub(super) fn install(ops: &mut Operators) {
    ops.register(Operator::new("+", 2, 1, add));
    ops.register(Operator::new("-", 2, 1, |o| arithmetic(o, |a, b| Ok(a - b))));
    ops.register(Operator::new("*", 2, 1, |o| arithmetic(o, |a, b| Ok(a * b))));
    ops.register(Operator::new("/", 2, 1, |o| arithmetic(o, divide)));
    ops.alias("add", "+");
    ops.alias("sub", "-");
    ops.alias("mul", "*");
    ops.alias("div", "/");

    ops.register(Operator::new("==", 2, 1, |o| Ok(vec![Word::literal(o.value(0)? == o.value(1)?)])));
    ops.register(Operator::new("<", 2, 1, |o| compare(o, Ordering::is_lt)));
    ops.register(Operator::new(">", 2, 1, |o| compare(o, Ordering::is_gt)));
    ops.register(Operator::new(">=", 2, 1, |o| compare(o, Ordering::is_ge)));
    ops.register(Operator::new("!", 1, 1, |o| Ok(vec![Word::literal(!o.value(0)?.truthy())])));
    ops.register(Operator::new("and", 2, 1, and).lazy());
    ops.register(Operator::new("or", 2, 1, or).lazy());
    ops.register(Operator::new("exists", 1, 1, |o| Ok(vec![Word::literal(o.is_bound(0)?)])).lazy());

    ops.register(Operator::new("contains", 2, 1, contains));
    ops.register(Operator::new("pathjoin", 2, 1, pathjoin));
    ops.register(Operator::new("truncate", 1, 1, truncate));
    ops.register(Operator::new("~", 1, 1, |o| Ok(vec![Word::reference(o.text(0)?)])));
}

fn add(o: &Operands<'_>) -> OpResult {
    let sum = match (o.value(0)?, o.value(1)?) {
        (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
        (Value::Str(a), Value::Str(b)) => Value::Str(a + &b),
        (a, b) => return Err(mismatch("add", &a, &b)),
    };
    Ok(vec![sum.into()])
}

fn arithmetic<F>(o: &Operands<'_>, f: F) -> OpResult
where
    F: Fn(f64, f64) -> Result<f64, OperatorError>,
{
    Ok(vec![Word::literal(f(o.number(0)?, o.number(1)?)?)])
}

fn divide(a: f64, b: f64) -> Result<f64, OperatorError> {
    if b == 0.0 {
        return Err(OperatorError::failed("division by zero"));
    }
    Ok(a / b)
}

fn compare<P>(o: &Operands<'_>, pred: P) -> OpResult
where
    P: Fn(Ordering) -> bool,
{
    let (a, b) = (o.value(0)?, o.value(1)?);
    let ordering = match (&a, &b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y),
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    };
    let ordering = ordering.ok_or_else(|| mismatch("compare", &a, &b))?;
    Ok(vec![Word::literal(pred(ordering))])
}

/// Short-circuits on the top operand: the deeper one is only looked up, and
/// returned as is, when the top one is truthy.
fn and(o: &Operands<'_>) -> OpResult {
    let result = if o.value(1)?.truthy() {
        o.value(0)?
    } else {
        Value::Bool(false)
    };
    Ok(vec![result.into()])
}

fn or(o: &Operands<'_>) -> OpResult {
    let result = if o.value(1)?.truthy() {
        Value::Bool(true)
    } else {
        o.value(0)?
    };
    Ok(vec![result.into()])
}

fn contains(o: &Operands<'_>) -> OpResult {
    let haystack = o.text(0)?;
    let needle = o.value(1)?.to_string();
    Ok(vec![Word::literal(haystack.contains(&needle))])
}

/// Joins with `/`; an empty head yields the tail unchanged.
fn pathjoin(o: &Operands<'_>) -> OpResult {
    let (head, tail) = (o.text(0)?, o.text(1)?);
    let joined = if head.is_empty() {
        tail
    } else {
        format!("{head}/{tail}")
    };
    Ok(vec![Word::literal(joined)])
}

/// Strips markup tags and keeps the first [`TRUNCATE_WORDS`] words.
fn truncate(o: &Operands<'_>) -> OpResult {
    let text = o.text(0)?;
    let stripped = TAG.replace_all(&text, " ");
    let words: Vec<&str> = stripped.split_whitespace().take(TRUNCATE_WORDS).collect();
    Ok(vec![Word::literal(words.join(" "))])
}

fn mismatch(what: &str, a: &Value, b: &Value) -> OperatorError {
    OperatorError::failed(format!(
        "cannot {what} {} and {}",
        a.type_name(),
        b.type_name()
    ))
}
