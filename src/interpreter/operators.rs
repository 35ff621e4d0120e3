use std::collections::HashMap;
use std::sync::Arc;

use derivative::Derivative;

use super::environment::Environment;
use super::scope::ScopeHeap;
use super::value::{Value, Word};
use crate::error::{ErrorKind, OperatorError};

/// Character introducing a repetition suffix on an operator token.
pub const MODIFIER_MARKER: char = '*';

/// How many times an operator invocation runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Modifier {
    #[default]
    Once,
    /// `op*N`: exactly N applications, all or nothing.
    Times(usize),
    /// `op*`: applications until one fails.
    Greedy,
}

impl std::fmt::Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Once => Ok(()),
            Self::Times(n) => write!(f, "{MODIFIER_MARKER}{n}"),
            Self::Greedy => write!(f, "{MODIFIER_MARKER}"),
        }
    }
}

pub type Body = dyn Fn(&Operands<'_>) -> Result<Vec<Word>, OperatorError> + Send + Sync;

/// A named stack transformation consuming `arity` words and producing
/// `results` words.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct Operator {
    name: String,
    arity: usize,
    results: usize,
    lazy: bool,
    #[derivative(Debug = "ignore")]
    body: Arc<Body>,
}

impl Operator {
    pub fn new<F>(name: impl Into<String>, arity: usize, results: usize, body: F) -> Self
    where
        F: Fn(&Operands<'_>) -> Result<Vec<Word>, OperatorError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            arity,
            results,
            lazy: false,
            body: Arc::new(body),
        }
    }

    /// Hands operands over without resolving references first.
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn results(&self) -> usize {
        self.results
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// One application. Atomic: on failure the operands go back onto the
    /// stack untouched.
    fn apply(&self, heap: &mut ScopeHeap, env: &dyn Environment) -> Result<(), Failure> {
        let taken = heap.pop_operands(self.arity).map_err(Failure::Operator)?;
        match self.invoke(&taken, env) {
            Ok(results) => heap.extend(results).map_err(Failure::Fatal),
            Err(err) => {
                heap.restore(taken);
                Err(Failure::Operator(err))
            }
        }
    }

    fn invoke(&self, taken: &[Word], env: &dyn Environment) -> Result<Vec<Word>, OperatorError> {
        let words = if self.lazy {
            taken.to_vec()
        } else {
            taken
                .iter()
                .map(|w| w.resolve(env).map(Word::Literal))
                .collect::<Result<_, _>>()?
        };
        let results = (self.body)(&Operands { words, env })?;
        if results.len() != self.results {
            return Err(OperatorError::ResultArity {
                expected: self.results,
                produced: results.len(),
            });
        }
        Ok(results)
    }
}

enum Failure {
    /// The application itself failed; greedy repetition stops here.
    Operator(OperatorError),
    /// A resource limit was hit; never swallowed.
    Fatal(ErrorKind),
}

impl From<Failure> for ErrorKind {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Operator(err) => err.into(),
            Failure::Fatal(kind) => kind,
        }
    }
}

/// Runs `op` against the current stack as often as `modifier` asks and
/// returns the number of successful applications.
pub(crate) fn dispatch(
    op: &Operator,
    modifier: Modifier,
    heap: &mut ScopeHeap,
    env: &dyn Environment,
    greedy_limit: usize,
) -> Result<usize, ErrorKind> {
    match modifier {
        Modifier::Once => {
            op.apply(heap, env)?;
            Ok(1)
        }
        Modifier::Times(n) => {
            let before = heap.snapshot();
            for i in 0..n {
                if let Err(failure) = op.apply(heap, env) {
                    tracing::debug!(op = op.name(), application = i + 1, "bounded repeat failed");
                    heap.reset(before);
                    return Err(failure.into());
                }
            }
            Ok(n)
        }
        Modifier::Greedy => {
            let mut count = 0;
            loop {
                match op.apply(heap, env) {
                    Ok(()) => {
                        count += 1;
                        if count > greedy_limit {
                            return Err(ErrorKind::IterationOverflow {
                                limit: greedy_limit,
                            });
                        }
                    }
                    Err(Failure::Operator(reason)) => {
                        tracing::trace!(op = op.name(), count, %reason, "greedy repeat stopped");
                        return Ok(count);
                    }
                    Err(Failure::Fatal(kind)) => return Err(kind),
                }
            }
        }
    }
}

/// The words an operator consumes, in stack order (deepest first).
pub struct Operands<'a> {
    words: Vec<Word>,
    env: &'a dyn Environment,
}

impl Operands<'_> {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Operand `i`. Asking past the declared arity underflows.
    pub fn word(&self, i: usize) -> Result<&Word, OperatorError> {
        self.words.get(i).ok_or(OperatorError::Underflow {
            needed: i + 1,
            available: self.words.len(),
        })
    }

    /// Value of operand `i`, looking references up in the environment.
    pub fn value(&self, i: usize) -> Result<Value, OperatorError> {
        self.word(i)?.resolve(self.env)
    }

    pub fn number(&self, i: usize) -> Result<f64, OperatorError> {
        let value = self.value(i)?;
        value
            .as_number()
            .ok_or_else(|| OperatorError::failed(format!("expected number, got {}", value.type_name())))
    }

    pub fn text(&self, i: usize) -> Result<String, OperatorError> {
        match self.value(i)? {
            Value::Str(s) => Ok(s),
            other => Err(OperatorError::failed(format!(
                "expected string, got {}",
                other.type_name()
            ))),
        }
    }

    /// Whether operand `i` is a reference the environment knows.
    pub fn is_bound(&self, i: usize) -> Result<bool, OperatorError> {
        Ok(match self.word(i)? {
            Word::Reference(name) => self.env.contains(name),
            Word::Literal(_) => false,
        })
    }
}

/// Operator registry, looked up by name during classification and dispatch.
#[derive(Clone, Debug)]
pub struct Operators {
    ops: HashMap<String, Operator>,
}

impl Operators {
    /// Registry preloaded with the starter operator set.
    pub fn new() -> Self {
        let mut ops = Self::empty();
        super::builtins::install(&mut ops);
        ops
    }

    pub fn empty() -> Self {
        Self {
            ops: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Operator> {
        self.ops.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    pub fn register(&mut self, operator: Operator) -> Option<Operator> {
        self.ops.insert(operator.name.clone(), operator)
    }

    /// Registers the operator `name` again under `alias`.
    pub fn alias(&mut self, alias: &str, name: &str) -> bool {
        let Some(op) = self.ops.get(name) else {
            return false;
        };
        let mut aliased = op.clone();
        aliased.name = alias.to_string();
        self.ops.insert(alias.to_string(), aliased);
        true
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ops.keys().map(String::as_str)
    }
}

impl Default for Operators {
    fn default() -> Self {
        Self::new()
    }
}
