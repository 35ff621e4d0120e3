mod builtins;
mod environment;
mod operators;
mod scope;
mod value;

pub use environment::{Empty, Environment};
pub use operators::{Body, Modifier, Operands, Operator, Operators, MODIFIER_MARKER};
pub use scope::{ScopeHeap, Stack};
pub use value::{Value, Word};

use crate::config::Config;
use crate::error::{ErrorKind, EvalError, OperatorError, Position};
use crate::parser::{classify, expand, tokenize, Classified, LineMap, Macros, Token};

/// Evaluates programs against one environment and operator registry. Both
/// are only read; every evaluation gets its own scope heap.
pub struct Evaluator<'a> {
    env: &'a dyn Environment,
    operators: &'a Operators,
    macros: Option<&'a Macros>,
    config: Config,
}

impl<'a> Evaluator<'a> {
    pub fn new(env: &'a dyn Environment, operators: &'a Operators) -> Self {
        Self {
            env,
            operators,
            macros: None,
            config: Config::default(),
        }
    }

    pub fn with_macros(mut self, macros: &'a Macros) -> Self {
        self.macros = Some(macros);
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Runs `text` and returns the final stack, bottom first.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn eval(&self, text: &str) -> Result<Vec<Word>, EvalError> {
        let tokens = tokenize(text)?;
        let end = Position {
            index: tokens.len(),
            span: LineMap::new(text).end(),
        };
        Execution::new(self, expand(tokens, self.macros), end).run()
    }
}

enum State {
    Running,
    Done,
    Failed(EvalError),
}

/// One pass over a token sequence.
struct Execution<'a> {
    env: &'a dyn Environment,
    operators: &'a Operators,
    config: Config,
    tokens: Vec<Token>,
    cursor: usize,
    heap: ScopeHeap,
    state: State,
    end: Position,
}

impl<'a> Execution<'a> {
    fn new(evaluator: &Evaluator<'a>, tokens: Vec<Token>, end: Position) -> Self {
        let config = evaluator.config;
        Self {
            env: evaluator.env,
            operators: evaluator.operators,
            config,
            tokens,
            cursor: 0,
            heap: ScopeHeap::new(config.stack_limit, config.depth_limit),
            state: State::Running,
            end,
        }
    }

    fn run(mut self) -> Result<Vec<Word>, EvalError> {
        while let State::Running = self.state {
            self.step();
        }
        match std::mem::replace(&mut self.state, State::Done) {
            State::Failed(err) => Err(err),
            _ => self.finish(),
        }
    }

    fn step(&mut self) {
        let Some(token) = self.tokens.get(self.cursor) else {
            self.state = if self.heap.depth() == 1 {
                State::Done
            } else {
                tracing::debug!(open = self.heap.depth() - 1, "scopes left open");
                State::Failed(self.at_end(ErrorKind::ScopeUnderflow))
            };
            return;
        };
        let position = Position {
            index: token.index(),
            span: token.span,
        };
        let classified = classify(token, self.operators);
        match self.execute(classified) {
            Ok(()) => self.cursor += 1,
            Err(kind) => self.state = State::Failed(EvalError::new(kind, position)),
        }
    }

    fn execute(&mut self, classified: Classified) -> Result<(), ErrorKind> {
        match classified {
            Classified::OpenScope => {
                self.heap.push_scope()?;
                tracing::trace!(depth = self.heap.depth(), "scope opened");
            }
            Classified::CloseScope => {
                self.heap.pop_scope()?;
                tracing::trace!(depth = self.heap.depth(), "scope closed");
            }
            Classified::Word(word) => self.heap.push(word)?,
            Classified::Invocation { name, modifier } => {
                let operators = self.operators;
                let op = operators
                    .get(&name)
                    .ok_or_else(|| OperatorError::failed(format!("unknown operator `{name}`")))?;
                let count = operators::dispatch(
                    op,
                    modifier,
                    &mut self.heap,
                    self.env,
                    self.config.greedy_limit,
                )?;
                tracing::debug!(op = %name, %modifier, count, "operator applied");
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<Vec<Word>, EvalError> {
        let end = self.end;
        let words = self
            .heap
            .into_result()
            .map_err(|_| EvalError::new(ErrorKind::ScopeUnderflow, end))?;
        if !self.config.resolve_trailing {
            return Ok(words);
        }
        let env = self.env;
        words
            .into_iter()
            .map(|word| match word {
                Word::Reference(name) => match env.lookup(&name) {
                    Some(value) => Ok(Word::Literal(value)),
                    None => Err(EvalError::new(ErrorKind::UnresolvedReference(name), end)),
                },
                literal => Ok(literal),
            })
            .collect()
    }

    fn at_end(&self, kind: ErrorKind) -> EvalError {
        EvalError::new(kind, self.end)
    }
}
