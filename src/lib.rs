//! A small stack-based expression language.
//!
//! Programs are whitespace separated words. Literals and references are
//! pushed onto the current stack, brackets open and close nested scopes,
//! and operators transform the current stack. An operator word may carry a
//! repetition suffix: `add*3` runs `add` three times, `add*` runs it until
//! it fails.
//!
//! ```
//! use std::collections::HashMap;
//! use stackeval::{eval, Macros, Operators, Value, Word};
//!
//! let env = HashMap::from([("name".to_string(), Value::from("Jack"))]);
//! let ops = Operators::new();
//! let result = eval("'hello ' name '!' add*", &env, &ops, None).unwrap();
//! assert_eq!(result, vec![Word::literal("hello Jack!")]);
//!
//! let macros = Macros::standard();
//! let result = eval("2 2 2 prod 4 sum", &env, &ops, Some(&macros)).unwrap();
//! assert_eq!(result, vec![Word::literal(12)]);
//! ```

mod config;
mod error;
mod interpreter;
mod parser;

pub use config::{Config, DEPTH_LIMIT, GREEDY_LIMIT, STACK_LIMIT};
pub use error::{ErrorKind, EvalError, OperatorError, Position};
pub use interpreter::{
    Body, Empty, Environment, Evaluator, Modifier, Operands, Operator, Operators, ScopeHeap,
    Stack, Value, Word, MODIFIER_MARKER,
};
pub use parser::{
    classify, expand, literal, render, tokenize, Classified, Locatable, Location, Macros, Span,
    Token, TokenType, Tokenizer,
};

/// Evaluates `text` with the default [`Config`].
pub fn eval(
    text: &str,
    env: &dyn Environment,
    operators: &Operators,
    macros: Option<&Macros>,
) -> Result<Vec<Word>, EvalError> {
    let mut evaluator = Evaluator::new(env, operators);
    if let Some(macros) = macros {
        evaluator = evaluator.with_macros(macros);
    }
    evaluator.eval(text)
}
