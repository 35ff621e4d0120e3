use std::collections::HashMap;

use super::tokenizer::{tokenize, Token, TokenType};
use crate::error::EvalError;

/// Shortcut words and the tokens they stand for.
#[derive(Clone, Debug, Default)]
pub struct Macros {
    table: HashMap<String, Vec<Token>>,
}

impl Macros {
    pub fn new() -> Self {
        Self::default()
    }

    /// `sum` and `prod` as greedy `add` and `mul`.
    pub fn standard() -> Self {
        let mut macros = Self::new();
        macros.insert_words("sum", &["add*"]);
        macros.insert_words("prod", &["mul*"]);
        macros
    }

    /// Defines `shortcut` as the tokens of `replacement`.
    pub fn define(&mut self, shortcut: impl Into<String>, replacement: &str) -> Result<(), EvalError> {
        let tokens = tokenize(replacement)?;
        self.table.insert(shortcut.into(), tokens);
        Ok(())
    }

    fn insert_words(&mut self, shortcut: &str, words: &[&str]) {
        let tokens = words
            .iter()
            .map(|w| Token::bare(w, Default::default()))
            .collect();
        self.table.insert(shortcut.to_string(), tokens);
    }

    pub fn get(&self, shortcut: &str) -> Option<&[Token]> {
        self.table.get(shortcut).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Single left-to-right pass. Replacement tokens are not expanded
    /// again, and take the span and index of the shortcut they replace.
    pub fn expand(&self, tokens: Vec<Token>) -> Vec<Token> {
        let mut expanded = Vec::with_capacity(tokens.len());
        for token in tokens {
            let replacement = match token.typ {
                TokenType::BareWord => self.get(&token.lexeme),
                _ => None,
            };
            match replacement {
                Some(replacement) => {
                    tracing::trace!(shortcut = %token, "expanding macro");
                    expanded.extend(replacement.iter().map(|t| Token {
                        span: token.span,
                        index: token.index,
                        ..t.clone()
                    }));
                }
                None => expanded.push(token),
            }
        }
        expanded
    }
}

/// Applies `macros` if present, otherwise passes tokens through.
pub fn expand(tokens: Vec<Token>, macros: Option<&Macros>) -> Vec<Token> {
    match macros {
        Some(macros) if !macros.is_empty() => macros.expand(tokens),
        _ => tokens,
    }
}
