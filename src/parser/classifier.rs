use const_format::concatcp;
use once_cell::sync::Lazy;
use regex::Regex;

use super::tokenizer::{Token, TokenType};
use crate::interpreter::{Modifier, Operators, Value, Word};

/// What a token means to the evaluator.
#[derive(Clone, Debug, PartialEq)]
pub enum Classified {
    OpenScope,
    CloseScope,
    Word(Word),
    Invocation { name: String, modifier: Modifier },
}

const TRUE: &str = "True";
const FALSE: &str = "False";

const S_SIGN: &str = r"[-+]?";
const S_DIGITS: &str = r"[0-9]+";
const S_DECIMAL: &str = concatcp!(S_DIGITS, r"(?:\.[0-9]*)?|\.", S_DIGITS);
const S_NUMBER: &str = concatcp!("^", S_SIGN, "(?:", S_DECIMAL, ")$");
const S_MODIFIED: &str = r"^(.+?)\*([0-9]*)$";

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(S_NUMBER).expect("Error compiling regex."));
static MODIFIED: Lazy<Regex> =
    Lazy::new(|| Regex::new(S_MODIFIED).expect("Error compiling regex."));

/// Classifies one token. Precedence is fixed: brackets, quoted literals,
/// numbers, booleans, operators, and finally references. An operator name
/// therefore hides an environment entry of the same name.
pub fn classify(token: &Token, operators: &Operators) -> Classified {
    match token.typ {
        TokenType::OpenBracket => return Classified::OpenScope,
        TokenType::CloseBracket => return Classified::CloseScope,
        TokenType::QuotedLiteral => return Classified::Word(Word::literal(token.lexeme.as_str())),
        TokenType::BareWord => {}
    }
    if let Some(value) = literal(&token.lexeme) {
        return Classified::Word(Word::Literal(value));
    }
    if let Some((name, modifier)) = invocation(&token.lexeme, operators) {
        return Classified::Invocation {
            name: name.to_string(),
            modifier,
        };
    }
    Classified::Word(Word::reference(token.lexeme.as_str()))
}

/// Number or boolean spelled by a bare word.
pub fn literal(text: &str) -> Option<Value> {
    match text {
        TRUE => return Some(Value::Bool(true)),
        FALSE => return Some(Value::Bool(false)),
        _ => {}
    }
    if NUMBER.is_match(text) {
        return text.parse().ok().map(Value::Number);
    }
    None
}

/// Splits `text` into a registered operator name and its modifier. A
/// malformed suffix means the word is not an invocation at all.
fn invocation<'t>(text: &'t str, operators: &Operators) -> Option<(&'t str, Modifier)> {
    if operators.contains(text) {
        return Some((text, Modifier::Once));
    }
    let caps = MODIFIED.captures(text)?;
    let name = caps.get(1)?.as_str();
    if !operators.contains(name) {
        return None;
    }
    let modifier = match caps.get(2).map(|m| m.as_str()) {
        None | Some("") => Modifier::Greedy,
        Some(count) => Modifier::Times(count.parse().ok()?),
    };
    Some((name, modifier))
}
