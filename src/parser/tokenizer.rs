use super::locations::{LineMap, Locatable, Span};
use crate::error::{ErrorKind, EvalError, Position};
use const_format::concatcp;
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub(crate) typ: TokenType,
    pub(crate) lexeme: String,
    pub(crate) span: Span,
    pub(crate) quote: Option<char>,
    /// Index of the source token this one came from. Macro replacements
    /// share the index of the shortcut they replace.
    pub(crate) index: usize,
}

impl Token {
    pub fn typ(&self) -> TokenType {
        self.typ
    }

    /// Token text without delimiters.
    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn quote(&self) -> Option<char> {
        self.quote
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn bare(lexeme: &str, span: Span) -> Self {
        let typ = match lexeme {
            OPEN => TokenType::OpenBracket,
            CLOSE => TokenType::CloseBracket,
            _ => TokenType::BareWord,
        };
        Self {
            typ,
            lexeme: lexeme.to_string(),
            span,
            quote: None,
            index: 0,
        }
    }
}

impl Locatable for Token {
    fn span(&self) -> Span {
        self.span
    }
}

/// Prints the token the way it would be written in a program, so that
/// re-tokenizing the printed form yields the same token.
impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.quote {
            Some(q) => write!(f, "{q}{}{q}", self.lexeme),
            None => write!(f, "{}", self.lexeme),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenType {
    OpenBracket,
    CloseBracket,
    QuotedLiteral,
    BareWord,
}

pub(crate) const OPEN: &str = "(";
pub(crate) const CLOSE: &str = ")";

const DELIMITERS: &str = r#"\s()"'"#;
const S_WHITESPACE: &str = r"^\s+";
const S_BRACKET: &str = r"^[()]";
const S_QUOTE: &str = r#"^["']"#;
const S_BAREWORD: &str = concatcp!("^[^", DELIMITERS, "]+");

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(S_WHITESPACE).expect("Error compiling regex."));
static BRACKET: Lazy<Regex> = Lazy::new(|| Regex::new(S_BRACKET).expect("Error compiling regex."));
static QUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(S_QUOTE).expect("Error compiling regex."));
static BAREWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(S_BAREWORD).expect("Error compiling regex."));

/// Splits program text into tokens. Whitespace separates words, brackets
/// always stand alone, and a quote character captures everything up to the
/// next identical quote as one literal.
pub struct Tokenizer<'a> {
    text: &'a str,
    lines: LineMap<'a>,
    tokens: Vec<Token>,
    start: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            lines: LineMap::new(text),
            tokens: vec![],
            start: 0,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, EvalError> {
        let text = self.text;
        while self.start < text.len() {
            let rest = &text[self.start..];
            if let Some(m) = WHITESPACE.find(rest) {
                self.start += m.end();
                continue;
            }
            if self.find_by_regex(&BRACKET) {
                continue;
            }
            if let Some(m) = QUOTE.find(rest) {
                self.quoted(m.as_str())?;
                continue;
            }
            if self.find_by_regex(&BAREWORD) {
                continue;
            }
            unreachable!("every character is whitespace, a delimiter or part of a word");
        }
        tracing::trace!(count = self.tokens.len(), "tokenized");
        Ok(self.tokens)
    }

    fn quoted(&mut self, delimiter: &str) -> Result<(), EvalError> {
        let text = self.text;
        let body_start = self.start + delimiter.len();
        let Some(len) = text[body_start..].find(delimiter) else {
            return Err(EvalError::new(
                ErrorKind::UnterminatedQuote,
                Position {
                    index: self.tokens.len(),
                    span: self.lines.span(self.start, text.len()),
                },
            ));
        };
        let end = body_start + len + delimiter.len();
        self.push(Token {
            typ: TokenType::QuotedLiteral,
            lexeme: text[body_start..body_start + len].to_string(),
            span: self.lines.span(self.start, end),
            quote: delimiter.chars().next(),
            index: 0,
        });
        self.start = end;
        Ok(())
    }

    fn push(&mut self, mut token: Token) {
        token.index = self.tokens.len();
        self.tokens.push(token);
    }

    fn find_by_regex(&mut self, regex: &Regex) -> bool {
        let text = self.text;
        if let Some(m) = regex.find(&text[self.start..]) {
            let end = self.start + m.end();
            let token = Token::bare(m.as_str(), self.lines.span(self.start, end));
            self.push(token);
            self.start = end;
            return true;
        }
        false
    }
}

pub fn tokenize(text: &str) -> Result<Vec<Token>, EvalError> {
    Tokenizer::new(text).tokenize()
}

/// Source form of a token sequence, single-space separated.
pub fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
