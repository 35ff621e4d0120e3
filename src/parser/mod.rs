mod classifier;
mod locations;
mod macros;
pub mod tokenizer;

pub use classifier::{classify, literal, Classified};
pub(crate) use locations::LineMap;
pub use locations::{Locatable, Location, Span};
pub use macros::{expand, Macros};
pub use tokenizer::{render, tokenize, Token, TokenType, Tokenizer};
