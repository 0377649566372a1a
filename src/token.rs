//! Tokens handed to the loader by the parameter-file lexer.
//!
//! The lexer itself lives outside this crate. All the loader needs from it is
//! the token text, the line it started on, and whether it was a quoted string
//! (quoted text is never punctuation, even when it reads `{` or `;`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// One lexical token of parameter-file text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// 1-indexed source line.
    pub line: usize,
    /// Set when the token came from a quoted string literal.
    pub is_string: bool,
}

impl Token {
    pub fn new(text: impl Into<String>, line: usize) -> Self {
        Self {
            text: text.into(),
            line,
            is_string: false,
        }
    }

    /// A token lexed from a quoted string literal.
    pub fn quoted(text: impl Into<String>, line: usize) -> Self {
        Self {
            text: text.into(),
            line,
            is_string: true,
        }
    }

    /// True when this token is the unquoted punctuation `p`.
    pub fn is_punct(&self, p: &str) -> bool {
        !self.is_string && self.text == p
    }

    pub(crate) fn is_delimiter(&self) -> bool {
        !self.is_string && matches!(self.text.as_str(), "{" | "}" | "," | ";" | "=")
    }
}

/// Where a token sits in the stream: its source line and its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub token: usize,
}

impl Location {
    pub fn new(line: usize, token: usize) -> Self {
        Self { line, token }
    }

    /// Location of `tokens[index]`, or of the end of the stream when `index`
    /// is past the last token.
    pub fn at(tokens: &[Token], index: usize) -> Self {
        match tokens.get(index).or_else(|| tokens.last()) {
            Some(tok) => Self::new(tok.line, index),
            None => Self::default(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, token {}", self.line, self.token)
    }
}
