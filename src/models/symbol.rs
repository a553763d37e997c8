use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Prefix of the optional header line exported by the screener
const HEADER_PREFIX: &str = "symbols from";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("symbol is empty")]
    Empty,
    #[error("symbol {0:?} contains whitespace")]
    Whitespace(String),
}

/// Ticker symbol of a tradable instrument
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(raw: &str) -> Result<Self, SymbolError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SymbolError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(SymbolError::Whitespace(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filesystem-safe rendition of the symbol.
    ///
    /// Anything outside `[A-Za-z0-9._-]` becomes `_`.
    pub fn file_stem(&self) -> String {
        self.0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = SymbolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

/// Parse a pasted, newline-separated symbol list.
///
/// A leading `Symbols from ...` header line is dropped, blank lines are
/// skipped and input order is preserved. Lines holding more than one token
/// are rejected.
pub fn parse_symbol_list(input: &str) -> Result<Vec<Symbol>, SymbolError> {
    let mut lines = input.trim().lines().peekable();

    if let Some(first) = lines.peek() {
        if first.trim().to_lowercase().starts_with(HEADER_PREFIX) {
            lines.next();
        }
    }

    lines
        .filter(|line| !line.trim().is_empty())
        .map(Symbol::parse)
        .collect()
}
