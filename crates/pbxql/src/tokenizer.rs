//! Query tokenizer.
//!
//! Tokenizing happens in three passes:
//!
//! 1. **Split** the input on a fixed delimiter set, longest delimiter first,
//!    so `!=` is never split into `!` and `=`.
//! 2. **Merge quotes**: a quote token swallows everything up to the next
//!    identical quote, markers included.
//! 3. **Merge groups**: a `(` token swallows everything up to its matching
//!    `)`, nested groups included.
//!
//! Every token is a slice of the original query and remembers its byte
//! offset, so merged tokens are plain spans over the input.

use tracing::{trace, warn};

use crate::error::{QueryError, Result};

/// Delimiters, ordered longest first.
const DELIMITERS: &[&str] = &[
    "\r\n", "!=", ">=", "<=", "&&", "||", " ", "\t", "\n", "\r", "(", ")", "'", "\"", "`", "´",
    "=", "<", ">", "!", ",", ";", "+", "*", "/",
];

/// Characters that open and close a quoted token.
pub const QUOTES: &[char] = &['\'', '"', '`', '´'];

/// What a token is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Free text between delimiters.
    Text,
    /// A single delimiter (operator symbol, punctuation or whitespace).
    Delimiter,
    /// A quoted string, quote markers included.
    Quoted,
    /// A parenthesized group, parentheses included.
    Group,
}

/// A contiguous slice of the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of the first character in the original query.
    pub offset: usize,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, text: &'a str, offset: usize) -> Self {
        Token { kind, text, offset }
    }

    /// Byte offset one past the last character.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    /// Returns `true` for whitespace-only tokens.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Returns the quote character if this token is a lone quote delimiter.
    fn quote_mark(&self) -> Option<char> {
        if self.kind != TokenKind::Delimiter {
            return None;
        }
        let mut chars = self.text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if QUOTES.contains(&c) => Some(c),
            _ => None,
        }
    }

    fn is_delimiter(&self, text: &str) -> bool {
        self.kind == TokenKind::Delimiter && self.text == text
    }
}

/// A slice of the query being tokenized, plus its position in the whole.
#[derive(Clone, Copy)]
struct Source<'a> {
    text: &'a str,
    base: usize,
}

impl<'a> Source<'a> {
    fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.text[start - self.base..end - self.base]
    }

    fn end(&self) -> usize {
        self.base + self.text.len()
    }
}

/// Splits queries into tokens.
///
/// By default an unterminated quote or an unbalanced parenthesis is an error.
/// In lenient mode the open quote or group silently runs to the end of the
/// input instead.
///
/// # Example
///
/// ```
/// use pbxql::{Tokenizer, TokenKind};
///
/// let tokens = Tokenizer::new().tokenize("name = \"a b\"").unwrap();
/// let words: Vec<&str> = tokens
///     .iter()
///     .filter(|t| !t.is_blank())
///     .map(|t| t.text)
///     .collect();
/// assert_eq!(words, vec!["name", "=", "\"a b\""]);
/// assert_eq!(tokens.last().unwrap().kind, TokenKind::Quoted);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer {
    lenient: bool,
}

impl Tokenizer {
    /// Creates a strict tokenizer.
    pub fn new() -> Self {
        Tokenizer::default()
    }

    /// Enables or disables lenient handling of unterminated quotes and groups.
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Tokenizes a whole query.
    pub fn tokenize<'a>(&self, query: &'a str) -> Result<Vec<Token<'a>>> {
        self.tokenize_at(query, 0)
    }

    /// Tokenizes `text`, which starts at byte `base` of the original query.
    pub(crate) fn tokenize_at<'a>(&self, text: &'a str, base: usize) -> Result<Vec<Token<'a>>> {
        let source = Source { text, base };
        let tokens = split(source);
        let tokens = self.merge_quotes(source, tokens)?;
        let tokens = self.merge_groups(source, tokens)?;
        trace!(count = tokens.len(), base, "tokenized");
        Ok(tokens)
    }

    fn merge_quotes<'a>(
        &self,
        source: Source<'a>,
        tokens: Vec<Token<'a>>,
    ) -> Result<Vec<Token<'a>>> {
        let mut merged = Vec::with_capacity(tokens.len());
        let mut iter = tokens.into_iter();

        while let Some(token) = iter.next() {
            let Some(quote) = token.quote_mark() else {
                merged.push(token);
                continue;
            };

            let close = iter.by_ref().find(|next| next.quote_mark() == Some(quote));
            let end = match close {
                Some(close) => close.end(),
                None if self.lenient => {
                    warn!(offset = token.offset, %quote, "unterminated quote runs to end of query");
                    source.end()
                }
                None => {
                    return Err(QueryError::UnterminatedQuote {
                        quote,
                        offset: token.offset,
                    })
                }
            };

            merged.push(Token::new(
                TokenKind::Quoted,
                source.slice(token.offset, end),
                token.offset,
            ));
        }

        Ok(merged)
    }

    fn merge_groups<'a>(
        &self,
        source: Source<'a>,
        tokens: Vec<Token<'a>>,
    ) -> Result<Vec<Token<'a>>> {
        let mut merged = Vec::with_capacity(tokens.len());
        let mut iter = tokens.into_iter();

        while let Some(token) = iter.next() {
            if token.is_delimiter(")") && !self.lenient {
                return Err(QueryError::UnbalancedParenthesis {
                    offset: token.offset,
                });
            }
            if !token.is_delimiter("(") {
                merged.push(token);
                continue;
            }

            let mut depth = 1usize;
            let mut end = None;
            for next in iter.by_ref() {
                if next.is_delimiter("(") {
                    depth += 1;
                } else if next.is_delimiter(")") {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(next.end());
                        break;
                    }
                }
            }

            let end = match end {
                Some(end) => end,
                None if self.lenient => {
                    warn!(offset = token.offset, "unclosed group runs to end of query");
                    source.end()
                }
                None => {
                    return Err(QueryError::UnbalancedParenthesis {
                        offset: token.offset,
                    })
                }
            };

            merged.push(Token::new(
                TokenKind::Group,
                source.slice(token.offset, end),
                token.offset,
            ));
        }

        Ok(merged)
    }
}

/// Tokenizes a query with the strict default settings.
pub fn tokenize(query: &str) -> Result<Vec<Token<'_>>> {
    Tokenizer::new().tokenize(query)
}

/// First pass: split on delimiters, longest match first.
fn split(source: Source<'_>) -> Vec<Token<'_>> {
    let text = source.text;
    let mut tokens = Vec::new();
    let mut pending: Option<usize> = None;
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        match DELIMITERS.iter().find(|delim| rest.starts_with(**delim)) {
            Some(delim) => {
                if let Some(start) = pending.take() {
                    tokens.push(Token::new(
                        TokenKind::Text,
                        &text[start..pos],
                        source.base + start,
                    ));
                }
                tokens.push(Token::new(
                    TokenKind::Delimiter,
                    &text[pos..pos + delim.len()],
                    source.base + pos,
                ));
                pos += delim.len();
            }
            None => {
                if pending.is_none() {
                    pending = Some(pos);
                }
                pos += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    if let Some(start) = pending {
        tokens.push(Token::new(
            TokenKind::Text,
            &text[start..],
            source.base + start,
        ));
    }

    tokens
}
