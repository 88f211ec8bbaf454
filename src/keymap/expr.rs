//! Precondition expressions over the context-key store
//!
//! A precondition is a small boolean tree evaluated against a
//! [`ContextKeyStore`] snapshot. The same tree can be written as text:
//!
//! ```text
//! feature-context-active && !input-focused
//! feature-context-active && (find-widget-visible || mode == 'search')
//! ```
//!
//! Precedence from loosest to tightest: `||`, `&&`, `==`/`!=`, `!`.
//! `true` and `false` are constants; `k != v` is shorthand for `!(k == v)`.

use std::fmt;

use thiserror::Error;

use super::context::{ContextKeyStore, ContextValue};

/// Errors raised while building or parsing an expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },
    #[error("expected ')' at offset {0}")]
    UnclosedParen(usize),
    #[error("unterminated string literal starting at offset {0}")]
    UnterminatedString(usize),
    #[error("context key names must not be empty")]
    EmptyKey,
    #[error("invalid context key name {0:?}")]
    InvalidKey(String),
    #[error("number literals must be finite")]
    NonFiniteNumber,
}

/// A precondition tree
#[derive(Debug, Clone, PartialEq)]
pub enum ContextKeyExpr {
    /// The key is present with a truthy value
    Has(String),
    /// The key is present and strictly equal to the literal
    Equals(String, ContextValue),
    Not(Box<ContextKeyExpr>),
    /// All children hold; empty is true
    And(Vec<ContextKeyExpr>),
    /// Any child holds; empty is false
    Or(Vec<ContextKeyExpr>),
}

impl ContextKeyExpr {
    pub fn has(key: impl Into<String>) -> Self {
        ContextKeyExpr::Has(key.into())
    }

    pub fn equals(key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        ContextKeyExpr::Equals(key.into(), value.into())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: ContextKeyExpr) -> Self {
        ContextKeyExpr::Not(Box::new(expr))
    }

    pub fn and(exprs: impl IntoIterator<Item = ContextKeyExpr>) -> Self {
        ContextKeyExpr::And(exprs.into_iter().collect())
    }

    pub fn or(exprs: impl IntoIterator<Item = ContextKeyExpr>) -> Self {
        ContextKeyExpr::Or(exprs.into_iter().collect())
    }

    /// Conjoin two independent preconditions, flattening nested `And`s
    pub fn and_also(self, other: ContextKeyExpr) -> Self {
        let mut parts = match self {
            ContextKeyExpr::And(parts) => parts,
            expr => vec![expr],
        };
        match other {
            ContextKeyExpr::And(more) => parts.extend(more),
            expr => parts.push(expr),
        }
        ContextKeyExpr::And(parts)
    }

    /// Evaluate against a store snapshot. Unknown keys are falsy.
    pub fn evaluate(&self, store: &ContextKeyStore) -> bool {
        match self {
            ContextKeyExpr::Has(key) => store.is_truthy(key),
            ContextKeyExpr::Equals(key, value) => store.get(key) == Some(value),
            ContextKeyExpr::Not(expr) => !expr.evaluate(store),
            ContextKeyExpr::And(exprs) => exprs.iter().all(|e| e.evaluate(store)),
            ContextKeyExpr::Or(exprs) => exprs.iter().any(|e| e.evaluate(store)),
        }
    }

    /// Reject trees that cannot be written back as text
    ///
    /// Key names must be non-empty identifiers other than `true`/`false`, and
    /// number literals must be finite.
    pub fn validate(&self) -> Result<(), ExprError> {
        match self {
            ContextKeyExpr::Has(key) => validate_key(key),
            ContextKeyExpr::Equals(key, value) => {
                validate_key(key)?;
                match value {
                    ContextValue::Number(n) if !n.is_finite() => Err(ExprError::NonFiniteNumber),
                    _ => Ok(()),
                }
            }
            ContextKeyExpr::Not(expr) => expr.validate(),
            ContextKeyExpr::And(exprs) | ContextKeyExpr::Or(exprs) => {
                exprs.iter().try_for_each(ContextKeyExpr::validate)
            }
        }
    }

    /// Context keys this expression reads, in first-seen order
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        self.collect_keys(&mut keys);
        keys
    }

    fn collect_keys<'a>(&'a self, keys: &mut Vec<&'a str>) {
        match self {
            ContextKeyExpr::Has(key) | ContextKeyExpr::Equals(key, _) => {
                if !keys.contains(&key.as_str()) {
                    keys.push(key);
                }
            }
            ContextKeyExpr::Not(expr) => expr.collect_keys(keys),
            ContextKeyExpr::And(exprs) | ContextKeyExpr::Or(exprs) => {
                for expr in exprs {
                    expr.collect_keys(keys);
                }
            }
        }
    }

    /// Parse the text form of an expression
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        let mut parser = Parser { source, pos: 0 };
        let expr = parser.parse_or()?;
        parser.skip_whitespace();
        match parser.peek() {
            None => Ok(expr),
            Some(found) => Err(ExprError::UnexpectedChar {
                found,
                offset: parser.pos,
            }),
        }
    }
}

/// Evaluate `expr` against `store`
pub fn evaluate(expr: &ContextKeyExpr, store: &ContextKeyStore) -> bool {
    expr.evaluate(store)
}

impl std::str::FromStr for ContextKeyExpr {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ContextKeyExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextKeyExpr::Has(key) => write!(f, "{}", key),
            ContextKeyExpr::Equals(key, value) => write!(f, "{} == {}", key, value),
            ContextKeyExpr::Not(expr) => match expr.as_ref() {
                ContextKeyExpr::Equals(key, value) => write!(f, "{} != {}", key, value),
                ContextKeyExpr::Has(key) => write!(f, "!{}", key),
                ContextKeyExpr::Not(_) => write!(f, "!{}", expr),
                _ => write!(f, "!({})", expr),
            },
            ContextKeyExpr::And(exprs) if exprs.is_empty() => write!(f, "true"),
            ContextKeyExpr::Or(exprs) if exprs.is_empty() => write!(f, "false"),
            ContextKeyExpr::And(exprs) => write_joined(f, exprs, " && "),
            ContextKeyExpr::Or(exprs) => write_joined(f, exprs, " || "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, exprs: &[ContextKeyExpr], sep: &str) -> fmt::Result {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        // Nested n-ary nodes keep their grouping
        match expr {
            ContextKeyExpr::And(inner) | ContextKeyExpr::Or(inner) if !inner.is_empty() => {
                write!(f, "({})", expr)?
            }
            _ => write!(f, "{}", expr)?,
        }
    }
    Ok(())
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_whitespace();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<ContextKeyExpr, ExprError> {
        let mut parts = vec![self.parse_and()?];
        while self.eat("||") {
            parts.push(self.parse_and()?);
        }
        Ok(if parts.len() == 1 {
            parts.remove(0)
        } else {
            ContextKeyExpr::Or(parts)
        })
    }

    fn parse_and(&mut self) -> Result<ContextKeyExpr, ExprError> {
        let mut parts = vec![self.parse_unary()?];
        while self.eat("&&") {
            parts.push(self.parse_unary()?);
        }
        Ok(if parts.len() == 1 {
            parts.remove(0)
        } else {
            ContextKeyExpr::And(parts)
        })
    }

    fn parse_unary(&mut self) -> Result<ContextKeyExpr, ExprError> {
        self.skip_whitespace();
        // `!=` is handled after an identifier, so a leading `!` is always negation
        if self.eat("!") {
            return Ok(ContextKeyExpr::not(self.parse_unary()?));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<ContextKeyExpr, ExprError> {
        self.skip_whitespace();
        let Some(next) = self.peek() else {
            return Err(ExprError::UnexpectedEnd);
        };

        if next == '(' {
            self.pos += 1;
            let expr = self.parse_or()?;
            if !self.eat(")") {
                return Err(ExprError::UnclosedParen(self.pos));
            }
            return Ok(expr);
        }

        if !is_identifier_char(next) {
            return Err(ExprError::UnexpectedChar {
                found: next,
                offset: self.pos,
            });
        }

        let key = self.identifier();
        if self.eat("==") {
            let value = self.literal()?;
            return Ok(ContextKeyExpr::Equals(key.to_string(), value));
        }
        if self.eat("!=") {
            let value = self.literal()?;
            return Ok(ContextKeyExpr::not(ContextKeyExpr::Equals(
                key.to_string(),
                value,
            )));
        }

        Ok(match key {
            "true" => ContextKeyExpr::And(Vec::new()),
            "false" => ContextKeyExpr::Or(Vec::new()),
            _ => ContextKeyExpr::Has(key.to_string()),
        })
    }

    fn identifier(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !is_identifier_char(c))
            .unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn literal(&mut self) -> Result<ContextValue, ExprError> {
        self.skip_whitespace();
        let start = self.pos;
        match self.peek() {
            None => Err(ExprError::UnexpectedEnd),
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                let mut value = String::new();
                let mut chars = self.rest().char_indices();
                while let Some((i, c)) = chars.next() {
                    match c {
                        '\\' => {
                            if let Some((_, escaped)) = chars.next() {
                                value.push(escaped);
                            }
                        }
                        c if c == quote => {
                            self.pos += i + c.len_utf8();
                            return Ok(ContextValue::String(value));
                        }
                        c => value.push(c),
                    }
                }
                Err(ExprError::UnterminatedString(start))
            }
            Some(c) if is_identifier_char(c) => {
                let word = self.identifier();
                Ok(match word {
                    "true" => ContextValue::Bool(true),
                    "false" => ContextValue::Bool(false),
                    _ => match word.parse::<f64>() {
                        Ok(n) if n.is_finite() => ContextValue::Number(n),
                        _ => ContextValue::String(word.to_string()),
                    },
                })
            }
            Some(found) => Err(ExprError::UnexpectedChar {
                found,
                offset: start,
            }),
        }
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn validate_key(key: &str) -> Result<(), ExprError> {
    if key.is_empty() {
        return Err(ExprError::EmptyKey);
    }
    if matches!(key, "true" | "false") || !key.chars().all(is_identifier_char) {
        return Err(ExprError::InvalidKey(key.to_string()));
    }
    Ok(())
}
