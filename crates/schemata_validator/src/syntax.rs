//! Schema expression syntax.
//!
//! A schema document is a tree whose leaves are validator expressions such as
//! `str(min=3)`, `enum('a', 'b')`, `list(include('node'), required=False)` or
//! `any(int(), null())`. This module parses one expression string into a
//! `CallExpr` that the registry turns into a validator instance.
//!
//! Literals follow the original schema language: quoted strings, integers,
//! floats, booleans (`True`/`true`), `None`/`null`, bare dates
//! (`2018-01-01`), and bracketed lists of scalars. A bare tag without
//! parentheses is accepted as a zero-argument call.

use crate::error::SchemaError;
use chrono::{NaiveDate, NaiveDateTime};
use schemata_core::Value;

/// One argument of a call: either a scalar literal or a nested call.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// A literal value
    Scalar(Value),
    /// A nested validator expression
    Call(CallExpr),
}

impl Arg {
    /// Returns the scalar literal, if this argument is one.
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Arg::Scalar(v) => Some(v),
            Arg::Call(_) => None,
        }
    }

    /// Returns the nested call, if this argument is one.
    pub fn as_call(&self) -> Option<&CallExpr> {
        match self {
            Arg::Call(c) => Some(c),
            Arg::Scalar(_) => None,
        }
    }
}

/// A parsed validator expression: a tag plus positional and keyword arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    /// The validator tag or name being invoked
    pub name: String,
    /// Positional arguments in declaration order
    pub args: Vec<Arg>,
    /// Keyword arguments in declaration order
    pub kwargs: Vec<(String, Arg)>,
}

impl CallExpr {
    /// Looks up a keyword argument by name.
    pub fn kwarg(&self, name: &str) -> Option<&Arg> {
        self.kwargs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Verifies that every keyword argument is in the allowed set.
    ///
    /// `required` is accepted on every validator and is handled at the schema
    /// node level, so it is always allowed here.
    pub fn check_kwargs(&self, allowed: &[&str]) -> Result<(), SchemaError> {
        for (key, _) in &self.kwargs {
            if key != "required" && !allowed.contains(&key.as_str()) {
                return Err(SchemaError::IncompatibleConstraint {
                    tag: self.name.clone(),
                    constraint: key.clone(),
                });
            }
        }
        Ok(())
    }

    /// Reads a boolean keyword argument, defaulting when absent.
    pub fn bool_kwarg(&self, name: &str, default: bool) -> Result<bool, SchemaError> {
        match self.kwarg(name) {
            None => Ok(default),
            Some(Arg::Scalar(Value::Bool(b))) => Ok(*b),
            Some(other) => Err(SchemaError::arguments(
                &self.name,
                format!("'{}' expects a boolean, got {:?}", name, other),
            )),
        }
    }

    /// Reads a string keyword argument.
    pub fn str_kwarg(&self, name: &str) -> Result<Option<String>, SchemaError> {
        match self.kwarg(name) {
            None => Ok(None),
            Some(Arg::Scalar(Value::Str(s))) => Ok(Some(s.clone())),
            Some(other) => Err(SchemaError::arguments(
                &self.name,
                format!("'{}' expects a string, got {:?}", name, other),
            )),
        }
    }
}

/// Parses one schema expression string.
pub fn parse_expression(src: &str) -> Result<CallExpr, SchemaError> {
    let mut parser = Parser::new(src);
    parser.skip_whitespace();
    let call = parser.parse_call()?;
    parser.skip_whitespace();
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("unexpected character '{}'", c)));
    }
    Ok(call)
}

struct Parser<'a> {
    src: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> SchemaError {
        SchemaError::syntax(self.src, reason)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: char) -> Result<(), SchemaError> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected '{}', found '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    fn parse_ident(&mut self) -> Result<String, SchemaError> {
        let start = self.pos;
        if !matches!(self.peek(), Some(c) if c.is_ascii_alphabetic() || c == '_') {
            return Err(self.error("expected a validator name"));
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_call(&mut self) -> Result<CallExpr, SchemaError> {
        let name = self.parse_ident()?;
        self.parse_call_tail(name)
    }

    /// Parses the optional `(...)` after a tag name has been consumed.
    fn parse_call_tail(&mut self, name: String) -> Result<CallExpr, SchemaError> {
        let mut call = CallExpr {
            name,
            args: Vec::new(),
            kwargs: Vec::new(),
        };
        self.skip_whitespace();
        if self.peek() != Some('(') {
            return Ok(call);
        }
        self.eat('(')?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(')') => break,
                None => return Err(self.error("unterminated argument list")),
                _ => {}
            }
            self.parse_arg(&mut call)?;
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                }
                Some(')') => break,
                Some(c) => return Err(self.error(format!("expected ',' or ')', found '{}'", c))),
                None => return Err(self.error("unterminated argument list")),
            }
        }
        self.eat(')')?;
        Ok(call)
    }

    fn parse_arg(&mut self, call: &mut CallExpr) -> Result<(), SchemaError> {
        // An identifier may start a keyword argument, a nested call, or a
        // word literal (True, None, ...). Decide after reading it.
        if matches!(self.peek(), Some(c) if c.is_ascii_alphabetic() || c == '_') {
            let ident = self.parse_ident()?;
            self.skip_whitespace();
            if self.peek() == Some('=') {
                self.pos += 1;
                self.skip_whitespace();
                let value = self.parse_value()?;
                if call.kwargs.iter().any(|(k, _)| *k == ident) {
                    return Err(self.error(format!("duplicate keyword argument '{}'", ident)));
                }
                call.kwargs.push((ident, value));
            } else {
                call.args.push(self.ident_to_arg(ident)?);
            }
            return Ok(());
        }
        let value = self.parse_value()?;
        call.args.push(value);
        Ok(())
    }

    fn parse_value(&mut self) -> Result<Arg, SchemaError> {
        match self.peek() {
            Some('\'') | Some('"') => Ok(Arg::Scalar(Value::Str(self.parse_string()?))),
            Some('[') => Ok(Arg::Scalar(self.parse_list()?)),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let ident = self.parse_ident()?;
                self.ident_to_arg(ident)
            }
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' => {
                Ok(Arg::Scalar(self.parse_word()?))
            }
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
            None => Err(self.error("expected a value, found end of input")),
        }
    }

    /// Classifies an identifier that appeared in value position.
    fn ident_to_arg(&mut self, ident: String) -> Result<Arg, SchemaError> {
        match ident.as_str() {
            "True" | "true" => Ok(Arg::Scalar(Value::Bool(true))),
            "False" | "false" => Ok(Arg::Scalar(Value::Bool(false))),
            "None" | "none" => Ok(Arg::Scalar(Value::Null)),
            _ => Ok(Arg::Call(self.parse_call_tail(ident)?)),
        }
    }

    fn parse_string(&mut self) -> Result<String, SchemaError> {
        let quote = self.bump().unwrap();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some(escaped) => out.push(escaped),
                    None => return Err(self.error("unterminated string literal")),
                },
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string literal")),
            }
        }
    }

    fn parse_list(&mut self) -> Result<Value, SchemaError> {
        self.eat('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(']') => break,
                None => return Err(self.error("unterminated list literal")),
                _ => {}
            }
            match self.parse_value()? {
                Arg::Scalar(v) => items.push(v),
                Arg::Call(c) => {
                    return Err(self.error(format!("'{}' is not a scalar list item", c.name)));
                }
            }
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                }
                Some(']') => break,
                Some(c) => return Err(self.error(format!("expected ',' or ']', found '{}'", c))),
                None => return Err(self.error("unterminated list literal")),
            }
        }
        self.eat(']')?;
        Ok(Value::Seq(items))
    }

    /// Parses a bare word: an integer, float or date literal.
    fn parse_word(&mut self) -> Result<Value, SchemaError> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(c) if c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.' | ':')
        ) {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        if let Ok(i) = word.parse::<i64>() {
            return Ok(Value::Int(i));
        }
        if let Ok(f) = word.parse::<f64>() {
            return Ok(Value::Float(f));
        }
        if let Ok(d) = NaiveDate::parse_from_str(&word, "%Y-%m-%d") {
            return Ok(Value::Date(d));
        }
        if let Ok(t) = NaiveDateTime::parse_from_str(&word, "%Y-%m-%dT%H:%M:%S") {
            return Ok(Value::Timestamp(t));
        }
        Err(self.error(format!("invalid literal '{}'", word)))
    }
}
