//! Lenient JSON grammar for hand-edited credential files.
//!
//! Accepts everything strict JSON accepts and additionally:
//! - bare object keys matching `[A-Za-z_][A-Za-z0-9_-]*`
//! - bare scalar values made of `[A-Za-z0-9._:@/+=-]`; a bare token that is a
//!   valid JSON number, `true`, `false` or `null` keeps that type, every other
//!   bare token becomes a string
//! - a trailing comma before `}` or `]`
//!
//! Objects and arrays nest at most 128 levels deep.
//!
//! Quoted strings are decoded by `serde_json`, so valid JSON input produces the
//! same value here as with `serde_json::from_str`.

use serde_json::{Map, Value};
use thiserror::Error;

const MAX_DEPTH: usize = 128;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{message} at byte {position}")]
pub struct LenientError {
    pub message: String,
    pub position: usize,
}

pub fn parse(input: &str) -> Result<Value, LenientError> {
    let mut parser = Parser {
        src: input,
        pos: 0,
        depth: 0,
    };
    let value = parser.value()?;
    parser.skip_ws();
    if parser.pos < parser.src.len() {
        return Err(parser.error("trailing characters after value"));
    }
    Ok(value)
}

fn is_bare_key_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_bare_key_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'-'
}

fn is_bare_value_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'.' | b'_' | b':' | b'@' | b'/' | b'+' | b'=' | b'-')
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn error(&self, message: &str) -> LenientError {
        LenientError {
            message: message.to_owned(),
            position: self.pos,
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), LenientError> {
        self.skip_ws();
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", byte as char)))
        }
    }

    fn value(&mut self) -> Result<Value, LenientError> {
        self.skip_ws();
        match self.peek() {
            Some(b'{') => self.nested(Self::object),
            Some(b'[') => self.nested(Self::array),
            Some(b'"') => self.quoted().map(Value::String),
            Some(c) if is_bare_value_char(c) => Ok(bare_to_value(self.bare(is_bare_value_char))),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn nested(&mut self, parse: fn(&mut Self) -> Result<Value, LenientError>) -> Result<Value, LenientError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn object(&mut self) -> Result<Value, LenientError> {
        self.pos += 1;
        let mut map = Map::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Value::Object(map));
                }
                Some(b'"') => {
                    let key = self.quoted()?;
                    self.member(&mut map, key)?;
                }
                Some(c) if is_bare_key_start(c) => {
                    let key = self.bare(is_bare_key_char).to_owned();
                    self.member(&mut map, key)?;
                }
                Some(_) => return Err(self.error("expected object key")),
                None => return Err(self.error("unterminated object")),
            }

            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {}
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    fn member(&mut self, map: &mut Map<String, Value>, key: String) -> Result<(), LenientError> {
        self.expect(b':')?;
        let value = self.value()?;
        map.insert(key, value);
        Ok(())
    }

    fn array(&mut self) -> Result<Value, LenientError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(b']') {
                self.pos += 1;
                return Ok(Value::Array(items));
            }
            items.push(self.value()?);

            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {}
                _ => return Err(self.error("expected ',' or ']'")),
            }
        }
    }

    /// Quoted string, decoded with serde_json so escapes match strict JSON
    fn quoted(&mut self) -> Result<String, LenientError> {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        let mut end = start + 1;
        while end < bytes.len() {
            match bytes[end] {
                b'\\' => end += 2,
                b'"' => break,
                _ => end += 1,
            }
        }
        if end >= bytes.len() {
            return Err(self.error("unterminated string"));
        }
        let literal = &self.src[start..=end];
        let decoded = serde_json::from_str::<String>(literal)
            .map_err(|e| self.error(&format!("invalid string: {}", e)))?;
        self.pos = end + 1;
        Ok(decoded)
    }

    fn bare(&mut self, accept: fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(accept) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }
}

fn bare_to_value(token: &str) -> Value {
    match serde_json::from_str::<Value>(token) {
        Ok(value @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => value,
        _ => Value::String(token.to_owned()),
    }
}
