//! Byte level parser for media ranges such as `text/plain; charset="utf-8"`.
//!
//! The accepted grammar is the RFC 7231 `media-type` production without optional whitespace
//! around the whole value:
//!
//! ```text
//! media-type = token "/" token *( *WSP ";" *WSP token "=" ( token / quoted-string ) )
//! ```
//!
//! Bytes in `0x80..=0xFF` are only allowed inside quoted strings and are decoded as latin-1.

use crate::media_type::ParamCase;

/// Where a media range comes from. Registrations are stricter than request headers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Origin {
    Registration,
    Header,
}

/// A syntactically valid media range, parameters kept in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MediaRange {
    pub(crate) essence: String,
    pub(crate) params: Vec<(String, String)>,
}

pub(crate) fn parse(input: &[u8], origin: Origin, case: ParamCase) -> Option<MediaRange> {
    let mut cursor = Cursor::new(input);

    let top = cursor.token()?;
    if !cursor.eat(b'/') {
        return None;
    }
    let sub = cursor.token()?;

    // `*/*` and `type/*` are ranges, not types
    if origin == Origin::Registration && sub == b"*" {
        return None;
    }

    let mut essence = String::with_capacity(top.len() + sub.len() + 1);
    essence.push_str(&latin1(top).to_ascii_lowercase());
    essence.push('/');
    essence.push_str(&latin1(sub).to_ascii_lowercase());

    let mut params = Vec::new();
    while !cursor.is_empty() {
        cursor.skip_whitespace();
        if !cursor.eat(b';') {
            return None;
        }
        cursor.skip_whitespace();

        let key = cursor.token()?;
        if !cursor.eat(b'=') {
            return None;
        }
        if origin == Origin::Registration && key.eq_ignore_ascii_case(b"q") {
            return None;
        }

        let value = match cursor.peek() {
            Some(b'"') => cursor.quoted_string()?,
            _ => latin1(cursor.token()?),
        };

        params.push((latin1(key).to_ascii_lowercase(), case.apply(value)));
    }

    Some(MediaRange { essence, params })
}

#[inline]
pub(crate) fn is_token(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"-!#$%&'*+.^_`|~".contains(&b)
}

#[inline]
fn is_quoted_text(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | 0x21 | 0x23..=0x5b | 0x5d..=0x7e | 0x80..=0xff)
}

#[inline]
fn is_quoted_pair(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | 0x21..=0x7e | 0x80..=0xff)
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    /// Consumes one or more token bytes.
    fn token(&mut self) -> Option<&'a [u8]> {
        let start = self.pos;
        while self.peek().is_some_and(is_token) {
            self.pos += 1;
        }
        (self.pos > start).then(|| &self.bytes[start..self.pos])
    }

    /// Consumes a quoted string, returning its unescaped content.
    fn quoted_string(&mut self) -> Option<String> {
        if !self.eat(b'"') {
            return None;
        }

        let mut value = String::new();
        loop {
            let b = self.peek()?;
            self.pos += 1;
            match b {
                b'"' => return Some(value),
                b'\\' => {
                    let escaped = self.peek().filter(|&e| is_quoted_pair(e))?;
                    self.pos += 1;
                    value.push(char::from(escaped));
                }
                b if is_quoted_text(b) => value.push(char::from(b)),
                _ => return None,
            }
        }
    }
}
