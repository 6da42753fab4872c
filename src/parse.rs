// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Translating a character stream to a token stream. This is called
//! "parser" because it fully parses atoms (strings, symbols, numbers,
//! byte vectors etc.), thus "tokenizer" may be selling it short. The
//! only tokens that denote nesting are `Token::Open` and
//! `Token::Close`. See [read](../read/index.html) if interested in
//! trees rather than atoms / tokens.
//!
//! Whitespace and all comment forms (`;`, `#|...|#`, `#;datum`) are
//! skipped.

use crate::formatting::{BytesFormatting, Parenkind, Radix};
use crate::number::{NumberError, parse_byte, parse_decimal, parse_with_radix,
                    special_real};
use crate::pos::{Pos, PosTracker, is_line_terminator};
use crate::settings::ReaderSettings;
use crate::value::{Value, ValueError};
use genawaiter::rc::Gen;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error ({0}) after")]
    IOError(anyhow::Error),
    #[error("unexpected end of input in {0}")]
    UnexpectedEof(&'static str),
    #[error("unterminated block comment")]
    UnterminatedBlockComment,
    #[error("'#;' is not followed by a datum")]
    DatumCommentWithoutDatum,
    #[error("invalid escaped character '{0}'")]
    InvalidEscapedChar(char),
    #[error("'\\{0}' escapes are not enabled")]
    UEscapeNotAllowed(char),
    #[error("missing hex digits in code sequence")]
    MissingHexDigits,
    #[error("too many digits in code sequence")]
    TooManyDigits,
    #[error("missing ';' after code sequence, got '{0}'")]
    MissingSemicolon(char),
    #[error("invalid code point {0:#x}")]
    InvalidCodePoint(u32),
    #[error("character {0:#x} is out of range in byte string")]
    ByteOutOfRange(u32),
    #[error("invalid '#' token {0:?}")]
    InvalidHashToken(String),
    #[error("unknown character name {0:?}")]
    UnknownCharName(String),
    #[error("{0}")]
    Number(#[from] NumberError),
    #[error("{0}")]
    Value(#[from] ValueError),
    #[error("quoting with '{0}' is not supported")]
    QuoteNotSupported(char),
    #[error("unterminated '|' in symbol")]
    UnterminatedBar,
    #[error("{0} are not enabled")]
    NotEnabled(&'static str),
    #[error("expecting '{}', got '{}'", .0.closing(), .1.closing())]
    ParenMismatch(Parenkind, Parenkind),
    #[error("invalid byte vector element starting with '{0}'")]
    InvalidByteElement(char),
}

#[derive(Error, Debug)]
#[error("{err} {pos}")]
pub struct ParseErrorWithPos {
    pub err: ParseError,
    pub pos: Pos
}

impl ParseError {
    pub fn at(self, p: Pos) -> ParseErrorWithPos {
        ParseErrorWithPos {
            err: self,
            pos: p
        }
    }
}

trait At<T> {
    fn at(self, p: Pos) -> Result<T, ParseErrorWithPos>;
}

impl<T, E: Into<ParseError>> At<T> for Result<T, E> {
    fn at(self, p: Pos) -> Result<T, ParseErrorWithPos> {
        self.map_err(|e| e.into().at(p))
    }
}

#[derive(Debug)]
pub enum Token {
    Datum(Value),
    Dot,
    Open(Parenkind),
    Close(Parenkind),
}

/// The token and the position where it starts.
#[derive(Debug)]
pub struct TokenWithPos(pub Token, pub Pos);

/// Characters that end a symbol or number token.
pub fn is_delimiter(c: char) -> bool {
    c.is_whitespace()
        || matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | '"' | '\'' | ';' | ',')
}

pub fn maybe_open_close(c: char) -> Option<Token> {
    match c {
        '(' => Some(Token::Open(Parenkind::Round)),
        '[' => Some(Token::Open(Parenkind::Square)),
        '{' => Some(Token::Open(Parenkind::Curly)),
        ')' => Some(Token::Close(Parenkind::Round)),
        ']' => Some(Token::Close(Parenkind::Square)),
        '}' => Some(Token::Close(Parenkind::Curly)),
        _ => None
    }
}

fn maybe_closing(c: char) -> Option<Parenkind> {
    match maybe_open_close(c) {
        Some(Token::Close(k)) => Some(k),
        _ => None
    }
}

/// R7RS names plus a few from other Schemes. Matched
/// case-insensitively.
pub fn name2char(s: &str) -> Option<char> {
    Some(match s.to_ascii_lowercase().as_str() {
        "alarm" => '\x07',
        "backspace" => '\x08',
        "delete" | "rubout" => '\x7F',
        "escape" => '\x1B',
        "formfeed" | "page" => '\x0C',
        "linefeed" | "newline" => '\n',
        "null" | "nul" => '\0',
        "return" => '\r',
        "space" => ' ',
        "tab" => '\t',
        "vtab" => '\x0B',
        _ => return None
    })
}

/// A character source with position tracking and exactly one
/// character of unget.
struct CharStream<I> {
    inner: I,
    tracker: PosTracker,
    /// The last character returned by `get`, and the tracker state
    /// from before it.
    last: Option<(char, PosTracker)>,
    pushed_back: Option<char>,
    done: bool,
}

impl<I: Iterator<Item = anyhow::Result<char>>> CharStream<I> {
    fn new(inner: I) -> Self {
        CharStream {
            inner,
            tracker: PosTracker::new(),
            last: None,
            pushed_back: None,
            done: false,
        }
    }

    fn pos(&self) -> Pos {
        self.tracker.pos()
    }

    fn get(&mut self) -> Result<Option<char>, ParseErrorWithPos> {
        let c =
            if let Some(c) = self.pushed_back.take() {
                c
            } else if self.done {
                self.last = None;
                return Ok(None)
            } else {
                match self.inner.next() {
                    Some(Ok(c)) => c,
                    Some(Err(e)) => {
                        // avoid calling next() again!
                        self.done = true;
                        self.last = None;
                        return Err(ParseError::IOError(e).at(self.pos()))
                    }
                    None => {
                        self.done = true;
                        self.last = None;
                        return Ok(None)
                    }
                }
            };
        self.last = Some((c, self.tracker));
        self.tracker.advance(c);
        Ok(Some(c))
    }

    /// Push back the character last returned by `get`. After `get`
    /// returned None this does nothing.
    fn unget(&mut self) {
        if let Some((c, tracker)) = self.last.take() {
            self.tracker = tracker;
            self.pushed_back = Some(c);
        }
    }

    fn peek(&mut self) -> Result<Option<char>, ParseErrorWithPos> {
        let c = self.get()?;
        self.unget();
        Ok(c)
    }
}

pub struct Parser<I> {
    cs: CharStream<I>,
    settings: ReaderSettings,
}

impl<I: Iterator<Item = anyhow::Result<char>>> Parser<I> {
    pub fn new(chars: I, settings: ReaderSettings) -> Self {
        Parser { cs: CharStream::new(chars), settings }
    }

    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }

    /// The current position (after the last consumed character).
    pub fn pos(&self) -> Pos {
        self.cs.pos()
    }

    fn err<T>(&self, e: ParseError) -> Result<T, ParseErrorWithPos> {
        Err(e.at(self.cs.pos()))
    }

    fn get_or_eof(&mut self, context: &'static str)
                  -> Result<char, ParseErrorWithPos> {
        match self.cs.get()? {
            Some(c) => Ok(c),
            None => self.err(ParseError::UnexpectedEof(context))
        }
    }

    fn check_paren_enabled(&self, k: Parenkind) -> Result<(), ParseErrorWithPos> {
        match k {
            Parenkind::Round => Ok(()),
            Parenkind::Square if self.settings.allow_brackets => Ok(()),
            Parenkind::Curly if self.settings.allow_braces => Ok(()),
            Parenkind::Square => self.err(ParseError::NotEnabled("brackets")),
            Parenkind::Curly => self.err(ParseError::NotEnabled("braces")),
        }
    }

    /// The next token, or None at the end of input.
    pub fn next_token(&mut self) -> Result<Option<TokenWithPos>, ParseErrorWithPos> {
        loop {
            let pos = self.cs.pos();
            let c = match self.cs.get()? {
                Some(c) => c,
                None => return Ok(None)
            };
            if c.is_whitespace() {
                continue;
            }
            if let Some(t) = maybe_open_close(c) {
                if let Token::Open(k) | Token::Close(k) = t {
                    self.check_paren_enabled(k)?;
                }
                return Ok(Some(TokenWithPos(t, pos)))
            }
            let t = match c {
                ';' => {
                    self.skip_line_comment()?;
                    continue;
                }
                '"' => Token::Datum(Value::string(&self.read_string(false)?)),
                '\'' | '`' | ',' => return self.err(ParseError::QuoteNotSupported(c)),
                '#' => {
                    match self.get_or_eof("'#' token")? {
                        '|' => {
                            self.skip_block_comment()?;
                            continue;
                        }
                        ';' => {
                            self.skip_datum()?;
                            continue;
                        }
                        c1 => Token::Datum(self.read_hash(c1)?)
                    }
                }
                _ => {
                    self.cs.unget();
                    self.read_symbol_or_number()?
                }
            };
            return Ok(Some(TokenWithPos(t, pos)))
        }
    }

    fn skip_line_comment(&mut self) -> Result<(), ParseErrorWithPos> {
        while let Some(c) = self.cs.get()? {
            if is_line_terminator(c) {
                break;
            }
        }
        Ok(())
    }

    // After "#|"; nests.
    fn skip_block_comment(&mut self) -> Result<(), ParseErrorWithPos> {
        let mut depth = 1;
        let mut prev = None;
        loop {
            let c = match self.cs.get()? {
                Some(c) => c,
                None => return self.err(ParseError::UnterminatedBlockComment)
            };
            match (prev, c) {
                (Some('|'), '#') => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(())
                    }
                    prev = None;
                }
                (Some('#'), '|') => {
                    depth += 1;
                    prev = None;
                }
                _ => prev = Some(c)
            }
        }
    }

    // After "#;": discard the next datum, which may be a whole list.
    fn skip_datum(&mut self) -> Result<(), ParseErrorWithPos> {
        let mut open: Vec<Parenkind> = Vec::new();
        loop {
            let t = match self.next_token()? {
                Some(TokenWithPos(t, _)) => t,
                None => return self.err(ParseError::UnexpectedEof("datum comment"))
            };
            match t {
                Token::Open(k) => open.push(k),
                Token::Close(k) => {
                    match open.pop() {
                        None => return self.err(ParseError::DatumCommentWithoutDatum),
                        Some(o) if o != k => return self.err(ParseError::ParenMismatch(o, k)),
                        Some(_) => {}
                    }
                    if open.is_empty() {
                        return Ok(())
                    }
                }
                Token::Dot => {
                    if open.is_empty() {
                        return self.err(ParseError::DatumCommentWithoutDatum)
                    }
                }
                Token::Datum(_) => {
                    if open.is_empty() {
                        return Ok(())
                    }
                }
            }
        }
    }

    // Up to `max` hex digits; the first non-digit is left in the
    // stream. Returns the value and the number of digits.
    fn read_hex(&mut self, max: usize) -> Result<(u32, usize), ParseErrorWithPos> {
        let mut n: u32 = 0;
        let mut count = 0;
        while count < max {
            match self.cs.get()? {
                Some(c) => {
                    if let Some(d) = c.to_digit(16) {
                        n = n * 16 + d;
                        count += 1;
                    } else {
                        self.cs.unget();
                        break;
                    }
                }
                None => break
            }
        }
        Ok((n, count))
    }

    fn code_to_char(&self, code: u32) -> Result<char, ParseErrorWithPos> {
        match char::from_u32(code) {
            Some(c) => Ok(c),
            None => self.err(ParseError::InvalidCodePoint(code))
        }
    }

    // After a backslash in a string or symbol; pushes the decoded
    // character(s) to `out`.
    fn read_escape(&mut self, in_symbol: bool, out: &mut String)
                   -> Result<(), ParseErrorWithPos> {
        let c = self.get_or_eof("escape sequence")?;
        let replacement = match c {
            'a' => '\x07',
            'b' => '\x08',
            'e' => '\x1B',
            'f' => '\x0C',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\x0B',
            '"' | '\'' | '\\' | '|' => c,
            '\r' => {
                // keep the line break as it is
                out.push('\r');
                if self.cs.peek()? == Some('\n') {
                    self.cs.get()?;
                    '\n'
                } else {
                    return Ok(())
                }
            }
            '\n' => '\n',
            'x' | 'X' => {
                let (code, count) = self.read_hex(8)?;
                if count == 0 {
                    return self.err(ParseError::MissingHexDigits)
                }
                match self.get_or_eof("escape sequence")? {
                    ';' => {}
                    c if c.is_ascii_hexdigit() => return self.err(ParseError::TooManyDigits),
                    c => return self.err(ParseError::MissingSemicolon(c))
                }
                self.code_to_char(code)?
            }
            'u' | 'U' => {
                if !self.settings.allow_u_in_escapes {
                    return self.err(ParseError::UEscapeNotAllowed(c))
                }
                let (code, count) = self.read_hex(if c == 'u' { 4 } else { 8 })?;
                if count == 0 {
                    return self.err(ParseError::MissingHexDigits)
                }
                self.code_to_char(code)?
            }
            c if in_symbol && c.is_whitespace() => c,
            c => return self.err(ParseError::InvalidEscapedChar(c))
        };
        out.push(replacement);
        Ok(())
    }

    // After the opening '"'. In byte mode every character must be
    // at most 0xFF.
    fn read_string(&mut self, bytes: bool) -> Result<String, ParseErrorWithPos> {
        let context = if bytes { "byte string" } else { "string" };
        let mut out = String::new();
        loop {
            match self.get_or_eof(context)? {
                '"' => return Ok(out),
                '\\' => self.read_escape(false, &mut out)?,
                c => out.push(c)
            }
            if bytes {
                if let Some(c) = out.chars().next_back() {
                    if c as u32 > 0xFF {
                        return self.err(ParseError::ByteOutOfRange(c as u32))
                    }
                }
            }
        }
    }

    // Run of non-delimiters; returns the text and whether bars or
    // escapes force it to be a symbol.
    fn read_atom_text(&mut self) -> Result<(String, bool), ParseErrorWithPos> {
        let mut out = String::new();
        let mut forced_symbol = false;
        let mut in_bar = false;
        loop {
            let c = match self.cs.get()? {
                Some(c) => c,
                None if in_bar => return self.err(ParseError::UnterminatedBar),
                None => break
            };
            if in_bar {
                match c {
                    '|' => in_bar = false,
                    '\\' => self.read_escape(true, &mut out)?,
                    c => out.push(c)
                }
            } else {
                match c {
                    '|' => {
                        in_bar = true;
                        forced_symbol = true;
                    }
                    '\\' => {
                        self.read_escape(true, &mut out)?;
                        forced_symbol = true;
                    }
                    c if is_delimiter(c) => {
                        self.cs.unget();
                        break;
                    }
                    c => out.push(c)
                }
            }
        }
        Ok((out, forced_symbol))
    }

    fn read_symbol_or_number(&mut self) -> Result<Token, ParseErrorWithPos> {
        let (s, forced_symbol) = self.read_atom_text()?;
        if forced_symbol {
            return Ok(Token::Datum(Value::symbol(&s)))
        }
        if s == "." {
            return Ok(Token::Dot)
        }
        if let Some(x) = special_real(&s) {
            return Ok(Token::Datum(Value::real(x)))
        }
        if let Some(n) = parse_decimal(&s) {
            return Ok(Token::Datum(Value::number(n)))
        }
        if self.settings.null_and_nil_as_empty_list && (s == "null" || s == "nil") {
            return Ok(Token::Datum(Value::null()))
        }
        Ok(Token::Datum(Value::symbol(&s)))
    }

    // Text up to the next delimiter, which is left in the stream.
    fn read_until_delimiter(&mut self) -> Result<String, ParseErrorWithPos> {
        let mut out = String::new();
        while let Some(c) = self.cs.get()? {
            if is_delimiter(c) {
                self.cs.unget();
                break;
            }
            out.push(c);
        }
        Ok(out)
    }

    fn at_delimiter(&mut self) -> Result<bool, ParseErrorWithPos> {
        Ok(match self.cs.peek()? {
            None => true,
            Some(c) => is_delimiter(c)
        })
    }

    // After '#' and `c`.
    fn read_hash(&mut self, c: char) -> Result<Value, ParseErrorWithPos> {
        if c == '\\' {
            return self.read_char_literal()
        }
        if c == '"' {
            if !self.settings.allow_byte_strings {
                return self.err(ParseError::NotEnabled("byte strings"))
            }
            let s = self.read_string(true)?;
            let bytes: Vec<u8> = s.chars().map(|c| c as u8).collect();
            let fmt = BytesFormatting { byte_string: Some(true), ..Default::default() };
            return Value::from(bytes).with_formatting(fmt).at(self.pos())
        }
        if let Some(radix) = Radix::from_prefix_char(c) {
            let s = self.read_until_delimiter()?;
            let n = parse_with_radix(&s, radix).at(self.pos())?;
            return Ok(Value::number(n))
        }
        if c == 'u' {
            return self.read_byte_vector()
        }
        if c.is_ascii_alphabetic() {
            let mut name = String::from(c);
            while let Some(c) = self.cs.get()? {
                if c.is_ascii_alphabetic() {
                    name.push(c);
                } else {
                    self.cs.unget();
                    break;
                }
            }
            let lower = name.to_ascii_lowercase();
            if lower == "t" && self.cs.peek()? == Some(':') {
                self.cs.get()?;
                return self.read_type_identifier()
            }
            let b = match lower.as_str() {
                "t" | "true" => true,
                "f" | "false" => false,
                _ => return self.err(ParseError::InvalidHashToken(format!("#{}", name)))
            };
            if !self.at_delimiter()? {
                let rest = self.read_until_delimiter()?;
                return self.err(ParseError::InvalidHashToken(format!("#{}{}", name, rest)))
            }
            return Ok(Value::boolean(b))
        }
        self.err(ParseError::InvalidHashToken(format!("#{}", c)))
    }

    // After "#t:".
    fn read_type_identifier(&mut self) -> Result<Value, ParseErrorWithPos> {
        if self.at_delimiter()? {
            return self.err(ParseError::InvalidHashToken("#t:".into()))
        }
        match self.read_symbol_or_number()? {
            Token::Datum(v) => {
                if let Ok(sym) = v.as_symbol() {
                    return Ok(Value::type_identifier(sym.name()))
                }
                self.err(ParseError::InvalidHashToken(format!("#t:{}", v)))
            }
            _ => self.err(ParseError::InvalidHashToken("#t:.".into()))
        }
    }

    // After "#\".
    fn read_char_literal(&mut self) -> Result<Value, ParseErrorWithPos> {
        let c = self.get_or_eof("character")?;
        if matches!(c, 'x' | 'X' | 'u' | 'U') {
            if let Some(next) = self.cs.peek()? {
                if next.is_ascii_hexdigit() {
                    let max = match c {
                        'u' => 4,
                        _ => 8
                    };
                    if (c == 'u' || c == 'U') && !self.settings.allow_u_in_characters {
                        return self.err(ParseError::UEscapeNotAllowed(c))
                    }
                    let (code, _) = self.read_hex(max)?;
                    return Ok(Value::char(self.code_to_char(code)?))
                }
            }
        }
        if c.is_ascii_alphabetic() {
            let mut name = String::from(c);
            while let Some(c) = self.cs.get()? {
                if c.is_ascii_alphabetic() {
                    name.push(c);
                } else {
                    self.cs.unget();
                    break;
                }
            }
            if name.len() == 1 {
                return Ok(Value::char(c))
            }
            return match name2char(&name) {
                Some(c) => Ok(Value::char(c)),
                None => self.err(ParseError::UnknownCharName(name))
            }
        }
        Ok(Value::char(c))
    }

    // After "#u".
    fn read_byte_vector(&mut self) -> Result<Value, ParseErrorWithPos> {
        if self.cs.get()? != Some('8') {
            return self.err(ParseError::InvalidHashToken("#u".into()))
        }
        let k = match self.cs.get()?.and_then(maybe_open_close) {
            Some(Token::Open(k)) => k,
            _ => return self.err(ParseError::InvalidHashToken("#u8".into()))
        };
        if !self.settings.allow_byte_vectors {
            return self.err(ParseError::NotEnabled("byte vectors"))
        }
        self.check_paren_enabled(k)?;
        let mut bytes = Vec::new();
        let mut skip_next = false;
        loop {
            let c = self.get_or_eof("byte vector")?;
            if c.is_whitespace() {
                continue;
            }
            let radix = match c {
                ';' => {
                    self.skip_line_comment()?;
                    continue;
                }
                '#' => {
                    let c1 = self.get_or_eof("byte vector")?;
                    match c1 {
                        '|' => {
                            self.skip_block_comment()?;
                            continue;
                        }
                        ';' => {
                            skip_next = true;
                            continue;
                        }
                        _ => match Radix::from_prefix_char(c1) {
                            Some(r) => r,
                            None => return self.err(
                                ParseError::InvalidHashToken(format!("#{}", c1)))
                        }
                    }
                }
                c if c.is_ascii_digit() || c == '+' => {
                    self.cs.unget();
                    Radix::Decimal
                }
                c => {
                    if let Some(close) = maybe_closing(c) {
                        if skip_next {
                            return self.err(ParseError::DatumCommentWithoutDatum)
                        }
                        if close != k {
                            return self.err(ParseError::ParenMismatch(k, close))
                        }
                        break;
                    }
                    return self.err(ParseError::InvalidByteElement(c))
                }
            };
            let s = self.read_until_delimiter()?;
            let b = parse_byte(&s, radix).at(self.pos())?;
            if skip_next {
                skip_next = false;
            } else {
                bytes.push(b);
            }
        }
        let v = Value::from(bytes);
        if k == Parenkind::Round {
            Ok(v)
        } else {
            let fmt = BytesFormatting { parens: Some(k), ..Default::default() };
            v.with_formatting(fmt).at(self.pos())
        }
    }
}

/// Lazily produce tokens from a character stream. Stops after the
/// first error.
pub fn parse<'s, I>(
    cs: I,
    settings: ReaderSettings,
) -> impl Iterator<Item = Result<TokenWithPos, ParseErrorWithPos>> + 's
    where I: Iterator<Item = anyhow::Result<char>> + 's
{
    Gen::new(|co| async move {
        let mut parser = Parser::new(cs, settings);
        loop {
            match parser.next_token() {
                Ok(Some(t)) => co.yield_(Ok(t)).await,
                Ok(None) => return,
                Err(e) => {
                    co.yield_(Err(e)).await;
                    return;
                }
            }
        }
    }).into_iter()
}
