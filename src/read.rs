// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Building [Value](crate::value::Value) trees from the token stream.

use crate::buffered_chars::{buffered_chars, str_chars};
use crate::formatting::{ListFormatting, Parenkind};
use crate::list_builder::ListBuilder;
use crate::parse::{Parser, ParseError, ParseErrorWithPos, Token, TokenWithPos};
use crate::pos::Pos;
use crate::settings::ReaderSettings;
use crate::value::Value;
use genawaiter::rc::Gen;
use std::io::Read;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("{0}")]
    PE(ParseError),
    #[error("missing item after '.'")]
    MissingItemAfterDot,
    #[error("expecting only one item after '.'")]
    ExpectingOneItemAfterDot,
    #[error("'.' already appeared {0}, again")]
    DotAlreadyAppeared(Pos),
    #[error("'.' without preceding item")]
    DotWithoutPrecedingItem,
    #[error("nesting too deep")]
    NestingTooDeep,
    #[error("'{}' {1} expects '{}', got '{}'",
            .0.opening(), .0.closing(), .2.closing())]
    ParenMismatch(Parenkind, Pos, Parenkind),
    #[error("unexpected closing character '{}'", .0.closing())]
    UnexpectedClosingParen(Parenkind),
    #[error("premature EOF while expecting closing character '{}' for '{}' {1}",
            .0.closing(), .0.opening())]
    PrematureEofExpectingClosingParen(Parenkind, Pos),
    #[error("'.' outside of list context")]
    DotOutsideListContext
}

#[derive(Error, Debug)]
#[error("{err} {pos}")]
pub struct ReadErrorWithPos {
    err: ReadError,
    pos: Pos
}

impl ReadErrorWithPos {
    pub fn error(&self) -> &ReadError {
        &self.err
    }
    pub fn pos(&self) -> Pos {
        self.pos
    }
    /// 1-based
    pub fn line(&self) -> u32 {
        self.pos.line
    }
    /// 0-based
    pub fn column(&self) -> u32 {
        self.pos.col
    }
}

impl ReadError {
    fn at(self, p: Pos) -> ReadErrorWithPos {
        ReadErrorWithPos {
            err: self,
            pos: p
        }
    }
}

impl From<ParseErrorWithPos> for ReadErrorWithPos {
    fn from(ep: ParseErrorWithPos) -> ReadErrorWithPos {
        let ParseErrorWithPos { err, pos } = ep;
        ReadErrorWithPos {
            err: ReadError::PE(err),
            pos
        }
    }
}

pub struct Reader<I> {
    parser: Parser<I>,
}

impl<I: Iterator<Item = anyhow::Result<char>>> Reader<I> {
    pub fn new(chars: I, settings: ReaderSettings) -> Self {
        Reader { parser: Parser::new(chars, settings) }
    }

    /// The position after the last consumed character.
    pub fn pos(&self) -> Pos {
        self.parser.pos()
    }

    /// The next datum, or `Value::eof()` at the end of the input.
    pub fn read(&mut self) -> Result<Value, ReadErrorWithPos> {
        let r = self.read_toplevel();
        match &r {
            Ok(v) => tracing::trace!("read {} at {}", v, self.pos()),
            Err(e) => tracing::debug!("read failed: {}", e),
        }
        r
    }

    /// All remaining data, lazily. Ends after the first error.
    pub fn read_all<'s>(self) -> impl Iterator<Item = Result<Value, ReadErrorWithPos>> + 's
        where I: 's
    {
        Gen::new(|co| async move {
            let mut reader = self;
            loop {
                match reader.read() {
                    Ok(v) => {
                        if v.is_eof() {
                            return;
                        }
                        co.yield_(Ok(v)).await;
                    }
                    Err(e) => {
                        co.yield_(Err(e)).await;
                        return;
                    }
                }
            }
        }).into_iter()
    }

    fn read_toplevel(&mut self) -> Result<Value, ReadErrorWithPos> {
        match self.parser.next_token()? {
            None => Ok(Value::eof()),
            Some(TokenWithPos(t, pos)) => match t {
                Token::Datum(v) => Ok(v),
                Token::Open(k) => {
                    let depth_fuel = self.parser.settings().max_depth;
                    self.read_list(k, pos, depth_fuel)
                }
                Token::Close(k) => Err(ReadError::UnexpectedClosingParen(k).at(pos)),
                Token::Dot => Err(ReadError::DotOutsideListContext.at(pos)),
            }
        }
    }

    // After the opening paren of kind `parenkind` at `startpos`.
    fn read_list(
        &mut self,
        parenkind: Parenkind,
        startpos: Pos,
        depth_fuel: u32,
    ) -> Result<Value, ReadErrorWithPos> {
        if depth_fuel == 0 {
            return Err(ReadError::NestingTooDeep.at(startpos))
        }
        let mut items = ListBuilder::new();
        let mut seen_dot: Option<Pos> = None;
        let mut tail: Option<Value> = None;
        loop {
            let TokenWithPos(t, pos) = match self.parser.next_token()? {
                Some(t) => t,
                None => return Err(
                    ReadError::PrematureEofExpectingClosingParen(parenkind, startpos)
                        .at(self.parser.pos()))
            };
            let item = match t {
                Token::Close(pk) => {
                    if pk != parenkind {
                        return Err(ReadError::ParenMismatch(parenkind, startpos, pk)
                                   .at(pos))
                    }
                    if let Some(dotpos) = seen_dot {
                        if tail.is_none() {
                            return Err(ReadError::MissingItemAfterDot.at(dotpos))
                        }
                    }
                    break;
                }
                Token::Dot => {
                    if let Some(oldpos) = seen_dot {
                        return Err(ReadError::DotAlreadyAppeared(oldpos).at(pos))
                    }
                    if items.is_empty() {
                        return Err(ReadError::DotWithoutPrecedingItem.at(pos))
                    }
                    seen_dot = Some(pos);
                    continue;
                }
                Token::Open(pk) => self.read_list(pk, pos, depth_fuel - 1)?,
                Token::Datum(v) => v,
            };
            if seen_dot.is_some() {
                if tail.is_some() {
                    return Err(ReadError::ExpectingOneItemAfterDot.at(pos))
                }
                tail = Some(item);
            } else {
                items.add(item);
            }
        }
        if parenkind != Parenkind::Round {
            items.set_formatting(Some(ListFormatting {
                parens: Some(parenkind),
                ..Default::default()
            }));
        }
        Ok(items.to_value_with_tail(tail.unwrap_or_else(Value::null)))
    }
}

/// A reader decoding UTF-8 from `fh`.
pub fn from_read<'s>(
    fh: impl Read + 's,
    settings: ReaderSettings,
) -> Reader<impl Iterator<Item = anyhow::Result<char>> + 's> {
    Reader::new(buffered_chars(fh), settings)
}

pub fn from_string(s: &str, settings: ReaderSettings)
                   -> Reader<impl Iterator<Item = anyhow::Result<char>> + '_> {
    Reader::new(str_chars(s), settings)
}

/// Read all data from `fh` with the default settings.
pub fn read_all(
    fh: impl Read,
) -> Result<Vec<Value>, ReadErrorWithPos>
{
    from_read(fh, ReaderSettings::default()).read_all().collect()
}
