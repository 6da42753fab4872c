// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Source positions for diagnostics.

use std::cmp::Eq;

/// `line` is 1-based, `col` is 0-based (the number of characters
/// consumed on the current line).

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
}

impl Pos {
    pub const START: Pos = Pos { line: 1, col: 0 };
}

impl Default for Pos {
    fn default() -> Self {
        Pos::START
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        // This, when prefixed with a Debug style path string, is
        // following the Emacs convention for location information.
        f.write_fmt(format_args!("@{}.{}", self.line, self.col))
    }
}

/// Is `c` one of the characters ending a line? CR LF counts once,
/// see `PosTracker`.
pub fn is_line_terminator(c: char) -> bool {
    matches!(c, '\r' | '\n' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

/// Follows the position across a character stream. The state is
/// `Copy` so that a one character unget can restore it.
#[derive(Debug, Copy, Clone, Default)]
pub struct PosTracker {
    pos: Pos,
    after_cr: bool,
}

impl PosTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn advance(&mut self, c: char) {
        if c == '\n' && self.after_cr {
            // second half of CR LF
            self.after_cr = false;
            return;
        }
        self.after_cr = c == '\r';
        if is_line_terminator(c) {
            self.pos = Pos { line: self.pos.line + 1, col: 0 };
        } else {
            self.pos.col += 1;
        }
    }
}
