// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Settings for both reading (parsing) and writing (serializing)
//! data.

use crate::formatting::{BooleanFormatting, BytesFormatting, CharacterFormatting,
                        ListFormatting, NumberFormatting};
use kstring::KString;

/// Which optional syntax the reader accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderSettings {
    /// `[...]` lists and `#u8[...]`.
    pub allow_brackets: bool,
    /// `{...}` lists and `#u8{...}`.
    pub allow_braces: bool,
    pub allow_byte_vectors: bool,
    /// `#"..."`
    pub allow_byte_strings: bool,
    /// `#\u` and `#\U` characters.
    pub allow_u_in_characters: bool,
    /// `\u` and `\U` escapes in strings and symbols.
    pub allow_u_in_escapes: bool,
    /// Read bare `null` and `nil` as the empty list.
    pub null_and_nil_as_empty_list: bool,
    /// Maximum list nesting.
    pub max_depth: u32,
}

// The limit with default settings on Linux is around 1200.
pub const DEFAULT_MAX_DEPTH: u32 = 500;

pub const PERMISSIVE: ReaderSettings = ReaderSettings {
    allow_brackets: true,
    allow_braces: true,
    allow_byte_vectors: true,
    allow_byte_strings: true,
    allow_u_in_characters: true,
    allow_u_in_escapes: true,
    null_and_nil_as_empty_list: false,
    max_depth: DEFAULT_MAX_DEPTH,
};

pub const R7RS: ReaderSettings = ReaderSettings {
    allow_brackets: false,
    allow_braces: false,
    allow_byte_vectors: true,
    allow_byte_strings: false,
    allow_u_in_characters: false,
    allow_u_in_escapes: false,
    null_and_nil_as_empty_list: false,
    max_depth: DEFAULT_MAX_DEPTH,
};

pub const STRICT: ReaderSettings = ReaderSettings {
    allow_brackets: false,
    allow_braces: false,
    allow_byte_vectors: false,
    allow_byte_strings: false,
    allow_u_in_characters: false,
    allow_u_in_escapes: false,
    null_and_nil_as_empty_list: false,
    max_depth: DEFAULT_MAX_DEPTH,
};

impl Default for ReaderSettings {
    fn default() -> Self {
        PERMISSIVE
    }
}

/// How the empty list is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullLiteral {
    #[default]
    EmptyList,
    Null,
    Nil,
}

impl NullLiteral {
    pub fn as_str(self) -> &'static str {
        match self {
            NullLiteral::EmptyList => "()",
            NullLiteral::Null => "null",
            NullLiteral::Nil => "nil",
        }
    }
}

/// What goes between top-level values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Separator {
    #[default]
    Newline,
    DoubleNewline,
    Space,
    Custom(KString),
}

impl Separator {
    pub fn as_str(&self) -> &str {
        match self {
            Separator::Newline => "\n",
            Separator::DoubleNewline => "\n\n",
            Separator::Space => " ",
            Separator::Custom(s) => s,
        }
    }
}

/// Formatting applied to every value of the respective kind unless
/// the value or the call says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormattingDefaults {
    pub boolean: BooleanFormatting,
    pub number: NumberFormatting,
    pub character: CharacterFormatting,
    pub bytes: BytesFormatting,
    pub list: ListFormatting,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WriterSettings {
    pub null_literal: NullLiteral,
    pub separator: Separator,
    pub defaults: FormattingDefaults,
}
