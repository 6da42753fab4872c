// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Rendering hints that can be attached to values, configured as
//! writer-wide defaults, or passed as a one-off override to the
//! writer. Every field is optional; absent fields fall through to the
//! next layer (see [merge](Formatting::merge)).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parenkind {
    #[default]
    Round,
    Square,
    Curly
}

impl Parenkind {
    pub fn opening(self) -> char {
        match self {
            Parenkind::Round => '(',
            Parenkind::Square => '[',
            Parenkind::Curly => '{'
        }
    }
    pub fn closing(self) -> char {
        match self {
            Parenkind::Round => ')',
            Parenkind::Square => ']',
            Parenkind::Curly => '}'
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Radix {
    /// Plain decimal, no prefix.
    #[default]
    Decimal,
    /// Decimal with `#d` prefix.
    PrefixedDecimal,
    Hexadecimal,
    Octal,
    Binary,
}

impl Radix {
    pub fn base(self) -> u32 {
        match self {
            Radix::Decimal | Radix::PrefixedDecimal => 10,
            Radix::Hexadecimal => 16,
            Radix::Octal => 8,
            Radix::Binary => 2,
        }
    }

    /// The `#x` style prefix, if any.
    pub fn prefix(self) -> &'static str {
        match self {
            Radix::Decimal => "",
            Radix::PrefixedDecimal => "#d",
            Radix::Hexadecimal => "#x",
            Radix::Octal => "#o",
            Radix::Binary => "#b",
        }
    }

    /// From the letter following '#' (either case).
    pub fn from_prefix_char(c: char) -> Option<Radix> {
        match c {
            'x' | 'X' => Some(Radix::Hexadecimal),
            'd' | 'D' => Some(Radix::PrefixedDecimal),
            'o' | 'O' => Some(Radix::Octal),
            'b' | 'B' => Some(Radix::Binary),
            _ => None
        }
    }
}

/// How characters that cannot be written literally are escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapingStyle {
    /// `\x41;` in strings, `#\x41` for characters.
    #[default]
    XStyle,
    /// `\u` with 4 hex digits or `\U` with 8 in strings; `#\u` with 4
    /// or `#\U` with 6 hex digits for characters.
    UStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BooleanFormatting {
    /// `#true`/`#false` instead of `#t`/`#f`.
    pub long_form: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumberFormatting {
    pub radix: Option<Radix>,
}

/// Used for characters, strings, symbols and type identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharacterFormatting {
    pub ascii_only: Option<bool>,
    pub escaping: Option<EscapingStyle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BytesFormatting {
    /// Write as `#"..."` instead of `#u8(...)`.
    pub byte_string: Option<bool>,
    pub parens: Option<Parenkind>,
    pub radix: Option<Radix>,
    /// Elements per line in `#u8(...)` form.
    pub line_limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListFormatting {
    pub parens: Option<Parenkind>,
    /// Elements from this index on are each put on their own line.
    pub line_break_index: Option<usize>,
    /// Put this many elements on each line; takes precedence over
    /// `line_break_index`.
    pub line_elems_count: Option<usize>,
    /// Indentation of continuation lines relative to the opening
    /// paren's column (default 1).
    pub line_extra_spaces: Option<usize>,
}

macro_rules! merge_fields {
    ($t:ident { $($field:ident),* }) => {
        impl $t {
            /// Fields present in `over` win.
            pub fn merge(&self, over: &$t) -> $t {
                $t {
                    $($field: over.$field.or(self.$field)),*
                }
            }
        }
    }
}

merge_fields!(BooleanFormatting { long_form });
merge_fields!(NumberFormatting { radix });
merge_fields!(CharacterFormatting { ascii_only, escaping });
merge_fields!(BytesFormatting { byte_string, parens, radix, line_limit });
merge_fields!(ListFormatting { parens, line_break_index, line_elems_count,
                               line_extra_spaces });

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormattingKind {
    Boolean,
    Number,
    Character,
    Bytes,
    List,
}

impl std::fmt::Display for FormattingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FormattingKind::Boolean => "boolean",
            FormattingKind::Number => "number",
            FormattingKind::Character => "character",
            FormattingKind::Bytes => "bytes",
            FormattingKind::List => "list",
        })
    }
}

/// A formatting descriptor of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatting {
    Boolean(BooleanFormatting),
    Number(NumberFormatting),
    Character(CharacterFormatting),
    Bytes(BytesFormatting),
    List(ListFormatting),
}

impl Formatting {
    pub fn kind(&self) -> FormattingKind {
        match self {
            Formatting::Boolean(_) => FormattingKind::Boolean,
            Formatting::Number(_) => FormattingKind::Number,
            Formatting::Character(_) => FormattingKind::Character,
            Formatting::Bytes(_) => FormattingKind::Bytes,
            Formatting::List(_) => FormattingKind::List,
        }
    }

    /// Merge two descriptors of the same kind, `over` winning
    /// field-wise. Returns None if the kinds differ.
    pub fn merge(&self, over: &Formatting) -> Option<Formatting> {
        Some(match (self, over) {
            (Formatting::Boolean(a), Formatting::Boolean(b)) =>
                Formatting::Boolean(a.merge(b)),
            (Formatting::Number(a), Formatting::Number(b)) =>
                Formatting::Number(a.merge(b)),
            (Formatting::Character(a), Formatting::Character(b)) =>
                Formatting::Character(a.merge(b)),
            (Formatting::Bytes(a), Formatting::Bytes(b)) =>
                Formatting::Bytes(a.merge(b)),
            (Formatting::List(a), Formatting::List(b)) =>
                Formatting::List(a.merge(b)),
            _ => return None
        })
    }
}

/// Access to one kind of descriptor inside a `Formatting`, used to
/// resolve the layers in the writer generically.
pub trait Descriptor: Copy + Default {
    fn extract(f: &Formatting) -> Option<Self>;
    fn merge_with(&self, over: &Self) -> Self;
}

macro_rules! descriptor {
    ($t:ident, $variant:ident) => {
        impl Descriptor for $t {
            fn extract(f: &Formatting) -> Option<Self> {
                match f {
                    Formatting::$variant(x) => Some(*x),
                    _ => None
                }
            }
            fn merge_with(&self, over: &Self) -> Self {
                self.merge(over)
            }
        }

        impl From<$t> for Formatting {
            fn from(x: $t) -> Formatting {
                Formatting::$variant(x)
            }
        }
    }
}

descriptor!(BooleanFormatting, Boolean);
descriptor!(NumberFormatting, Number);
descriptor!(CharacterFormatting, Character);
descriptor!(BytesFormatting, Bytes);
descriptor!(ListFormatting, List);
