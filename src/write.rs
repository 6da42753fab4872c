// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Rendering values as text.
//!
//! The formatting used for a value is resolved from four layers,
//! later ones winning field by field: built-in defaults, the
//! writer-wide defaults from [WriterSettings](crate::settings::WriterSettings),
//! the formatting attached to the value, and the override passed to
//! [write_with](Writer::write_with) (which applies to the top-level
//! value only).

use crate::formatting::{BooleanFormatting, BytesFormatting, CharacterFormatting,
                        Descriptor, EscapingStyle, Formatting, FormattingKind,
                        ListFormatting, NumberFormatting, Radix};
use crate::number::{Number, format_integer, format_real};
use crate::settings::{DEFAULT_MAX_DEPTH, WriterSettings};
use crate::symbol::Symbol;
use crate::value::{Value, ValueKind, ValueType};
use std::io::Write;
use thiserror::Error;
use unicode_general_category::{GeneralCategory, get_general_category};

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("{0}")]
    IO(#[from] std::io::Error),
    #[error("EOF cannot be written")]
    Eof,
    #[error("{0} formatting does not apply to a value of type {1}")]
    FormattingMismatch(FormattingKind, ValueType),
    #[error("real number {0} cannot be written in radix {1}")]
    InvalidRadixForReal(f64, u32),
    #[error("lists nested deeper than {0} levels")]
    NestingTooDeep(u32),
}

/// Latin-1 rules below 0x100, the Unicode general category above.
pub fn is_printable(c: char) -> bool {
    let code = c as u32;
    if code <= 0xFF {
        (0x20..=0x7E).contains(&code) || code >= 0xA0
    } else {
        !matches!(get_general_category(c),
                  GeneralCategory::Control
                  | GeneralCategory::Format
                  | GeneralCategory::PrivateUse
                  | GeneralCategory::Unassigned
                  | GeneralCategory::Surrogate)
    }
}

fn needs_escape(c: char, ascii_only: bool) -> bool {
    (ascii_only && c as u32 > 0x7E) || !is_printable(c)
}

pub fn char2name(c: char) -> Option<&'static str> {
    match c {
        '\x07' => Some("alarm"),
        '\x08' => Some("backspace"),
        '\x7F' => Some("delete"),
        '\x1B' => Some("escape"),
        '\x0C' => Some("formfeed"),
        '\n' => Some("linefeed"),
        '\0' => Some("null"),
        '\r' => Some("return"),
        ' ' => Some("space"),
        '\t' => Some("tab"),
        '\x0B' => Some("vtab"),
        _ => None
    }
}

fn mnemonic(c: char) -> Option<char> {
    match c {
        '\x07' => Some('a'),
        '\x08' => Some('b'),
        '\x1B' => Some('e'),
        '\x0C' => Some('f'),
        '\n' => Some('n'),
        '\r' => Some('r'),
        '\t' => Some('t'),
        '\x0B' => Some('v'),
        _ => None
    }
}

// Escapes for the inside of strings, byte strings and `|...|`
// symbols; `quote` is the delimiter.
fn push_escaped(out: &mut String, s: impl Iterator<Item = char>, quote: char,
                f: &CharacterFormatting) {
    let ascii_only = f.ascii_only.unwrap_or(false);
    for c in s {
        if c == quote || c == '\\' {
            out.push('\\');
            out.push(c);
        } else if needs_escape(c, ascii_only) {
            if let Some(m) = mnemonic(c) {
                out.push('\\');
                out.push(m);
            } else {
                let code = c as u32;
                match f.escaping.unwrap_or_default() {
                    EscapingStyle::XStyle => out.push_str(&format!("\\x{:x};", code)),
                    EscapingStyle::UStyle =>
                        if code <= 0xFFFF {
                            out.push_str(&format!("\\u{:04x}", code))
                        } else {
                            out.push_str(&format!("\\U{:08x}", code))
                        }
                }
            }
        } else {
            out.push(c);
        }
    }
}

fn format_char(c: char, f: &CharacterFormatting) -> String {
    let mut out = String::from("#\\");
    if let Some(name) = char2name(c) {
        out.push_str(name);
    } else if needs_escape(c, f.ascii_only.unwrap_or(false)) {
        let code = c as u32;
        match f.escaping.unwrap_or_default() {
            EscapingStyle::XStyle => out.push_str(&format!("x{:x}", code)),
            EscapingStyle::UStyle =>
                if code <= 0xFFFF {
                    out.push_str(&format!("u{:04x}", code))
                } else {
                    out.push_str(&format!("U{:06x}", code))
                }
        }
    } else {
        out.push(c);
    }
    out
}

fn format_symbol(sym: &Symbol, f: &CharacterFormatting) -> String {
    let name = sym.name();
    let ascii_only = f.ascii_only.unwrap_or(false);
    if sym.is_plain() && !name.chars().any(|c| needs_escape(c, ascii_only)) {
        return name.into()
    }
    let mut out = String::from("|");
    push_escaped(&mut out, name.chars(), '|', f);
    out.push('|');
    out
}

fn format_number(n: Number, f: &NumberFormatting) -> Result<String, WriteError> {
    let radix = f.radix.unwrap_or_default();
    match n {
        Number::Integer(i) => Ok(format_integer(i, radix)),
        Number::Real(x) => {
            if x.is_finite() && radix.base() != 10 {
                return Err(WriteError::InvalidRadixForReal(x, radix.base()))
            }
            Ok(format!("{}{}", radix.prefix(), format_real(x)))
        }
    }
}

pub struct Writer<W: Write> {
    out: W,
    settings: WriterSettings,
    column: usize,
    need_separator: bool,
    depth: u32,
}

impl<W: Write> Writer<W> {
    pub fn new(out: W, settings: WriterSettings) -> Self {
        Writer { out, settings, column: 0, need_separator: false, depth: 0 }
    }

    pub fn settings(&self) -> &WriterSettings {
        &self.settings
    }

    /// Characters written since the last line break.
    pub fn column(&self) -> usize {
        self.column
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, s: &str) -> Result<(), WriteError> {
        for c in s.chars() {
            if c == '\n' {
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        self.out.write_all(s.as_bytes())?;
        Ok(())
    }

    fn emit_char(&mut self, c: char) -> Result<(), WriteError> {
        self.emit(c.encode_utf8(&mut [0; 4]))
    }

    fn newline_indent(&mut self, indent: usize) -> Result<(), WriteError> {
        self.emit("\n")?;
        self.emit(&" ".repeat(indent))
    }

    pub fn write(&mut self, v: &Value) -> Result<(), WriteError> {
        self.write_with(v, None)
    }

    /// Write `v`, with `over` taking precedence over all other
    /// formatting for `v` itself (not for the elements of lists).
    pub fn write_with(&mut self, v: &Value, over: Option<&Formatting>)
                      -> Result<(), WriteError> {
        if let Some(f) = over {
            let vt = v.value_type();
            if vt.formatting_kind() != Some(f.kind()) {
                return Err(WriteError::FormattingMismatch(f.kind(), vt))
            }
        }
        if v.is_eof() {
            return Err(WriteError::Eof)
        }
        if self.need_separator {
            let sep = self.settings.separator.clone();
            self.emit(sep.as_str())?;
        }
        self.need_separator = true;
        self.depth = 0;
        let r = self.write_value(v, over);
        match &r {
            Ok(()) => tracing::trace!("wrote {:?}", v.value_type()),
            Err(e) => tracing::debug!("write failed: {}", e),
        }
        r
    }

    pub fn write_all<'t>(&mut self, vals: impl IntoIterator<Item = &'t Value>)
                         -> Result<(), WriteError> {
        for v in vals {
            self.write(v)?;
        }
        Ok(())
    }

    fn resolve<D: Descriptor>(base: D, v: &Value, over: Option<&Formatting>) -> D {
        let mut d = base;
        if let Some(attached) = v.formatting().and_then(D::extract) {
            d = d.merge_with(&attached);
        }
        if let Some(o) = over.and_then(D::extract) {
            d = d.merge_with(&o);
        }
        d
    }

    fn write_value(&mut self, v: &Value, over: Option<&Formatting>)
                   -> Result<(), WriteError> {
        let defaults = self.settings.defaults;
        match v.kind() {
            ValueKind::Null => {
                let s = self.settings.null_literal.as_str();
                self.emit(s)
            }
            ValueKind::Eof => Err(WriteError::Eof),
            ValueKind::Boolean(b) => {
                let f: BooleanFormatting = Self::resolve(defaults.boolean, v, over);
                let s = match (*b, f.long_form.unwrap_or(false)) {
                    (true, false) => "#t",
                    (false, false) => "#f",
                    (true, true) => "#true",
                    (false, true) => "#false",
                };
                self.emit(s)
            }
            ValueKind::Number(n) => {
                let f: NumberFormatting = Self::resolve(defaults.number, v, over);
                let s = format_number(*n, &f)?;
                self.emit(&s)
            }
            ValueKind::Char(c) => {
                let f: CharacterFormatting = Self::resolve(defaults.character, v, over);
                self.emit(&format_char(*c, &f))
            }
            ValueKind::String(s) => {
                let f: CharacterFormatting = Self::resolve(defaults.character, v, over);
                let mut out = String::from("\"");
                push_escaped(&mut out, s.chars(), '"', &f);
                out.push('"');
                self.emit(&out)
            }
            ValueKind::Symbol(sym) => {
                let f: CharacterFormatting = Self::resolve(defaults.character, v, over);
                self.emit(&format_symbol(sym, &f))
            }
            ValueKind::TypeIdentifier(t) => {
                let f: CharacterFormatting = Self::resolve(defaults.character, v, over);
                let s = format!("#t:{}", format_symbol(t.symbol(), &f));
                self.emit(&s)
            }
            ValueKind::Bytes(b) => {
                let f: BytesFormatting = Self::resolve(defaults.bytes, v, over);
                self.write_bytes(b, &f)
            }
            ValueKind::Pair(_) => {
                let f: ListFormatting = Self::resolve(defaults.list, v, over);
                self.write_list(v, &f)
            }
        }
    }

    fn write_bytes(&mut self, b: &[u8], f: &BytesFormatting) -> Result<(), WriteError> {
        if f.byte_string.unwrap_or(false) {
            // line_limit does not apply; a break would change the content
            let mut out = String::from("#\"");
            let cf = CharacterFormatting {
                ascii_only: Some(true),
                escaping: Some(EscapingStyle::XStyle),
            };
            push_escaped(&mut out, b.iter().map(|&x| char::from(x)), '"', &cf);
            out.push('"');
            return self.emit(&out)
        }
        let parens = f.parens.unwrap_or_default();
        let radix = f.radix.unwrap_or(Radix::Decimal);
        self.emit("#u8")?;
        let indent = self.column + 1;
        self.emit_char(parens.opening())?;
        for (i, x) in b.iter().enumerate() {
            if i > 0 {
                match f.line_limit {
                    Some(n) if n > 0 && i % n == 0 => self.newline_indent(indent)?,
                    _ => self.emit(" ")?
                }
            }
            self.emit(&format_integer(*x as i64, radix))?;
        }
        self.emit_char(parens.closing())
    }

    // Elements are written recursively (up to the reader's default
    // nesting limit), the cdr chain iteratively.
    fn write_list(&mut self, v: &Value, f: &ListFormatting) -> Result<(), WriteError> {
        if self.depth >= DEFAULT_MAX_DEPTH {
            return Err(WriteError::NestingTooDeep(DEFAULT_MAX_DEPTH))
        }
        self.depth += 1;
        self.write_list_elements(v, f)?;
        self.depth -= 1;
        Ok(())
    }

    fn write_list_elements(&mut self, v: &Value, f: &ListFormatting)
                           -> Result<(), WriteError> {
        let parens = f.parens.unwrap_or_default();
        let indent = self.column + f.line_extra_spaces.unwrap_or(1);
        self.emit_char(parens.opening())?;
        let mut i = 0;
        let mut cur = v;
        loop {
            match cur.kind() {
                ValueKind::Pair(p) => {
                    if i > 0 {
                        let newline = match (f.line_elems_count, f.line_break_index) {
                            (Some(n), _) => n > 0 && i % n == 0,
                            (None, Some(b)) => i >= b,
                            (None, None) => false,
                        };
                        if newline {
                            self.newline_indent(indent)?;
                        } else {
                            self.emit(" ")?;
                        }
                    }
                    self.write_value(p.car(), None)?;
                    cur = p.cdr();
                    i += 1;
                }
                ValueKind::Null => break,
                _ => {
                    match f.line_break_index {
                        Some(b) if i > b => {
                            self.newline_indent(indent)?;
                            self.emit(".")?;
                            self.newline_indent(indent)?;
                        }
                        _ => self.emit(" . ")?
                    }
                    self.write_value(cur, None)?;
                    break;
                }
            }
        }
        self.emit_char(parens.closing())
    }
}

/// Render with default settings.
pub fn to_string(v: &Value) -> Result<String, WriteError> {
    to_string_with(v, &WriterSettings::default(), None)
}

pub fn to_string_with(v: &Value, settings: &WriterSettings, over: Option<&Formatting>)
                      -> Result<String, WriteError> {
    let mut w = Writer::new(Vec::new(), settings.clone());
    w.write_with(v, over)?;
    Ok(String::from_utf8_lossy(&w.into_inner()).into_owned())
}

/// Write each value followed by a newline, with default settings.
pub fn write_all<'t>(
    out: impl Write,
    vals: impl IntoIterator<Item = &'t Value>
) -> Result<(), WriteError> {
    let mut w = Writer::new(out, WriterSettings::default());
    let mut seen_item = false;
    for v in vals {
        w.write(v)?;
        seen_item = true;
    }
    if seen_item {
        w.emit("\n")?;
    }
    w.out.flush()?;
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatting::Parenkind;
    use crate::settings::{NullLiteral, Separator};
    use rstest::rstest;

    fn with(v: &Value, f: impl Into<Formatting>) -> String {
        to_string_with(v, &WriterSettings::default(), Some(&f.into())).unwrap()
    }

    #[test]
    fn t_atoms() {
        assert_eq!(to_string(&Value::boolean(true)).unwrap(), "#t");
        assert_eq!(with(&Value::boolean(false),
                        BooleanFormatting { long_form: Some(true) }), "#false");
        assert_eq!(to_string(&Value::integer(-42)).unwrap(), "-42");
        assert_eq!(to_string(&Value::real(1.0)).unwrap(), "1.0");
        assert_eq!(to_string(&Value::real(f64::NAN)).unwrap(), "+nan.0");
        assert_eq!(to_string(&Value::null()).unwrap(), "()");
        assert_eq!(to_string(&Value::type_identifier("point")).unwrap(), "#t:point");
        assert!(matches!(to_string(&Value::eof()), Err(WriteError::Eof)));
    }

    #[rstest]
    #[case(Radix::Hexadecimal, "#x7b")]
    #[case(Radix::Octal, "#o173")]
    #[case(Radix::Binary, "#b1111011")]
    #[case(Radix::PrefixedDecimal, "#d123")]
    #[case(Radix::Decimal, "123")]
    fn t_radix(#[case] radix: Radix, #[case] expected: &str) {
        assert_eq!(with(&Value::integer(123), NumberFormatting { radix: Some(radix) }),
                   expected);
    }

    #[test]
    fn t_real_radix() {
        let hex = NumberFormatting { radix: Some(Radix::Hexadecimal) };
        assert!(matches!(
            to_string_with(&Value::real(1.5), &WriterSettings::default(),
                           Some(&hex.into())),
            Err(WriteError::InvalidRadixForReal(_, 16))));
        assert_eq!(with(&Value::real(f64::INFINITY), hex), "#x+inf.0");
    }

    #[rstest]
    #[case('a', "#\\a")]
    #[case(' ', "#\\space")]
    #[case('\n', "#\\linefeed")]
    #[case('\x7f', "#\\delete")]
    #[case('\x01', "#\\x1")]
    #[case('测', "#\\测")]
    fn t_chars(#[case] c: char, #[case] expected: &str) {
        assert_eq!(to_string(&Value::char(c)).unwrap(), expected);
    }

    #[test]
    fn t_char_escaping() {
        let x = CharacterFormatting { ascii_only: Some(true), escaping: None };
        let u = CharacterFormatting { ascii_only: Some(true),
                                      escaping: Some(EscapingStyle::UStyle) };
        assert_eq!(with(&Value::char('测'), x), "#\\x6d4b");
        assert_eq!(with(&Value::char('测'), u), "#\\u6d4b");
        assert_eq!(with(&Value::char('\u{2a6a5}'), u), "#\\U02a6a5");
    }

    #[test]
    fn t_strings() {
        let s = Value::string("テスト");
        assert_eq!(to_string(&s).unwrap(), "\"テスト\"");
        let x = CharacterFormatting { ascii_only: Some(true), escaping: None };
        let u = CharacterFormatting { ascii_only: Some(true),
                                      escaping: Some(EscapingStyle::UStyle) };
        assert_eq!(with(&s, x), "\"\\x30c6;\\x30b9;\\x30c8;\"");
        assert_eq!(with(&s, u), "\"\\u30c6\\u30b9\\u30c8\"");
        assert_eq!(to_string(&Value::string("a\"b\\c\nd\u{1}")).unwrap(),
                   "\"a\\\"b\\\\c\\nd\\x1;\"");
    }

    #[rstest]
    #[case("foo", "foo")]
    #[case("two words", "|two words|")]
    #[case("#t", "|#t|")]
    #[case("123", "|123|")]
    #[case("", "||")]
    #[case("+1", "|+1|")]
    #[case("-inf.0", "|-inf.0|")]
    #[case("inf.0", "inf.0")]
    #[case("1.6", "|1.6|")]
    #[case("1.6.2", "1.6.2")]
    #[case("1e6", "|1e6|")]
    #[case("1e6e2", "1e6e2")]
    #[case(".", "|.|")]
    #[case("nil", "|nil|")]
    #[case("a|b", "|a\\|b|")]
    #[case("a\\b", "|a\\\\b|")]
    #[case("tab\there", "|tab\\there|")]
    fn t_symbols(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(to_string(&Value::symbol(name)).unwrap(), expected);
    }

    #[test]
    fn t_bytes() {
        let v = Value::bytes(b"Untitled");
        assert_eq!(to_string(&v).unwrap(), "#u8(85 110 116 105 116 108 101 100)");
        assert_eq!(with(&v, BytesFormatting { line_limit: Some(3), ..Default::default() }),
                   "#u8(85 110 116\n    105 116 108\n    101 100)");
        assert_eq!(with(&Value::bytes(&[1, 255]),
                        BytesFormatting { radix: Some(Radix::Hexadecimal),
                                          parens: Some(Parenkind::Square),
                                          ..Default::default() }),
                   "#u8[#x1 #xff]");
        assert_eq!(with(&Value::bytes(b"a\"\n\xff"),
                        BytesFormatting { byte_string: Some(true), ..Default::default() }),
                   "#\"a\\\"\\n\\xff;\"");
    }

    #[test]
    fn t_lists() {
        let l = Value::list((1..=3).map(Value::integer));
        assert_eq!(to_string(&l).unwrap(), "(1 2 3)");
        assert_eq!(with(&l, ListFormatting { parens: Some(Parenkind::Square),
                                             ..Default::default() }), "[1 2 3]");
        let dotted = Value::cons(Value::integer(1),
                                 Value::cons(Value::integer(2), Value::integer(3)));
        assert_eq!(to_string(&dotted).unwrap(), "(1 2 . 3)");
        assert_eq!(with(&l, ListFormatting { line_break_index: Some(1),
                                             ..Default::default() }),
                   "(1\n 2\n 3)");
        assert_eq!(with(&dotted, ListFormatting { line_break_index: Some(1),
                                                  line_extra_spaces: Some(2),
                                                  ..Default::default() }),
                   "(1\n  2\n  .\n  3)");
        let six = Value::list((1..=6).map(Value::integer));
        assert_eq!(with(&six, ListFormatting { line_elems_count: Some(2),
                                               ..Default::default() }),
                   "(1 2\n 3 4\n 5 6)");
    }

    #[test]
    fn t_nested_indent() {
        let inner = Value::list(vec![Value::symbol("b"), Value::symbol("c")])
            .with_formatting(ListFormatting { line_break_index: Some(1),
                                              ..Default::default() }).unwrap();
        let outer = Value::list(vec![Value::symbol("a"), inner]);
        assert_eq!(to_string(&outer).unwrap(), "(a (b\n    c))");
    }

    #[test]
    fn t_precedence() {
        let settings = WriterSettings {
            defaults: crate::settings::FormattingDefaults {
                number: NumberFormatting { radix: Some(Radix::Hexadecimal) },
                ..Default::default()
            },
            ..Default::default()
        };
        let attached = Value::integer(8)
            .with_formatting(NumberFormatting { radix: Some(Radix::Octal) }).unwrap();
        let l = Value::list(vec![Value::integer(255), attached.clone()]);
        assert_eq!(to_string_with(&l, &settings, None).unwrap(), "(#xff #o10)");
        let bin: Formatting = NumberFormatting { radix: Some(Radix::Binary) }.into();
        assert_eq!(to_string_with(&attached, &settings, Some(&bin)).unwrap(), "#b1000");
        assert!(matches!(
            to_string_with(&Value::string("x"), &settings, Some(&bin)),
            Err(WriteError::FormattingMismatch(FormattingKind::Number, ValueType::String))));
    }

    #[rstest]
    #[case(Separator::Newline, NullLiteral::EmptyList, "1\n()\nx", 1)]
    #[case(Separator::DoubleNewline, NullLiteral::Null, "1\n\nnull\n\nx", 1)]
    #[case(Separator::Space, NullLiteral::Nil, "1 nil x", 7)]
    #[case(Separator::Space, NullLiteral::Null, "1 null x", 8)]
    #[case(Separator::Custom(" | ".into()), NullLiteral::Nil, "1 | nil | x", 11)]
    fn t_separators_and_null(#[case] separator: Separator, #[case] null_literal: NullLiteral,
                             #[case] expected: &str, #[case] column: usize) {
        let vals = vec![Value::integer(1), Value::null(), Value::symbol("x")];
        let settings = WriterSettings { null_literal, separator, ..Default::default() };
        let mut w = Writer::new(Vec::new(), settings);
        w.write_all(&vals).unwrap();
        assert_eq!(w.column(), column);
        assert_eq!(String::from_utf8(w.into_inner()).unwrap(), expected);
    }

    #[test]
    fn t_write_all_terminates_lines() {
        let vals = vec![Value::integer(1), Value::null(), Value::symbol("x")];
        let mut out = Vec::new();
        write_all(&mut out, &vals).unwrap();
        assert_eq!(out, b"1\n()\nx\n");
    }

    #[test]
    fn t_nesting_limit() {
        let nested = |n: u32| {
            let mut v = Value::null();
            for _ in 0..n {
                v = Value::list(vec![v]);
            }
            v
        };
        // n lists around the innermost `()`
        let s = to_string(&nested(DEFAULT_MAX_DEPTH)).unwrap();
        assert!(s.starts_with("(("));
        assert!(matches!(to_string(&nested(200_000)),
                         Err(WriteError::NestingTooDeep(DEFAULT_MAX_DEPTH))));
        assert!(nested(200_000).to_string().starts_with("#<lists nested deeper"));
    }

    #[test]
    fn t_printable() {
        assert!(is_printable('a'));
        assert!(is_printable('\u{a0}'));
        assert!(!is_printable('\u{85}'));
        assert!(!is_printable('\u{200b}'));
        assert!(!is_printable('\u{e000}'));
        assert!(is_printable('テ'));
    }
}
