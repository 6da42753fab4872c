// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Runtime data type representing an S-expression value.

//! [Value](Value) is immutable (apart from its attached formatting)
//! and cheap to clone: strings are `KString`, and bytes and pairs are
//! shared via `Arc`. Lists are chains of pairs ending in `Null`; the
//! reader never produces cycles. Each value carries a hash computed
//! at construction time.

use crate::formatting::{Formatting, FormattingKind, ListFormatting};
use crate::number::Number;
use crate::symbol::{Symbol, TypeIdentifier};
use kstring::KString;
use rustc_hash::FxHasher;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use thiserror::Error;

/// Declaration order is the order values of different types sort in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueType {
    Null,
    Eof,
    Boolean,
    Number,
    Char,
    String,
    Bytes,
    Symbol,
    Pair,
    TypeIdentifier,
}

impl ValueType {
    /// The formatting kind values of this type accept, if any.
    pub fn formatting_kind(self) -> Option<FormattingKind> {
        match self {
            ValueType::Null | ValueType::Eof => None,
            ValueType::Boolean => Some(FormattingKind::Boolean),
            ValueType::Number => Some(FormattingKind::Number),
            ValueType::Char
                | ValueType::String
                | ValueType::Symbol
                | ValueType::TypeIdentifier => Some(FormattingKind::Character),
            ValueType::Bytes => Some(FormattingKind::Bytes),
            ValueType::Pair => Some(FormattingKind::List),
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ValueType::Null => "null",
            ValueType::Eof => "eof",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::Char => "char",
            ValueType::String => "string",
            ValueType::Bytes => "bytes",
            ValueType::Symbol => "symbol",
            ValueType::Pair => "pair",
            ValueType::TypeIdentifier => "type identifier",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected {expected}, got {actual}")]
pub struct CastError {
    pub actual: ValueType,
    pub expected: &'static str,
}

impl CastError {
    fn new(actual: ValueType, expected: &'static str) -> Self {
        CastError { actual, expected }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("invalid character scalar value {0:#x}")]
    InvalidScalar(u32),
    #[error("{0} formatting cannot be attached to a value of type {1}")]
    FormattingMismatch(FormattingKind, ValueType),
    #[error("{0}")]
    Cast(#[from] CastError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    Null,
    Eof,
    Boolean(bool),
    Number(Number),
    Char(char),
    String(KString),
    Bytes(Arc<[u8]>),
    Symbol(Symbol),
    Pair(Arc<Pair>),
    TypeIdentifier(TypeIdentifier),
}

impl ValueKind {
    pub fn value_type(&self) -> ValueType {
        match self {
            ValueKind::Null => ValueType::Null,
            ValueKind::Eof => ValueType::Eof,
            ValueKind::Boolean(_) => ValueType::Boolean,
            ValueKind::Number(_) => ValueType::Number,
            ValueKind::Char(_) => ValueType::Char,
            ValueKind::String(_) => ValueType::String,
            ValueKind::Bytes(_) => ValueType::Bytes,
            ValueKind::Symbol(_) => ValueType::Symbol,
            ValueKind::Pair(_) => ValueType::Pair,
            ValueKind::TypeIdentifier(_) => ValueType::TypeIdentifier,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Pair {
    car: Value,
    cdr: Value,
}

impl Pair {
    pub fn car(&self) -> &Value {
        &self.car
    }
    pub fn cdr(&self) -> &Value {
        &self.cdr
    }
}

fn take_pair(v: &mut Value, pending: &mut Vec<Arc<Pair>>) {
    if let ValueKind::Pair(_) = v.kind {
        if let ValueKind::Pair(p) = std::mem::replace(&mut v.kind, ValueKind::Null) {
            pending.push(p);
        }
    }
}

// Pairs we hold the last reference to are unlinked onto a worklist,
// so dropping deep structures (through car or cdr) does not recurse.
impl Drop for Pair {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        take_pair(&mut self.car, &mut pending);
        take_pair(&mut self.cdr, &mut pending);
        while let Some(p) = pending.pop() {
            if let Ok(mut pair) = Arc::try_unwrap(p) {
                take_pair(&mut pair.car, &mut pending);
                take_pair(&mut pair.cdr, &mut pending);
            }
        }
    }
}

#[derive(Clone)]
pub struct Value {
    kind: ValueKind,
    formatting: Option<Formatting>,
    hash: u64,
}

// Real: 0.0 and -0.0 hash the same, as do all NaNs. Bytes: only the
// last (up to) 8 bytes contribute.
fn compute_hash(kind: &ValueKind) -> u64 {
    let mut h = FxHasher::default();
    kind.value_type().hash(&mut h);
    match kind {
        ValueKind::Null | ValueKind::Eof => {}
        ValueKind::Boolean(b) => b.hash(&mut h),
        ValueKind::Number(Number::Integer(i)) => {
            h.write_u8(0);
            i.hash(&mut h)
        }
        ValueKind::Number(Number::Real(x)) => {
            h.write_u8(1);
            let bits =
                if x.is_nan() { f64::NAN.to_bits() }
                else if *x == 0. { 0 }
                else { x.to_bits() };
            bits.hash(&mut h)
        }
        ValueKind::Char(c) => c.hash(&mut h),
        ValueKind::String(s) => s.as_str().hash(&mut h),
        ValueKind::Bytes(b) => b[b.len().saturating_sub(8)..].hash(&mut h),
        ValueKind::Symbol(s) => s.hash(&mut h),
        ValueKind::Pair(p) => {
            h.write_u64(p.car.hash);
            h.write_u64(p.cdr.hash);
        }
        ValueKind::TypeIdentifier(t) => t.hash(&mut h),
    }
    h.finish()
}

impl Value {
    pub fn from_kind(kind: ValueKind) -> Value {
        let hash = compute_hash(&kind);
        Value { kind, formatting: None, hash }
    }

    pub fn null() -> Value {
        Value::from_kind(ValueKind::Null)
    }
    pub fn eof() -> Value {
        Value::from_kind(ValueKind::Eof)
    }
    pub fn boolean(b: bool) -> Value {
        Value::from_kind(ValueKind::Boolean(b))
    }
    pub fn number(n: Number) -> Value {
        Value::from_kind(ValueKind::Number(n))
    }
    pub fn integer(i: i64) -> Value {
        Value::number(Number::Integer(i))
    }
    pub fn real(x: f64) -> Value {
        Value::number(Number::Real(x))
    }
    pub fn char(c: char) -> Value {
        Value::from_kind(ValueKind::Char(c))
    }
    /// Fails for surrogates and values beyond 0x10FFFF.
    pub fn scalar(code: u32) -> Result<Value, ValueError> {
        char::from_u32(code)
            .map(Value::char)
            .ok_or(ValueError::InvalidScalar(code))
    }
    pub fn string(s: &str) -> Value {
        Value::from_kind(ValueKind::String(KString::from_ref(s)))
    }
    pub fn bytes(b: &[u8]) -> Value {
        Value::from_kind(ValueKind::Bytes(b.into()))
    }
    pub fn symbol(name: &str) -> Value {
        Value::from_kind(ValueKind::Symbol(Symbol::from_string(name)))
    }
    pub fn type_identifier(name: &str) -> Value {
        Value::from_kind(ValueKind::TypeIdentifier(TypeIdentifier::from_string(name)))
    }
    pub fn cons(car: Value, cdr: Value) -> Value {
        Value::from_kind(ValueKind::Pair(Arc::new(Pair { car, cdr })))
    }
    /// A proper list of the given elements.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Value {
        let items: Vec<Value> = items.into_iter().collect();
        items.into_iter().rev().fold(Value::null(), |tail, v| Value::cons(v, tail))
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn value_type(&self) -> ValueType {
        self.kind.value_type()
    }

    pub fn formatting(&self) -> Option<&Formatting> {
        self.formatting.as_ref()
    }

    /// Attach (or with None, remove) formatting. The formatting kind
    /// must fit the value's type.
    pub fn set_formatting(&mut self, formatting: Option<Formatting>)
                          -> Result<(), ValueError> {
        if let Some(f) = &formatting {
            let vt = self.value_type();
            if vt.formatting_kind() != Some(f.kind()) {
                return Err(ValueError::FormattingMismatch(f.kind(), vt))
            }
        }
        self.formatting = formatting;
        Ok(())
    }

    /// For pairs, which accept any list formatting.
    pub(crate) fn set_list_formatting(&mut self, formatting: ListFormatting) {
        debug_assert!(self.is_pair());
        self.formatting = Some(formatting.into());
    }

    pub fn with_formatting(mut self, formatting: impl Into<Formatting>)
                           -> Result<Value, ValueError> {
        self.set_formatting(Some(formatting.into()))?;
        Ok(self)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, ValueKind::Null)
    }
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, ValueKind::Eof)
    }
    pub fn is_pair(&self) -> bool {
        matches!(self.kind, ValueKind::Pair(_))
    }

    /// True iff following the cdr links ends in `Null`.
    pub fn is_list(&self) -> bool {
        let mut v = self;
        loop {
            match &v.kind {
                ValueKind::Null => return true,
                ValueKind::Pair(p) => v = &p.cdr,
                _ => return false
            }
        }
    }

    fn cast_error(&self, expected: &'static str) -> CastError {
        CastError::new(self.value_type(), expected)
    }

    pub fn as_bool(&self) -> Result<bool, CastError> {
        match self.kind {
            ValueKind::Boolean(b) => Ok(b),
            _ => Err(self.cast_error("boolean"))
        }
    }
    pub fn as_number(&self) -> Result<Number, CastError> {
        match self.kind {
            ValueKind::Number(n) => Ok(n),
            _ => Err(self.cast_error("number"))
        }
    }
    /// Reals are not accepted.
    pub fn as_i64(&self) -> Result<i64, CastError> {
        match self.kind {
            ValueKind::Number(Number::Integer(i)) => Ok(i),
            _ => Err(self.cast_error("integer"))
        }
    }
    pub fn as_i32(&self) -> Result<i32, CastError> {
        i32::try_from(self.as_i64()?)
            .map_err(|_| self.cast_error("32-bit integer"))
    }
    /// Integers are widened.
    pub fn as_f64(&self) -> Result<f64, CastError> {
        Ok(self.as_number()?.to_f64())
    }
    pub fn as_char(&self) -> Result<char, CastError> {
        match self.kind {
            ValueKind::Char(c) => Ok(c),
            _ => Err(self.cast_error("char"))
        }
    }
    pub fn as_scalar(&self) -> Result<u32, CastError> {
        Ok(self.as_char()? as u32)
    }
    pub fn as_str(&self) -> Result<&str, CastError> {
        match &self.kind {
            ValueKind::String(s) => Ok(s.as_str()),
            _ => Err(self.cast_error("string"))
        }
    }
    pub fn as_bytes(&self) -> Result<&[u8], CastError> {
        match &self.kind {
            ValueKind::Bytes(b) => Ok(b),
            _ => Err(self.cast_error("bytes"))
        }
    }
    pub fn as_symbol(&self) -> Result<&Symbol, CastError> {
        match &self.kind {
            ValueKind::Symbol(s) => Ok(s),
            _ => Err(self.cast_error("symbol"))
        }
    }
    pub fn as_pair(&self) -> Result<&Pair, CastError> {
        match &self.kind {
            ValueKind::Pair(p) => Ok(p),
            _ => Err(self.cast_error("pair"))
        }
    }
    pub fn as_type_identifier(&self) -> Result<&TypeIdentifier, CastError> {
        match &self.kind {
            ValueKind::TypeIdentifier(t) => Ok(t),
            _ => Err(self.cast_error("type identifier"))
        }
    }

    /// Generic extraction, e.g. `v.cast::<i64>()`.
    pub fn cast<'v, T>(&'v self) -> Result<T, CastError>
        where T: TryFrom<&'v Value, Error = CastError>
    {
        T::try_from(self)
    }

    /// Iterate the elements of a list lazily. Fails right away if the
    /// value is neither a pair nor null; an improper tail is reported
    /// as an `Err` item when reached.
    pub fn iter(&self) -> Result<ListIter<'_>, CastError> {
        match self.kind {
            ValueKind::Null | ValueKind::Pair(_) => Ok(ListIter { rest: Some(self) }),
            _ => Err(self.cast_error("list"))
        }
    }

    pub fn list_len(&self) -> Result<usize, CastError> {
        let mut n = 0;
        for item in self.iter()? {
            item?;
            n += 1;
        }
        Ok(n)
    }

    pub fn to_vec(&self) -> Result<Vec<Value>, CastError> {
        self.iter()?.map(|r| r.cloned()).collect()
    }
}

pub struct ListIter<'v> {
    rest: Option<&'v Value>,
}

impl<'v> Iterator for ListIter<'v> {
    type Item = Result<&'v Value, CastError>;

    fn next(&mut self) -> Option<Self::Item> {
        let v = self.rest.take()?;
        match &v.kind {
            ValueKind::Null => None,
            ValueKind::Pair(p) => {
                self.rest = Some(&p.cdr);
                Some(Ok(&p.car))
            }
            _ => Some(Err(v.cast_error("proper list")))
        }
    }
}

/// Structural; formatting is ignored. Pairs are walked with an
/// explicit stack.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            if a.hash != b.hash {
                return false
            }
            match (&a.kind, &b.kind) {
                (ValueKind::Pair(p), ValueKind::Pair(q)) => {
                    if !Arc::ptr_eq(p, q) {
                        pending.push((&p.cdr, &q.cdr));
                        pending.push((&p.car, &q.car));
                    }
                }
                (x, y) => if x != y {
                    return false
                }
            }
        }
        true
    }
}

impl Eq for Value {}

// Non-pair values, or pairs only by type.
fn cmp_shallow(a: &Value, b: &Value) -> Ordering {
    a.value_type().cmp(&b.value_type()).then_with(|| {
        match (&a.kind, &b.kind) {
            (ValueKind::Boolean(x), ValueKind::Boolean(y)) => x.cmp(y),
            (ValueKind::Number(x), ValueKind::Number(y)) => x.cmp(y),
            (ValueKind::Char(x), ValueKind::Char(y)) => x.cmp(y),
            (ValueKind::String(x), ValueKind::String(y)) => x.as_str().cmp(y.as_str()),
            (ValueKind::Bytes(x), ValueKind::Bytes(y)) => x[..].cmp(&y[..]),
            (ValueKind::Symbol(x), ValueKind::Symbol(y)) => x.cmp(y),
            (ValueKind::TypeIdentifier(x), ValueKind::TypeIdentifier(y)) => x.cmp(y),
            _ => Ordering::Equal
        }
    })
}

/// Values of different types sort by [ValueType]; otherwise by
/// content. Bytes compare lexicographically, pairs car first, then
/// cdr. Consistent with `==`.
impl Ord for Value {
    fn cmp(&self, other: &Value) -> Ordering {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            match (&a.kind, &b.kind) {
                (ValueKind::Pair(p), ValueKind::Pair(q)) => {
                    if !Arc::ptr_eq(p, q) {
                        pending.push((&p.cdr, &q.cdr));
                        pending.push((&p.car, &q.car));
                    }
                }
                _ => match cmp_shallow(a, b) {
                    Ordering::Equal => {}
                    o => return o
                }
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Value) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash)
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.formatting {
            Some(fmt) => write!(f, "Value({:?}, {:?})", self.kind, fmt),
            None => write!(f, "Value({:?})", self.kind),
        }
    }
}

/// Text as written with default writer settings. Eof, which cannot
/// be written, shows as `#!eof`.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_eof() {
            return f.write_str("#!eof")
        }
        match crate::write::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(e) => write!(f, "#<{}>", e),
        }
    }
}

macro_rules! from_integer {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(i: $t) -> Value {
                Value::integer(i as i64)
            }
        })*
    }
}

from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::boolean(b)
    }
}
impl From<f64> for Value {
    fn from(x: f64) -> Value {
        Value::real(x)
    }
}
impl From<Number> for Value {
    fn from(n: Number) -> Value {
        Value::number(n)
    }
}
impl From<char> for Value {
    fn from(c: char) -> Value {
        Value::char(c)
    }
}
impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::string(s)
    }
}
impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::from_kind(ValueKind::String(KString::from_string(s)))
    }
}
impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Value {
        Value::from_kind(ValueKind::Bytes(b.into()))
    }
}
impl From<Symbol> for Value {
    fn from(s: Symbol) -> Value {
        Value::from_kind(ValueKind::Symbol(s))
    }
}
impl From<TypeIdentifier> for Value {
    fn from(t: TypeIdentifier) -> Value {
        Value::from_kind(ValueKind::TypeIdentifier(t))
    }
}

macro_rules! try_from_value {
    ($($t:ty => $method:ident),*) => {
        $(impl TryFrom<&Value> for $t {
            type Error = CastError;
            fn try_from(v: &Value) -> Result<$t, CastError> {
                v.$method().map(Into::into)
            }
        })*
    }
}

try_from_value!(bool => as_bool, Number => as_number, i64 => as_i64,
                i32 => as_i32, f64 => as_f64, char => as_char,
                String => as_str, Vec<u8> => as_bytes);

impl TryFrom<&Value> for Symbol {
    type Error = CastError;
    fn try_from(v: &Value) -> Result<Symbol, CastError> {
        v.as_symbol().cloned()
    }
}

impl TryFrom<&Value> for TypeIdentifier {
    type Error = CastError;
    fn try_from(v: &Value) -> Result<TypeIdentifier, CastError> {
        v.as_type_identifier().cloned()
    }
}

impl<'v> TryFrom<&'v Value> for &'v str {
    type Error = CastError;
    fn try_from(v: &'v Value) -> Result<&'v str, CastError> {
        v.as_str()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatting::{ListFormatting, NumberFormatting, Parenkind, Radix};
    use std::collections::HashSet;
    use rstest::rstest;

    #[test]
    fn t_scalar() {
        assert_eq!(Value::scalar(0x41).unwrap(), Value::char('A'));
        assert_eq!(Value::scalar(0xD800), Err(ValueError::InvalidScalar(0xD800)));
        assert_eq!(Value::scalar(0x110000), Err(ValueError::InvalidScalar(0x110000)));
        assert!(Value::scalar(0x10FFFF).is_ok());
    }

    #[test]
    fn t_equality() {
        let a = Value::list(vec![Value::integer(1), Value::string("x"),
                                 Value::bytes(&[1, 2, 3])]);
        let b = Value::list(vec![Value::integer(1), Value::string("x"),
                                 Value::bytes(&[1, 2, 3])]);
        assert_eq!(a, b);
        assert_ne!(a, Value::list(vec![Value::integer(1)]));
        assert_ne!(Value::integer(1), Value::real(1.0));
        assert_eq!(Value::real(f64::NAN), Value::real(f64::NAN));
        assert_eq!(Value::real(0.0), Value::real(-0.0));
        assert_eq!(Value::symbol("s"), Value::symbol("s"));
        assert_ne!(Value::symbol("s"), Value::string("s"));
    }

    #[test]
    fn t_hash_consistent() {
        let mut set = HashSet::new();
        set.insert(Value::bytes(&[9, 1, 2, 3, 4, 5, 6, 7, 8]));
        set.insert(Value::real(-0.0));
        assert!(set.contains(&Value::bytes(&[9, 1, 2, 3, 4, 5, 6, 7, 8])));
        assert!(set.contains(&Value::real(0.0)));
        // same last 8 bytes, same hash, but not equal
        let x = Value::bytes(&[1, 0, 0, 0, 0, 0, 0, 0, 0]);
        let y = Value::bytes(&[2, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(x.hash, y.hash);
        assert_ne!(x, y);
    }

    #[test]
    fn t_formatting_typecheck() {
        let f = NumberFormatting { radix: Some(Radix::Hexadecimal) };
        assert!(Value::integer(3).with_formatting(f).is_ok());
        assert_eq!(Value::string("x").with_formatting(f).unwrap_err(),
                   ValueError::FormattingMismatch(FormattingKind::Number,
                                                  ValueType::String));
        assert!(Value::null().with_formatting(ListFormatting::default()).is_err());
        let l = Value::list(vec![Value::integer(1)])
            .with_formatting(ListFormatting {
                parens: Some(Parenkind::Square), ..Default::default()
            }).unwrap();
        // formatting does not take part in equality
        assert_eq!(l, Value::list(vec![Value::integer(1)]));
    }

    #[test]
    fn t_casts() {
        assert_eq!(Value::integer(5).as_f64(), Ok(5.0));
        assert_eq!(Value::real(5.0).as_i64(),
                   Err(CastError { actual: ValueType::Number, expected: "integer" }));
        assert!(Value::integer(1 << 40).as_i32().is_err());
        assert_eq!(Value::integer(-7).cast::<i32>(), Ok(-7));
        assert_eq!(Value::string("hi").cast::<String>(), Ok("hi".to_string()));
        assert_eq!(Value::char('λ').as_scalar(), Ok(0x3bb));
        let e = Value::boolean(true).as_str().unwrap_err();
        assert_eq!(e.to_string(), "expected string, got boolean");
    }

    #[test]
    fn t_lists() {
        let l = Value::list((1..=3).map(Value::integer));
        assert!(l.is_list());
        assert_eq!(l.list_len(), Ok(3));
        assert_eq!(l.to_vec().unwrap(),
                   vec![Value::integer(1), Value::integer(2), Value::integer(3)]);
        let improper = Value::cons(Value::integer(1), Value::integer(2));
        assert!(!improper.is_list());
        let items: Vec<_> = improper.iter().unwrap().collect();
        assert_eq!(items.len(), 2);
        assert!(items[1].is_err());
        assert!(Value::integer(1).iter().is_err());
        assert_eq!(Value::null().list_len(), Ok(0));
    }

    #[test]
    fn t_long_list() {
        let n = 200_000;
        let a = Value::list((0..n).map(Value::integer));
        let b = Value::list((0..n).map(Value::integer));
        assert!(a == b);
        drop(a);
        drop(b);
    }

    #[test]
    fn t_deep_car_nesting() {
        let deep = || {
            let mut v = Value::null();
            for _ in 0..200_000 {
                v = Value::list(vec![v]);
            }
            v
        };
        let a = deep();
        let b = deep();
        assert!(a == b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
        drop(a);
        drop(b);
    }

    #[test]
    fn t_shared_tail_survives_drop() {
        let tail = Value::list(vec![Value::integer(2), Value::integer(3)]);
        let v = Value::cons(Value::integer(1), tail.clone());
        drop(v);
        assert_eq!(tail.list_len().unwrap(), 2);
    }

    #[rstest]
    #[case(Value::null(), Value::boolean(false))]
    #[case(Value::boolean(false), Value::boolean(true))]
    #[case(Value::boolean(true), Value::integer(0))]
    #[case(Value::integer(2), Value::real(2.5))]
    #[case(Value::real(2.0), Value::integer(3))]
    #[case(Value::integer(7), Value::char('a'))]
    #[case(Value::char('a'), Value::char('b'))]
    #[case(Value::string("ab"), Value::string("b"))]
    #[case(Value::string("zz"), Value::bytes(b""))]
    #[case(Value::bytes(&[1, 2]), Value::bytes(&[1, 3]))]
    #[case(Value::bytes(&[1, 2]), Value::bytes(&[1, 2, 0]))]
    #[case(Value::bytes(&[9]), Value::symbol("a"))]
    #[case(Value::symbol("a"), Value::symbol("b"))]
    #[case(Value::symbol("z"), Value::cons(Value::null(), Value::null()))]
    #[case(Value::list(vec![Value::integer(1), Value::integer(2)]),
           Value::list(vec![Value::integer(1), Value::integer(3)]))]
    #[case(Value::list(vec![Value::integer(1)]),
           Value::list(vec![Value::integer(1), Value::integer(0)]))]
    #[case(Value::list(vec![Value::integer(1), Value::integer(9)]),
           Value::list(vec![Value::integer(2)]))]
    #[case(Value::list(vec![Value::integer(1)]), Value::type_identifier("a"))]
    fn t_order(#[case] a: Value, #[case] b: Value) {
        assert!(a < b, "{:?} < {:?}", a, b);
        assert!(b > a);
        assert_ne!(a, b);
    }

    #[test]
    fn t_order_agrees_with_eq() {
        let pairs = [
            (Value::real(0.0), Value::real(-0.0)),
            (Value::real(f64::NAN), Value::real(-f64::NAN)),
            (Value::list(vec![Value::symbol("x"), Value::bytes(b"ab")]),
             Value::list(vec![Value::symbol("x"), Value::bytes(b"ab")])),
        ];
        for (a, b) in pairs {
            assert_eq!(a, b);
            assert_eq!(a.cmp(&b), Ordering::Equal);
        }
        let mut sorted = vec![Value::integer(3), Value::string("s"), Value::null(),
                              Value::integer(-1)];
        sorted.sort();
        assert_eq!(sorted, vec![Value::null(), Value::integer(-1), Value::integer(3),
                                Value::string("s")]);
        let set: std::collections::BTreeSet<Value> =
            [Value::integer(1), Value::integer(1), Value::real(1.0)].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn t_send_sync() {
        fn check<T: Send + Sync>() {}
        check::<Value>();
    }
}
