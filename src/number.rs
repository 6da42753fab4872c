// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Numbers: 64-bit integers and doubles, and the token syntax shared
//! by the reader and the writer.

use crate::formatting::Radix;
use num::{BigInt, ToPrimitive};
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Clone, Copy)]
pub enum Number {
    Integer(i64),
    Real(f64),
}

impl Number {
    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    /// Widens integers.
    pub fn to_f64(&self) -> f64 {
        match *self {
            Number::Integer(i) => i as f64,
            Number::Real(x) => x,
        }
    }
}

/// Integers and reals are never equal to each other; NaN equals NaN.
impl PartialEq for Number {
    fn eq(&self, other: &Number) -> bool {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            (Number::Real(a), Number::Real(b)) =>
                a == b || (a.is_nan() && b.is_nan()),
            _ => false
        }
    }
}

impl Eq for Number {}

/// By numeric value; an integer sorts before a real of the same
/// value, so that the order agrees with `==`. NaN sorts after
/// `+inf.0`.
impl Ord for Number {
    fn cmp(&self, other: &Number) -> Ordering {
        let canonical = |n: &Number| match *n {
            Number::Real(x) if x.is_nan() => f64::NAN,
            Number::Real(x) if x == 0. => 0.,
            n => n.to_f64(),
        };
        canonical(self).total_cmp(&canonical(other)).then_with(|| {
            match (self, other) {
                (Number::Integer(a), Number::Integer(b)) => a.cmp(b),
                (Number::Integer(_), Number::Real(_)) => Ordering::Less,
                (Number::Real(_), Number::Integer(_)) => Ordering::Greater,
                (Number::Real(_), Number::Real(_)) => Ordering::Equal,
            }
        })
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Number) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Number {
        Number::Integer(i)
    }
}

impl From<f64> for Number {
    fn from(x: f64) -> Number {
        Number::Real(x)
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Real(x) => f.write_str(&format_real(x)),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NumberError {
    #[error("invalid number syntax {0:?} for radix {1}")]
    InvalidSyntax(String, u32),
    #[error("number {0:?} out of range")]
    OutOfRange(String),
}

/// `+nan.0`, `-nan.0`, `+inf.0`, `-inf.0`.
pub fn special_real(s: &str) -> Option<f64> {
    match s {
        "+nan.0" => Some(f64::NAN),
        "-nan.0" => Some(-f64::NAN),
        "+inf.0" => Some(f64::INFINITY),
        "-inf.0" => Some(f64::NEG_INFINITY),
        _ => None
    }
}

/// Parse an unprefixed token as a decimal number: integer if it fits
/// an i64, otherwise floating point. Only `[0-9+-.eE]` are accepted
/// and at least one digit is required, so e.g. "inf" stays a symbol.
pub fn parse_decimal(s: &str) -> Option<Number> {
    if !s.chars().all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        || !s.chars().any(|c| c.is_ascii_digit())
    {
        return None
    }
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::Integer(i))
    }
    s.parse::<f64>().ok().map(Number::Real)
}

/// Would the token `s` read as a number (without a radix prefix)?
pub fn looks_like_number(s: &str) -> bool {
    special_real(s).is_some() || parse_decimal(s).is_some()
}

// Sign followed by at least one digit valid in `base`; rejects the
// extras that BigInt's parser would allow (underscores).
fn is_integer_syntax(s: &str, base: u32) -> bool {
    let digits = s.strip_prefix(|c| c == '+' || c == '-').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_digit(base))
}

fn parse_bigint(s: &str, base: u32) -> Result<BigInt, NumberError> {
    if !is_integer_syntax(s, base) {
        return Err(NumberError::InvalidSyntax(s.into(), base))
    }
    let digits = s.strip_prefix('+').unwrap_or(s);
    BigInt::parse_bytes(digits.as_bytes(), base)
        .ok_or_else(|| NumberError::InvalidSyntax(s.into(), base))
}

/// Parse the token following a `#x`/`#d`/`#o`/`#b` prefix. The
/// special reals are accepted in any radix. Non-decimal integers
/// beyond i64 but within u64 are taken as two's complement, which is
/// what the writer produces for negative numbers.
pub fn parse_with_radix(s: &str, radix: Radix) -> Result<Number, NumberError> {
    if let Some(x) = special_real(s) {
        return Ok(Number::Real(x))
    }
    let base = radix.base();
    if base == 10 {
        return parse_decimal(s)
            .ok_or_else(|| NumberError::InvalidSyntax(s.into(), base))
    }
    let n = parse_bigint(s, base)?;
    if let Some(i) = n.to_i64() {
        Ok(Number::Integer(i))
    } else if let Some(u) = n.to_u64() {
        Ok(Number::Integer(u as i64))
    } else {
        Err(NumberError::OutOfRange(s.into()))
    }
}

/// Parse a byte vector element, range 0..=255.
pub fn parse_byte(s: &str, radix: Radix) -> Result<u8, NumberError> {
    parse_bigint(s, radix.base())?
        .to_u8()
        .ok_or_else(|| NumberError::OutOfRange(s.into()))
}

/// The shortest text reading back as `x`; always contains '.' or an
/// exponent so that it does not read back as an integer.
pub fn format_real(x: f64) -> String {
    if x.is_nan() {
        "+nan.0".into()
    } else if x.is_infinite() {
        if x > 0. { "+inf.0".into() } else { "-inf.0".into() }
    } else {
        format!("{:?}", x)
    }
}

/// Integers in non-decimal radices are written as their 64-bit two's
/// complement.
pub fn format_integer(i: i64, radix: Radix) -> String {
    let prefix = radix.prefix();
    match radix {
        Radix::Decimal | Radix::PrefixedDecimal => format!("{}{}", prefix, i),
        Radix::Hexadecimal => format!("{}{:x}", prefix, i),
        Radix::Octal => format!("{}{:o}", prefix, i),
        Radix::Binary => format!("{}{:b}", prefix, i),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", Number::Integer(0))]
    #[case("-17", Number::Integer(-17))]
    #[case("+5", Number::Integer(5))]
    #[case(".2", Number::Real(0.2))]
    #[case("1.", Number::Real(1.0))]
    #[case("1e6", Number::Real(1e6))]
    #[case("-2.5E-3", Number::Real(-2.5e-3))]
    #[case("99999999999999999999", Number::Real(1e20))]
    fn t_decimal(#[case] s: &str, #[case] n: Number) {
        assert_eq!(parse_decimal(s), Some(n));
    }

    #[rstest]
    #[case("+")]
    #[case("-")]
    #[case(".")]
    #[case("e")]
    #[case("1.6.2")]
    #[case("1e6e2")]
    #[case("inf.0")]
    #[case("1_000")]
    #[case("12a")]
    fn t_not_decimal(#[case] s: &str) {
        assert_eq!(parse_decimal(s), None);
    }

    #[rstest]
    #[case("1AF", Radix::Hexadecimal, 0x1AF)]
    #[case("173", Radix::Octal, 0o173)]
    #[case("1111011", Radix::Binary, 123)]
    #[case("-7b", Radix::Hexadecimal, -123)]
    #[case("ffffffffffffffff", Radix::Hexadecimal, -1)]
    #[case("42", Radix::PrefixedDecimal, 42)]
    fn t_radix(#[case] s: &str, #[case] radix: Radix, #[case] i: i64) {
        assert_eq!(parse_with_radix(s, radix), Ok(Number::Integer(i)));
    }

    #[test]
    fn t_radix_errors() {
        assert!(parse_with_radix("1ffffffffffffffff", Radix::Hexadecimal).is_err());
        assert!(parse_with_radix("12", Radix::Binary).is_err());
        assert!(parse_with_radix("1.5", Radix::Hexadecimal).is_err());
        assert!(parse_with_radix("", Radix::Octal).is_err());
        assert!(parse_with_radix("+inf.0", Radix::Binary).is_ok());
    }

    #[test]
    fn t_byte() {
        assert_eq!(parse_byte("ff", Radix::Hexadecimal), Ok(255));
        assert_eq!(parse_byte("256", Radix::Decimal),
                   Err(NumberError::OutOfRange("256".into())));
        assert!(parse_byte("ffff", Radix::Hexadecimal).is_err());
        assert!(parse_byte("-1", Radix::Decimal).is_err());
    }

    #[test]
    fn t_format() {
        assert_eq!(format_real(1.0), "1.0");
        assert_eq!(format_real(0.1), "0.1");
        assert_eq!(format_real(f64::NEG_INFINITY), "-inf.0");
        assert_eq!(format_real(-f64::NAN), "+nan.0");
        assert_eq!(format_integer(123, Radix::Hexadecimal), "#x7b");
        assert_eq!(format_integer(123, Radix::Octal), "#o173");
        assert_eq!(format_integer(123, Radix::Binary), "#b1111011");
        assert_eq!(format_integer(-1, Radix::Hexadecimal), "#xffffffffffffffff");
        assert_eq!(format_integer(-5, Radix::PrefixedDecimal), "#d-5");
    }

    #[test]
    fn t_nan_eq() {
        assert_eq!(Number::Real(f64::NAN), Number::Real(-f64::NAN));
        assert_eq!(Number::Real(0.0), Number::Real(-0.0));
        assert_ne!(Number::Integer(1), Number::Real(1.0));
    }

    #[rstest]
    #[case(Number::Integer(-3), Number::Integer(2))]
    #[case(Number::Integer(1), Number::Real(1.0))]
    #[case(Number::Real(0.5), Number::Integer(1))]
    #[case(Number::Integer(i64::MAX - 1), Number::Integer(i64::MAX))]
    #[case(Number::Real(f64::NEG_INFINITY), Number::Integer(i64::MIN))]
    #[case(Number::Real(f64::INFINITY), Number::Real(f64::NAN))]
    fn t_order(#[case] a: Number, #[case] b: Number) {
        assert!(a < b);
        assert!(b > a);
    }

    #[test]
    fn t_order_agrees_with_eq() {
        assert_eq!(Number::Real(0.0).cmp(&Number::Real(-0.0)), Ordering::Equal);
        assert_eq!(Number::Real(f64::NAN).cmp(&Number::Real(-f64::NAN)), Ordering::Equal);
    }
}
