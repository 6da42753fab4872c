// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! S-Expressions as a data interchange format: a value model, a
//! reader and a pretty-printing writer.
//!
//! * The syntax blends R7RS and Racket: booleans, integers and
//!   doubles in several radices, Unicode characters and strings, byte
//!   vectors (`#u8(...)`) and byte strings (`#"..."`), interned
//!   symbols, pairs and lists with `()`, `[]` or `{}`, and type
//!   identifiers (`#t:name`). Quoting sugar is rejected.
//!
//! * [Value](value::Value) can carry formatting hints (radix, paren
//!   kind, line breaking, escaping style) so that data read and
//!   written back keeps its shape.
//!
//! * Good error reporting: reader errors carry the line and column,
//!   structural errors also the position of the opening paren.
//!
//! * Direct access to the tokenizer, `sexpio::parse`, as well as
//!   `sexpio::read` to build in-memory trees. Both read lazily from
//!   anything implementing `Read`.
//!
//! ```
//! use sexpio::{parse_str, to_string};
//! let v = parse_str("[1 #x1f |two words|]").unwrap();
//! assert_eq!(to_string(&v).unwrap(), "[1 31 |two words|]");
//! ```

pub mod buffered_chars;
pub mod formatting;
pub mod list_builder;
pub mod number;
pub mod parse;
pub mod pos;
pub mod read;
pub mod settings;
pub mod symbol;
pub mod value;
pub mod write;

pub use formatting::{Formatting, Parenkind};
pub use list_builder::ListBuilder;
pub use number::Number;
pub use read::{Reader, ReadErrorWithPos};
pub use settings::{ReaderSettings, WriterSettings};
pub use symbol::{Symbol, TypeIdentifier};
pub use value::{Value, ValueType};
pub use write::{WriteError, Writer, to_string};

/// The first datum in `s`, or `Value::eof()` if there is none.
pub fn parse_str(s: &str) -> Result<Value, ReadErrorWithPos> {
    read::from_string(s, ReaderSettings::default()).read()
}

/// All data in `s`.
pub fn parse_all_str(s: &str) -> Result<Vec<Value>, ReadErrorWithPos> {
    read::from_string(s, ReaderSettings::default()).read_all().collect()
}
