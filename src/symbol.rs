// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Interned symbols. All symbols with the same name share one
//! allocation, held in a process-wide table for the lifetime of the
//! process, so that comparison is a pointer comparison.

use crate::number::looks_like_number;
use crate::parse::is_delimiter;
use kstring::KString;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug)]
struct SymbolData {
    name: KString,
    plain: bool,
}

static SYMBOLS: Lazy<RwLock<FxHashMap<Box<str>, Symbol>>> =
    Lazy::new(|| RwLock::new(FxHashMap::default()));

#[derive(Clone)]
pub struct Symbol(Arc<SymbolData>);

impl Symbol {
    /// Look up the symbol named `name`, interning it on first use.
    pub fn from_string(name: &str) -> Symbol {
        {
            let table = SYMBOLS.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(sym) = table.get(name) {
                return sym.clone();
            }
        }
        let mut table = SYMBOLS.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have won the race between the locks.
        if let Some(sym) = table.get(name) {
            return sym.clone();
        }
        let sym = Symbol(Arc::new(SymbolData {
            name: KString::from_ref(name),
            plain: is_plain_symbol_name(name),
        }));
        tracing::trace!("interned symbol {:?}", name);
        table.insert(name.into(), sym.clone());
        sym
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Whether the name can be written without `|...|` and still
    /// read back as this symbol. The writer may still decide to quote
    /// (e.g. for ASCII-only output).
    pub fn is_plain(&self) -> bool {
        self.0.plain
    }

    pub fn ptr_eq(a: &Symbol, b: &Symbol) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

/// `null` and `nil` are always quoted so that the output does not
/// depend on the reader's setting for reading them as `()`.
fn is_plain_symbol_name(name: &str) -> bool {
    !(name.is_empty()
      || name.starts_with('#')
      || name.starts_with('`')
      || name == "."
      || name == "null"
      || name == "nil"
      || looks_like_number(name)
      || name.chars().any(|c| c == '|' || c == '\\' || is_delimiter(c)))
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Symbol) -> bool {
        Symbol::ptr_eq(self, other)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state)
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Symbol) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Symbol) -> Ordering {
        self.name().cmp(other.name())
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({:?})", self.name())
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Symbol {
        Symbol::from_string(s)
    }
}

/// A tag naming a type, written `#t:name`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeIdentifier(Symbol);

impl TypeIdentifier {
    pub fn new(sym: Symbol) -> Self {
        TypeIdentifier(sym)
    }

    pub fn from_string(name: &str) -> Self {
        TypeIdentifier(Symbol::from_string(name))
    }

    pub fn symbol(&self) -> &Symbol {
        &self.0
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }
}

impl std::fmt::Display for TypeIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#t:{}", self.0)
    }
}

impl std::fmt::Debug for TypeIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TypeIdentifier({:?})", self.name())
    }
}
