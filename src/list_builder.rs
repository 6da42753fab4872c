// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Accumulate list elements with O(1) appends, then turn them into a
//! chain of pairs in one go.

use crate::formatting::ListFormatting;
use crate::value::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("list builder was modified during iteration")]
pub struct ConcurrentModification;

#[derive(Debug, Default)]
pub struct ListBuilder {
    items: Vec<Value>,
    formatting: Option<ListFormatting>,
    version: u64,
}

impl ListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formatting(formatting: ListFormatting) -> Self {
        ListBuilder { formatting: Some(formatting), ..Default::default() }
    }

    /// Formatting for the outermost pair of the resulting list.
    pub fn set_formatting(&mut self, formatting: Option<ListFormatting>) {
        self.formatting = formatting;
        self.version += 1;
    }

    pub fn formatting(&self) -> Option<&ListFormatting> {
        self.formatting.as_ref()
    }

    pub fn add(&mut self, v: Value) {
        self.items.push(v);
        self.version += 1;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn reset(&mut self) {
        self.items.clear();
        self.formatting = None;
        self.version += 1;
    }

    /// The accumulated elements as a proper list, emptying the
    /// builder. An empty builder gives `Null`, without formatting.
    pub fn to_value(&mut self) -> Value {
        self.to_value_with_tail(Value::null())
    }

    /// Like `to_value` but the last pair's cdr is `tail`. With no
    /// elements, `tail` itself is returned.
    pub fn to_value_with_tail(&mut self, tail: Value) -> Value {
        let items = std::mem::take(&mut self.items);
        let formatting = self.formatting.take();
        self.version += 1;
        if items.is_empty() {
            return tail
        }
        let mut v = items.into_iter().rev().fold(tail, |tail, v| Value::cons(v, tail));
        if let Some(f) = formatting {
            v.set_list_formatting(f);
        }
        v
    }

    /// Borrowing iteration; the borrow checker rules out mutation.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    /// A position that does not borrow the builder between steps;
    /// stepping fails once the builder has been modified.
    pub fn cursor(&self) -> Cursor {
        Cursor { index: 0, version: self.version }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    index: usize,
    version: u64,
}

impl Cursor {
    pub fn next<'b>(&mut self, builder: &'b ListBuilder)
                    -> Result<Option<&'b Value>, ConcurrentModification> {
        if builder.version != self.version {
            return Err(ConcurrentModification)
        }
        let item = builder.items.get(self.index);
        if item.is_some() {
            self.index += 1;
        }
        Ok(item)
    }
}

impl FromIterator<Value> for ListBuilder {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut b = ListBuilder::new();
        b.extend(iter);
        b
    }
}

impl Extend<Value> for ListBuilder {
    fn extend<I: IntoIterator<Item = Value>>(&mut self, iter: I) {
        for v in iter {
            self.add(v);
        }
    }
}
