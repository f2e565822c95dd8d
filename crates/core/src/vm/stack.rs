//! Typed value stacks.
//!
//! Each thread owns four of these (vector, real, string, object). Depth 0 is the top of the
//! stack. Reading or popping past the bottom is an internal violation.

use crate::common::error::{Fatal, fatal};

/// A growable stack of one value kind.
#[derive(Clone, Debug)]
pub struct ValueStack<T> {
    name: &'static str,
    items: Vec<T>,
    peak: usize,
}

impl<T> ValueStack<T> {
    /// Creates an empty stack with room for `capacity` entries.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self { name, items: Vec::with_capacity(capacity), peak: 0 }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Largest depth reached so far.
    pub const fn peak(&self) -> usize {
        self.peak
    }

    #[cold]
    fn underflow(&self, depth: usize) -> ! {
        fatal(Fatal::StackUnderflow { stack: self.name, depth, size: self.items.len() })
    }

    /// Pushes a value.
    #[inline]
    pub fn push(&mut self, value: T) {
        self.items.push(value);
        self.peak = self.peak.max(self.items.len());
    }

    /// Pops the top value.
    #[inline]
    pub fn pop(&mut self) -> T {
        match self.items.pop() {
            Some(v) => v,
            None => self.underflow(0),
        }
    }

    /// Discards the top `n` values.
    pub fn pop_n(&mut self, n: usize) {
        if n > self.items.len() {
            self.underflow(n);
        }
        self.items.truncate(self.items.len() - n);
    }

    fn slot(&self, depth: usize) -> usize {
        match self.items.len().checked_sub(depth + 1) {
            Some(idx) => idx,
            None => self.underflow(depth),
        }
    }

    /// Borrows the value `depth` entries below the top.
    #[inline]
    pub fn peek(&self, depth: usize) -> &T {
        &self.items[self.slot(depth)]
    }

    /// Mutably borrows the value `depth` entries below the top, for in-place updates.
    #[inline]
    pub fn peek_mut(&mut self, depth: usize) -> &mut T {
        let idx = self.slot(depth);
        &mut self.items[idx]
    }

    /// Overwrites the value `depth` entries below the top without popping.
    pub fn poke(&mut self, depth: usize, value: T) {
        *self.peek_mut(depth) = value;
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
