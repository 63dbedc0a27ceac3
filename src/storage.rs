use alloc::vec::Vec;

use crate::{Discard, Sink};

/// Sink that records every value it receives
///
/// Storage turns a streaming indicator into one whose full output history can
/// be read back by position. Values are appended in arrival order and passed
/// on untouched to an optional downstream sink, so a consumer can sit behind
/// the storage as well.
///
/// The stored sequence is indexed by output, not by tick: entry `i` is the
/// `i`-th value received. Tick indices may skip, so recover the tick of an
/// entry from a downstream sink rather than from `valid_from_bar + i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Storage<T, D = Discard> {
    /// Every value received so far
    data: Vec<T>,
    /// Receives each value after it is stored
    downstream: D,
}

impl<T> Storage<T> {
    /// Creates an empty storage with no downstream consumer
    pub const fn new() -> Self {
        Self {
            data: Vec::new(),
            downstream: Discard,
        }
    }
}

impl<T> Default for Storage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, D> Storage<T, D> {
    /// Creates an empty storage forwarding each value to `downstream`
    ///
    /// # Arguments
    ///
    /// * `downstream` - Sink invoked after every value is stored
    pub const fn with_downstream(downstream: D) -> Self {
        Self {
            data: Vec::new(),
            downstream,
        }
    }

    /// Returns every stored value, oldest first
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Returns the number of stored values
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if nothing was stored yet
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the `i`-th stored value
    #[inline]
    pub fn get(&self, i: usize) -> Option<&T> {
        self.data.get(i)
    }

    /// Returns the most recently stored value
    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.data.last()
    }

    /// Returns the downstream sink
    #[inline]
    pub const fn downstream(&self) -> &D {
        &self.downstream
    }

    /// Consumes the storage and returns the stored values
    #[inline]
    pub fn into_data(self) -> Vec<T> {
        self.data
    }
}

impl<T: Copy, D: Sink<T>> Sink<T> for Storage<T, D> {
    #[inline]
    fn on_value(&mut self, value: T, index: usize) {
        self.data.push(value);
        self.downstream.on_value(value, index);
    }
}
