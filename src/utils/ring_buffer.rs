use alloc::vec::Vec;

/// Fixed-capacity window of the most recent ticks.
///
/// Ticks are appended until `capacity` is reached; from then on every push
/// overwrites the oldest tick and hands it back so the caller can retire it
/// from its running statistics.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// Held ticks, never more than `capacity`.
    slots: Vec<T>,
    /// Window length.
    capacity: usize,
    /// Slot the next eviction comes from.
    oldest: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            oldest: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    /// Admits `value`, returning the tick it displaced once the window is full.
    pub fn push(&mut self, value: T) -> Option<T> {
        if !self.is_full() {
            self.slots.push(value);
            return None;
        }

        let evicted = core::mem::replace(&mut self.slots[self.oldest], value);
        self.oldest = (self.oldest + 1) % self.capacity;
        Some(evicted)
    }
}
