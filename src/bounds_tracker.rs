use num_traits::Float;

/// Running minimum and maximum over every value a stage has emitted.
///
/// Unlike a rolling extreme this never forgets: the minimum only decreases and
/// the maximum only increases for the lifetime of the indicator. Both bounds
/// start at the infinities and become meaningful with the first output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsTracker<T> {
    /// Smallest emitted value
    min: T,
    /// Largest emitted value
    max: T,
    /// Whether any value was recorded yet
    seen: bool,
}

impl<T: Float> BoundsTracker<T> {
    /// Creates an empty tracker
    pub fn new() -> Self {
        Self {
            min: T::infinity(),
            max: T::neg_infinity(),
            seen: false,
        }
    }

    /// Folds one emitted value into the bounds
    #[inline]
    pub fn record_output(&mut self, value: T) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.seen = true;
    }

    /// Returns the smallest emitted value, or `None` before the first output
    #[inline]
    pub fn min(&self) -> Option<T> {
        self.seen.then_some(self.min)
    }

    /// Returns the largest emitted value, or `None` before the first output
    #[inline]
    pub fn max(&self) -> Option<T> {
        self.seen.then_some(self.max)
    }
}

impl<T: Float> Default for BoundsTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}
